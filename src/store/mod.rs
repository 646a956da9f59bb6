//! Content store layer — where wiki pages are read from and written to.

pub mod http;
pub mod memory;
pub mod traits;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use traits::{ContentStore, Page};
