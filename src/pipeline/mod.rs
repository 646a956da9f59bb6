//! Edit pipeline.
//!
//! Every email flows through:
//! 1. `parser::parse()` — email text → ordered edits
//! 2. `EditProcessor::apply()` — edits → store writes, one result per edit
//! 3. `RunReport` — results → the text mailed back to the sender

pub mod parser;
pub mod processor;
pub mod report;
pub mod types;

pub use processor::EditProcessor;
pub use report::{RunReport, format_report};
pub use types::{Edit, EditResult, EditStatus, Operation};
