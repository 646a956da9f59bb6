//! wiki-mail — apply wiki page edits sent by email.

pub mod channels;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod runner;
pub mod store;

pub use runner::Runner;
