//! Outbound channels for run reports.

pub mod email;

pub use email::{LettreMailer, ReportMailer, extract_reply_address, resolve_recipient};
