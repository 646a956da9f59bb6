//! Run report — the summary sent back to whoever mailed the edits.

use std::fmt;

use serde::Serialize;

use crate::pipeline::types::EditResult;

/// Render results one per line as `- <status>: <message>`.
///
/// No trailing newline is added after the last line.
pub fn format_report(results: &[EditResult]) -> String {
    results
        .iter()
        .map(|result| format!("- {result}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every edit outcome of one run, in email order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    results: Vec<EditResult>,
}

impl RunReport {
    pub fn new(results: Vec<EditResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[EditResult] {
        &self.results
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The report as JSON: `{"results": [{"status": ..., "message": ...}]}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_report(&self.results))
    }
}
