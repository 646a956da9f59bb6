//! Shared types for the edit pipeline.

use std::fmt;

use serde::Serialize;

// ── Operation ───────────────────────────────────────────────────────

/// The kind of change an edit asks for, chosen by its leading marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `>Title` — overwrite the page, creating it if needed.
    Replace,
    /// `>>Title` — add the body after the existing content.
    Append,
    /// `<<Title` — add the body before the existing content.
    Prepend,
    /// `<Title` — insert the body as a line in sorted position.
    InsertSorted,
    /// No recognised marker. Always fails when applied.
    Unknown,
}

impl Operation {
    /// Map a marker (`>`, `>>`, `<<`, `<`) to its operation.
    pub fn from_marker(marker: &str) -> Self {
        match marker {
            ">" => Self::Replace,
            ">>" => Self::Append,
            "<<" => Self::Prepend,
            "<" => Self::InsertSorted,
            _ => Self::Unknown,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::InsertSorted => "insert_sorted",
            Self::Unknown => "unknown",
        }
    }
}

// ── Edit ────────────────────────────────────────────────────────────

/// One instruction to change a wiki page, cut from an email.
///
/// The title and body are always derived from the raw segment; an `Edit`
/// cannot be changed after it is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    operation: Operation,
    title: String,
    body: String,
    raw_segment: String,
}

impl Edit {
    pub(crate) fn new(operation: Operation, title: String, body: String, raw_segment: String) -> Self {
        Self {
            operation,
            title,
            body,
            raw_segment,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Page the edit targets.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Text supplied by the sender.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The segment of the email this edit was parsed from.
    pub fn raw_segment(&self) -> &str {
        &self.raw_segment
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_segment)
    }
}

// ── Result ──────────────────────────────────────────────────────────

/// Whether an edit went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditStatus {
    Success,
    Failure,
}

impl fmt::Display for EditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Failure => "failure",
        })
    }
}

/// Outcome of applying one edit, e.g. `success: appended to "todo"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditResult {
    status: EditStatus,
    message: String,
}

impl EditResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: EditStatus::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: EditStatus::Failure,
            message: message.into(),
        }
    }

    pub fn status(&self) -> EditStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_success(&self) -> bool {
        self.status == EditStatus::Success
    }
}

impl fmt::Display for EditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}
