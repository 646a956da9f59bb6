//! Error types for wiki-mail.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Content store errors.
///
/// A missing page is not an error; reads report it as `Page::Absent`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid store endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Store unavailable for {title:?}: {reason}")]
    Unavailable { title: String, reason: String },

    #[error("Store rejected write to {title:?}: {reason}")]
    WriteRejected { title: String, reason: String },

    #[error("Failed to list pages: {reason}")]
    ListingFailed { reason: String },

    #[error("Invalid page title {title:?}: {reason}")]
    InvalidTitle { title: String, reason: String },

    #[error("Page {title:?} is not valid UTF-8")]
    UndecodableContent { title: String },
}

impl StoreError {
    /// Errors about the page itself rather than the store being reachable.
    pub fn is_page_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTitle { .. } | Self::UndecodableContent { .. }
        )
    }
}

/// Errors raised while applying a single edit.
///
/// These never escape the processor; they become failure lines in the report.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("unrecognized edit marker in {line:?}")]
    UnknownOperation { line: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Report delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid {field} address {address:?}: {reason}")]
    InvalidAddress {
        field: &'static str,
        address: String,
        reason: String,
    },

    #[error("Failed to build report email: {0}")]
    Build(String),

    #[error("Failed to send report via {transport}: {reason}")]
    SendFailed { transport: String, reason: String },
}
