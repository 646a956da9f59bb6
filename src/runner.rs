//! Runner — wires a store, the parser and the processor together for one email.

use std::sync::Arc;

use tracing::info;

use crate::config::{ProcessorOptions, StoreConfig};
use crate::error::StoreError;
use crate::pipeline::{EditProcessor, RunReport, parser};
use crate::store::{ContentStore, HttpStore};

/// Applies the edits in one email to one wiki.
pub struct Runner {
    store: Arc<dyn ContentStore>,
    email: String,
    options: ProcessorOptions,
}

impl Runner {
    /// Connect to the wiki over HTTP.
    ///
    /// An unusable host or port is the only error that stops a whole run.
    pub fn connect(config: &StoreConfig, email: impl Into<String>) -> Result<Self, StoreError> {
        let store = HttpStore::new(config)?;
        info!(url = %store.base_url(), user = %config.username, "Connected to wiki");
        Ok(Self::with_store(Arc::new(store), email))
    }

    /// Run against any store.
    pub fn with_store(store: Arc<dyn ContentStore>, email: impl Into<String>) -> Self {
        Self {
            store,
            email: email.into(),
            options: ProcessorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ProcessorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Parse the email, apply its edits in order and report on each.
    pub async fn run(&self) -> RunReport {
        let edits = parser::parse(&self.email);
        info!(edits = edits.len(), "Parsed email");

        let processor = EditProcessor::with_options(Arc::clone(&self.store), self.options);
        RunReport::new(processor.apply(&edits).await)
    }
}
