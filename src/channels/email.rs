//! Report delivery — sends the run report back by email via lettre.
//!
//! SMTP when a relay is configured, otherwise the local sendmail binary.
//! Both lettre transports block, so sends run on the blocking pool.

use std::sync::LazyLock;

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SendmailTransport, SmtpTransport, Transport};
use regex::Regex;
use secrecy::ExposeSecret;

use crate::config::{MailConfig, MailTransportConfig};
use crate::error::MailError;

static EMAIL_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,4}").unwrap());

/// Something that can deliver a run report to a person.
#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send_report(&self, to: &str, report: &str) -> Result<(), MailError>;
}

/// `ReportMailer` backed by lettre.
pub struct LettreMailer {
    config: MailConfig,
}

impl LettreMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Build the report email without sending it.
    pub fn build_message(&self, to: &str, report: &str) -> Result<Message, MailError> {
        Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| MailError::InvalidAddress {
                        field: "from",
                        address: self.config.from_address.clone(),
                        reason: format!("{e}"),
                    })?,
            )
            .to(to.parse().map_err(|e| MailError::InvalidAddress {
                field: "to",
                address: to.to_string(),
                reason: format!("{e}"),
            })?)
            .subject(self.config.subject.as_str())
            .body(report.to_string())
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl ReportMailer for LettreMailer {
    async fn send_report(&self, to: &str, report: &str) -> Result<(), MailError> {
        let message = self.build_message(to, report)?;
        let transport = self.config.transport.clone();
        let label = transport_label(&transport);

        tokio::task::spawn_blocking(move || send_blocking(&transport, &message))
            .await
            .map_err(|e| MailError::SendFailed {
                transport: label.into(),
                reason: format!("send task panicked: {e}"),
            })??;

        tracing::info!(to, transport = label, "Report mailed");
        Ok(())
    }
}

fn transport_label(transport: &MailTransportConfig) -> &'static str {
    match transport {
        MailTransportConfig::Smtp { .. } => "smtp",
        MailTransportConfig::Sendmail { .. } => "sendmail",
    }
}

fn send_blocking(transport: &MailTransportConfig, message: &Message) -> Result<(), MailError> {
    match transport {
        MailTransportConfig::Smtp {
            host,
            port,
            username,
            password,
        } => {
            let mut builder = SmtpTransport::starttls_relay(host)
                .map_err(|e| MailError::SendFailed {
                    transport: "smtp".into(),
                    reason: format!("SMTP relay error: {e}"),
                })?
                .port(*port);
            if let (Some(username), Some(password)) = (username, password) {
                builder = builder.credentials(Credentials::new(
                    username.clone(),
                    password.expose_secret().to_string(),
                ));
            }
            builder
                .build()
                .send(message)
                .map_err(|e| MailError::SendFailed {
                    transport: "smtp".into(),
                    reason: e.to_string(),
                })?;
        }
        MailTransportConfig::Sendmail { command } => {
            let sendmail = match command {
                Some(path) => SendmailTransport::new_with_command(path.as_os_str()),
                None => SendmailTransport::new(),
            };
            sendmail.send(message).map_err(|e| MailError::SendFailed {
                transport: "sendmail".into(),
                reason: e.to_string(),
            })?;
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────

/// First email-address-shaped token anywhere in `text`.
pub fn extract_reply_address(text: &str) -> Option<&str> {
    EMAIL_ADDRESS.find(text).map(|m| m.as_str())
}

/// Where the report goes: the explicit address if given, else the first
/// address found in the email.
pub fn resolve_recipient(explicit: Option<&str>, email: &str) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .or_else(|| extract_reply_address(email))
        .map(str::to_string)
}

#[cfg(test)]
#[path = "email_tests.rs"]
mod tests;
