//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default SMTP submission port.
const DEFAULT_SMTP_PORT: u16 = 587;

/// Connection parameters for the wiki.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

impl StoreConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Base URL every page path is resolved against.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

/// How the created/replaced outcome is worded in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerbStyle {
    /// `created` when the page was absent, `replaced` when it existed.
    #[default]
    ExistenceAware,
    /// Always `created/replaced`, whether or not the page existed.
    Combined,
}

/// What to do when the pre-edit read fails for a reason other than absence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFailurePolicy {
    /// Log the failure and carry on as if the page did not exist.
    #[default]
    TreatAsAbsent,
    /// Fail the edit.
    Fail,
}

/// Knobs for the edit processor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorOptions {
    pub verb_style: VerbStyle,
    pub read_failures: ReadFailurePolicy,
}

/// How the report email leaves the machine.
#[derive(Debug, Clone)]
pub enum MailTransportConfig {
    /// SMTP relay with STARTTLS.
    Smtp {
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<SecretString>,
    },
    /// Local sendmail-compatible binary (`sendmail` on `PATH` when unset).
    Sendmail { command: Option<PathBuf> },
}

/// Report mail configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub transport: MailTransportConfig,
    pub from_address: String,
    pub subject: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransportConfig::Sendmail { command: None },
            from_address: "wiki-mail@localhost".to_string(),
            subject: "wiki edit report".to_string(),
        }
    }
}

impl MailConfig {
    /// Build config from `WIKI_MAIL_*` environment variables.
    ///
    /// `WIKI_MAIL_SMTP_HOST` selects SMTP; without it the report goes through
    /// the local sendmail binary.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let transport = match lookup("WIKI_MAIL_SMTP_HOST").filter(|h| !h.is_empty()) {
            Some(host) => {
                let port = match lookup("WIKI_MAIL_SMTP_PORT") {
                    Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                        key: "WIKI_MAIL_SMTP_PORT".into(),
                        message: format!("{raw:?}: {e}"),
                    })?,
                    None => DEFAULT_SMTP_PORT,
                };
                let username = lookup("WIKI_MAIL_SMTP_USERNAME");
                let password = lookup("WIKI_MAIL_SMTP_PASSWORD").map(SecretString::from);
                if username.is_some() != password.is_some() {
                    return Err(ConfigError::MissingRequired {
                        key: if username.is_some() {
                            "WIKI_MAIL_SMTP_PASSWORD".into()
                        } else {
                            "WIKI_MAIL_SMTP_USERNAME".into()
                        },
                        hint: "SMTP credentials need both a username and a password".into(),
                    });
                }
                MailTransportConfig::Smtp {
                    host,
                    port,
                    username,
                    password,
                }
            }
            None => MailTransportConfig::Sendmail {
                command: lookup("WIKI_MAIL_SENDMAIL").map(PathBuf::from),
            },
        };

        Ok(Self {
            transport,
            from_address: lookup("WIKI_MAIL_FROM").unwrap_or(defaults.from_address),
            subject: lookup("WIKI_MAIL_SUBJECT").unwrap_or(defaults.subject),
        })
    }
}
