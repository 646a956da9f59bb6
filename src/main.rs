use std::io::Read;

use anyhow::Context;
use clap::Parser;

use wiki_mail::channels::{LettreMailer, ReportMailer, resolve_recipient};
use wiki_mail::config::{MailConfig, ProcessorOptions, ReadFailurePolicy, StoreConfig, VerbStyle};
use wiki_mail::store::HttpStore;
use wiki_mail::Runner;

/// Apply the wiki edits in an email read from stdin and report on each.
#[derive(Debug, Parser)]
#[command(
    name = "wiki-mail",
    version,
    override_usage = "wiki-mail [OPTIONS] <HOST> <PORT> <USERNAME> <PASSWORD> [REPORT_ADDRESS] < email.txt"
)]
struct Cli {
    /// Wiki host name
    host: String,
    /// Wiki port
    port: u16,
    /// HTTP Basic auth user
    username: String,
    /// HTTP Basic auth password
    password: String,
    /// Where to mail the report (defaults to the first address in the email)
    report_address: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Print the report but do not mail it
    #[arg(long)]
    no_mail: bool,
    /// Report "created/replaced" without checking whether the page existed
    #[arg(long)]
    legacy_verbs: bool,
    /// Fail an edit when its page cannot be read, instead of treating it as new
    #[arg(long)]
    strict_reads: bool,
    /// List the wiki's pages and sizes instead of reading an email
    #[arg(long)]
    list_pages: bool,
}

impl Cli {
    fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.host, self.port, &self.username, &self.password)
    }

    fn processor_options(&self) -> ProcessorOptions {
        ProcessorOptions {
            verb_style: if self.legacy_verbs {
                VerbStyle::Combined
            } else {
                VerbStyle::ExistenceAware
            },
            read_failures: if self.strict_reads {
                ReadFailurePolicy::Fail
            } else {
                ReadFailurePolicy::TreatAsAbsent
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Install rustls crypto provider before any TLS usage
    let _ = rustls::crypto::ring::default_provider().install_default();

    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.list_pages {
        return list_pages(&cli).await;
    }

    let mut email = String::new();
    std::io::stdin()
        .read_to_string(&mut email)
        .context("failed to read email from stdin")?;

    let runner = Runner::connect(&cli.store_config(), email)
        .context("failed to set up wiki client")?
        .with_options(cli.processor_options());
    let report = runner.run().await;

    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Run complete"
    );

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{report}");
    }

    if cli.no_mail {
        return Ok(());
    }

    let Some(recipient) = resolve_recipient(cli.report_address.as_deref(), runner.email()) else {
        tracing::warn!("No report address given or found in the email; report not mailed");
        return Ok(());
    };

    let mailer = LettreMailer::new(MailConfig::from_env()?);
    mailer
        .send_report(&recipient, &report.to_string())
        .await
        .with_context(|| format!("failed to mail report to {recipient}"))?;

    Ok(())
}

async fn list_pages(cli: &Cli) -> anyhow::Result<()> {
    let store = HttpStore::new(&cli.store_config()).context("failed to set up wiki client")?;
    let pages = store.page_sizes().await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&pages)?);
    } else {
        for (title, size) in &pages {
            println!("{size:>8}  {title}");
        }
    }
    Ok(())
}
