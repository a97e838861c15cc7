//! Check command: fetch both catalogs, reconcile, report and notify

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use super::output::Output;
use crate::domain::{CatalogIndexer, Reconciler, Report};
use crate::notify::{Notification, Notifier, SendmailNotifier};
use crate::storage::{Config, Documents, Fetcher, NotifyConfig, Source};

#[derive(Args)]
pub struct CheckArgs {
    /// Config file (TOML)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Landscape document, URL or path
    #[arg(long, env = "LANDSCAPE_YAML_PATH")]
    pub landscape: Option<Source>,

    /// Registry document, URL or path
    #[arg(long, env = "PROJECTS_YAML_PATH")]
    pub registry: Option<Source>,

    /// Comma-separated notification recipients
    #[arg(long, env = "EMAIL_TO")]
    pub notify_to: Option<String>,

    /// Do not send notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Any non-empty value disables notifications
    #[arg(long, env = "SKIP_EMAIL", hide = true)]
    pub skip_email: Option<String>,
}

impl CheckArgs {
    fn notify_disabled(&self) -> bool {
        self.no_notify || self.skip_email.as_deref().is_some_and(|v| !v.is_empty())
    }

    /// Applies command-line and environment overrides on top of the file config
    fn apply(&self, config: &mut Config) {
        if let Some(landscape) = &self.landscape {
            config.sources.landscape = landscape.clone();
        }
        if let Some(registry) = &self.registry {
            config.sources.registry = registry.clone();
        }
        if let Some(list) = &self.notify_to {
            config.notify.set_recipients(list);
        }
        if self.notify_disabled() {
            config.notify.enabled = false;
        }
    }
}

pub fn run(args: CheckArgs, output: &Output) -> Result<ExitCode> {
    let start = Instant::now();

    let mut config = Config::load(args.config.as_deref())?;
    match &config.path {
        Some(path) => output.verbose_ctx("config", &format!("Loaded {}", path.display())),
        None => output.verbose_ctx("config", "No config file, using defaults"),
    }
    args.apply(&mut config);
    output.verbose_ctx(
        "config",
        &format!("{} exception entries", config.exceptions.len()),
    );

    let fetcher = Fetcher::new(config.fetch.timeout()).context("Failed to build HTTP client")?;
    output.verbose_ctx("fetch", &format!("Landscape: {}", config.sources.landscape));
    output.verbose_ctx("fetch", &format!("Registry: {}", config.sources.registry));
    let documents = match Documents::load(&fetcher, &config.sources.landscape, &config.sources.registry) {
        Ok(documents) => documents,
        Err(e) => {
            // Load failures are mailed like drift
            if let Err(notify_err) = notify(&config.notify, format!("error: {:#}\n", e), output) {
                output.error(&format!("{:#}", notify_err));
            }
            return Err(e);
        }
    };
    output.verbose_ctx(
        "fetch",
        &format!(
            "{} landscape items, {} registry projects",
            documents.landscape.items().count(),
            documents.registry.projects.len()
        ),
    );

    let catalogs = CatalogIndexer::new(&config.exceptions).index(&documents.registry, &documents.landscape);
    output.verbose_ctx(
        "index",
        &format!(
            "{} registry, {} landscape, {} aliases, {} disabled",
            catalogs.registry.projects.len(),
            catalogs.landscape.projects.len(),
            catalogs.aliases.len(),
            catalogs.registry.disabled.len()
        ),
    );
    for name in &catalogs.landscape.unresolved {
        output.verbose_ctx("index", &format!("No registry match for landscape project '{}'", name));
    }

    let result = Reconciler::new(&config.exceptions).reconcile(&catalogs);
    let report = Report::new(&result);

    if output.is_json() {
        output.data(&serde_json::json!({
            "drift_detected": report.drift_detected(),
            "generated_at": Utc::now().to_rfc3339(),
            "landscape": config.sources.landscape.to_string(),
            "registry": config.sources.registry.to_string(),
            "mismatches": result.mismatches,
            "statuses": result.statuses,
            "report": report.lines(),
        }));
    } else {
        output.lines(report.lines());
    }

    if report.drift_detected() {
        notify(&config.notify, report.text(), output)?;
    }

    output.verbose(&format!("Check finished in {:?}", start.elapsed()));

    Ok(if report.drift_detected() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Mails `body` to the configured recipients, if any
fn notify(config: &NotifyConfig, body: String, output: &Output) -> Result<()> {
    if !config.is_active() {
        output.verbose_ctx("notify", "Notifications disabled or no recipients");
        return Ok(());
    }

    let notification = Notification {
        subject: config.subject.clone(),
        body,
    };
    let delivery = SendmailNotifier::from_config(config).deliver(&notification)?;

    for recipient in &delivery.delivered {
        output.verbose_ctx("notify", &format!("Sent to {}", recipient));
    }
    for (recipient, error) in &delivery.failed {
        output.error(&format!("Failed to notify {}: {}", recipient, error));
    }

    Ok(())
}
