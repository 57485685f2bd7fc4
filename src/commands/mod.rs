//! Command handlers
//!
//! Each subcommand loads fresh preferences, builds an [`Importer`] wired to
//! the Otter API and the local graph, and reports results on stdout.

mod dialog;
mod settings;

pub(crate) use dialog::run_dialog;
pub(crate) use settings::{run_settings, SettingsArgs};

use crate::config::AppConfig;
use crate::destination::DestinationTable;
use crate::error::AppError;
use crate::graph::{Graph, LocalGraph};
use crate::importer::{Importer, SweepReport, SweepSettings};
use crate::keychain;
use crate::label::{render_label, LabelFields};
use crate::otter::OtterClient;
use crate::preferences::{Preferences, PreferencesStore};
use crate::registry::ImportRegistry;
use crate::roam_date;
use crate::transcript::{format_transcript, render_turns};
use anyhow::Context as _;
use chrono::{Local, Utc};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Shared state for command handlers
pub(crate) struct Context {
    config: AppConfig,
    store: PreferencesStore,
    graph: Arc<LocalGraph>,
}

impl Context {
    pub(crate) fn new(config: AppConfig, store: PreferencesStore, graph: LocalGraph) -> Self {
        Self {
            config,
            store,
            graph: Arc::new(graph),
        }
    }

    fn importer(&self, prefs: &Preferences) -> Result<Importer, AppError> {
        let credentials = keychain::load_credentials(prefs.email.as_deref())?;
        let client = OtterClient::new(&self.config.api)
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;
        let destinations =
            DestinationTable::new(prefs.destination_rules.clone(), prefs.default_variant())?;

        Ok(Importer::new(
            Arc::new(client),
            self.graph.clone(),
            Arc::new(ImportRegistry::new(self.store.clone())),
            destinations,
            credentials,
        )
        .with_sweep_settings(SweepSettings {
            page_size: self.config.sweep.page_size,
            min_age_hours: prefs.sweep_min_age_hours,
        })
        .on_success(Arc::new(|id: &str| {
            println!("Successfully imported otter recording: {}!", id);
        })))
    }

    /// Title of the page holding `uid`, for messages.
    async fn page_title_of(&self, uid: &str) -> String {
        match self.graph.page_of(uid).await {
            Ok(Some(page)) => self
                .graph
                .text_of(&page)
                .ok()
                .flatten()
                .unwrap_or(page),
            _ => uid.to_string(),
        }
    }
}

/// Uid of today's daily page, created when missing.
fn todays_page(graph: &LocalGraph) -> Result<String, AppError> {
    let today = Local::now().date_naive();
    let uid = roam_date::page_uid(today);
    graph.ensure_page(&uid, &roam_date::page_title(today))?;
    Ok(uid)
}

fn print_report(report: &SweepReport) {
    for outcome in &report.imported {
        debug!(id = %outcome.id, order = outcome.order, "Placed recording");
        println!(
            "  {} -> block {} under {} ({})",
            outcome.id, outcome.block_uid, outcome.target, outcome.variant
        );
    }
    for (id, e) in &report.failed {
        eprintln!("Failed to import otter recording {}: {}", id, e.display_message());
    }
    println!(
        "Skipped {} unprocessed, {} already imported, {} too recent",
        report.skipped_unprocessed, report.skipped_imported, report.skipped_recent
    );
}

/// Sweep into `parent`, defaulting to today's daily page.
pub(crate) async fn run_sweep(ctx: &Context, parent: Option<String>) -> anyhow::Result<()> {
    let target = match parent {
        Some(uid) => uid,
        None => todays_page(&ctx.graph)?,
    };
    let prefs = ctx.store.try_load()?;
    let importer = ctx.importer(&prefs)?;

    let report = importer.sweep(&target).await?;
    print_report(&report);
    println!("Imported {} otter recordings into {}", report.count(), target);
    Ok(())
}

/// Sweep into the page containing `block`, or `block` itself.
pub(crate) async fn run_smartblock(ctx: &Context, block: String) -> anyhow::Result<()> {
    let target = match ctx.graph.page_of(&block).await {
        Ok(Some(page)) => page,
        Ok(None) => block,
        Err(e) => {
            warn!(block = %block, "Could not find page for block: {}", e);
            block
        }
    };
    run_sweep(ctx, Some(target)).await
}

/// Startup auto-import into the configured destination.
pub(crate) async fn run_startup(ctx: &Context) -> anyhow::Result<()> {
    let prefs = ctx.store.try_load()?;
    if !prefs.auto_import_enabled() {
        info!("Auto-import is disabled");
        return Ok(());
    }
    let Some(target) = prefs.default_destination.clone() else {
        warn!("Auto-import is enabled but no default destination is set");
        println!(
            "Auto-import is enabled but no default destination is set; \
             run `otter-import settings --default-destination <uid>`"
        );
        return Ok(());
    };

    info!("Auto-import is enabled and running");
    let importer = ctx.importer(&prefs)?;
    let report = importer.sweep(&target).await?;
    print_report(&report);

    println!(
        "Successfully imported {} latest otter recordings automatically at block {} on {}!",
        report.count(),
        target,
        ctx.page_title_of(&target).await
    );
    Ok(())
}

/// Print one recording's transcript using the `template` setting, or
/// grouped by speaker when `by_speaker` is set.
pub(crate) async fn run_show(ctx: &Context, id: String, by_speaker: bool) -> anyhow::Result<()> {
    let prefs = ctx.store.try_load()?;
    let importer = ctx.importer(&prefs)?;
    let detail = importer
        .fetch_recording(&id)
        .await
        .map_err(|e| anyhow::anyhow!(e.display_message()))
        .with_context(|| format!("Failed to fetch recording {}", id))?;

    let heading = render_label(
        prefs.label_or_default(),
        &LabelFields {
            title: detail.title.as_deref(),
            summary: detail.summary.as_deref(),
            created_at: detail.created_at,
            link: detail.link.as_deref(),
        },
        &Local,
        Utc::now(),
    );
    println!("{}", heading);
    if by_speaker {
        println!("{}", format_transcript(&detail.turns));
    } else {
        println!("{}", render_turns(&detail.turns, prefs.template_or_default()));
    }
    Ok(())
}

/// Read one line without its line ending. Wiped from memory on drop.
fn read_password(mut input: impl BufRead) -> std::io::Result<Zeroizing<String>> {
    let mut password = Zeroizing::new(String::new());
    input.read_line(&mut password)?;
    let len = password.trim_end_matches(['\r', '\n']).len();
    password.truncate(len);
    Ok(password)
}

/// Remember the account email and store the password in the keychain.
pub(crate) async fn run_login(ctx: &Context, email: String) -> anyhow::Result<()> {
    print!("Otter password: ");
    std::io::stdout().flush()?;
    let password = read_password(std::io::stdin().lock()).context("Failed to read password")?;

    match keychain::store_password(&email, &password) {
        Ok(()) => println!("Password stored in the keychain"),
        Err(crate::error::KeychainError::NotImplemented) => {
            println!(
                "No keychain on this platform; \
                 set OTTER_PASSWORD in the environment or a .env file"
            );
        }
        Err(e) => return Err(e.into()),
    }

    ctx.store.update(|prefs| prefs.email = Some(email.clone()))?;
    info!(email = %email, "Saved Otter email");
    Ok(())
}

/// Remove the stored password for the configured email.
pub(crate) async fn run_logout(ctx: &Context) -> anyhow::Result<()> {
    let prefs = ctx.store.try_load()?;
    let Some(email) = prefs.email else {
        println!("No Otter account configured");
        return Ok(());
    };
    keychain::delete_password(&email)?;
    println!("Removed stored password for {}", email);
    Ok(())
}
