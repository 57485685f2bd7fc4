//! `settings` subcommand

use super::Context;
use crate::destination::{DestinationRule, DestinationTable};
use crate::error::AppError;
use crate::outline::OutlineVariant;
use crate::preferences::Preferences;
use clap::{Args, ValueEnum};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum VariantArg {
    Default,
    AudioNotes,
    WalkingJournal,
}

impl From<VariantArg> for OutlineVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Default => OutlineVariant::Default,
            VariantArg::AudioNotes => OutlineVariant::AudioNotes,
            VariantArg::WalkingJournal => OutlineVariant::WalkingJournal,
        }
    }
}

#[derive(Debug, Default, Args)]
pub(crate) struct SettingsArgs {
    /// Label format for listed recordings
    #[arg(long)]
    label: Option<String>,

    /// Line format used by `show`
    #[arg(long)]
    template: Option<String>,

    /// Import the latest recordings on `startup`
    #[arg(long)]
    auto_import: Option<bool>,

    /// Block uid that startup imports go under
    #[arg(long)]
    default_destination: Option<String>,

    /// Outline variant when no folder rule matches
    #[arg(long, value_enum)]
    default_variant: Option<VariantArg>,

    /// Skip recordings younger than this many hours during sweeps (0 disables)
    #[arg(long)]
    min_age_hours: Option<u64>,

    /// Route a folder: FOLDER_ID=TARGET_UID[:VARIANT]
    #[arg(long, value_parser = parse_rule)]
    add_rule: Vec<DestinationRule>,

    /// Remove the rule for a folder id
    #[arg(long)]
    remove_rule: Vec<i64>,
}

impl SettingsArgs {
    fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.template.is_none()
            && self.auto_import.is_none()
            && self.default_destination.is_none()
            && self.default_variant.is_none()
            && self.min_age_hours.is_none()
            && self.add_rule.is_empty()
            && self.remove_rule.is_empty()
    }
}

fn parse_rule(s: &str) -> Result<DestinationRule, String> {
    let (folder, rest) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FOLDER_ID=TARGET_UID[:VARIANT], got {:?}", s))?;
    let folder_id = folder
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid folder id {:?}: {}", folder, e))?;

    let (target, variant) = match rest.split_once(':') {
        Some((target, variant)) => (
            target,
            VariantArg::from_str(variant.trim(), true)?.into(),
        ),
        None => (rest, OutlineVariant::Default),
    };
    let target = target.trim();
    if target.is_empty() {
        return Err("target uid must not be empty".to_string());
    }

    Ok(DestinationRule {
        folder_id,
        target: target.to_string(),
        variant,
    })
}

/// Apply the requested changes. Rules for an already routed folder replace it.
fn apply(args: &SettingsArgs, prefs: &mut Preferences) -> Result<(), AppError> {
    if let Some(label) = &args.label {
        prefs.label = Some(label.clone());
    }
    if let Some(template) = &args.template {
        prefs.template = Some(template.clone());
    }
    if let Some(auto_import) = args.auto_import {
        prefs.auto_import = Some(auto_import);
    }
    if let Some(destination) = &args.default_destination {
        prefs.default_destination = Some(destination.clone());
    }
    if let Some(variant) = args.default_variant {
        prefs.default_variant = Some(variant.into());
    }
    if let Some(hours) = args.min_age_hours {
        prefs.sweep_min_age_hours = (hours > 0).then_some(hours);
    }

    prefs
        .destination_rules
        .retain(|rule| !args.remove_rule.contains(&rule.folder_id));
    for rule in &args.add_rule {
        prefs
            .destination_rules
            .retain(|existing| existing.folder_id != rule.folder_id);
        prefs.destination_rules.push(rule.clone());
    }

    DestinationTable::new(prefs.destination_rules.clone(), prefs.default_variant())?;
    Ok(())
}

fn print_settings(prefs: &Preferences) {
    println!("email:               {}", prefs.email.as_deref().unwrap_or("(not set)"));
    println!("label:               {}", prefs.label_or_default());
    println!("template:            {}", prefs.template_or_default());
    println!("auto import:         {}", prefs.auto_import_enabled());
    println!(
        "default destination: {}",
        prefs.default_destination.as_deref().unwrap_or("(not set)")
    );
    println!("default variant:     {}", prefs.default_variant());
    match prefs.sweep_min_age_hours {
        Some(hours) => println!("minimum age:         {} hours", hours),
        None => println!("minimum age:         (none)"),
    }
    for rule in &prefs.destination_rules {
        println!(
            "folder {:>10} -> {} ({})",
            rule.folder_id, rule.target, rule.variant
        );
    }
    println!("imported recordings: {}", prefs.ids.len());
}

pub(crate) async fn run_settings(ctx: &Context, args: SettingsArgs) -> anyhow::Result<()> {
    if args.is_empty() {
        print_settings(&ctx.store.load());
        return Ok(());
    }

    let mut prefs = ctx.store.try_load()?;
    apply(&args, &mut prefs)?;
    ctx.store.save(&prefs)?;
    info!(path = ?ctx.store.path(), "Saved settings");
    print_settings(&prefs);
    Ok(())
}
