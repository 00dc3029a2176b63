//! wdlabel-extract - Wikidata label extraction
//!
//! Runs the label stage over a themes directory: English labels for every
//! known entity, then multilingual labels from a Wikidata N-Triples dump.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wdlabel_common::config::{write_toml_config, TomlConfig};
use wdlabel_common::{DatasetRegistry, Scheduler, StageReport};
use wdlabel_extract::stage::LabelStage;

/// Command-line arguments for wdlabel-extract
#[derive(Parser, Debug)]
#[command(name = "wdlabel-extract")]
#[command(about = "Extract English and multilingual labels from Wikidata")]
#[command(version)]
struct Args {
    /// Config file
    #[arg(short, long, env = "WDLABEL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding input and output datasets
    #[arg(short, long, env = "WDLABEL_THEMES_DIR")]
    themes_dir: Option<PathBuf>,

    /// Wikidata N-Triples dump
    #[arg(short, long, env = "WDLABEL_DUMP")]
    dump: Option<PathBuf>,

    /// Write stage reports as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default configuration to a file
    InitConfig {
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// JSON document written by `--report`
#[derive(Serialize)]
struct RunReport<'a> {
    generated_at: DateTime<Utc>,
    version: &'static str,
    git_hash: &'static str,
    themes_dir: &'a Path,
    dump: &'a Path,
    stages: &'a [StageReport],
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(Command::InitConfig { path, force }) = &args.command {
        return init_config(path, *force);
    }

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // RUST_LOG takes precedence over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting wdlabel-extract {} ({}, {} build, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_PROFILE"),
        env!("BUILD_TIMESTAMP")
    );

    let themes_dir = config.resolve_themes_dir(args.themes_dir.as_deref());
    let dump = config.resolve_dump(args.dump.as_deref(), &themes_dir);
    info!("Themes directory: {}", themes_dir.display());
    info!("Triple dump: {}", dump.display());

    let mut scheduler = Scheduler::new(DatasetRegistry::new(&themes_dir));
    scheduler.add_stage(Box::new(LabelStage::from_config(&config, &dump)));
    let reports = scheduler.run().context("Label extraction failed")?;

    if let Some(path) = &args.report {
        let report = RunReport {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            git_hash: env!("GIT_HASH"),
            themes_dir: &themes_dir,
            dump: &dump,
            stages: &reports,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    info!("Done");
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_toml_config(&TomlConfig::default(), path)
        .with_context(|| format!("Failed to write config {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
