//! Drive Group Selector
//!
//! Evaluates a drive group against a host's ceph-volume inventory and
//! prints the devices selected for each storage role.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use drive_group_selector::domain::ports::HostFactsSourceRef;
use drive_group_selector::{
    DriveGroupEvaluator, FileDriveGroupSource, FileHostFactsSource, FileInventorySource,
    HostFacts, InventoryConfig, Role, SelectorConfig, Selection, StaticHostFacts,
};

// =============================================================================
// CLI Arguments
// =============================================================================

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Drive Group Selector - pick devices for data, WAL and DB roles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Drive group spec (YAML or JSON), or a directory of `<host>.yaml` files
    #[arg(long, env = "DRIVE_GROUP")]
    drive_group: PathBuf,

    /// ceph-volume inventory JSON, or a directory of `<host>.json` files
    #[arg(long, env = "INVENTORY")]
    inventory: PathBuf,

    /// Host to evaluate
    #[arg(long, env = "HOST_NAME", default_value = "localhost")]
    host: String,

    /// Host facts JSON (`{host: {"virtual": ...}}`)
    #[arg(long, env = "HOST_FACTS", conflicts_with = "virtual_host")]
    facts: Option<PathBuf>,

    /// Treat the host as virtualized
    #[arg(long = "virtual", env = "VIRTUAL")]
    virtual_host: bool,

    /// Only evaluate this role (data, wal, db)
    #[arg(long)]
    role: Option<Role>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Keep devices ceph-volume reports as unavailable
    #[arg(long, env = "INCLUDE_UNAVAILABLE")]
    include_unavailable: bool,

    /// Reject the legacy `rotates` filter name
    #[arg(long, env = "STRICT_NAMES")]
    strict_names: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args);

    info!("Starting {} {}", drive_group_selector::NAME, drive_group_selector::VERSION);
    info!("  Host: {}", args.host);
    info!("  Drive group: {}", args.drive_group.display());
    info!("  Inventory: {}", args.inventory.display());

    let evaluator = build_evaluator(&args);

    let result = match args.role {
        Some(role) => evaluator
            .evaluate_role(&args.host, role)
            .await
            .map(|selection| render_role(role, &selection, args.format)),
        None => evaluator.evaluate(&args.host).await.map(|selection| match args.format {
            OutputFormat::Json => serde_json::to_string_pretty(&selection),
            OutputFormat::Text => Ok(Role::ALL
                .iter()
                .map(|role| render_text(*role, selection.devices(*role)))
                .collect::<Vec<_>>()
                .join("\n")),
        }),
    };

    let output = match result {
        Ok(rendered) => rendered.context("Failed to render selection")?,
        Err(e) => {
            error!("Drive group evaluation failed ({:?}): {}", e.kind(), e);
            return Err(e).with_context(|| format!("Failed to evaluate drive group for {}", args.host));
        }
    };

    println!("{}", output);
    Ok(())
}

fn build_evaluator(args: &Args) -> DriveGroupEvaluator {
    let facts: HostFactsSourceRef = match (&args.facts, args.virtual_host) {
        (Some(path), _) => Arc::new(FileHostFactsSource::new(path)),
        (None, true) => Arc::new(StaticHostFacts::for_host(&args.host, HostFacts::virtualized("forced"))),
        (None, false) => Arc::new(StaticHostFacts::for_host(&args.host, HostFacts::physical())),
    };

    let inventory_config = InventoryConfig {
        include_unavailable: args.include_unavailable,
    };

    DriveGroupEvaluator::new(
        Arc::new(FileInventorySource::new(&args.inventory, inventory_config)),
        Arc::new(FileDriveGroupSource::new(&args.drive_group)),
        facts,
        SelectorConfig::default().accept_legacy_names(!args.strict_names),
    )
}

// =============================================================================
// Output
// =============================================================================

fn render_role(role: Role, selection: &Selection, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(selection),
        OutputFormat::Text => Ok(render_text(role, selection)),
    }
}

fn render_text(role: Role, selection: &Selection) -> String {
    let mut out = format!("{}_devices: {}", role, selection.len());
    for path in selection.iter() {
        out.push_str("\n  ");
        out.push_str(path);
    }
    out
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // stdout carries the selection
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
