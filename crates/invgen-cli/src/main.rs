//! Invgen - Main entry point
//!
//! Pulls the device inventory from NetBox (or a record dump), projects it
//! and writes the host map, group registry and Ansible inventory tree.

mod config;
mod sink;

use anyhow::{bail, Context, Result};
use clap::Parser;
use invgen_core::{DeviceRecord, Projector};
use invgen_netbox::{load_records, NetboxClient};
use std::path::PathBuf;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::{Config, SourceKind};

#[derive(Parser, Debug)]
#[command(name = "invgen")]
#[command(about = "Generate automation inventories from a NetBox source of truth")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "invgen.toml")]
    config: PathBuf,

    /// Read device records from this file instead of NetBox
    #[arg(short, long)]
    source_file: Option<PathBuf>,

    /// Output directory for the inventory files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Project and print the inventory tree without writing files
    #[arg(long)]
    dry_run: bool,
}

async fn load_devices(config: &Config) -> Result<Vec<DeviceRecord>> {
    match config.source.kind {
        SourceKind::File => {
            let Some(path) = config.source.path.as_ref() else {
                bail!("source.path must be set for the file source");
            };
            load_records(path).with_context(|| format!("Failed to load {}", path.display()))
        }
        SourceKind::Netbox => {
            let client = NetboxClient::new(config.to_client_config()?)
                .context("Failed to create NetBox client")?;
            client
                .fetch_records()
                .await
                .context("Failed to fetch NetBox inventory")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Invgen v{}", env!("CARGO_PKG_VERSION"));

    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded environment file");
    }

    let mut config = config::load_config(&args.config)?;
    config.apply_env(|key| std::env::var(key).ok());

    if let Some(path) = args.source_file {
        config.source.kind = SourceKind::File;
        config.source.path = Some(path);
    }
    if let Some(dir) = args.output_dir {
        config.output.dir = dir;
    }

    info!(
        source = ?config.source.kind,
        output = %config.output.dir.display(),
        dedup = ?config.registry.dedup,
        "Configuration loaded"
    );

    let devices = load_devices(&config).await?;

    let projection = Projector::new(config.registry.dedup).project(&devices);

    info!(
        devices = devices.len(),
        hosts = projection.hosts.len(),
        classes = projection.registry.len(),
        groups = projection.tree.groups().count(),
        skipped = projection.skipped.len(),
        "Projected inventory"
    );
    for skipped in &projection.skipped {
        warn!(device = %skipped.name, reason = %skipped.reason, "Device left out of inventory");
    }

    let rendered = sink::render(&projection)?;

    if args.dry_run {
        println!("{}", rendered.tree);
        println!(
            "{} hosts, {} classes, {} skipped (dry run, nothing written)",
            projection.hosts.len(),
            projection.registry.len(),
            projection.skipped.len()
        );
    } else {
        let written = rendered.write_to(&config.output.dir, &config.output)?;
        info!(files = written.len(), "Inventory written");
    }

    Ok(())
}
