use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lsdb_collector::api::ApiClient;
use lsdb_collector::backend::ssh::SshBackend;
use lsdb_collector::collector::commands;
use lsdb_collector::collector::{CollectionResult, Collector, CollectorConfig, Inventory};

/// Collects link-state databases from a fleet of network devices.
#[derive(Parser)]
#[command(name = "lsdb-collector", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a collection over the inventory and print or write the artifact
    Collect(CollectArgs),
    /// List protocols known to the command registry
    Protocols,
    /// List vendors registered for a protocol
    Vendors { protocol: String },
}

#[derive(Args)]
struct CollectArgs {
    /// Path to the inventory YAML file
    #[arg(short, long)]
    inventory: PathBuf,
    /// Only collect from hosts running this protocol
    #[arg(short, long)]
    protocol: Option<String>,
    /// Write the aggregated LSDB text here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Maximum number of concurrent host sessions
    #[arg(long, default_value_t = 10)]
    workers: usize,
    /// Per-command timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,
    /// Upload the artifact to this topology service URL after collection
    #[arg(long)]
    upload_url: Option<String>,
    /// Username for the topology service
    #[arg(long)]
    upload_user: Option<String>,
    /// Password for the topology service
    #[arg(long)]
    upload_password: Option<String>,
    /// Watcher name recorded with the upload
    #[arg(long)]
    watcher: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Collect(args) => collect(args).await,
        Commands::Protocols => {
            for protocol in commands::list_protocols() {
                println!("{protocol}");
            }
            Ok(())
        }
        Commands::Vendors { protocol } => {
            for vendor in commands::list_vendors(&protocol)? {
                println!("{vendor}");
            }
            Ok(())
        }
    }
}

async fn collect(args: CollectArgs) -> anyhow::Result<()> {
    let inventory = Inventory::load(&args.inventory)
        .with_context(|| format!("failed to load inventory {}", args.inventory.display()))?;

    let collector = Collector::new(inventory, Arc::new(SshBackend::new())).with_config(
        CollectorConfig {
            max_workers: args.workers,
            command_timeout: Duration::from_secs(args.timeout),
        },
    );
    let result = collector.collect(args.protocol.as_deref()).await;

    for host in &result.host_results {
        if host.success {
            info!(host = %host.hostname, commands = host.commands.len(), "collected");
        } else {
            warn!(
                host = %host.hostname,
                error = host.error.as_deref().unwrap_or("unknown"),
                "host failed"
            );
        }
    }
    for error in &result.errors {
        warn!("{error}");
    }

    if let Some(url) = &args.upload_url {
        upload(&result, url, &args).await?;
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &result.raw_lsdb_text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                bytes = result.raw_lsdb_text.len(),
                path = %path.display(),
                "wrote aggregated LSDB"
            );
        }
        None => println!("{}", result.raw_lsdb_text),
    }

    Ok(())
}

async fn upload(result: &CollectionResult, url: &str, args: &CollectArgs) -> anyhow::Result<()> {
    let Some(host) = result.host_results.iter().find(|h| h.success) else {
        warn!("skipping upload, no host collected successfully");
        return Ok(());
    };

    let mut client = ApiClient::new(url);
    if let (Some(user), Some(password)) = (&args.upload_user, &args.upload_password) {
        client = client.with_basic_auth(user, password);
    }

    let protocol = args.protocol.as_deref().unwrap_or(&host.protocol);
    let graph = client
        .upload_raw(
            &result.raw_lsdb_text,
            &host.vendor,
            protocol,
            args.watcher.as_deref(),
        )
        .await
        .context("failed to upload LSDB to topology service")?;
    info!(
        graph_time = graph.graph_time.as_deref().unwrap_or("-"),
        "uploaded graph"
    );
    Ok(())
}
