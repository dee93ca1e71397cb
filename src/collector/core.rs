/*!
The collection pipeline: concurrent per-host command execution and
deterministic aggregation.

One bounded task per host; commands run sequentially within a host on a
single session. Completion order across hosts is unconstrained and
irrelevant: joined results land in index-addressed slots and the aggregate is
rebuilt in inventory order, so the artifact is byte-for-byte reproducible for
identical inputs and command outcomes.
*/

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::backend::core::{ConnectionParams, ExecutionBackend, ExecutionError};
use crate::collector::commands;
use crate::collector::inventory::{Inventory, InventoryHost};

/// Tuning knobs for a collection run.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Maximum number of hosts worked on at once.
    pub max_workers: usize,
    /// Upper bound for a single command round-trip.
    pub command_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_workers: 10,
            command_timeout: Duration::from_secs(60),
        }
    }
}

/// One command's outcome on one host, in command-resolution order.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub command: String,
    /// Raw device output, or an `ERROR: …` sentinel when the command failed.
    pub output: String,
    pub success: bool,
}

/// Result from a single host collection.
///
/// `success` reflects command resolution and the connection, not individual
/// commands: a host whose commands all failed is still a successful host,
/// with the failures recorded per command.
#[derive(Debug, Clone)]
pub struct HostResult {
    pub hostname: String,
    pub vendor: String,
    pub protocol: String,
    pub commands: Vec<String>,
    pub outputs: Vec<CommandOutput>,
    pub success: bool,
    pub error: Option<String>,
}

/// Result from a whole collection run.
#[derive(Debug, Clone)]
pub struct CollectionResult {
    /// The aggregated artifact: labeled blocks in inventory order.
    pub raw_lsdb_text: String,
    pub host_results: Vec<HostResult>,
    pub errors: Vec<String>,
}

/// Collects LSDB data from every inventory host through an execution backend.
pub struct Collector {
    inventory: Inventory,
    backend: Arc<dyn ExecutionBackend>,
    config: CollectorConfig,
}

impl Collector {
    pub fn new(inventory: Inventory, backend: Arc<dyn ExecutionBackend>) -> Self {
        Self {
            inventory,
            backend,
            config: CollectorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CollectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Executes a collection run over all hosts matching `protocol`, or the
    /// whole inventory when no override is given.
    ///
    /// Always returns a result once the collector is constructed: per-host
    /// and per-command failures are reported inside it, never raised.
    pub async fn collect(&self, protocol: Option<&str>) -> CollectionResult {
        let hosts: Vec<InventoryHost> = self
            .inventory
            .hosts(protocol, None)
            .into_iter()
            .cloned()
            .collect();

        if hosts.is_empty() {
            return CollectionResult {
                raw_lsdb_text: String::new(),
                host_results: Vec::new(),
                errors: vec!["No hosts found in inventory".to_string()],
            };
        }

        info!(hosts = hosts.len(), "starting collection run");

        let host_count = hosts.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers.max(1)));
        let mut tasks: JoinSet<(usize, HostOutcome)> = JoinSet::new();

        for (index, host) in hosts.into_iter().enumerate() {
            let backend = Arc::clone(&self.backend);
            let semaphore = Arc::clone(&semaphore);
            let command_timeout = self.config.command_timeout;
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("collector semaphore closed");
                (index, collect_host(backend, &host, command_timeout).await)
            });
        }

        let mut slots: Vec<Option<HostOutcome>> = (0..host_count).map(|_| None).collect();
        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => {
                    error!("host task failed to complete: {e}");
                    errors.push(format!("host task failed to complete: {e}"));
                }
            }
        }

        let mut host_results = Vec::with_capacity(host_count);
        let mut blocks = Vec::new();
        for outcome in slots.into_iter().flatten() {
            errors.extend(outcome.errors);
            let result = outcome.result;
            if result.success {
                for output in result.outputs.iter().filter(|o| o.success) {
                    blocks.push(format!(
                        "=== {} - {} ===\n{}\n",
                        result.hostname, output.command, output.output
                    ));
                }
            }
            host_results.push(result);
        }

        CollectionResult {
            raw_lsdb_text: blocks.join("\n"),
            host_results,
            errors,
        }
    }
}

struct HostOutcome {
    result: HostResult,
    errors: Vec<String>,
}

/// Runs one host's full command sequence: resolve, connect, execute each
/// command in order, close. Command failures do not stop the sequence.
async fn collect_host(
    backend: Arc<dyn ExecutionBackend>,
    host: &InventoryHost,
    command_timeout: Duration,
) -> HostOutcome {
    let commands = match commands::resolve(&host.protocol, &host.vendor) {
        Ok(commands) => commands,
        Err(e) => {
            warn!(host = %host.name, "command resolution failed: {e}");
            return HostOutcome {
                result: failed_result(host, Vec::new(), &e.to_string()),
                errors: vec![format!("{}: {}", host.name, e)],
            };
        }
    };

    let params = ConnectionParams::from(host);
    debug!(host = %host.name, platform = params.platform.as_str(), "connecting");
    let mut session = match backend.connect(&params).await {
        Ok(session) => session,
        Err(e) => {
            warn!(host = %host.name, "connection failed: {e}");
            return HostOutcome {
                result: failed_result(host, commands, &e.to_string()),
                errors: vec![format!("{}: {}", host.name, e)],
            };
        }
    };

    let mut outputs = Vec::with_capacity(commands.len());
    let mut errors = Vec::new();
    for command in &commands {
        let outcome = match tokio::time::timeout(command_timeout, session.execute(command)).await {
            Ok(result) => result,
            Err(_) => Err(ExecutionError::Timeout(command_timeout)),
        };
        match outcome {
            Ok(output) => {
                debug!(host = %host.name, command = %command, bytes = output.len(), "command succeeded");
                outputs.push(CommandOutput {
                    command: command.clone(),
                    output,
                    success: true,
                });
            }
            Err(e) => {
                warn!(host = %host.name, command = %command, "command failed: {e}");
                outputs.push(CommandOutput {
                    command: command.clone(),
                    output: format!("ERROR: {e}"),
                    success: false,
                });
                errors.push(format!("{} - {}: {}", host.name, command, e));
            }
        }
    }

    if let Err(e) = session.close().await {
        warn!(host = %host.name, "failed to close session: {e}");
    }

    HostOutcome {
        result: HostResult {
            hostname: host.name.clone(),
            vendor: host.vendor.clone(),
            protocol: host.protocol.clone(),
            commands,
            outputs,
            success: true,
            error: None,
        },
        errors,
    }
}

fn failed_result(host: &InventoryHost, commands: Vec<String>, error: &str) -> HostResult {
    HostResult {
        hostname: host.name.clone(),
        vendor: host.vendor.clone(),
        protocol: host.protocol.clone(),
        commands,
        outputs: Vec::new(),
        success: false,
        error: Some(error.to_string()),
    }
}
