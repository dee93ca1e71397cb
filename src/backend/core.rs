/*!
Capability traits for remote command execution.

A backend opens one session per device; a session runs at most one command at
a time. Failures are ordinary data the collector aggregates, never unwinds.
*/

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::collector::inventory::InventoryHost;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("TCP error: {0}")]
    Tcp(String),
    #[error("SSH error: {0}")]
    Ssh(String),
    #[error("SSH authentication error: {0}")]
    Auth(String),
    #[error("Command execution error: {0}")]
    Command(String),
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),
    #[error("Async error: {0}")]
    Async(String),
}

/// Device operating-system family, used to pick backend execution semantics.
///
/// Unrecognized vendors get generic treatment here; they only fail later if
/// the command registry has no entry for them either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Junos,
    Eos,
    Sros,
    Huawei,
    Generic,
}

impl Platform {
    pub fn from_vendor(vendor: &str) -> Self {
        match vendor.to_ascii_lowercase().as_str() {
            "cisco" => Platform::Ios,
            "juniper" => Platform::Junos,
            "arista" => Platform::Eos,
            "nokia" => Platform::Sros,
            "huawei" => Platform::Huawei,
            // FRR, Quagga and anything unrecognized
            _ => Platform::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Junos => "junos",
            Platform::Eos => "eos",
            Platform::Sros => "sros",
            Platform::Huawei => "huawei",
            Platform::Generic => "generic",
        }
    }
}

/// Connection parameters for one device, handed to the backend as-is.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub address: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Selection hint for backend strategy; does not alter command content.
    pub platform: Platform,
    /// Opaque pass-through from the inventory's `connection_options`.
    pub options: HashMap<String, serde_yaml::Value>,
}

impl From<&InventoryHost> for ConnectionParams {
    fn from(host: &InventoryHost) -> Self {
        Self {
            address: host.address.clone(),
            port: host.port,
            username: host.username.clone(),
            password: host.password.clone(),
            platform: Platform::from_vendor(&host.vendor),
            options: host.connection_options.clone(),
        }
    }
}

/// An established session on one device.
///
/// The collector issues commands sequentially; a session never has more than
/// one command in flight.
#[async_trait]
pub trait DeviceSession: Send {
    async fn execute(&mut self, command: &str) -> Result<String, ExecutionError>;
    async fn close(self: Box<Self>) -> Result<(), ExecutionError>;
}

impl std::fmt::Debug for dyn DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DeviceSession")
    }
}

/// Capability for opening command-execution sessions on remote devices.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn connect(
        &self,
        params: &ConnectionParams,
    ) -> Result<Box<dyn DeviceSession>, ExecutionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_vendor() {
        assert_eq!(Platform::from_vendor("cisco"), Platform::Ios);
        assert_eq!(Platform::from_vendor("Juniper"), Platform::Junos);
        assert_eq!(Platform::from_vendor("arista"), Platform::Eos);
        assert_eq!(Platform::from_vendor("nokia"), Platform::Sros);
        assert_eq!(Platform::from_vendor("huawei"), Platform::Huawei);
        assert_eq!(Platform::from_vendor("frr"), Platform::Generic);
        assert_eq!(Platform::from_vendor("quagga"), Platform::Generic);
        assert_eq!(Platform::from_vendor("some-new-vendor"), Platform::Generic);
    }

    #[test]
    fn test_connection_params_from_host() {
        let inventory = crate::collector::inventory::Inventory::from_string(
            "R9:\n  address: 198.51.100.9\n  username: admin\n  password: secret\n  vendor: nokia\n  protocol: isis\n  port: 830\n",
        )
        .unwrap();
        let host = inventory.hosts(None, None)[0];

        let params = ConnectionParams::from(host);
        assert_eq!(params.address, "198.51.100.9");
        assert_eq!(params.port, 830);
        assert_eq!(params.username.as_deref(), Some("admin"));
        assert_eq!(params.platform, Platform::Sros);
        assert_eq!(params.platform.as_str(), "sros");
    }
}
