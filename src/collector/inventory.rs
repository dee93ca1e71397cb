/*!
Inventory handling for topology collection.

Loads a YAML device list into typed, validated host records while preserving
file order. Hosts are immutable after load; the collector clones them into
its per-host tasks.
*/

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("inventory file not found: {0}")]
    NotFound(String),
    #[error("failed to read inventory file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid YAML in inventory file: {0}")]
    Format(#[source] serde_yaml::Error),
    #[error("inventory must be a mapping of host name to host data")]
    NotAMapping,
    #[error("invalid record for host '{host}': {source}")]
    HostFormat {
        host: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("host '{host}' missing required '{field}' field")]
    MissingField { host: String, field: &'static str },
    #[error("duplicate host '{0}' in inventory")]
    DuplicateHost(String),
}

/// A single managed device from the inventory file.
#[derive(Debug, Clone)]
pub struct InventoryHost {
    pub name: String,
    pub address: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Lower-cased device OS family, e.g. `cisco`, `juniper`, `frr`.
    pub vendor: String,
    /// Lower-cased routing protocol: `ospf`, `ospfv3` or `isis`.
    pub protocol: String,
    pub port: u16,
    /// Extra connection parameters passed through opaquely to the backend.
    pub connection_options: HashMap<String, serde_yaml::Value>,
}

/// Raw on-disk shape of one host record, before validation.
#[derive(Debug, Deserialize)]
struct RawHost {
    #[serde(alias = "hostname", alias = "host")]
    address: Option<String>,
    #[serde(alias = "user")]
    username: Option<String>,
    password: Option<String>,
    vendor: Option<String>,
    protocol: Option<String>,
    port: Option<u16>,
    #[serde(default)]
    connection_options: HashMap<String, serde_yaml::Value>,
}

impl InventoryHost {
    fn from_raw(name: &str, raw: RawHost) -> Result<Self, InventoryError> {
        let missing = |field| InventoryError::MissingField {
            host: name.to_string(),
            field,
        };
        let address = raw
            .address
            .filter(|a| !a.is_empty())
            .ok_or_else(|| missing("address"))?;
        let vendor = raw
            .vendor
            .map(|v| v.to_lowercase())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| missing("vendor"))?;
        let protocol = raw
            .protocol
            .map(|p| p.to_lowercase())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| missing("protocol"))?;

        Ok(Self {
            name: name.to_string(),
            address,
            username: raw.username,
            password: raw.password,
            vendor,
            protocol,
            port: raw.port.unwrap_or(22),
            connection_options: raw.connection_options,
        })
    }
}

/// Ordered set of managed devices, keyed by name.
#[derive(Debug, Clone)]
pub struct Inventory {
    hosts: Vec<InventoryHost>,
}

impl Inventory {
    /// Loads and validates the inventory file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InventoryError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InventoryError::NotFound(path.display().to_string()));
        }
        let text = fs::read_to_string(path)?;
        Self::from_string(&text)
    }

    /// Parses inventory YAML already held in memory.
    ///
    /// Top-level keys beginning with `---` are document-separator artifacts
    /// left behind by file concatenation and are skipped, not treated as
    /// hosts. Duplicate host names are rejected.
    pub fn from_string(text: &str) -> Result<Self, InventoryError> {
        let doc: serde_yaml::Value = serde_yaml::from_str(text).map_err(InventoryError::Format)?;
        let mapping = doc.as_mapping().ok_or(InventoryError::NotAMapping)?;

        let mut hosts = Vec::with_capacity(mapping.len());
        let mut seen: HashSet<&str> = HashSet::with_capacity(mapping.len());
        for (key, value) in mapping {
            let name = key.as_str().ok_or(InventoryError::NotAMapping)?;
            if name.starts_with("---") {
                continue;
            }
            if !seen.insert(name) {
                return Err(InventoryError::DuplicateHost(name.to_string()));
            }
            let raw: RawHost =
                serde_yaml::from_value(value.clone()).map_err(|e| InventoryError::HostFormat {
                    host: name.to_string(),
                    source: e,
                })?;
            hosts.push(InventoryHost::from_raw(name, raw)?);
        }

        Ok(Self { hosts })
    }

    /// Returns hosts matching the given filters, preserving file order.
    ///
    /// Filters are case-insensitive equality checks; `None` means no
    /// restriction.
    pub fn hosts(&self, protocol: Option<&str>, vendor: Option<&str>) -> Vec<&InventoryHost> {
        let protocol = protocol.map(str::to_lowercase);
        let vendor = vendor.map(str::to_lowercase);
        self.hosts
            .iter()
            .filter(|h| protocol.as_deref().is_none_or(|p| h.protocol == p))
            .filter(|h| vendor.as_deref().is_none_or(|v| h.vendor == v))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryHost> {
        self.hosts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;

    const SAMPLE: &str = include_str!("../../test_data/inventory.yaml");

    #[test]
    fn test_parse_sample_inventory() {
        let inventory = Inventory::from_string(SAMPLE).unwrap();
        assert_eq!(inventory.len(), 3);

        let hosts = inventory.hosts(None, None);
        assert_eq!(hosts[0].name, "R1");
        assert_eq!(hosts[0].address, "192.0.2.11");
        assert_eq!(hosts[0].port, 22);
        assert_eq!(hosts[0].vendor, "cisco");

        // R2 uses the `host` and `user` aliases and a custom port
        assert_eq!(hosts[1].address, "192.0.2.12");
        assert_eq!(hosts[1].username.as_deref(), Some("netops"));
        assert_eq!(hosts[1].port, 2222);

        // R3 uses the `hostname` alias and carries connection options
        assert_eq!(hosts[2].address, "192.0.2.13");
        assert!(hosts[2].connection_options.contains_key("transport"));
    }

    #[test]
    fn test_vendor_and_protocol_are_lowercased() {
        let inventory = Inventory::from_string(
            "R1:\n  address: 10.0.0.1\n  vendor: Cisco\n  protocol: OSPF\n",
        )
        .unwrap();
        let hosts = inventory.hosts(None, None);
        assert_eq!(hosts[0].vendor, "cisco");
        assert_eq!(hosts[0].protocol, "ospf");
    }

    #[test]
    fn test_filter_by_protocol_preserves_order() {
        let inventory = Inventory::from_string(SAMPLE).unwrap();
        let isis = inventory.hosts(Some("isis"), None);
        assert_eq!(isis.len(), 1);
        assert_eq!(isis[0].name, "R3");

        let ospf = inventory.hosts(Some("OSPF"), None);
        assert_eq!(
            ospf.iter().map(|h| h.name.as_str()).collect::<Vec<_>>(),
            vec!["R1", "R2"]
        );
    }

    #[test]
    fn test_filter_by_vendor() {
        let inventory = Inventory::from_string(SAMPLE).unwrap();
        let juniper = inventory.hosts(None, Some("Juniper"));
        assert_eq!(juniper.len(), 1);
        assert_eq!(juniper[0].name, "R2");

        assert!(inventory.hosts(Some("ospf"), Some("frr")).is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let err = Inventory::from_string("R1:\n  address: 10.0.0.1\n  vendor: cisco\n").unwrap_err();
        match err {
            InventoryError::MissingField { host, field } => {
                assert_eq!(host, "R1");
                assert_eq!(field, "protocol");
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_field_counts_as_missing() {
        let err = Inventory::from_string(
            "R1:\n  address: 10.0.0.1\n  vendor: ''\n  protocol: ospf\n",
        )
        .unwrap_err();
        assert!(matches!(err, InventoryError::MissingField { field: "vendor", .. }));
    }

    #[test]
    fn test_top_level_must_be_mapping() {
        let err = Inventory::from_string("- R1\n- R2\n").unwrap_err();
        assert!(matches!(err, InventoryError::NotAMapping));
    }

    #[test]
    fn test_document_separator_keys_are_skipped() {
        let inventory = Inventory::from_string(
            "'---': null\nR1:\n  address: 10.0.0.1\n  vendor: cisco\n  protocol: ospf\n",
        )
        .unwrap();
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn test_duplicate_host_names_rejected() {
        // serde_yaml may reject duplicate mapping keys on its own; either way
        // the load must fail.
        let result = Inventory::from_string(
            "R1:\n  address: 10.0.0.1\n  vendor: cisco\n  protocol: ospf\nR1:\n  address: 10.0.0.2\n  vendor: frr\n  protocol: ospf\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Inventory::load("/nonexistent/inventory.yaml").unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("hosts.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let inventory = Inventory::load(&path).unwrap();
        assert_eq!(inventory.len(), 3);
    }
}
