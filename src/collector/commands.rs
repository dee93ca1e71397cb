/*!
Static registry of vendor- and protocol-specific LSDB show commands.

The table is initialized once before any host task starts and is never
mutated afterwards, so it is shared across concurrent tasks without locking.
Supporting a new vendor or protocol is a data change here, not a logic change.
*/

use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("protocol '{0}' not found in command registry")]
    UnknownProtocol(String),
    #[error("vendor '{vendor}' not found for protocol '{protocol}'. Available vendors: {}", .available.join(", "))]
    UnknownVendor {
        protocol: String,
        vendor: String,
        available: Vec<String>,
    },
}

static COMMAND_REGISTRY: Lazy<HashMap<&'static str, HashMap<&'static str, Vec<&'static str>>>> =
    Lazy::new(|| {
        HashMap::from([
            (
                "ospf",
                HashMap::from([
                    (
                        "cisco",
                        vec![
                            "show ip ospf database router",
                            "show ip ospf database network",
                            "show ip ospf database external",
                        ],
                    ),
                    (
                        "juniper",
                        vec![
                            "show ospf database router extensive | no-more",
                            "show ospf database network extensive | no-more",
                            "show ospf database external extensive | no-more",
                        ],
                    ),
                    (
                        "frr",
                        vec![
                            "show ip ospf database router",
                            "show ip ospf database network",
                            "show ip ospf database external",
                        ],
                    ),
                    (
                        "quagga",
                        vec![
                            "show ip ospf database router",
                            "show ip ospf database network",
                            "show ip ospf database external",
                        ],
                    ),
                    (
                        "arista",
                        vec![
                            "show ip ospf database router detail",
                            "show ip ospf database network detail",
                            "show ip ospf database external detail",
                        ],
                    ),
                    (
                        "nokia",
                        vec![
                            "show router ospf database router detail",
                            "show router ospf database network detail",
                            "show router ospf database external detail",
                        ],
                    ),
                ]),
            ),
            (
                "ospfv3",
                HashMap::from([("arista", vec!["show ipv6 ospf database detail"])]),
            ),
            (
                "isis",
                HashMap::from([
                    ("cisco", vec!["show isis database detail"]),
                    ("juniper", vec!["show isis database extensive"]),
                    ("frr", vec!["show isis database detail"]),
                    ("nokia", vec!["show router isis database detail"]),
                    ("huawei", vec!["display isis lsdb verbose"]),
                ]),
            ),
        ])
    });

/// Resolves the ordered command list for a `(protocol, vendor)` pair.
///
/// Lookup is case-insensitive on both keys. The returned list is a fresh copy
/// on every call, so callers may mutate it without affecting later lookups.
pub fn resolve(protocol: &str, vendor: &str) -> Result<Vec<String>, RegistryError> {
    let protocol = protocol.to_ascii_lowercase();
    let vendor = vendor.to_ascii_lowercase();

    let vendors = COMMAND_REGISTRY
        .get(protocol.as_str())
        .ok_or_else(|| RegistryError::UnknownProtocol(protocol.clone()))?;

    let commands = vendors.get(vendor.as_str()).ok_or_else(|| {
        let mut available: Vec<String> = vendors.keys().map(|v| v.to_string()).collect();
        available.sort_unstable();
        RegistryError::UnknownVendor {
            protocol: protocol.clone(),
            vendor: vendor.clone(),
            available,
        }
    })?;

    Ok(commands.iter().map(|c| c.to_string()).collect())
}

/// Lists all protocols known to the registry, sorted.
pub fn list_protocols() -> Vec<&'static str> {
    let mut protocols: Vec<&'static str> = COMMAND_REGISTRY.keys().copied().collect();
    protocols.sort_unstable();
    protocols
}

/// Lists all vendors registered for a protocol, sorted.
pub fn list_vendors(protocol: &str) -> Result<Vec<&'static str>, RegistryError> {
    let protocol = protocol.to_ascii_lowercase();
    let vendors = COMMAND_REGISTRY
        .get(protocol.as_str())
        .ok_or(RegistryError::UnknownProtocol(protocol))?;
    let mut vendors: Vec<&'static str> = vendors.keys().copied().collect();
    vendors.sort_unstable();
    Ok(vendors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_registered_pair() {
        let commands = resolve("ospf", "cisco").unwrap();
        assert_eq!(
            commands,
            vec![
                "show ip ospf database router",
                "show ip ospf database network",
                "show ip ospf database external",
            ]
        );
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(resolve("OSPF", "Cisco").unwrap(), resolve("ospf", "cisco").unwrap());
        assert_eq!(resolve("IsIs", "HUAWEI").unwrap(), vec!["display isis lsdb verbose"]);
    }

    #[test]
    fn test_resolve_returns_independent_copies() {
        let mut first = resolve("isis", "juniper").unwrap();
        first.push("rogue command".to_string());
        first[0] = "mutated".to_string();

        let second = resolve("isis", "juniper").unwrap();
        assert_eq!(second, vec!["show isis database extensive"]);
    }

    #[test]
    fn test_resolve_unknown_protocol() {
        let err = resolve("bgp", "cisco").unwrap_err();
        assert_eq!(err, RegistryError::UnknownProtocol("bgp".to_string()));
    }

    #[test]
    fn test_resolve_unknown_vendor_lists_alternatives() {
        let err = resolve("ospfv3", "cisco").unwrap_err();
        match err {
            RegistryError::UnknownVendor { protocol, vendor, available } => {
                assert_eq!(protocol, "ospfv3");
                assert_eq!(vendor, "cisco");
                assert_eq!(available, vec!["arista".to_string()]);
            }
            other => panic!("expected UnknownVendor, got {:?}", other),
        }
    }

    #[test]
    fn test_list_protocols() {
        assert_eq!(list_protocols(), vec!["isis", "ospf", "ospfv3"]);
    }

    #[test]
    fn test_list_vendors() {
        assert_eq!(
            list_vendors("isis").unwrap(),
            vec!["cisco", "frr", "huawei", "juniper", "nokia"]
        );
        assert!(matches!(
            list_vendors("rip").unwrap_err(),
            RegistryError::UnknownProtocol(_)
        ));
    }
}
