/*!
Collection pipeline

Structure:
- `commands`: static registry mapping (protocol, vendor) to show commands.
- `inventory`: YAML device list loading and validation.
- `core`: the concurrent collector that fans out per-host tasks and merges
          their output into one ordered artifact.

Re-exports the result types and `Collector` for easy consumption by callers.
*/

pub mod commands;
pub mod core;
pub mod inventory;

pub use self::core::{CollectionResult, Collector, CollectorConfig, CommandOutput, HostResult};
pub use self::inventory::{Inventory, InventoryHost};
