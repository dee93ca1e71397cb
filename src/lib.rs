/*!
Collects link-state databases from a fleet of heterogeneous network devices
and merges them into one deterministic, labeled text artifact for downstream
topology parsing.

Structure:
- `collector`: inventory, command registry, and the concurrent collection
               pipeline.
- `backend`: execution-backend capability traits and the SSH transport.
- `api`: bindings for the upstream topology-analysis service.
*/

pub mod api;
pub mod backend;
pub mod collector;
