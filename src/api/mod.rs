/*!
Thin async bindings for the upstream topology-analysis service.

These are pass-through HTTP calls: the service parses the uploaded LSDB text
and owns all graph computation. Nothing here interprets device output.
*/

mod client;
mod graph;
mod upload;

pub use self::client::{ApiClient, ApiError};
pub use self::graph::{
    AdjacencyEvents, Event, EventQuery, Graph, NetworkEntry, NetworkEvents, Node, PathResult,
};
pub use self::upload::{LsdbUpload, normalize_vendor};
