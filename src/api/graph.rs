/*!
Typed views of the service's graph resources: graph metadata, nodes,
networks, shortest paths and events.
*/

use serde::Deserialize;
use serde_json::Value;

use super::client::{ApiClient, ApiError};

/// Metadata for one uploaded graph, as returned by the create-graph endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Graph {
    pub graph_time: Option<String>,
    pub timestamp: Option<String>,
    pub protocol: Option<String>,
    pub watcher_name: Option<String>,
    #[serde(default)]
    pub is_from_watcher: bool,
    #[serde(default)]
    pub hosts: Value,
    #[serde(default)]
    pub networks: Value,
    #[serde(default)]
    pub areas: Value,
}

/// A node in an uploaded graph.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: Value,
    pub name: Option<String>,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, Value>,
}

/// One advertised network and the routers attached to it.
#[derive(Debug, Clone)]
pub struct NetworkEntry {
    pub network: String,
    pub attributes: Vec<Value>,
}

/// A shortest-path answer.
#[derive(Debug, Clone, Deserialize)]
pub struct PathResult {
    #[serde(default, rename = "spt_path_nodes_name_as_ll_in_ll")]
    pub paths: Vec<Vec<String>>,
    pub cost: Option<f64>,
    #[serde(default, rename = "unbackup_paths_nodes_name_as_ll_in_ll")]
    pub unbackup_paths: Vec<Vec<String>>,
}

/// A topology event reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub event_name: Option<String>,
    pub event_status: Option<String>,
    #[serde(default)]
    pub event_object: Value,
    pub event_detected_by: Option<String>,
    pub graph_time: Option<String>,
    pub timestamp: Option<String>,
    pub watcher_name: Option<String>,
    pub protocol: Option<String>,
    pub old_cost: Option<f64>,
    pub new_cost: Option<f64>,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkEvents {
    #[serde(default)]
    pub network_up_down_events: Vec<Event>,
    #[serde(default)]
    pub network_cost_change_events: Vec<Event>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdjacencyEvents {
    #[serde(default)]
    pub all_host_up_down_events: Vec<Event>,
    #[serde(default)]
    pub single_host_up_events: Vec<Event>,
    #[serde(default)]
    pub single_host_down_events: Vec<Event>,
    #[serde(default)]
    pub adjacency_cost_change_events: Vec<Event>,
}

/// Time window for event queries; `last_minutes` overrides the explicit range.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub last_minutes: Option<u32>,
}

impl EventQuery {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(minutes) = self.last_minutes {
            query.push(("last_minutes", minutes.to_string()));
        } else {
            if let Some(start) = &self.start_time {
                query.push(("start_time", start.clone()));
            }
            if let Some(end) = &self.end_time {
                query.push(("end_time", end.clone()));
            }
        }
        query
    }
}

impl ApiClient {
    /// Fetches the nodes of a graph, optionally filtered by name.
    pub async fn nodes(&self, graph_time: &str, name: Option<&str>) -> Result<Vec<Node>, ApiError> {
        let mut query = Vec::new();
        if let Some(name) = name {
            query.push(("name", name.to_string()));
        }
        let value: Value = self
            .get_json(&format!("/diagram/{graph_time}/nodes"), &query)
            .await?;
        Ok(nodes_from_value(value))
    }

    /// Finds the networks an IP address belongs to.
    pub async fn networks_by_ip(
        &self,
        graph_time: &str,
        ip_address: &str,
    ) -> Result<Vec<NetworkEntry>, ApiError> {
        let value: Value = self
            .get_json(
                &format!("/network/{graph_time}"),
                &[("ip_address", ip_address.to_string())],
            )
            .await?;
        Ok(networks_from_value(value))
    }

    /// Computes the shortest path between two nodes, optionally with edges
    /// removed for backup-path what-ifs.
    pub async fn shortest_path(
        &self,
        graph_time: &str,
        src_node: &str,
        dst_node: &str,
        removed_edges: Option<&[(String, String)]>,
    ) -> Result<PathResult, ApiError> {
        let mut payload = serde_json::json!({
            "graph_time": graph_time,
            "src_node": src_node,
            "dst_node": dst_node,
        });
        if let Some(edges) = removed_edges {
            payload["removedEdgesAsNodePairsFromSptPath_ll_in_ll"] = serde_json::json!(
                edges
                    .iter()
                    .map(|(src, dst)| vec![src.clone(), dst.clone()])
                    .collect::<Vec<_>>()
            );
        }
        self.post_json("/path/", &payload).await
    }

    /// Network up/down and cost-change events in the given window.
    pub async fn network_events(
        &self,
        graph_time: &str,
        query: &EventQuery,
    ) -> Result<NetworkEvents, ApiError> {
        self.get_json(&format!("/events/{graph_time}/networks"), &query.to_query())
            .await
    }

    /// Host up/down and link cost-change events in the given window.
    pub async fn adjacency_events(
        &self,
        graph_time: &str,
        query: &EventQuery,
    ) -> Result<AdjacencyEvents, ApiError> {
        self.get_json(&format!("/events/{graph_time}/adjacency"), &query.to_query())
            .await
    }
}

/// The nodes endpoint answers either a list of records or a map keyed by
/// node id; both are folded into the same shape.
fn nodes_from_value(value: Value) -> Vec<Node> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(id, data)| match data {
                Value::Object(mut record) => {
                    record.insert("id".to_string(), Value::String(id));
                    serde_json::from_value(Value::Object(record)).ok()
                }
                other => Some(Node {
                    id: Value::String(id),
                    name: other.as_str().map(str::to_string),
                    attributes: serde_json::Map::new(),
                }),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn networks_from_value(value: Value) -> Vec<NetworkEntry> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(network, attrs)| NetworkEntry {
                network,
                attributes: match attrs {
                    Value::Array(items) => items,
                    other => vec![other],
                },
            })
            .collect(),
        _ => Vec::new(),
    }
}
