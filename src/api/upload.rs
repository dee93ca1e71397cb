/*!
Upload of raw LSDB artifacts to the topology service.
*/

use serde::Serialize;

use super::client::{ApiClient, ApiError};
use super::graph::Graph;

/// One raw-LSDB payload, as the create-graph endpoints expect it.
#[derive(Debug, Clone, Serialize)]
pub struct LsdbUpload {
    pub lsdb_output: String,
    pub vendor_device: String,
    pub igp_protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watcher_name: Option<String>,
}

/// Maps lower-cased vendor names onto the casing the API expects.
/// Unknown vendors pass through unchanged.
pub fn normalize_vendor(vendor: &str) -> String {
    let normalized = match vendor.to_ascii_lowercase().as_str() {
        "cisco" => "Cisco",
        "juniper" => "Juniper",
        "arista" => "Arista",
        "nokia" => "Nokia",
        "frr" => "FRR",
        "quagga" => "Quagga",
        "huawei" => "Huawei",
        "bird" => "Bird",
        "mikrotik" => "Mikrotik",
        "paloalto" => "Paloalto",
        "ubiquiti" => "Ubiquiti",
        "alliedtelesis" => "AlliedTelesis",
        "zte" => "ZTE",
        "extreme" => "Extreme",
        "ericsson" => "Ericsson",
        "ruckus" => "Ruckus",
        "fortinet" => "Fortinet",
        _ => return vendor.to_string(),
    };
    normalized.to_string()
}

impl ApiClient {
    /// Uploads one raw LSDB artifact and returns the created graph's
    /// metadata, including diff information against the previous upload.
    pub async fn upload_raw(
        &self,
        lsdb_text: &str,
        vendor: &str,
        protocol: &str,
        watcher_name: Option<&str>,
    ) -> Result<Graph, ApiError> {
        let payload = LsdbUpload {
            lsdb_output: lsdb_text.to_string(),
            vendor_device: normalize_vendor(vendor),
            igp_protocol: protocol.to_string(),
            watcher_name: watcher_name.map(str::to_string),
        };
        self.post_json("/graph/", &payload).await
    }

    /// Uploads several LSDB artifacts in one request.
    pub async fn upload_multi(&self, uploads: &[LsdbUpload]) -> Result<Graph, ApiError> {
        self.post_json("/graphs", uploads).await
    }
}
