use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::handler::{HostUrls, SyncReadOrder, DEFAULT_POLL_INTERVAL_MS};

/// Cookie sync settings. Unset fields are derived from the publishable key.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct SyncConfig {
    pub enabled: Option<bool>,
    pub cookie_name: Option<String>,
    pub host_urls: Option<HostUrls>,
    #[serde(default)]
    pub read_order: SyncReadOrder,
}

/// Where cookies are read from.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct CookieStoreConfig {
    #[serde(flatten)]
    pub backend: CookieStoreBackend,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
#[serde(tag = "type")]
pub enum CookieStoreBackend {
    #[default]
    #[serde(rename = "memory")]
    Memory,
    /// The jar shared with the bridge's own HTTP client.
    #[serde(rename = "jar")]
    Jar,
    /// A JSON cookie export written by the browser side.
    #[serde(rename = "file")]
    File { path: String },
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}
