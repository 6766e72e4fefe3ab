use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A wrapper for the storage configuration:
/// - enabled: if false, the token cache is disabled (NoStorageArea).
/// - backend: the storage area backing the cache. Defaults to memory.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct StorageConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(flatten)]
    pub backend: Option<StorageBackend>,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            enabled: true,
            backend: None,
        }
    }
}

/// The existing storage backends, selected by a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StorageBackend {
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "file")]
    File(FileStorageConfig),
}

/// A JSON document on disk, shared by every process pointing at it.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FileStorageConfig {
    pub path: String,
}
