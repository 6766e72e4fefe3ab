use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::storage::StorageConfig;
use super::sync::{CookieStoreConfig, PollConfig, SyncConfig};
use crate::error::BridgeError;
use crate::models::ExtensionContext;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Prefix for environment overrides, e.g. `TOKENBRIDGE_PUBLISHABLE_KEY`
/// or `TOKENBRIDGE_SYNC__ENABLED`.
pub const ENV_PREFIX: &str = "TOKENBRIDGE_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: which context this process is, where the token
/// lives and how it is synced.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub publishable_key: String,
    #[serde(default)]
    pub context: ExtensionContext,
    /// Path to the extension `manifest.json`, validated before sync starts.
    pub manifest_path: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub cookies: CookieStoreConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Load config from a YAML file, with environment overrides on top.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, BridgeError> {
    let figment = Figment::new()
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    let config = figment
        .extract::<Config>()
        .map_err(|e| BridgeError::Config(e.to_string()))?;
    match config {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), BridgeError> {
    let schema = schema_for!(Config);
    let rendered =
        serde_json::to_string_pretty(&schema).map_err(|e| BridgeError::Config(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}
