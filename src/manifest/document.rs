use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, ConfigurationError};

/// Permission needed to use the extension storage area.
pub const STORAGE_PERMISSION: &str = "storage";
/// Permission needed to read the cookie store.
pub const COOKIES_PERMISSION: &str = "cookies";

/// The parts of an extension `manifest.json` that gate token sync.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub manifest_version: Option<u32>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub host_permissions: Vec<String>,
    #[serde(default)]
    pub background: Option<BackgroundEntry>,
}

/// `background` accepts a service worker (MV3) or scripts/page (MV2).
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BackgroundEntry {
    pub service_worker: Option<String>,
    pub scripts: Option<Vec<String>>,
    pub page: Option<String>,
}

impl BackgroundEntry {
    pub fn is_declared(&self) -> bool {
        self.service_worker.as_deref().is_some_and(|s| !s.is_empty())
            || self.scripts.as_ref().is_some_and(|s| !s.is_empty())
            || self.page.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::InvalidManifest(e.to_string()))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| BridgeError::ManifestIo {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self::from_json(&json)?)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn has_background(&self) -> bool {
        self.background
            .as_ref()
            .is_some_and(BackgroundEntry::is_declared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mv3_manifest() {
        let manifest = Manifest::from_json(
            r#"{
                "name": "My Extension",
                "manifest_version": 3,
                "permissions": ["storage", "cookies"],
                "host_permissions": ["https://*.example.com/*"],
                "background": { "service_worker": "background.js" },
                "action": { "default_popup": "popup.html" }
            }"#,
        )
        .unwrap();
        assert!(manifest.has_permission(STORAGE_PERMISSION));
        assert!(manifest.has_permission(COOKIES_PERMISSION));
        assert!(manifest.has_background());
        assert_eq!(manifest.manifest_version, Some(3));
    }

    #[test]
    fn test_empty_background_is_not_declared() {
        let manifest = Manifest::from_json(r#"{"background": {"scripts": []}}"#).unwrap();
        assert!(!manifest.has_background());
        assert!(manifest.permissions.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Manifest::from_json("{"),
            Err(ConfigurationError::InvalidManifest(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Manifest::load(dir.path().join("manifest.json")).await;
        assert!(matches!(result, Err(BridgeError::ManifestIo { .. })));
    }
}
