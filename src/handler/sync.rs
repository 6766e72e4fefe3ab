use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::SyncConfig;
use crate::cookies::HostUrls;
use crate::models::{InstanceType, PublishableKey};
use crate::storage::CacheKey;

/// Cookie holding the client JWT on production instances.
pub const PRODUCTION_SYNC_COOKIE: &str = "__client";
/// Cookie holding the dev-browser JWT on development instances.
pub const DEVELOPMENT_SYNC_COOKIE: &str = "__clerk_db_jwt";

/// Which source `JwtHandler::get` consults first when sync is on.
///
/// Cookie-first picks up a sign-out/sign-in that happened on the web origin
/// even when a stale token is still cached, so it is the default.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SyncReadOrder {
    #[default]
    CookieFirst,
    CacheFirst,
}

/// How a handler discovers tokens set by a web origin. Fixed for the
/// handler's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncParameters {
    pub enabled: bool,
    pub cookie_name: String,
    pub host_urls: HostUrls,
    /// Namespaces the token slot; the publishable key by default.
    pub tenant: String,
}

impl SyncParameters {
    pub fn disabled(tenant: impl Into<String>) -> Self {
        SyncParameters {
            enabled: false,
            cookie_name: String::new(),
            host_urls: HostUrls::Many(Vec::new()),
            tenant: tenant.into(),
        }
    }

    /// The storage slot holding this tenant's client JWT.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::client_jwt(&self.tenant, None)
    }

    /// Derives the parameters from the instance type and the sync host.
    ///
    /// Sync is on when a sync host is known, unless config says otherwise.
    /// The cookie name follows the instance type unless overridden.
    pub fn from_environment(
        key: &PublishableKey,
        sync_host: Option<HostUrls>,
        config: &SyncConfig,
    ) -> Self {
        let host_urls = config
            .host_urls
            .clone()
            .or(sync_host)
            .unwrap_or(HostUrls::Many(Vec::new()));
        let enabled = config.enabled.unwrap_or(!host_urls.is_empty()) && !host_urls.is_empty();
        let cookie_name = config.cookie_name.clone().unwrap_or_else(|| {
            match key.instance_type() {
                InstanceType::Production => PRODUCTION_SYNC_COOKIE,
                InstanceType::Development => DEVELOPMENT_SYNC_COOKIE,
            }
            .to_string()
        });

        SyncParameters {
            enabled,
            cookie_name,
            host_urls,
            tenant: key.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};

    fn key(prefix: &str) -> PublishableKey {
        let raw = format!(
            "{}{}",
            prefix,
            general_purpose::STANDARD.encode("clerk.example.com$")
        );
        PublishableKey::parse(&raw).unwrap()
    }

    #[test]
    fn test_production_with_sync_host() {
        let params = SyncParameters::from_environment(
            &key("pk_live_"),
            Some(HostUrls::from("example.com")),
            &SyncConfig::default(),
        );
        assert!(params.enabled);
        assert_eq!(params.cookie_name, "__client");
        assert_eq!(params.host_urls, HostUrls::from("example.com"));
        assert!(params.tenant.starts_with("pk_live_"));
    }

    #[test]
    fn test_cache_key_is_namespaced_by_tenant() {
        let live = SyncParameters::from_environment(
            &key("pk_live_"),
            None,
            &SyncConfig::default(),
        );
        let test = SyncParameters::disabled("pk_test_other");
        assert_eq!(
            live.cache_key().as_str(),
            format!("__client_jwt|{}", live.tenant)
        );
        assert_eq!(test.cache_key().as_str(), "__client_jwt|pk_test_other");
        assert_ne!(live.cache_key(), test.cache_key());
    }

    #[test]
    fn test_development_cookie_name() {
        let params = SyncParameters::from_environment(
            &key("pk_test_"),
            Some(HostUrls::from("localhost:3000")),
            &SyncConfig::default(),
        );
        assert!(params.enabled);
        assert_eq!(params.cookie_name, "__clerk_db_jwt");
    }

    #[test]
    fn test_no_sync_host_disables_sync() {
        let params =
            SyncParameters::from_environment(&key("pk_live_"), None, &SyncConfig::default());
        assert!(!params.enabled);

        // Forcing sync on without any host still cannot sync.
        let forced = SyncConfig {
            enabled: Some(true),
            ..Default::default()
        };
        assert!(!SyncParameters::from_environment(&key("pk_live_"), None, &forced).enabled);
    }

    #[test]
    fn test_config_overrides() {
        let config = SyncConfig {
            enabled: Some(false),
            cookie_name: Some("__custom".to_string()),
            host_urls: Some(HostUrls::from("override.example.com")),
            read_order: SyncReadOrder::CacheFirst,
        };
        let params = SyncParameters::from_environment(
            &key("pk_live_"),
            Some(HostUrls::from("example.com")),
            &config,
        );
        assert!(!params.enabled);
        assert_eq!(params.cookie_name, "__custom");
        assert_eq!(params.host_urls, HostUrls::from("override.example.com"));
    }
}
