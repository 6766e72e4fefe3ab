//! Bridge initialization for one execution context.
//!
//! Parses the publishable key, derives the sync parameters, validates the
//! extension manifest when sync is requested, and wires the handler and
//! interceptors into a [`ContextBridge`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{ConfigV1, SyncConfig};
use crate::cookies::{create_cookie_store, CookieStore, CookieSyncReader, HostUrls};
use crate::error::{BridgeError, ConfigurationError};
use crate::handler::{JwtHandler, SyncParameters, DEFAULT_POLL_INTERVAL_MS};
use crate::interceptors::{RequestInterceptor, ResponseInterceptor, TokenTransport};
use crate::manifest::{
    candidate_hosts, require_host_permission, to_host_urls, validate_manifest, Manifest,
    RequestedFeatures,
};
use crate::models::{ExtensionContext, PublishableKey};
use crate::state::ContextBridge;
use crate::storage::{create_storage_area, StorageArea, StorageCache};

/// Everything a context needs to bring the bridge up.
pub struct BridgeOptions {
    pub publishable_key: String,
    pub context: ExtensionContext,
    /// Web origin(s) whose cookie carries the token. `None` leaves the
    /// decision to `sync` config and the manifest.
    pub sync_host: Option<HostUrls>,
    pub sync: SyncConfig,
    pub manifest: Option<Manifest>,
    pub storage: Arc<dyn StorageArea>,
    pub cookies: Arc<dyn CookieStore>,
    pub jar: Arc<Jar>,
    pub poll_interval: Duration,
}

impl BridgeOptions {
    pub fn new(
        publishable_key: impl Into<String>,
        storage: Arc<dyn StorageArea>,
        cookies: Arc<dyn CookieStore>,
    ) -> Self {
        BridgeOptions {
            publishable_key: publishable_key.into(),
            context: ExtensionContext::default(),
            sync_host: None,
            sync: SyncConfig::default(),
            manifest: None,
            storage,
            cookies,
            jar: Arc::new(Jar::default()),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// Brings the bridge up for one context.
///
/// # Errors
///
/// `CredentialsError` for a missing or malformed publishable key, and
/// `ConfigurationError` when sync is requested but the manifest does not
/// allow it. Both are fatal for the sync feature and not retried.
pub fn init(options: BridgeOptions) -> Result<ContextBridge, BridgeError> {
    let publishable_key = PublishableKey::parse(&options.publishable_key)?;
    let id = Uuid::new_v4();

    let sync_host = options
        .sync_host
        .clone()
        .or_else(|| manifest_sync_hosts(options.manifest.as_ref(), &options.sync));
    let params = SyncParameters::from_environment(&publishable_key, sync_host, &options.sync);

    if params.enabled {
        let manifest = options.manifest.as_ref().ok_or_else(|| {
            ConfigurationError::InvalidManifest(
                "cookie sync requires the extension manifest".to_string(),
            )
        })?;
        validate_manifest(
            manifest,
            RequestedFeatures {
                sync: true,
                background: options.context.can_poll(),
            },
        )?;
        for host in params.host_urls.as_slice() {
            require_host_permission(manifest, host)?;
        }
    } else if let Some(manifest) = &options.manifest {
        validate_manifest(manifest, RequestedFeatures::default())?;
    }

    let key = params.cache_key();
    let handler = JwtHandler::new(StorageCache::new(options.storage.clone()), key)
        .with_context(options.context)
        .with_sync(
            CookieSyncReader::new(options.cookies.clone()),
            params.clone(),
            options.sync.read_order,
        );
    let handler = Arc::new(handler);
    let transport = TokenTransport::from(publishable_key.instance_type());

    info!(
        bridge_id = %id,
        context = %options.context,
        instance_type = ?publishable_key.instance_type(),
        sync = params.enabled,
        storage = options.storage.get_name(),
        cookies = options.cookies.get_name(),
        "Token bridge initialized"
    );

    Ok(ContextBridge {
        id,
        context: options.context,
        publishable_key,
        request_interceptor: RequestInterceptor::new(handler.clone(), transport),
        response_interceptor: ResponseInterceptor::new(handler.clone(), transport),
        handler,
        transport,
        jar: options.jar,
        poll_interval: options.poll_interval,
        shutdown: CancellationToken::new(),
    })
}

/// Brings the bridge up from a loaded config file.
pub async fn init_from_config(config: &ConfigV1) -> Result<ContextBridge, BridgeError> {
    let manifest = match &config.manifest_path {
        Some(path) => Some(Manifest::load(path).await?),
        None => None,
    };
    let jar = Arc::new(Jar::default());

    let mut options = BridgeOptions::new(
        config.publishable_key.clone(),
        create_storage_area(&config.storage),
        create_cookie_store(&config.cookies, jar.clone()),
    );
    options.context = config.context;
    options.sync = config.sync.clone();
    options.manifest = manifest;
    options.jar = jar;
    options.poll_interval = Duration::from_millis(config.poll.interval_ms);

    init(options)
}

/// When sync is explicitly on but no host is configured, the manifest's
/// host permissions are the candidates.
fn manifest_sync_hosts(manifest: Option<&Manifest>, sync: &SyncConfig) -> Option<HostUrls> {
    if sync.enabled != Some(true) || sync.host_urls.is_some() {
        return None;
    }
    let hosts = candidate_hosts(manifest?);
    if hosts.is_empty() {
        warn!("Sync is enabled but the manifest declares no usable host permissions");
        return None;
    }
    Some(to_host_urls(&hosts))
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose, Engine as _};

    use super::*;
    use crate::cookies::MemoryCookieStore;
    use crate::error::CredentialsError;
    use crate::manifest::BackgroundEntry;
    use crate::storage::MemoryStorageArea;

    fn live_key() -> String {
        format!(
            "pk_live_{}",
            general_purpose::STANDARD.encode("clerk.example.com$")
        )
    }

    fn options() -> BridgeOptions {
        BridgeOptions::new(
            live_key(),
            Arc::new(MemoryStorageArea::new()),
            Arc::new(MemoryCookieStore::new()),
        )
    }

    fn manifest(permissions: &[&str], hosts: &[&str]) -> Manifest {
        Manifest {
            permissions: permissions.iter().map(|s| s.to_string()).collect(),
            host_permissions: hosts.iter().map(|s| s.to_string()).collect(),
            background: Some(BackgroundEntry {
                service_worker: Some("background.js".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_key_is_a_credentials_error() {
        let mut opts = options();
        opts.publishable_key = String::new();
        assert!(matches!(
            init(opts),
            Err(BridgeError::Credentials(CredentialsError::MissingPublishableKey))
        ));
    }

    #[test]
    fn test_without_sync_host_sync_is_off() {
        let bridge = init(options()).unwrap();
        assert!(!bridge.handler().is_sync_enabled());
        assert_eq!(bridge.transport(), TokenTransport::BearerHeader);
        assert_eq!(
            bridge.handler().key().as_str(),
            format!("__client_jwt|{}", live_key())
        );
    }

    #[test]
    fn test_sync_without_manifest_is_rejected() {
        let mut opts = options();
        opts.sync_host = Some(HostUrls::from("app.example.com"));
        assert!(matches!(
            init(opts),
            Err(BridgeError::Configuration(ConfigurationError::InvalidManifest(_)))
        ));
    }

    #[test]
    fn test_sync_validates_manifest_in_order() {
        let mut opts = options();
        opts.sync_host = Some(HostUrls::from("app.example.com"));
        opts.manifest = Some(manifest(&["storage"], &[]));
        assert!(matches!(
            init(opts),
            Err(BridgeError::Configuration(ConfigurationError::MissingPermission(p))) if p == "cookies"
        ));
    }

    #[test]
    fn test_sync_host_must_be_covered() {
        let mut opts = options();
        opts.sync_host = Some(HostUrls::from("app.example.com"));
        opts.manifest = Some(manifest(&["storage", "cookies"], &["https://other.org/*"]));
        assert!(matches!(
            init(opts),
            Err(BridgeError::Configuration(
                ConfigurationError::NoMatchingHostPermission { .. }
            ))
        ));
    }

    #[test]
    fn test_sync_enabled_with_valid_manifest() {
        let mut opts = options();
        opts.sync_host = Some(HostUrls::from("app.example.com"));
        opts.manifest = Some(manifest(&["storage", "cookies"], &["https://*.example.com/*"]));
        let bridge = init(opts).unwrap();
        assert!(bridge.handler().is_sync_enabled());
    }

    #[test]
    fn test_manifest_hosts_used_when_sync_forced_on() {
        let mut opts = options();
        opts.sync.enabled = Some(true);
        opts.manifest = Some(manifest(&["storage", "cookies"], &["https://*.example.com/*"]));
        let bridge = init(opts).unwrap();
        assert!(bridge.handler().is_sync_enabled());
    }

    #[tokio::test]
    async fn test_only_background_polls_and_teardown_stops_it() {
        let mut opts = options();
        opts.sync_host = Some(HostUrls::from("app.example.com"));
        opts.manifest = Some(manifest(&["storage", "cookies"], &["https://*.example.com/*"]));
        opts.context = ExtensionContext::Popup;
        let popup = init(opts).unwrap();
        assert!(popup.start_poll().is_none());

        let mut opts = options();
        opts.sync_host = Some(HostUrls::from("app.example.com"));
        opts.manifest = Some(manifest(&["storage", "cookies"], &["https://*.example.com/*"]));
        let background = init(opts).unwrap();
        let poll = background.start_poll().unwrap();

        background.teardown();
        assert!(background.is_torn_down());
        assert_eq!(poll.wait().await, None);
        assert!(background.start_poll().is_none());
    }
}
