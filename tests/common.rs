#![allow(dead_code)]

use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use tokenbridge::cookies::{CookieStore, MemoryCookieStore};
use tokenbridge::handler::HostUrls;
use tokenbridge::manifest::Manifest;
use tokenbridge::models::ExtensionContext;
use tokenbridge::storage::StorageArea;
use tokenbridge::BridgeOptions;

pub const FRONTEND_API: &str = "clerk.example.com";
pub const SYNC_HOST: &str = "app.example.com";

pub fn live_key() -> String {
    format!(
        "pk_live_{}",
        general_purpose::STANDARD.encode(format!("{}$", FRONTEND_API))
    )
}

pub fn test_key() -> String {
    format!(
        "pk_test_{}",
        general_purpose::STANDARD.encode(format!("{}$", FRONTEND_API))
    )
}

pub const MANIFEST_JSON: &str = r#"{
  "name": "Token bridge test extension",
  "manifest_version": 3,
  "permissions": ["storage", "cookies"],
  "host_permissions": ["https://*.example.com/*"],
  "background": { "service_worker": "background.js" }
}"#;

pub fn manifest() -> Manifest {
    Manifest::from_json(MANIFEST_JSON).expect("test manifest parses")
}

/// Options for a context that syncs from [`SYNC_HOST`].
pub fn sync_options(
    key: String,
    context: ExtensionContext,
    storage: Arc<dyn StorageArea>,
    cookies: Arc<dyn CookieStore>,
) -> BridgeOptions {
    let mut options = BridgeOptions::new(key, storage, cookies);
    options.context = context;
    options.sync_host = Some(HostUrls::from(SYNC_HOST));
    options.manifest = Some(manifest());
    options
}

pub fn no_cookies() -> Arc<MemoryCookieStore> {
    Arc::new(MemoryCookieStore::new())
}
