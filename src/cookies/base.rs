use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{file_cookies::JsonFileCookieStore, jar_cookies::JarCookieStore, memory_cookies::MemoryCookieStore};
use crate::config::{CookieStoreBackend, CookieStoreConfig};
use crate::error::CookieError;

/// A cookie as seen by the bridge. Only `value` is ever used as a token.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// `example.com` is host-only, `.example.com` also matches subdomains.
    pub domain: String,
    #[serde(default = "root_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
}

fn root_path() -> String {
    "/".to_string()
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Cookie {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: root_path(),
            secure: false,
        }
    }

    /// Whether a browser would send this cookie with a request to `url`.
    pub fn matches_url(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        let domain = self.domain.to_ascii_lowercase();

        let domain_ok = match domain.strip_prefix('.') {
            Some(parent) => host == parent || host.ends_with(&format!(".{}", parent)),
            None => host == domain,
        };
        let path_ok = url.path().starts_with(&self.path);
        let scheme_ok = !self.secure || url.scheme() == "https";

        domain_ok && path_ok && scheme_ok
    }
}

// Cookie values are session credentials.
impl std::fmt::Debug for Cookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

/// Read access to the browser cookie store.
#[async_trait]
pub trait CookieStore: Send + Sync {
    fn get_name(&self) -> &str;

    /// Looks up the cookie called `name` that would be sent to `url`.
    async fn get(&self, name: &str, url: &Url) -> Result<Option<Cookie>, CookieError>;
}

/// Creates a cookie store from config. `jar` is the jar shared with the
/// bridge's HTTP client; it is only read for the `jar` backend.
pub fn create_cookie_store(config: &CookieStoreConfig, jar: Arc<Jar>) -> Arc<dyn CookieStore> {
    match &config.backend {
        CookieStoreBackend::Memory => {
            info!("Using in-memory cookie store.");
            Arc::new(MemoryCookieStore::new())
        }
        CookieStoreBackend::Jar => {
            info!("Using the HTTP client cookie jar as cookie store.");
            Arc::new(JarCookieStore::new(jar))
        }
        CookieStoreBackend::File { path } => {
            info!("Using cookie export at '{}'", path);
            Arc::new(JsonFileCookieStore::new(path))
        }
    }
}
