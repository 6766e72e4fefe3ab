use std::sync::Arc;

use futures::future::{select_ok, FutureExt};
use reqwest::Url;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Cookie, CookieStore};
use crate::error::CookieError;

/// One host URL or several candidates, as written in config.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum HostUrls {
    One(String),
    Many(Vec<String>),
}

impl HostUrls {
    pub fn as_slice(&self) -> &[String] {
        match self {
            HostUrls::One(url) => std::slice::from_ref(url),
            HostUrls::Many(urls) => urls,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<&str> for HostUrls {
    fn from(url: &str) -> Self {
        HostUrls::One(url.to_string())
    }
}

impl From<Vec<String>> for HostUrls {
    fn from(urls: Vec<String>) -> Self {
        HostUrls::Many(urls)
    }
}

/// Prefixes `https://` when the URL carries no scheme, then parses it.
pub fn normalize_host_url(url: &str) -> Result<Url, CookieError> {
    let trimmed = url.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    Url::parse(&candidate).map_err(|e| CookieError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Discovers a session cookie set by a trusted web origin. Read only.
#[derive(Clone)]
pub struct CookieSyncReader {
    store: Arc<dyn CookieStore>,
}

impl CookieSyncReader {
    pub fn new(store: Arc<dyn CookieStore>) -> Self {
        CookieSyncReader { store }
    }

    /// Looks `name` up on every candidate host.
    ///
    /// With several hosts the lookups run concurrently and the first one to
    /// settle with a cookie wins, whatever its position in `urls`. A host
    /// that fails counts as a miss. `None` only when every host missed.
    pub async fn get_client_cookie(&self, name: &str, urls: &HostUrls) -> Option<Cookie> {
        match urls.as_slice() {
            [] => None,
            [url] => self.lookup(name, url).await.ok(),
            many => {
                let lookups = many
                    .iter()
                    .map(|url| self.lookup(name, url).boxed())
                    .collect::<Vec<_>>();

                // select_ok resolves with the first success and drops the
                // remaining lookups.
                match select_ok(lookups).await {
                    Ok((cookie, _remaining)) => Some(cookie),
                    Err(last) => {
                        debug!("No '{}' cookie on any of {} hosts ({})", name, many.len(), last);
                        None
                    }
                }
            }
        }
    }

    /// One host lookup. Misses and failures both come back as `Err` so that
    /// `select_ok` skips them.
    async fn lookup(&self, name: &str, url: &str) -> Result<Cookie, String> {
        let parsed = normalize_host_url(url).map_err(|e| {
            warn!(event_name = "cookies.lookup.invalid_url", url, "{}", e);
            e.to_string()
        })?;

        match self.store.get(name, &parsed).await {
            Ok(Some(cookie)) => {
                debug!(
                    store = self.store.get_name(),
                    host = parsed.host_str().unwrap_or_default(),
                    "Found '{}' cookie",
                    name
                );
                Ok(cookie)
            }
            Ok(None) => Err(format!("no '{}' cookie at {}", name, parsed)),
            Err(e) => {
                warn!(
                    event_name = "cookies.lookup.failed",
                    event_domain = "cookies",
                    store = self.store.get_name(),
                    host = parsed.host_str().unwrap_or_default(),
                    "Cookie lookup failed, treating as missing: {}",
                    e
                );
                Err(e.to_string())
            }
        }
    }
}
