use async_trait::async_trait;
use reqwest::Url;
use tokio::sync::RwLock;

use super::{Cookie, CookieStore};
use crate::error::CookieError;

/// Cookies held in memory. The embedding side (or a test) plays the browser
/// and writes through `insert`/`clear`; the bridge only reads.
#[derive(Default)]
pub struct MemoryCookieStore {
    cookies: RwLock<Vec<Cookie>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cookie, replacing one with the same name, domain and path.
    pub async fn insert(&self, cookie: Cookie) {
        let mut cookies = self.cookies.write().await;
        cookies.retain(|c| !(c.name == cookie.name && c.domain == cookie.domain && c.path == cookie.path));
        cookies.push(cookie);
    }

    pub async fn clear(&self) {
        self.cookies.write().await.clear();
    }
}

#[async_trait]
impl CookieStore for MemoryCookieStore {
    fn get_name(&self) -> &str {
        "memory"
    }

    async fn get(&self, name: &str, url: &Url) -> Result<Option<Cookie>, CookieError> {
        let cookies = self.cookies.read().await;
        Ok(cookies
            .iter()
            .find(|c| c.name == name && c.matches_url(url))
            .cloned())
    }
}
