use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore as _, Jar};
use reqwest::Url;

use super::{Cookie, CookieStore};
use crate::error::CookieError;

/// Reads cookies out of a `reqwest` jar, typically the one the bridge's
/// `ApiClient` fills from `Set-Cookie` headers.
pub struct JarCookieStore {
    jar: Arc<Jar>,
}

impl JarCookieStore {
    pub fn new(jar: Arc<Jar>) -> Self {
        JarCookieStore { jar }
    }
}

#[async_trait]
impl CookieStore for JarCookieStore {
    fn get_name(&self) -> &str {
        "jar"
    }

    async fn get(&self, name: &str, url: &Url) -> Result<Option<Cookie>, CookieError> {
        let Some(header) = self.jar.cookies(url) else {
            return Ok(None);
        };
        let header = header
            .to_str()
            .map_err(|e| CookieError::Backend(format!("non-ascii cookie header: {}", e)))?;

        // The jar renders `a=b; c=d` for the request; domain and path were
        // already matched by the jar itself.
        let host = url.host_str().unwrap_or_default();
        let cookie = header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(cookie_name, _)| *cookie_name == name)
            .map(|(cookie_name, value)| Cookie::new(cookie_name, value, host));
        Ok(cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_cookie_set_on_jar() {
        let jar = Arc::new(Jar::default());
        let url = Url::parse("https://clerk.example.com/v1/client").unwrap();
        jar.add_cookie_str("__client=abc123; Path=/; Secure", &url);
        jar.add_cookie_str("other=zzz; Path=/", &url);

        let store = JarCookieStore::new(jar);
        let cookie = store.get("__client", &url).await.unwrap().unwrap();
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain, "clerk.example.com");

        let elsewhere = Url::parse("https://unrelated.org/").unwrap();
        assert!(store.get("__client", &elsewhere).await.unwrap().is_none());
        assert!(store.get("missing", &url).await.unwrap().is_none());
    }
}
