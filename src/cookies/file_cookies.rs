use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Url;

use super::{Cookie, CookieStore};
use crate::error::CookieError;

/// A JSON array of cookies exported by the browser side, re-read on every
/// lookup so a cookie set by another context shows up on the next poll.
pub struct JsonFileCookieStore {
    path: PathBuf,
}

impl JsonFileCookieStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonFileCookieStore {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl CookieStore for JsonFileCookieStore {
    fn get_name(&self) -> &str {
        "file"
    }

    async fn get(&self, name: &str, url: &Url) -> Result<Option<Cookie>, CookieError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let cookies: Vec<Cookie> = serde_json::from_slice(&bytes)?;
        Ok(cookies
            .into_iter()
            .find(|c| c.name == name && c.matches_url(url)))
    }
}
