use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{file_storage::FileStorageArea, memory_storage::MemoryStorageArea, no_storage::NoStorageArea};
use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageError;

/// Separator between key segments.
pub const KEY_SEPARATOR: &str = "|";

/// Purpose segment of the client JWT key.
pub const CLIENT_JWT_PURPOSE: &str = "__client_jwt";

/// A namespaced storage key. Only built through [`create_key`], so two
/// keys are equal exactly when their non-empty segments are.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key of the client JWT slot for a tenant, optionally versioned.
    pub fn client_jwt(tenant: &str, version: Option<&str>) -> Self {
        create_key([Some(CLIENT_JWT_PURPOSE), Some(tenant), version])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Joins the present, non-empty segments with [`KEY_SEPARATOR`].
/// Missing segments are dropped, never replaced by a placeholder.
pub fn create_key<'a, I>(segments: I) -> CacheKey
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let joined = segments
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR);
    CacheKey(joined)
}

/// An async key/value area shared by every context of the extension.
/// Each call is atomic on its own; there are no multi-key transactions.
#[async_trait]
pub trait StorageArea: Send + Sync {
    fn get_name(&self) -> &str;
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Creates a concrete storage area based on the StorageConfig.
/// If `storage.enabled = false`, returns NoStorageArea. Memory is the default backend.
pub fn create_storage_area(config: &StorageConfig) -> Arc<dyn StorageArea> {
    if !config.enabled {
        info!("Token storage is disabled. Using NoStorageArea.");
        return Arc::new(NoStorageArea::new());
    }

    match &config.backend {
        Some(StorageBackend::File(file_config)) => {
            info!("Using file storage area at '{}'", file_config.path);
            Arc::new(FileStorageArea::new(&file_config.path))
        }
        Some(StorageBackend::Memory) | None => {
            info!("Using in-memory storage area.");
            Arc::new(MemoryStorageArea::new())
        }
    }
}

/// Typed access to a storage area through [`CacheKey`]s.
#[derive(Clone)]
pub struct StorageCache {
    area: Arc<dyn StorageArea>,
}

impl StorageCache {
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        StorageCache { area }
    }

    pub fn area(&self) -> &Arc<dyn StorageArea> {
        &self.area
    }

    pub async fn get(&self, key: &CacheKey) -> Result<Option<String>, StorageError> {
        let value = self.area.get(key.as_str()).await?;
        debug!(
            storage = self.area.get_name(),
            cache_key = key.as_str(),
            hit = value.is_some(),
            "storage read"
        );
        Ok(value)
    }

    pub async fn set(&self, key: &CacheKey, value: &str) -> Result<(), StorageError> {
        self.area.set(key.as_str(), value).await?;
        debug!(
            storage = self.area.get_name(),
            cache_key = key.as_str(),
            "storage write"
        );
        Ok(())
    }

    pub async fn remove(&self, key: &CacheKey) -> Result<(), StorageError> {
        self.area.remove(key.as_str()).await?;
        debug!(
            storage = self.area.get_name(),
            cache_key = key.as_str(),
            "storage remove"
        );
        Ok(())
    }
}
