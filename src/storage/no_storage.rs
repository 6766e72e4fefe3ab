use super::StorageArea;
use crate::error::StorageError;
use async_trait::async_trait;

/// A no-op storage area that always returns an error if called,
/// indicating storage is disabled.
pub struct NoStorageArea;

impl NoStorageArea {
    pub fn new() -> Self {
        NoStorageArea
    }
}

impl Default for NoStorageArea {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageArea for NoStorageArea {
    fn get_name(&self) -> &str {
        "disabled"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Disabled)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Disabled)
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Disabled)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_storage_rejects_every_call() {
        let area = NoStorageArea::new();
        assert!(matches!(area.get("k").await, Err(StorageError::Disabled)));
        assert!(matches!(area.set("k", "v").await, Err(StorageError::Disabled)));
        assert!(matches!(area.remove("k").await, Err(StorageError::Disabled)));
    }
}
