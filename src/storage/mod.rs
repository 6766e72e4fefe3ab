pub mod base;
pub mod file_storage;
pub mod memory_storage;
pub mod no_storage;

// Re-export the primary storage items so code outside can do
// "use crate::storage::{StorageArea, StorageCache, create_key};"
pub use base::{
    create_key, create_storage_area, CacheKey, StorageArea, StorageCache, CLIENT_JWT_PURPOSE,
    KEY_SEPARATOR,
};
pub use file_storage::FileStorageArea;
pub use memory_storage::MemoryStorageArea;
pub use no_storage::NoStorageArea;
