use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tracing::debug;

use super::StorageArea;
use crate::error::StorageError;

type Document = BTreeMap<String, String>;

/// A storage area persisted as one JSON object on disk.
///
/// Several processes may point at the same file. Writers hold an exclusive
/// lock on a sibling `.lock` file for the whole read-modify-write, so
/// writes to different keys never drop each other. The document is replaced
/// through a temp file and a rename, so readers take no lock and see either
/// the old or the new document.
pub struct FileStorageArea {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStorageArea {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        FileStorageArea { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `edit` to the document under the cross-process lock.
    ///
    /// Runs on the blocking pool, which also means a caller that stops
    /// waiting does not interrupt the write between temp file and rename.
    async fn update<F>(&self, edit: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Document) -> bool + Send + 'static,
    {
        let path = self.path.clone();
        let lock_path = self.lock_path.clone();
        tokio::task::spawn_blocking(move || {
            let lock = lock_document(&path, &lock_path)?;
            let mut document = read_document(&path)?;
            let result = if edit(&mut document) {
                write_document(&path, &document)
            } else {
                Ok(())
            };
            // Closing the handle also releases the lock.
            let _ = FileExt::unlock(&lock);
            result
        })
        .await
        .map_err(|e| StorageError::Backend(format!("storage write task failed: {}", e)))?
    }
}

fn lock_document(path: &Path, lock_path: &Path) -> Result<File, StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let lock = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;
    lock.lock_exclusive()?;
    Ok(lock)
}

fn read_document(path: &Path) -> Result<Document, StorageError> {
    match fs::read(path) {
        Ok(bytes) => parse_document(&bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Document::new()),
        Err(e) => Err(e.into()),
    }
}

fn parse_document(bytes: &[u8]) -> Result<Document, StorageError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::new());
    }
    Ok(serde_json::from_slice(bytes)?)
}

fn write_document(path: &Path, document: &Document) -> Result<(), StorageError> {
    let tmp = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
    let bytes = serde_json::to_vec_pretty(document)?;
    let written = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    debug!(path = %path.display(), entries = document.len(), "storage document written");
    Ok(())
}

#[async_trait]
impl StorageArea for FileStorageArea {
    fn get_name(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut document = match tokio::fs::read(&self.path).await {
            Ok(bytes) => parse_document(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(document.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.update(move |document| {
            document.insert(key, value);
            true
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        self.update(move |document| document.remove(&key).is_some())
            .await
    }
}
