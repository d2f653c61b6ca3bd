//! File storage abstraction.
//!
//! Handlers talk to a [`StorageDisk`] through relative, `/`-separated keys
//! such as `documents/C-001/<uuid>.pdf`. [`LocalDisk`] maps keys onto a root
//! directory on the local filesystem.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::Timestamp;

/// Errors returned by storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The key is absolute, empty, or escapes the storage root.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Nothing is stored under the key.
    #[error("File not found: {0}")]
    NotFound(String),

    /// Underlying filesystem failure.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An entry returned by [`StorageDisk::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub size_bytes: u64,
    pub modified_at: Timestamp,
}

/// A place where files are kept, addressed by relative keys.
#[async_trait]
pub trait StorageDisk: Send + Sync {
    /// Write `data` under `key`, creating parent directories and replacing any
    /// existing file.
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Read the whole file stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Delete the file under `key`. Returns `false` when nothing was there.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Whether a file exists under `key`.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// List the files directly under the `prefix` directory.
    ///
    /// A missing directory yields an empty list.
    async fn list(&self, prefix: &str) -> Result<Vec<StoredFile>, StorageError>;

    /// Absolute filesystem path for `key`, when the disk is file-backed.
    fn local_path(&self, key: &str) -> Option<PathBuf>;
}

/// Validate a storage key and split it into normal path components.
fn key_components(key: &str) -> Result<Vec<&str>, StorageError> {
    let trimmed = key.trim_matches('/');
    if trimmed.is_empty() || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }

    let mut parts = Vec::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| StorageError::InvalidKey(key.to_string()))?;
                parts.push(part);
            }
            _ => return Err(StorageError::InvalidKey(key.to_string())),
        }
    }
    Ok(parts)
}

/// Filesystem-backed storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct LocalDisk {
    root: PathBuf,
}

impl LocalDisk {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key to a path under the root.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let mut path = self.root.clone();
        for part in key_components(key)? {
            path.push(part);
        }
        Ok(path)
    }
}

#[async_trait]
impl StorageDisk for LocalDisk {
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredFile>, StorageError> {
        let dir = self.resolve(prefix)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let prefix = prefix.trim_matches('/');
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let modified_at: DateTime<Utc> = metadata.modified()?.into();
            files.push(StoredFile {
                key: format!("{prefix}/{name}"),
                size_bytes: metadata.len(),
                modified_at,
            });
        }

        files.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(files)
    }

    fn local_path(&self, key: &str) -> Option<PathBuf> {
        self.resolve(key).ok()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn rejects_escaping_keys() {
        assert_matches!(key_components("../secret"), Err(StorageError::InvalidKey(_)));
        assert_matches!(key_components("a/../../b"), Err(StorageError::InvalidKey(_)));
        assert_matches!(key_components("/etc/passwd"), Err(StorageError::InvalidKey(_)));
        assert_matches!(key_components(""), Err(StorageError::InvalidKey(_)));
        assert_matches!(key_components("a\\b"), Err(StorageError::InvalidKey(_)));
    }

    #[test]
    fn accepts_nested_keys() {
        assert_eq!(
            key_components("documents/C1/x.pdf").unwrap(),
            vec!["documents", "C1", "x.pdf"]
        );
    }

    #[tokio::test]
    async fn put_get_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let disk = LocalDisk::new(dir.path());

        disk.put("documents/C1/a.pdf", b"%PDF-1.4").await.unwrap();
        assert!(disk.exists("documents/C1/a.pdf").await.unwrap());
        assert_eq!(disk.get("documents/C1/a.pdf").await.unwrap(), b"%PDF-1.4");

        assert!(disk.delete("documents/C1/a.pdf").await.unwrap());
        assert!(!disk.delete("documents/C1/a.pdf").await.unwrap());
        assert_matches!(
            disk.get("documents/C1/a.pdf").await,
            Err(StorageError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn list_returns_files_with_prefix_keys() {
        let dir = tempfile::tempdir().unwrap();
        let disk = LocalDisk::new(dir.path());

        disk.put("tmp/pdf-split/b.pdf", b"b").await.unwrap();
        disk.put("tmp/pdf-split/a.pdf", b"aa").await.unwrap();
        disk.put("tmp/pdf-split/nested/c.pdf", b"c").await.unwrap();

        let files = disk.list("tmp/pdf-split").await.unwrap();
        let keys: Vec<_> = files.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["tmp/pdf-split/a.pdf", "tmp/pdf-split/b.pdf"]);
        assert_eq!(files[0].size_bytes, 2);
    }

    #[tokio::test]
    async fn list_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let disk = LocalDisk::new(dir.path());
        assert!(disk.list("nothing/here").await.unwrap().is_empty());
    }

    #[test]
    fn local_path_is_under_root() {
        let disk = LocalDisk::new("/srv/storage");
        assert_eq!(
            disk.local_path("documents/x.pdf"),
            Some(PathBuf::from("/srv/storage/documents/x.pdf"))
        );
        assert_eq!(disk.local_path("../x"), None);
    }
}
