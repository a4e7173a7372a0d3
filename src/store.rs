//! Blob storage for STASH.
//!
//! Persists file bytes on disk under opaque storage keys. Keys are
//! `{uuid}.{ext}` strings generated at upload time; the display filename
//! never touches the disk layout, so two users' files can never collide.
//! Blobs are sharded into subdirectories by the first 2 characters of the
//! key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{Result, StashError};

/// Disk-backed blob store keyed by opaque string.
///
/// Knows nothing about ownership or visibility; every operation is a plain
/// key lookup.
#[derive(Debug, Clone)]
pub struct BlobStore {
    /// Base directory for blobs.
    base_path: PathBuf,
}

impl BlobStore {
    /// Create a new BlobStore rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Generate a fresh storage key, preserving the original extension.
    pub fn generate_key(original_name: &str) -> String {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("bin");
        format!("{}.{ext}", Uuid::new_v4())
    }

    /// Persist bytes under `key`, overwriting any prior blob.
    ///
    /// Returns the number of bytes written.
    pub fn put(&self, key: &str, content: &[u8]) -> Result<u64> {
        let path = self.blob_path(key);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)?;
        Ok(content.len() as u64)
    }

    /// Load the blob stored under `key`.
    pub fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(key);

        match fs::read(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StashError::NotFound(format!("blob '{key}'")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the blob stored under `key`.
    ///
    /// A missing key is `NotFound`, not a silent success, so callers can
    /// tell "deleted" apart from "already gone".
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.blob_path(key);

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StashError::NotFound(format!("blob '{key}'")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a blob exists under `key`.
    pub fn exists(&self, key: &str) -> bool {
        self.blob_path(key).exists()
    }

    /// Get the size of a stored blob.
    pub fn len(&self, key: &str) -> Result<u64> {
        match fs::metadata(self.blob_path(key)) {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StashError::NotFound(format!("blob '{key}'")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Full path for a storage key: `{base}/{shard}/{key}`.
    fn blob_path(&self, key: &str) -> PathBuf {
        let shard = if key.len() >= 2 { &key[..2] } else { key };
        self.base_path.join(shard).join(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, BlobStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = BlobStore::new(temp_dir.path()).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_new_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("blobs");
        assert!(!root.exists());

        let store = BlobStore::new(&root).unwrap();
        assert!(root.exists());
        assert_eq!(store.base_path(), root);
    }

    #[test]
    fn test_put_and_get() {
        let (_tmp, store) = setup();
        let key = BlobStore::generate_key("report.pdf");

        let written = store.put(&key, b"file contents").unwrap();
        assert_eq!(written, 13);
        assert_eq!(store.get(&key).unwrap(), b"file contents");
    }

    #[test]
    fn test_put_overwrites() {
        let (_tmp, store) = setup();
        let key = BlobStore::generate_key("notes.txt");

        store.put(&key, b"first").unwrap();
        store.put(&key, b"second").unwrap();

        assert_eq!(store.get(&key).unwrap(), b"second");
    }

    #[test]
    fn test_get_not_found() {
        let (_tmp, store) = setup();
        let result = store.get("missing.bin");
        assert!(matches!(result, Err(StashError::NotFound(_))));
    }

    #[test]
    fn test_remove() {
        let (_tmp, store) = setup();
        let key = BlobStore::generate_key("gone.txt");

        store.put(&key, b"data").unwrap();
        assert!(store.exists(&key));

        store.remove(&key).unwrap();
        assert!(!store.exists(&key));
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let (_tmp, store) = setup();
        let result = store.remove("never-existed.txt");
        assert!(matches!(result, Err(StashError::NotFound(_))));
    }

    #[test]
    fn test_len() {
        let (_tmp, store) = setup();
        let key = BlobStore::generate_key("sized.bin");

        store.put(&key, &[0u8; 4096]).unwrap();
        assert_eq!(store.len(&key).unwrap(), 4096);

        assert!(matches!(
            store.len("missing.bin"),
            Err(StashError::NotFound(_))
        ));
    }

    #[test]
    fn test_generate_key_unique_and_extension() {
        let a = BlobStore::generate_key("photo.jpg");
        let b = BlobStore::generate_key("photo.jpg");

        assert_ne!(a, b);
        assert!(a.ends_with(".jpg"));
        assert!(BlobStore::generate_key("no_extension").ends_with(".bin"));
    }

    #[test]
    fn test_sharded_layout() {
        let (_tmp, store) = setup();
        let key = "ab12cd34-5678-90ab-cdef-123456789012.txt";

        store.put(key, b"data").unwrap();

        let shard_dir = store.base_path().join("ab");
        assert!(shard_dir.is_dir());
        assert!(shard_dir.join(key).is_file());
    }

    #[test]
    fn test_binary_round_trip() {
        let (_tmp, store) = setup();
        let content: Vec<u8> = (0..=255).collect();
        let key = BlobStore::generate_key("all-bytes.bin");

        store.put(&key, &content).unwrap();
        assert_eq!(store.get(&key).unwrap(), content);
    }
}
