use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Filesystem storage rooted at `base_path`; absolute paths bypass the root.
///
/// Writes overwrite in place and never create missing parent directories.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(Path::new(path))
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(self.resolve(path)).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        tracing::debug!("Writing {} bytes to {}", data.len(), full_path.display());
        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("out.csv", b"first,run\n").await.unwrap();
        storage.write_file("out.csv", b"second\n").await.unwrap();

        assert_eq!(storage.read_file("out.csv").await.unwrap(), b"second\n");
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_created() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let result = storage.write_file("missing/out.csv", b"x").await;

        assert!(matches!(result, Err(EtlError::IoError(_))));
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn test_absolute_path_bypasses_base() {
        let storage = LocalStorage::default();
        let absolute = std::env::temp_dir().join("nyc311.csv");
        assert_eq!(storage.resolve(absolute.to_str().unwrap()), absolute);
    }
}
