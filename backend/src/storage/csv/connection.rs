use anyhow::Result;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// CsvConnection owns the data directory and the file conventions inside it
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new connection, creating the data directory if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of a file inside the data directory
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.base_directory.join(file_name)
    }

    /// Read a file, returning `None` when it does not exist
    pub fn read_optional(&self, file_name: &str) -> Result<Option<String>> {
        let path = self.file_path(file_name);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    /// Atomic write: write to a temp file, then rename over the target
    pub fn write_atomic(&self, file_name: &str, contents: &[u8]) -> Result<()> {
        let path = self.file_path(file_name);
        if !self.base_directory.exists() {
            fs::create_dir_all(&self.base_directory)?;
        }

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &path)?;

        debug!("Wrote {} bytes to {:?}", contents.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");

        let connection = CsvConnection::new(&nested).unwrap();
        assert!(nested.exists());
        assert_eq!(connection.base_directory(), nested.as_path());
    }

    #[test]
    fn test_write_atomic_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();

        assert_eq!(connection.read_optional("data.yaml").unwrap(), None);

        connection.write_atomic("data.yaml", b"key: value\n").unwrap();
        assert_eq!(
            connection.read_optional("data.yaml").unwrap().as_deref(),
            Some("key: value\n")
        );
        assert!(!connection.file_path("data.tmp").exists());
    }
}
