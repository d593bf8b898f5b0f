//! Release asset model

use crate::error::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read buffer for checksum streaming (1MB)
const CHECKSUM_CHUNK_SIZE: usize = 1024 * 1024;

/// One file produced by the packaging step and published by the pipeline.
///
/// Paths are deterministic from name/version/platform at configuration build
/// time; the file itself may not exist yet when the asset is enumerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Display name used as the remote asset key
    pub name: String,

    /// Local path the packaging step writes this asset to
    pub path: PathBuf,

    /// SHA-256 of the file contents, filled in lazily
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl Asset {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            checksum: None,
        }
    }

    /// Whether the file currently exists on disk
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Compute the SHA-256 checksum of the file contents
    pub fn compute_checksum(&self) -> Result<String> {
        checksum_file(&self.path)
    }

    /// Checksum, computed on first use and cached on the asset
    pub fn checksum(&mut self) -> Result<&str> {
        if self.checksum.is_none() {
            let digest = self.compute_checksum()?;
            debug!("Checksum for {}: {}", self.name, digest);
            self.checksum = Some(digest);
        }
        Ok(self.checksum.as_deref().unwrap_or_default())
    }
}

/// Streaming SHA-256 over a file
pub fn checksum_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHECKSUM_CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("asset.bin");
        std::fs::write(&path, b"Hello, World!").unwrap();

        let mut asset = Asset::new("asset.bin", &path);
        // Known SHA256 hash of "Hello, World!"
        let expected = "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f";
        assert_eq!(asset.checksum().unwrap(), expected);
        // Second call returns the cached value
        assert_eq!(asset.checksum.as_deref(), Some(expected));
    }

    #[test]
    fn test_exists() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("there.dmg");
        std::fs::write(&present, b"x").unwrap();

        assert!(Asset::new("there.dmg", &present).exists());
        assert!(!Asset::new("gone.dmg", dir.path().join("gone.dmg")).exists());
    }

    #[test]
    fn test_checksum_missing_file_errors() {
        let asset = Asset::new("nope", "/definitely/not/here");
        assert!(asset.compute_checksum().is_err());
    }
}
