//! Document ingestion and digest tracking

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::EngineError;

/// A document read fully into memory together with its SHA-256 digest
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    path: PathBuf,
    bytes: Vec<u8>,
    digest: [u8; 32],
    loaded_at: DateTime<Utc>,
}

impl LoadedDocument {
    /// Read the file at `path` in one go and hash its content.
    ///
    /// Nothing outside the returned value is touched, so a failed read
    /// leaves any previously loaded document authoritative.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| EngineError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(path, bytes))
    }

    /// Wrap bytes that were obtained elsewhere
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        let digest = shared_crypto::sha256(&bytes);
        Self {
            path: path.into(),
            bytes,
            digest,
            loaded_at: Utc::now(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            path: self.path.clone(),
            size: self.bytes.len(),
            digest_hex: self.digest_hex(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Read-only view of the loaded document for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    pub path: PathBuf,
    pub size: usize,
    pub digest_hex: String,
    pub loaded_at: DateTime<Utc>,
}

impl DocumentInfo {
    /// File name without directories, falling back to the full path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_hashes_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        fs::write(&path, b"abc").unwrap();

        let doc = LoadedDocument::read(&path).unwrap();
        assert_eq!(doc.bytes(), b"abc");
        assert_eq!(
            doc.digest_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );

        let info = doc.info();
        assert_eq!(info.size, 3);
        assert_eq!(info.file_name(), "report.pdf");
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        fs::write(&path, b"").unwrap();

        let doc = LoadedDocument::read(&path).unwrap();
        assert_eq!(
            doc.digest_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = LoadedDocument::read("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, EngineError::FileRead { .. }));
    }

    #[test]
    fn test_directory_is_not_a_document() {
        let dir = tempfile::tempdir().unwrap();
        let err = LoadedDocument::read(dir.path()).unwrap_err();
        assert!(matches!(err, EngineError::FileRead { .. }));
    }

    #[test]
    fn test_info_serializes() {
        let doc = LoadedDocument::from_bytes("a.pdf", b"abc".to_vec());
        let json = serde_json::to_value(doc.info()).unwrap();
        assert_eq!(json["size"], 3);
        assert_eq!(json["path"], "a.pdf");
        assert_eq!(json["digest_hex"].as_str().unwrap().len(), 64);
    }
}
