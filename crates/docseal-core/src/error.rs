//! Error types for the signature engine

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Could not read document {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not write signature to {sink}: {source}")]
    Write {
        sink: String,
        #[source]
        source: io::Error,
    },

    #[error("No document has been loaded")]
    NoDocumentLoaded,

    #[error("No signature has been produced yet")]
    NoSignature,

    #[error("No document selected for verification")]
    NoDocumentSelected,

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Could not read {target}: {source}")]
    Read {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid public key: {0}")]
    KeyImport(String),

    #[error("Could not export public key: {0}")]
    KeyExport(String),
}

impl EngineError {
    /// Only key generation failures prevent the engine from existing;
    /// every other kind leaves it usable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::KeyGeneration(_))
    }

    /// Short stable name for display alongside the message
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::FileRead { .. } => "FileReadError",
            EngineError::Write { .. } => "WriteError",
            EngineError::NoDocumentLoaded => "NoDocumentLoadedError",
            EngineError::NoSignature => "NoSignatureError",
            EngineError::NoDocumentSelected => "NoDocumentSelectedError",
            EngineError::Signing(_) => "SigningError",
            EngineError::KeyGeneration(_) => "KeyGenerationError",
            EngineError::Read { .. } => "ReadError",
            EngineError::KeyImport(_) => "KeyImportError",
            EngineError::KeyExport(_) => "KeyExportError",
        }
    }
}
