//! The signature workflow engine
//!
//! Owns the key pair, the loaded document and the last signature, and
//! moves between them through four operations:
//!
//! ```text
//! [NoDocument] --load--> [DocumentLoaded] --sign--> [Signed] --persist--> [Signed, persisted]
//!                        load from any state replaces the document and drops the signature
//!                        verify from any state leaves everything unchanged
//! ```
//!
//! Mutating operations (`load`, `sign`, `persist`) take `&mut self`;
//! `verify` takes `&self` and only depends on its inputs and the public key.
//! A multi-threaded host should keep the engine behind a `Mutex` or `RwLock`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared_crypto::{envelope, CryptoError, PssVerifier, RsaPssIdentity};
use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use crate::config::{EngineConfig, SignatureFormat};
use crate::document::{DocumentInfo, LoadedDocument};
use crate::sink::{FileSink, SignatureSink};
use crate::verify::{verify_files, VerificationResult};
use crate::EngineError;

/// Where the engine sits in its load/sign/persist cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    NoDocument,
    DocumentLoaded,
    Signed { persisted: bool },
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::NoDocument => write!(f, "no document"),
            EngineState::DocumentLoaded => write!(f, "document loaded"),
            EngineState::Signed { persisted: false } => write!(f, "signed"),
            EngineState::Signed { persisted: true } => write!(f, "signed, persisted"),
        }
    }
}

#[derive(Debug, Clone)]
struct Signature {
    bytes: Vec<u8>,
    document_digest: [u8; 32],
    signed_at: DateTime<Utc>,
    persisted_to: Option<String>,
}

/// Read-only view of the current signature for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureInfo {
    pub len: usize,
    pub hex_prefix: String,
    pub document_digest_hex: String,
    pub signed_at: DateTime<Utc>,
    pub persisted_to: Option<String>,
}

#[derive(Debug)]
pub struct SignatureEngine<S: SignatureSink = FileSink> {
    identity: RsaPssIdentity,
    config: EngineConfig,
    sink: S,
    document: Option<LoadedDocument>,
    signature: Option<Signature>,
}

impl SignatureEngine<FileSink> {
    /// Engine with default settings writing signatures to the working directory
    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::new(EngineConfig::default(), FileSink::current_dir())
    }
}

impl<S: SignatureSink> SignatureEngine<S> {
    /// Create an engine with a freshly generated key pair.
    ///
    /// Fails with [`EngineError::KeyGeneration`] when the configuration
    /// asks for an unsupported key size or the OS random source is
    /// unavailable.
    pub fn new(config: EngineConfig, sink: S) -> Result<Self, EngineError> {
        config.validate()?;

        let identity = RsaPssIdentity::generate(config.key_bits).map_err(|e| match e {
            CryptoError::KeyGeneration(msg) => EngineError::KeyGeneration(msg),
            other => EngineError::KeyGeneration(other.to_string()),
        })?;

        tracing::info!(
            key_bits = config.key_bits,
            fingerprint = %identity.verifier().fingerprint(),
            "Signature engine ready"
        );
        Ok(Self::with_identity(identity, config, sink))
    }

    /// Create an engine around an existing key pair
    pub fn with_identity(identity: RsaPssIdentity, config: EngineConfig, sink: S) -> Self {
        Self {
            identity,
            config,
            sink,
            document: None,
            signature: None,
        }
    }

    /// Read a document and compute its SHA-256 digest.
    ///
    /// On success the previous document and any signature over it are
    /// discarded. On failure the engine is left exactly as it was.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<DocumentInfo, EngineError> {
        let document = LoadedDocument::read(path)?;
        let info = document.info();

        tracing::info!(
            path = %info.path.display(),
            size = info.size,
            digest = %info.digest_hex,
            "Loaded document"
        );

        self.document = Some(document);
        self.signature = None;
        Ok(info)
    }

    /// Sign the loaded document's raw bytes.
    ///
    /// Overwrites any previous signature. Two calls over the same document
    /// give different bytes (random PSS salt); both verify.
    pub fn sign(&mut self) -> Result<SignatureInfo, EngineError> {
        let document = self
            .document
            .as_ref()
            .ok_or(EngineError::NoDocumentLoaded)?;

        let bytes = self
            .identity
            .sign(document.bytes())
            .map_err(|e| match e {
                CryptoError::Signing(msg) => EngineError::Signing(msg),
                other => EngineError::Signing(other.to_string()),
            })?;

        let signature = Signature {
            bytes,
            document_digest: *document.digest(),
            signed_at: Utc::now(),
            persisted_to: None,
        };
        let info = self.describe(&signature);

        tracing::info!(
            path = %document.path().display(),
            signature = %info.hex_prefix,
            "Signed document"
        );

        self.signature = Some(signature);
        Ok(info)
    }

    /// Write the current signature to `sink_name`, replacing its content.
    ///
    /// The in-memory signature survives both success and failure.
    pub fn persist(&mut self, sink_name: &str) -> Result<(), EngineError> {
        let signature = self.signature.as_mut().ok_or(EngineError::NoSignature)?;

        let written = {
            let blob: Cow<'_, [u8]> = match self.config.signature_format {
                SignatureFormat::Raw => Cow::Borrowed(signature.bytes.as_slice()),
                SignatureFormat::Enveloped => Cow::Owned(envelope::wrap(&signature.bytes)),
            };
            self.sink
                .write(sink_name, &blob)
                .map_err(|source| EngineError::Write {
                    sink: self.sink.locate(sink_name),
                    source,
                })?;
            blob.len()
        };

        tracing::info!(
            sink = %self.sink.locate(sink_name),
            bytes = written,
            "Persisted signature"
        );
        signature.persisted_to = Some(sink_name.to_string());
        Ok(())
    }

    /// Persist to the configured default sink name
    pub fn persist_default(&mut self) -> Result<(), EngineError> {
        let sink_name = self.config.default_sink.clone();
        self.persist(&sink_name)
    }

    /// Verify a document on disk against a persisted signature using this
    /// engine's public key.
    ///
    /// The document is read fresh from `document_path`; the loaded
    /// document (if any) is not consulted. An empty path fails with
    /// [`EngineError::NoDocumentSelected`].
    pub fn verify(
        &self,
        document_path: impl AsRef<Path>,
        sink_name: &str,
    ) -> Result<VerificationResult, EngineError> {
        verify_files(
            self.identity.verifier(),
            document_path.as_ref(),
            &self.sink,
            sink_name,
        )
    }

    /// Verify the currently loaded document's file, re-read from disk
    pub fn verify_loaded(&self, sink_name: &str) -> Result<VerificationResult, EngineError> {
        let document = self
            .document
            .as_ref()
            .ok_or(EngineError::NoDocumentSelected)?;
        self.verify(document.path(), sink_name)
    }

    /// PEM-encoded public key, for shipping alongside a signature
    pub fn public_key_pem(&self) -> Result<String, EngineError> {
        self.identity
            .verifier()
            .public_key_pem()
            .map_err(|e| EngineError::KeyExport(e.to_string()))
    }

    /// Write the PEM public key to `sink_name` so a later session can
    /// verify this engine's signatures
    pub fn persist_public_key(&self, sink_name: &str) -> Result<(), EngineError> {
        let pem = self.public_key_pem()?;
        self.sink
            .write(sink_name, pem.as_bytes())
            .map_err(|source| EngineError::Write {
                sink: self.sink.locate(sink_name),
                source,
            })?;

        tracing::info!(sink = %self.sink.locate(sink_name), "Persisted public key");
        Ok(())
    }

    pub fn state(&self) -> EngineState {
        match (&self.document, &self.signature) {
            (None, _) => EngineState::NoDocument,
            (Some(_), None) => EngineState::DocumentLoaded,
            (Some(_), Some(signature)) => EngineState::Signed {
                persisted: signature.persisted_to.is_some(),
            },
        }
    }

    pub fn document(&self) -> Option<DocumentInfo> {
        self.document.as_ref().map(LoadedDocument::info)
    }

    pub fn loaded_document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    pub fn signature(&self) -> Option<SignatureInfo> {
        self.signature.as_ref().map(|s| self.describe(s))
    }

    pub fn signature_bytes(&self) -> Option<&[u8]> {
        self.signature.as_ref().map(|s| s.bytes.as_slice())
    }

    pub fn verifier(&self) -> &PssVerifier {
        self.identity.verifier()
    }

    pub fn fingerprint(&self) -> String {
        self.identity.verifier().fingerprint()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn describe(&self, signature: &Signature) -> SignatureInfo {
        let hex = hex::encode(&signature.bytes);
        let prefix_len = self.config.display_prefix_len.min(hex.len());

        SignatureInfo {
            len: signature.bytes.len(),
            hex_prefix: hex[..prefix_len].to_string(),
            document_digest_hex: hex::encode(signature.document_digest),
            signed_at: signature.signed_at,
            persisted_to: signature.persisted_to.clone(),
        }
    }
}
