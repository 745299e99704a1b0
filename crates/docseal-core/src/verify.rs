//! Signature verification with explicit tamper detection
//!
//! A cryptographic mismatch is an expected outcome and comes back as
//! [`VerificationResult::Invalid`]. Failing to read the document or the
//! stored signature is an [`EngineError::Read`], so "tampered document"
//! and "signature file missing" stay distinguishable.

use serde::Serialize;
use shared_crypto::{envelope, PssVerifier};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::{EngineError, SignatureSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerificationResult {
    /// The signature is a valid PSS-SHA256 signature over exactly these
    /// bytes under the given public key
    Valid,
    /// Anything else: altered content, wrong key, damaged signature bytes
    /// or foreign parameters
    Invalid,
}

impl VerificationResult {
    pub fn is_valid(self) -> bool {
        self == VerificationResult::Valid
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationResult::Valid => write!(f, "valid"),
            VerificationResult::Invalid => write!(f, "invalid"),
        }
    }
}

/// Check stored signature bytes (raw or enveloped) against document bytes
pub fn verify_detached(
    verifier: &PssVerifier,
    document: &[u8],
    stored_signature: &[u8],
) -> VerificationResult {
    let signature = match envelope::unwrap(stored_signature, verifier.signature_len()) {
        Ok(signature) => signature,
        Err(e) => {
            tracing::debug!(reason = %e, "Signature envelope rejected");
            return VerificationResult::Invalid;
        }
    };

    match verifier.verify(document, signature) {
        Ok(()) => VerificationResult::Valid,
        Err(e) => {
            tracing::debug!(reason = %e, "Signature does not match document");
            VerificationResult::Invalid
        }
    }
}

/// Read a candidate document from disk and a stored signature from a
/// sink, then verify them.
///
/// An empty `document_path` means no document was selected.
pub fn verify_files<S: SignatureSink + ?Sized>(
    verifier: &PssVerifier,
    document_path: &Path,
    sink: &S,
    signature_name: &str,
) -> Result<VerificationResult, EngineError> {
    if document_path.as_os_str().is_empty() {
        return Err(EngineError::NoDocumentSelected);
    }

    let document = fs::read(document_path).map_err(|source| EngineError::Read {
        target: document_path.display().to_string(),
        source,
    })?;
    let stored = sink
        .read(signature_name)
        .map_err(|source| EngineError::Read {
            target: sink.locate(signature_name),
            source,
        })?;

    let result = verify_detached(verifier, &document, &stored);
    tracing::info!(
        document = %document_path.display(),
        signature = %sink.locate(signature_name),
        %result,
        "Verified document"
    );
    Ok(result)
}

/// Import a PEM public key previously written with
/// `SignatureEngine::persist_public_key`
pub fn load_verifier<S: SignatureSink + ?Sized>(
    sink: &S,
    name: &str,
) -> Result<PssVerifier, EngineError> {
    let bytes = sink.read(name).map_err(|source| EngineError::Read {
        target: sink.locate(name),
        source,
    })?;
    let pem = String::from_utf8(bytes).map_err(|e| EngineError::KeyImport(e.to_string()))?;
    let verifier = PssVerifier::from_public_key_pem(&pem)
        .map_err(|e| EngineError::KeyImport(e.to_string()))?;

    tracing::debug!(
        key = %sink.locate(name),
        fingerprint = %verifier.fingerprint(),
        "Imported public key"
    );
    Ok(verifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::test_support::{ALICE, BOB};
    use std::io;

    #[test]
    fn test_detached_valid() {
        let signature = ALICE.sign(b"contract").unwrap();
        assert_eq!(
            verify_detached(ALICE.verifier(), b"contract", &signature),
            VerificationResult::Valid
        );
    }

    #[test]
    fn test_detached_wrong_key() {
        let signature = ALICE.sign(b"contract").unwrap();
        assert_eq!(
            verify_detached(BOB.verifier(), b"contract", &signature),
            VerificationResult::Invalid
        );
    }

    #[test]
    fn test_detached_enveloped() {
        let signature = envelope::wrap(&ALICE.sign(b"contract").unwrap());
        assert!(verify_detached(ALICE.verifier(), b"contract", &signature).is_valid());
    }

    #[test]
    fn test_detached_foreign_envelope_is_invalid() {
        let mut signature = envelope::wrap(&ALICE.sign(b"contract").unwrap());
        signature[5] = 0x7F;
        assert_eq!(
            verify_detached(ALICE.verifier(), b"contract", &signature),
            VerificationResult::Invalid
        );
    }

    #[test]
    fn test_detached_empty_signature() {
        assert_eq!(
            verify_detached(ALICE.verifier(), b"contract", &[]),
            VerificationResult::Invalid
        );
    }

    #[test]
    fn test_files_no_document_selected() {
        let sink = MemorySink::new();
        let err = verify_files(ALICE.verifier(), Path::new(""), &sink, "sig").unwrap_err();
        assert!(matches!(err, EngineError::NoDocumentSelected));
    }

    #[test]
    fn test_files_missing_signature_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.pdf");
        fs::write(&doc, b"content").unwrap();

        let sink = MemorySink::new();
        let err = verify_files(ALICE.verifier(), &doc, &sink, "sig").unwrap_err();
        match err {
            EngineError::Read { target, source } => {
                assert_eq!(target, "memory:sig");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected Read error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_verifier_roundtrip() {
        let sink = MemorySink::new();
        let pem = ALICE.verifier().public_key_pem().unwrap();
        sink.write("alice.pub.pem", pem.as_bytes()).unwrap();

        let verifier = load_verifier(&sink, "alice.pub.pem").unwrap();
        assert_eq!(verifier.fingerprint(), ALICE.verifier().fingerprint());
    }

    #[test]
    fn test_load_verifier_garbage() {
        let sink = MemorySink::new();
        sink.write("key.pem", &[0xFF, 0xFE, 0x00]).unwrap();
        assert!(matches!(
            load_verifier(&sink, "key.pem"),
            Err(EngineError::KeyImport(_))
        ));

        sink.write("key.pem", b"-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----\n")
            .unwrap();
        assert!(matches!(
            load_verifier(&sink, "key.pem"),
            Err(EngineError::KeyImport(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(VerificationResult::Valid.to_string(), "valid");
        assert_eq!(VerificationResult::Invalid.to_string(), "invalid");
    }
}
