//! Document signing core logic
//!
//! This crate provides the signature workflow engine: it loads a document,
//! tracks its SHA-256 digest, signs it with an ephemeral RSA-PSS key,
//! persists the signature to a named sink and later verifies documents
//! against stored signatures.
//!
//! ```no_run
//! use docseal_core::{SignatureEngine, VerificationResult};
//!
//! # fn example() -> Result<(), docseal_core::EngineError> {
//! let mut engine = SignatureEngine::with_defaults()?;
//! engine.load("report.pdf")?;
//! engine.sign()?;
//! engine.persist("signature.sig")?;
//! assert_eq!(
//!     engine.verify("report.pdf", "signature.sig")?,
//!     VerificationResult::Valid
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod sink;
pub mod verify;

pub use config::{EngineConfig, SignatureFormat};
pub use document::{DocumentInfo, LoadedDocument};
pub use engine::{EngineState, SignatureEngine, SignatureInfo};
pub use error::EngineError;
pub use sink::{FileSink, MemorySink, SignatureSink};
pub use verify::{load_verifier, verify_detached, verify_files, VerificationResult};

// Re-export the primitives callers need for detached verification
pub use shared_crypto::{sha256, sha256_hex, PssVerifier, RsaPssIdentity};

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    lazy_static::lazy_static! {
        pub static ref ALICE: RsaPssIdentity =
            RsaPssIdentity::generate(shared_crypto::DEFAULT_KEY_BITS).unwrap();
        pub static ref BOB: RsaPssIdentity =
            RsaPssIdentity::generate(shared_crypto::DEFAULT_KEY_BITS).unwrap();
    }

    /// Engine holding the shared test key, backed by memory
    pub fn engine() -> SignatureEngine<MemorySink> {
        engine_with(EngineConfig::default())
    }

    pub fn engine_with(config: EngineConfig) -> SignatureEngine<MemorySink> {
        SignatureEngine::with_identity(ALICE.clone(), config, MemorySink::new())
    }
}
