//! Shared cryptography utilities
//!
//! This crate provides the RSA-PSS primitives behind document signing:
//! key generation, signing, verification, public key export and the
//! optional signature envelope header.

pub mod envelope;
pub mod error;
pub mod keys;

pub use error::CryptoError;
pub use keys::{
    max_pss_salt_len, sha256, sha256_hex, PssVerifier, RsaPssIdentity, DEFAULT_KEY_BITS,
    MIN_KEY_BITS,
};
