//! Engine configuration
//!
//! Every field has a default, so an empty TOML table (or
//! `EngineConfig::default()`) gives the stock behaviour: 2048-bit keys,
//! raw signatures written to `signature.sig`.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// How signature bytes are laid out when persisted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SignatureFormat {
    /// Bare output of the signing primitive
    #[default]
    Raw,
    /// Raw signature behind an 8-byte parameter header
    Enveloped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// RSA modulus size in bits (minimum 2048)
    pub key_bits: usize,
    /// Sink name used by `persist_default`
    pub default_sink: String,
    /// Layout of persisted signatures
    pub signature_format: SignatureFormat,
    /// Hex characters shown in a signature preview
    pub display_prefix_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            key_bits: shared_crypto::DEFAULT_KEY_BITS,
            default_sink: "signature.sig".to_string(),
            signature_format: SignatureFormat::Raw,
            display_prefix_len: 50,
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine cannot be constructed with
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.key_bits < shared_crypto::MIN_KEY_BITS {
            return Err(EngineError::KeyGeneration(format!(
                "key_bits = {} is below the {} bit minimum",
                self.key_bits,
                shared_crypto::MIN_KEY_BITS
            )));
        }
        Ok(())
    }
}
