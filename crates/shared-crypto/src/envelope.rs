//! Optional parameter header for persisted signatures
//!
//! A raw RSA-PSS signature carries no record of the parameters that
//! produced it. The envelope prepends a fixed 8-byte header:
//!
//! ```text
//! +------+------+---------+------+------+
//! | DSIG | ver  | alg id  | hash | salt |
//! |  4   |  1   |    1    |  1   |  1   |
//! +------+------+---------+------+------+
//! ```
//!
//! so a verifier can reject a blob made under different parameters with a
//! diagnostic instead of a bare mismatch.

use crate::CryptoError;

/// Magic bytes opening every enveloped signature
pub const MAGIC: &[u8; 4] = b"DSIG";

/// Current header layout version
pub const VERSION: u8 = 0x01;

/// Total header length in bytes
pub const HEADER_LEN: usize = 8;

/// RSASSA-PSS
pub const ALG_RSA_PSS: u8 = 0x01;

/// SHA-256 for both the message hash and MGF1
pub const HASH_SHA256: u8 = 0x01;

/// Salt length = maximum permitted by the modulus
pub const SALT_MAX_LENGTH: u8 = 0x01;

/// Parameters recorded in an envelope header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureHeader {
    pub version: u8,
    pub algorithm: u8,
    pub hash: u8,
    pub salt_policy: u8,
}

impl SignatureHeader {
    /// The parameters this crate signs with
    pub fn current() -> Self {
        Self {
            version: VERSION,
            algorithm: ALG_RSA_PSS,
            hash: HASH_SHA256,
            salt_policy: SALT_MAX_LENGTH,
        }
    }

    fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(MAGIC);
        out[4] = self.version;
        out[5] = self.algorithm;
        out[6] = self.hash;
        out[7] = self.salt_policy;
        out
    }

    fn parse(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
            return Err(CryptoError::Envelope("missing DSIG magic".to_string()));
        }

        Ok(Self {
            version: bytes[4],
            algorithm: bytes[5],
            hash: bytes[6],
            salt_policy: bytes[7],
        })
    }

    fn check_supported(&self) -> Result<(), CryptoError> {
        let current = Self::current();
        if self.version != current.version {
            return Err(CryptoError::Envelope(format!(
                "header version {:#04x}, expected {:#04x}",
                self.version, current.version
            )));
        }
        if self.algorithm != current.algorithm {
            return Err(CryptoError::Envelope(format!(
                "algorithm id {:#04x} is not RSASSA-PSS",
                self.algorithm
            )));
        }
        if self.hash != current.hash {
            return Err(CryptoError::Envelope(format!(
                "hash id {:#04x} is not SHA-256",
                self.hash
            )));
        }
        if self.salt_policy != current.salt_policy {
            return Err(CryptoError::Envelope(format!(
                "salt policy {:#04x} is not max-length",
                self.salt_policy
            )));
        }
        Ok(())
    }
}

/// Prepend the current parameter header to a raw signature
pub fn wrap(signature: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + signature.len());
    out.extend_from_slice(&SignatureHeader::current().to_bytes());
    out.extend_from_slice(signature);
    out
}

/// Strip an envelope header if one is present.
///
/// A blob of exactly `signature_len` bytes is a raw signature. A blob of
/// `HEADER_LEN + signature_len` bytes opening with the magic must carry
/// the current parameters. Anything else is handed back untouched and
/// left for the verifier to reject.
pub fn unwrap(bytes: &[u8], signature_len: usize) -> Result<&[u8], CryptoError> {
    if bytes.len() == signature_len {
        return Ok(bytes);
    }

    if bytes.len() == HEADER_LEN + signature_len && bytes.starts_with(MAGIC) {
        let header = SignatureHeader::parse(bytes)?;
        header.check_supported()?;
        return Ok(&bytes[HEADER_LEN..]);
    }

    Ok(bytes)
}
