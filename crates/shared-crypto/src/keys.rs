//! Ephemeral RSA-PSS key generation and management

use rand_core::OsRng;
use rsa::{
    pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding},
    pss::{BlindedSigningKey, Signature, VerifyingKey},
    signature::{RandomizedSigner, SignatureEncoding, Verifier},
    traits::PublicKeyParts,
    RsaPrivateKey, RsaPublicKey,
};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::CryptoError;

/// Smallest modulus accepted for new key pairs
pub const MIN_KEY_BITS: usize = 2048;

/// Default modulus size for new key pairs
pub const DEFAULT_KEY_BITS: usize = 2048;

/// SHA-256 output length in bytes
pub const DIGEST_LEN: usize = 32;

/// Largest PSS salt a key of `key_bits` can carry with SHA-256.
///
/// emLen = ceil((modBits - 1) / 8), salt = emLen - hLen - 2. For a
/// 2048-bit modulus this is 222 bytes.
pub fn max_pss_salt_len(key_bits: usize) -> usize {
    let em_len = key_bits.saturating_sub(1).div_ceil(8);
    em_len.saturating_sub(DIGEST_LEN + 2)
}

/// An RSA key pair that lives for the lifetime of one signing session.
///
/// The private key is only ever used for signing and the public half only
/// for verification. Both halves are created together in [`generate`] and
/// cannot be swapped independently.
///
/// [`generate`]: RsaPssIdentity::generate
#[derive(Clone)]
pub struct RsaPssIdentity {
    signing_key: BlindedSigningKey<Sha256>,
    verifier: PssVerifier,
}

impl RsaPssIdentity {
    /// Generate a new random identity with public exponent 65537
    pub fn generate(bits: usize) -> Result<Self, CryptoError> {
        if bits < MIN_KEY_BITS {
            return Err(CryptoError::KeyGeneration(format!(
                "key size {} is below the {} bit minimum",
                bits, MIN_KEY_BITS
            )));
        }

        let private_key = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;

        let identity = Self::from_private_key(private_key);
        tracing::debug!(
            bits,
            fingerprint = %identity.verifier.fingerprint(),
            "Generated RSA key pair"
        );
        Ok(identity)
    }

    fn from_private_key(private_key: RsaPrivateKey) -> Self {
        let verifier = PssVerifier::new(private_key.to_public_key());
        let signing_key =
            BlindedSigningKey::<Sha256>::new_with_salt_len(private_key, verifier.salt_len);

        Self {
            signing_key,
            verifier,
        }
    }

    /// Sign raw data with RSASSA-PSS (SHA-256, MGF1-SHA-256, max salt).
    ///
    /// The salt is random, so signing the same data twice yields two
    /// different signatures that both verify.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let signature: Signature = self
            .signing_key
            .try_sign_with_rng(&mut OsRng, data)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        Ok(signature.to_vec())
    }

    /// Verify a signature against this identity's public key
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        self.verifier.verify(data, signature)
    }

    /// The public half of this identity
    pub fn verifier(&self) -> &PssVerifier {
        &self.verifier
    }

    /// Modulus size in bits
    pub fn key_bits(&self) -> usize {
        self.verifier.key_bits()
    }
}

impl fmt::Debug for RsaPssIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPssIdentity")
            .field("key_bits", &self.key_bits())
            .field("fingerprint", &self.verifier.fingerprint())
            .finish_non_exhaustive()
    }
}

/// Public half of an RSA-PSS identity, usable on its own to verify
/// signatures produced in another session.
#[derive(Debug, Clone)]
pub struct PssVerifier {
    public_key: RsaPublicKey,
    verifying_key: VerifyingKey<Sha256>,
    salt_len: usize,
}

impl PssVerifier {
    /// Build a verifier using the maximum salt length for this key
    pub fn new(public_key: RsaPublicKey) -> Self {
        let salt_len = max_pss_salt_len(public_key.n().bits());
        let verifying_key = VerifyingKey::<Sha256>::new_with_salt_len(public_key.clone(), salt_len);

        Self {
            public_key,
            verifying_key,
            salt_len,
        }
    }

    /// Import a verifier from a PEM-encoded SubjectPublicKeyInfo
    pub fn from_public_key_pem(pem: &str) -> Result<Self, CryptoError> {
        let public_key = RsaPublicKey::from_public_key_pem(pem)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self::new(public_key))
    }

    /// Import a verifier from a DER-encoded SubjectPublicKeyInfo
    pub fn from_public_key_der(der: &[u8]) -> Result<Self, CryptoError> {
        let public_key = RsaPublicKey::from_public_key_der(der)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self::new(public_key))
    }

    /// Check a signature over raw data.
    ///
    /// Malformed, truncated or foreign signatures all come back as
    /// [`CryptoError::Verification`]; this never panics on bad input.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        if signature.len() != self.signature_len() {
            return Err(CryptoError::Verification(format!(
                "expected {} signature bytes, got {}",
                self.signature_len(),
                signature.len()
            )));
        }

        let signature = Signature::try_from(signature)
            .map_err(|e| CryptoError::Verification(e.to_string()))?;

        self.verifying_key
            .verify(data, &signature)
            .map_err(|e| CryptoError::Verification(e.to_string()))
    }

    /// Get the public key as DER-encoded SubjectPublicKeyInfo
    pub fn public_key_der(&self) -> Result<Vec<u8>, CryptoError> {
        self.public_key
            .to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// Get the public key as PEM-encoded SubjectPublicKeyInfo
    pub fn public_key_pem(&self) -> Result<String, CryptoError> {
        self.public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// Hex SHA-256 of the DER public key
    pub fn fingerprint(&self) -> String {
        self.public_key_der()
            .map(|der| sha256_hex(&der))
            .unwrap_or_default()
    }

    /// Length in bytes of every signature this key produces
    pub fn signature_len(&self) -> usize {
        self.public_key.size()
    }

    /// Modulus size in bits
    pub fn key_bits(&self) -> usize {
        self.public_key.n().bits()
    }

    /// PSS salt length used for both signing and verification
    pub fn salt_len(&self) -> usize {
        self.salt_len
    }
}

/// Hash data using SHA-256
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash data and return as hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

#[cfg(test)]
pub(crate) mod test_keys {
    use super::*;

    lazy_static::lazy_static! {
        pub static ref ALICE: RsaPssIdentity =
            RsaPssIdentity::generate(DEFAULT_KEY_BITS).unwrap();
        pub static ref BOB: RsaPssIdentity =
            RsaPssIdentity::generate(DEFAULT_KEY_BITS).unwrap();
    }
}


#[cfg(test)]
mod proptests {
    use super::test_keys::{ALICE, BOB};
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Property: Any message can be signed and the signature verifies
        #[test]
        fn sign_verify_roundtrip(message in prop::collection::vec(any::<u8>(), 0..1024)) {
            let signature = ALICE.sign(&message).unwrap();
            prop_assert!(ALICE.verify(&message, &signature).is_ok());
        }

        /// Property: Signatures don't verify with different messages
        #[test]
        fn signature_message_binding(
            msg1 in prop::collection::vec(any::<u8>(), 1..512),
            msg2 in prop::collection::vec(any::<u8>(), 1..512),
        ) {
            prop_assume!(msg1 != msg2);
            let signature = ALICE.sign(&msg1).unwrap();
            prop_assert!(ALICE.verify(&msg2, &signature).is_err());
        }

        /// Property: A single flipped bit anywhere in the message breaks the signature
        #[test]
        fn single_bit_flip_detected(
            message in prop::collection::vec(any::<u8>(), 1..256),
            index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let signature = ALICE.sign(&message).unwrap();
            let mut tampered = message.clone();
            let i = index.index(tampered.len());
            tampered[i] ^= 1 << bit;
            prop_assert!(ALICE.verify(&tampered, &signature).is_err());
        }

        /// Property: Signatures are bound to the key that made them
        #[test]
        fn signature_key_binding(message in prop::collection::vec(any::<u8>(), 0..256)) {
            let signature = ALICE.sign(&message).unwrap();
            prop_assert!(BOB.verify(&message, &signature).is_err());
        }

        /// Property: Arbitrary bytes never verify and never panic
        #[test]
        fn garbage_signature_rejected(
            message in prop::collection::vec(any::<u8>(), 0..128),
            garbage in prop::collection::vec(any::<u8>(), 0..300),
        ) {
            prop_assert!(ALICE.verify(&message, &garbage).is_err());
        }

        /// Property: SHA-256 produces deterministic 32-byte output
        #[test]
        fn sha256_deterministic(data in prop::collection::vec(any::<u8>(), 0..2048)) {
            let hash1 = sha256(&data);
            let hash2 = sha256(&data);
            prop_assert_eq!(hash1, hash2);
            prop_assert_eq!(hash1.len(), 32);
        }

        /// Property: Hex digest is 64 lowercase hex characters
        #[test]
        fn sha256_hex_shape(data in prop::collection::vec(any::<u8>(), 0..512)) {
            let hex = sha256_hex(&data);
            prop_assert_eq!(hex.len(), 64);
            prop_assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }
}
