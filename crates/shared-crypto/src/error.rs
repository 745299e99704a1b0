use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Signature verification failed: {0}")]
    Verification(String),

    #[error("Invalid public key: {0}")]
    InvalidKey(String),

    #[error("Unsupported signature envelope: {0}")]
    Envelope(String),
}
