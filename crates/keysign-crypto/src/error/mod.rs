use thiserror::Error;

/// Error type for the crypto layer
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Unsupported digest: {0}")]
    UnsupportedDigest(String),

    #[error("Unsupported key size for {algorithm}: {bits} bits")]
    UnsupportedKeySize { algorithm: &'static str, bits: usize },

    #[error("Unsupported key encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("PKCS8 error: {0}")]
    Pkcs8Error(#[from] pkcs8::Error),

    #[error("SPKI error: {0}")]
    SpkiError(#[from] pkcs8::spki::Error),

    #[error("DER error: {0}")]
    DerError(#[from] pkcs8::der::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;
