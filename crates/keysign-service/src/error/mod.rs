use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors surfaced by the signing service
///
/// Each variant is a distinct failure class so callers can tell a bad
/// request apart from an I/O problem or a cryptographic failure.
#[derive(Error, Debug)]
pub enum Error {
    /// Identifier not in the scheme table; nothing was generated or written
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Read failure on a caller-supplied stream with no path attached
    #[error("IO error while reading input: {0}")]
    Read(#[source] std::io::Error),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Key encoding failed: {0}")]
    Encoding(String),
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn invalid_configuration(msg: impl std::fmt::Display) -> Self {
        Error::InvalidConfiguration(msg.to_string())
    }

    /// Short machine-readable name of the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Error::InvalidConfiguration(_) => "invalid_configuration",
            Error::KeyGeneration(_) => "key_generation",
            Error::Io { .. } | Error::Read(_) => "io",
            Error::Signing(_) => "signing",
            Error::Encoding(_) => "encoding",
        }
    }
}

impl From<keysign_crypto::Error> for Error {
    fn from(err: keysign_crypto::Error) -> Self {
        use keysign_crypto::Error as Crypto;

        match err {
            Crypto::UnsupportedAlgorithm(name) => Error::UnsupportedAlgorithm(name),
            Crypto::UnsupportedDigest(_)
            | Crypto::UnsupportedKeySize { .. }
            | Crypto::UnsupportedEncoding(_) => Error::InvalidConfiguration(err.to_string()),
            Crypto::KeyGeneration(msg) => Error::KeyGeneration(msg),
            Crypto::Signing(msg) => Error::Signing(msg),
            Crypto::Pkcs8Error(_) | Crypto::SpkiError(_) | Crypto::DerError(_) => {
                Error::Encoding(err.to_string())
            }
            Crypto::Io(source) => Error::Read(source),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;
