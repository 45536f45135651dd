//! Keysign Cryptography Library
//!
//! Key generation, key encodings and streaming signatures for the schemes the
//! signing service supports: DSA, RSA (PKCS#1 v1.5) and ECDSA over P-256.

pub mod error;

pub mod algorithm;
pub mod asymmetric;
pub mod key;
pub mod signer;

// Re-export commonly used types for convenience
pub use algorithm::{CombinedScheme, DigestAlgorithm, SignatureAlgorithm};
pub use asymmetric::{verify_signature, Dsa, Rsa, P256};
pub use error::{Error, Result};
pub use key::{KeyEncoding, KeyPair};
pub use signer::{sign_reader, SigningContext, DEFAULT_CHUNK_SIZE};
