//! # Keysign
//!
//! Generates a key pair, signs a file with it and writes the signature and
//! keys to disk.
//!
//! ## Crates
//!
//! - `keysign_crypto` - key generation, encodings, streaming signatures
//! - `keysign_service` - the signing pipeline, configuration, persistence
//! - `keysign-cli` - the `keysign` command

pub use keysign_crypto;
pub use keysign_service;
