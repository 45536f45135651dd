//! Incremental signing
//!
//! A [`SigningContext`] accumulates message bytes into the scheme's digest and
//! signs the result once. `finalize` takes the context by value, so a context
//! can never produce a second signature.

use std::io::{self, Read};

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::{
    algorithm::{CombinedScheme, DigestAlgorithm},
    error::{Error, Result},
    key::KeyPair,
};

/// Read size used when streaming a source into a context
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

enum HashState {
    Sha1(Sha1),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl HashState {
    fn new(digest: DigestAlgorithm) -> Self {
        match digest {
            DigestAlgorithm::Sha1 => HashState::Sha1(Sha1::new()),
            DigestAlgorithm::Sha256 => HashState::Sha256(Sha256::new()),
            DigestAlgorithm::Sha384 => HashState::Sha384(Sha384::new()),
            DigestAlgorithm::Sha512 => HashState::Sha512(Sha512::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            HashState::Sha1(h) => h.update(data),
            HashState::Sha256(h) => h.update(data),
            HashState::Sha384(h) => h.update(data),
            HashState::Sha512(h) => h.update(data),
        }
    }
}

/// Single-use signing state bound to one private key and one scheme
pub struct SigningContext<'a> {
    key: &'a KeyPair,
    scheme: CombinedScheme,
    state: HashState,
    consumed: u64,
}

impl<'a> SigningContext<'a> {
    /// Bind a context to `key`; the key's algorithm must match the scheme
    pub fn new(key: &'a KeyPair, scheme: CombinedScheme) -> Result<Self> {
        if key.algorithm() != scheme.algorithm {
            return Err(Error::Signing(format!(
                "{} key cannot produce {} signatures",
                key.algorithm(),
                scheme
            )));
        }
        Ok(Self {
            key,
            scheme,
            state: HashState::new(scheme.digest),
            consumed: 0,
        })
    }

    pub fn scheme(&self) -> CombinedScheme {
        self.scheme
    }

    /// Number of message bytes fed in so far
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
        self.consumed += data.len() as u64;
    }

    /// Drain `reader` into the context, `chunk_size` bytes at a time
    ///
    /// Returns the number of bytes read from this reader.
    pub fn update_from_reader<R: Read>(&mut self, mut reader: R, chunk_size: usize) -> io::Result<u64> {
        if chunk_size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "chunk size must be non-zero",
            ));
        }

        let mut buffer = vec![0u8; chunk_size];
        let mut total = 0u64;
        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.update(&buffer[..read]);
            total += read as u64;
        }
        Ok(total)
    }

    /// Produce the signature over everything fed in
    pub fn finalize(self) -> Result<Vec<u8>> {
        match self.state {
            HashState::Sha1(h) => self.key.sign_digest(h),
            HashState::Sha256(h) => self.key.sign_digest(h),
            HashState::Sha384(h) => self.key.sign_digest(h),
            HashState::Sha512(h) => self.key.sign_digest(h),
        }
    }
}

/// Sign everything `reader` yields in one call
pub fn sign_reader<R: Read>(
    key: &KeyPair,
    scheme: CombinedScheme,
    reader: R,
    chunk_size: usize,
) -> Result<Vec<u8>> {
    let mut context = SigningContext::new(key, scheme)?;
    context.update_from_reader(reader, chunk_size)?;
    context.finalize()
}
