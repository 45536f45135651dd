//! Algorithm and combined-scheme vocabulary
//!
//! A combined scheme pairs a digest with a signature algorithm, e.g.
//! `SHA256withRSA`. Identifiers are parsed case-insensitively; anything that
//! is not in the table is rejected instead of falling back to a default.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use sha2::digest::{
    const_oid::AssociatedOid, core_api::BlockSizeUser, Digest, FixedOutputReset,
};

use crate::error::{Error, Result};

// ============================================================================
// Signature algorithms
// ============================================================================

/// Supported signature algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// FIPS 186 DSA
    Dsa,
    /// RSA with PKCS#1 v1.5 padding
    Rsa,
    /// ECDSA over NIST P-256
    Ec,
}

impl SignatureAlgorithm {
    pub const ALL: [SignatureAlgorithm; 3] = [Self::Dsa, Self::Rsa, Self::Ec];

    /// Identifier as accepted on input
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dsa => "DSA",
            Self::Rsa => "RSA",
            Self::Ec => "EC",
        }
    }

    /// Name used in the `<digest>with<signature>` scheme string
    fn signature_name(&self) -> &'static str {
        match self {
            Self::Dsa => "DSA",
            Self::Rsa => "RSA",
            Self::Ec => "ECDSA",
        }
    }

    pub fn default_key_size(&self) -> usize {
        match self {
            Self::Dsa | Self::Rsa => 2048,
            Self::Ec => 256,
        }
    }

    pub fn supported_key_sizes(&self) -> &'static [usize] {
        match self {
            Self::Dsa => &[1024, 2048, 3072],
            Self::Rsa => &[1024, 2048, 3072, 4096],
            Self::Ec => &[256],
        }
    }

    /// Sizes still accepted for compatibility but too weak for long-term use
    pub fn is_legacy_key_size(&self, bits: usize) -> bool {
        !matches!(self, Self::Ec) && bits < 2048
    }

    pub fn check_key_size(&self, bits: usize) -> Result<()> {
        if self.supported_key_sizes().contains(&bits) {
            Ok(())
        } else {
            Err(Error::UnsupportedKeySize {
                algorithm: self.name(),
                bits,
            })
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DSA" => Ok(Self::Dsa),
            "RSA" => Ok(Self::Rsa),
            "EC" | "ECDSA" => Ok(Self::Ec),
            _ => Err(Error::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

// ============================================================================
// Digests
// ============================================================================

/// Hash functions usable in a combined scheme
///
/// Deserialized through [`FromStr`], so config files accept the same
/// spellings as the command line (`sha256`, `SHA-256`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum DigestAlgorithm {
    Sha1,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
        }
    }

    /// Still accepted for the legacy DSA mapping but too weak for new signatures
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Sha1)
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(Error::UnsupportedDigest(s.to_string())),
        }
    }
}

impl TryFrom<String> for DigestAlgorithm {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Bounds every digest in [`DigestAlgorithm`] satisfies, as required by the
/// DSA (RFC 6979) and RSA (PKCS#1 v1.5 DigestInfo) signers.
pub trait SchemeDigest: Digest + BlockSizeUser + FixedOutputReset + AssociatedOid {}

impl<D> SchemeDigest for D where D: Digest + BlockSizeUser + FixedOutputReset + AssociatedOid {}

// ============================================================================
// Combined schemes
// ============================================================================

/// A digest paired with a signature algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CombinedScheme {
    pub digest: DigestAlgorithm,
    pub algorithm: SignatureAlgorithm,
}

impl CombinedScheme {
    pub fn new(digest: DigestAlgorithm, algorithm: SignatureAlgorithm) -> Self {
        Self { digest, algorithm }
    }

    /// Scheme name, e.g. `SHA256withRSA`
    pub fn name(&self) -> String {
        format!("{}with{}", self.digest.name(), self.algorithm.signature_name())
    }
}

impl fmt::Display for CombinedScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for CombinedScheme {
    type Err = Error;

    /// Parses `SHA256withRSA` style names
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        let (digest, algorithm) = lower
            .split_once("with")
            .ok_or_else(|| Error::UnsupportedAlgorithm(s.to_string()))?;
        Ok(Self {
            digest: digest.parse()?,
            algorithm: algorithm.parse()?,
        })
    }
}
