//! Asymmetric signature algorithms
//!
//! One wrapper per supported algorithm, each able to generate a key pair,
//! export it as SPKI / PKCS#8 and sign a finished digest.

pub mod dsa;
pub mod p256;
pub mod rsa;

use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

pub use self::dsa::Dsa;
pub use self::p256::P256;
pub use self::rsa::Rsa;
use crate::{
    algorithm::{CombinedScheme, DigestAlgorithm, SchemeDigest, SignatureAlgorithm},
    error::Result,
};

/// Verify `signature` over `message` under `scheme` with an SPKI DER public key
///
/// Returns `Ok(false)` for a well-formed key and a signature that does not
/// match; errors are reserved for keys that cannot be parsed.
pub fn verify_signature(
    scheme: CombinedScheme,
    spki_der: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<bool> {
    match scheme.digest {
        DigestAlgorithm::Sha1 => verify_with::<Sha1>(scheme.algorithm, spki_der, message, signature),
        DigestAlgorithm::Sha256 => {
            verify_with::<Sha256>(scheme.algorithm, spki_der, message, signature)
        }
        DigestAlgorithm::Sha384 => {
            verify_with::<Sha384>(scheme.algorithm, spki_der, message, signature)
        }
        DigestAlgorithm::Sha512 => {
            verify_with::<Sha512>(scheme.algorithm, spki_der, message, signature)
        }
    }
}

fn verify_with<D: SchemeDigest>(
    algorithm: SignatureAlgorithm,
    spki_der: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<bool> {
    match algorithm {
        SignatureAlgorithm::Dsa => self::dsa::verify_with_spki_der::<D>(spki_der, message, signature),
        SignatureAlgorithm::Rsa => self::rsa::verify_with_spki_der::<D>(spki_der, message, signature),
        SignatureAlgorithm::Ec => self::p256::verify_with_spki_der::<D>(spki_der, message, signature),
    }
}
