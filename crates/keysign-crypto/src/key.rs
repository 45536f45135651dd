//! Key pairs and their interchange encodings

use std::{fmt, str::FromStr};

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{
    algorithm::{SchemeDigest, SignatureAlgorithm},
    asymmetric::{Dsa, Rsa, P256},
    error::{Error, Result},
};

/// On-disk representation of an exported key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum KeyEncoding {
    /// Raw DER: SPKI for public keys, PKCS#8 for private keys
    #[default]
    Der,
    /// The same DER wrapped in PEM armor
    Pem,
}

impl fmt::Display for KeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEncoding::Der => f.write_str("der"),
            KeyEncoding::Pem => f.write_str("pem"),
        }
    }
}

impl FromStr for KeyEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "der" => Ok(KeyEncoding::Der),
            "pem" => Ok(KeyEncoding::Pem),
            _ => Err(Error::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl TryFrom<String> for KeyEncoding {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// A private key together with the public key derived from it
pub enum KeyPair {
    Dsa(Dsa),
    Rsa(Rsa),
    Ec(P256),
}

impl KeyPair {
    /// Generate a key pair from the OS-seeded CSPRNG
    ///
    /// `bits` must be one of `algorithm.supported_key_sizes()`.
    pub fn generate(algorithm: SignatureAlgorithm, bits: usize) -> Result<Self> {
        algorithm.check_key_size(bits)?;
        let pair = match algorithm {
            SignatureAlgorithm::Dsa => KeyPair::Dsa(Dsa::generate(bits)?),
            SignatureAlgorithm::Rsa => KeyPair::Rsa(Rsa::generate(bits)?),
            SignatureAlgorithm::Ec => KeyPair::Ec(P256::generate()?),
        };
        Ok(pair)
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            KeyPair::Dsa(_) => SignatureAlgorithm::Dsa,
            KeyPair::Rsa(_) => SignatureAlgorithm::Rsa,
            KeyPair::Ec(_) => SignatureAlgorithm::Ec,
        }
    }

    pub fn size_bits(&self) -> usize {
        match self {
            KeyPair::Dsa(key) => key.size(),
            KeyPair::Rsa(key) => key.size(),
            KeyPair::Ec(_) => 256,
        }
    }

    /// X.509 SubjectPublicKeyInfo, DER
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        match self {
            KeyPair::Dsa(key) => key.to_spki_der(),
            KeyPair::Rsa(key) => key.to_spki_der(),
            KeyPair::Ec(key) => key.to_spki_der(),
        }
    }

    pub fn public_key_pem(&self) -> Result<String> {
        match self {
            KeyPair::Dsa(key) => key.to_spki_pem(),
            KeyPair::Rsa(key) => key.to_spki_pem(),
            KeyPair::Ec(key) => key.to_spki_pem(),
        }
    }

    /// PKCS#8 PrivateKeyInfo, DER, unencrypted
    pub fn private_key_der(&self) -> Result<Vec<u8>> {
        match self {
            KeyPair::Dsa(key) => key.to_pkcs8_der(),
            KeyPair::Rsa(key) => key.to_pkcs8_der(),
            KeyPair::Ec(key) => key.to_pkcs8_der(),
        }
    }

    pub fn private_key_pem(&self) -> Result<String> {
        match self {
            KeyPair::Dsa(key) => key.to_pkcs8_pem(),
            KeyPair::Rsa(key) => key.to_pkcs8_pem(),
            KeyPair::Ec(key) => key.to_pkcs8_pem(),
        }
    }

    pub fn encode_public_key(&self, encoding: KeyEncoding) -> Result<Vec<u8>> {
        match encoding {
            KeyEncoding::Der => self.public_key_der(),
            KeyEncoding::Pem => Ok(self.public_key_pem()?.into_bytes()),
        }
    }

    pub fn encode_private_key(&self, encoding: KeyEncoding) -> Result<Vec<u8>> {
        match encoding {
            KeyEncoding::Der => self.private_key_der(),
            KeyEncoding::Pem => Ok(self.private_key_pem()?.into_bytes()),
        }
    }

    /// SHA-256 over the SPKI DER encoding
    pub fn fingerprint(&self) -> Result<[u8; 32]> {
        let spki = self.public_key_der()?;
        Ok(Sha256::digest(&spki).into())
    }

    pub fn fingerprint_hex(&self) -> Result<String> {
        Ok(hex::encode(self.fingerprint()?))
    }

    pub(crate) fn sign_digest<D: SchemeDigest>(&self, digest: D) -> Result<Vec<u8>> {
        match self {
            KeyPair::Dsa(key) => key.sign_digest(digest),
            KeyPair::Rsa(key) => key.sign_digest(digest),
            KeyPair::Ec(key) => key.sign_digest(digest),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print key material
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm())
            .field("size_bits", &self.size_bits())
            .finish_non_exhaustive()
    }
}
