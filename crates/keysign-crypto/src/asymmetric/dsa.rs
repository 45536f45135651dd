use dsa::{Components, KeySize, Signature, SigningKey, VerifyingKey};
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use sha2::digest::{core_api::BlockSizeUser, Digest, FixedOutputReset};
use signature::{DigestSigner, DigestVerifier, SignatureEncoding};

use crate::error::{Error, Result};

pub struct Dsa {
    pub inner: SigningKey,
}

impl From<SigningKey> for Dsa {
    fn from(value: SigningKey) -> Self {
        Self { inner: value }
    }
}

/// Map a modulus length onto its FIPS 186 (L, N) pair
#[allow(deprecated)]
fn key_size(bits: usize) -> Result<KeySize> {
    match bits {
        1024 => Ok(KeySize::DSA_1024_160),
        2048 => Ok(KeySize::DSA_2048_256),
        3072 => Ok(KeySize::DSA_3072_256),
        _ => Err(Error::UnsupportedKeySize {
            algorithm: "DSA",
            bits,
        }),
    }
}

impl Dsa {
    /// Generate fresh domain parameters and a key pair for them
    pub fn generate(bits: usize) -> Result<Self> {
        let key_size = key_size(bits)?;
        let mut rng = rand::thread_rng();
        let components = Components::generate(&mut rng, key_size);
        let signing_key = SigningKey::generate(&mut rng, components);
        Ok(signing_key.into())
    }

    /// Import from PKCS8 DER format
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let signing_key = SigningKey::from_pkcs8_der(der)?;
        Ok(signing_key.into())
    }
}

impl Dsa {
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let der = self.inner.to_pkcs8_der()?;
        Ok(der.as_bytes().to_vec())
    }

    pub fn to_pkcs8_pem(&self) -> Result<String> {
        let pem = self.inner.to_pkcs8_pem(LineEnding::LF)?;
        Ok(pem.to_string())
    }

    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let der = self.inner.verifying_key().to_public_key_der()?;
        Ok(der.as_bytes().to_vec())
    }

    pub fn to_spki_pem(&self) -> Result<String> {
        let pem = self
            .inner
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)?;
        Ok(pem)
    }
}

impl Dsa {
    pub fn public_key(&self) -> &VerifyingKey {
        self.inner.verifying_key()
    }

    /// Bit length of the prime modulus `p`
    pub fn size(&self) -> usize {
        self.inner.verifying_key().components().p().bits()
    }

    /// Sign an accumulated digest; the nonce is derived per RFC 6979 so the
    /// result is deterministic for a given key and message
    pub fn sign_digest<D>(&self, digest: D) -> Result<Vec<u8>>
    where
        D: Digest + BlockSizeUser + FixedOutputReset,
    {
        let signature: Signature = self
            .inner
            .try_sign_digest(digest)
            .map_err(|e| Error::Signing(format!("DSA signing failed: {}", e)))?;
        Ok(signature.to_vec())
    }
}

/// Verify a DER-encoded DSA signature against an SPKI DER public key
pub fn verify_with_spki_der<D>(spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<bool>
where
    D: Digest + BlockSizeUser + FixedOutputReset,
{
    let public_key = VerifyingKey::from_public_key_der(spki_der)?;
    let signature = match Signature::try_from(signature) {
        Ok(sig) => sig,
        Err(_) => return Ok(false),
    };
    Ok(public_key
        .verify_digest(D::new_with_prefix(message), &signature)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use sha1::Sha1;
    use sha2::Sha256;

    use super::*;

    #[test]
    fn test_key_generation() {
        let key = Dsa::generate(1024).unwrap();
        assert_eq!(key.size(), 1024);
    }

    #[test]
    fn test_unsupported_size() {
        assert!(matches!(
            Dsa::generate(1536),
            Err(Error::UnsupportedKeySize { bits: 1536, .. })
        ));
    }

    #[test]
    fn test_sign_verify() {
        let key = Dsa::generate(1024).unwrap();
        let message = b"Hello, DSA!";

        let signature = key.sign_digest(Sha1::new_with_prefix(message)).unwrap();
        // DER SEQUENCE { r, s }
        assert_eq!(signature[0], 0x30);

        let spki_der = key.to_spki_der().unwrap();
        assert!(verify_with_spki_der::<Sha1>(&spki_der, message, &signature).unwrap());
        assert!(!verify_with_spki_der::<Sha1>(&spki_der, b"other", &signature).unwrap());
        assert!(!verify_with_spki_der::<Sha1>(&spki_der, message, b"garbage").unwrap());
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let key = Dsa::generate(1024).unwrap();
        let a = key.sign_digest(Sha256::new_with_prefix(b"same")).unwrap();
        let b = key.sign_digest(Sha256::new_with_prefix(b"same")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_der_export_import() {
        let key = Dsa::generate(1024).unwrap();
        let der = key.to_pkcs8_der().unwrap();
        let imported = Dsa::from_pkcs8_der(&der).unwrap();
        assert_eq!(key.to_spki_der().unwrap(), imported.to_spki_der().unwrap());

        let pem = key.to_spki_pem().unwrap();
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"));
    }
}
