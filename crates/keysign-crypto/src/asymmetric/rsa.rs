use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{traits::PublicKeyParts, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::digest::{const_oid::AssociatedOid, Digest};

use crate::error::{Error, Result};

pub struct Rsa {
    pub inner: RsaPrivateKey,
}

impl From<RsaPrivateKey> for Rsa {
    fn from(value: RsaPrivateKey) -> Self {
        Self { inner: value }
    }
}

impl Rsa {
    /// Generate a new RSA key pair with the given modulus length
    pub fn generate(bits: usize) -> Result<Self> {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| Error::KeyGeneration(format!("RSA-{}: {}", bits, e)))?;
        Ok(private_key.into())
    }

    /// Import from PKCS8 DER format
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_der(der)?;
        Ok(private_key.into())
    }
}

impl Rsa {
    /// Export private key to PKCS8 DER format
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let der = self.inner.to_pkcs8_der()?;
        Ok(der.as_bytes().to_vec())
    }

    /// Export private key to PKCS8 PEM format
    pub fn to_pkcs8_pem(&self) -> Result<String> {
        let pem = self.inner.to_pkcs8_pem(LineEnding::LF)?;
        Ok(pem.to_string())
    }

    /// Export public key to SPKI DER format
    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let der = self.inner.to_public_key().to_public_key_der()?;
        Ok(der.as_bytes().to_vec())
    }

    /// Export public key to SPKI PEM format
    pub fn to_spki_pem(&self) -> Result<String> {
        let pem = self
            .inner
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)?;
        Ok(pem)
    }
}

impl Rsa {
    pub fn public_key(&self) -> RsaPublicKey {
        self.inner.to_public_key()
    }

    /// Key size in bits
    pub fn size(&self) -> usize {
        self.inner.size() * 8
    }

    /// Sign an accumulated digest using PKCS#1 v1.5
    pub fn sign_digest<D>(&self, digest: D) -> Result<Vec<u8>>
    where
        D: Digest + AssociatedOid,
    {
        let mut rng = rand::thread_rng();
        let hashed = digest.finalize();
        let signature = self
            .inner
            .sign_with_rng(&mut rng, Pkcs1v15Sign::new::<D>(), &hashed)
            .map_err(|e| Error::Signing(format!("RSA signing failed: {}", e)))?;
        Ok(signature)
    }
}

/// Verify a PKCS#1 v1.5 signature against an SPKI DER public key
pub fn verify_with_spki_der<D>(spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<bool>
where
    D: Digest + AssociatedOid,
{
    let public_key = public_key_from_spki_der(spki_der)?;
    let hashed = D::digest(message);
    Ok(public_key
        .verify(Pkcs1v15Sign::new::<D>(), &hashed, signature)
        .is_ok())
}

/// Import public key from SPKI DER format
pub fn public_key_from_spki_der(der: &[u8]) -> Result<RsaPublicKey> {
    RsaPublicKey::from_public_key_der(der).map_err(Into::into)
}
