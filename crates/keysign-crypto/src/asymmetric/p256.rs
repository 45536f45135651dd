use p256::{
    ecdsa::{
        signature::hazmat::{PrehashSigner, PrehashVerifier},
        Signature, SigningKey, VerifyingKey,
    },
    elliptic_curve::rand_core::OsRng,
    PublicKey, SecretKey,
};
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use sha2::digest::Digest;

use crate::error::{Error, Result};

pub struct P256 {
    pub inner: SecretKey,
}

impl From<SecretKey> for P256 {
    fn from(value: SecretKey) -> Self {
        Self { inner: value }
    }
}

impl P256 {
    /// Generate a new P-256 key pair
    pub fn generate() -> Result<Self> {
        let secret_key = SecretKey::random(&mut OsRng);
        Ok(secret_key.into())
    }

    /// Import from PKCS8 DER format
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let secret_key = SecretKey::from_pkcs8_der(der)?;
        Ok(secret_key.into())
    }
}

impl P256 {
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
        let der = self.inner.public_key().to_public_key_der()?;
        Ok(der.as_bytes().to_vec())
    }

    /// Export public key to SPKI PEM format
    pub fn to_spki_pem(&self) -> Result<String> {
        let pem = self.inner.public_key().to_public_key_pem(LineEnding::LF)?;
        Ok(pem)
    }
}

impl P256 {
    pub fn public_key(&self) -> PublicKey {
        self.inner.public_key()
    }

    /// Sign an accumulated digest with ECDSA, DER-encoded output
    ///
    /// The digest is finalized and signed as a prehash, so any digest of at
    /// least 128 bits works with the curve.
    pub fn sign_digest<D: Digest>(&self, digest: D) -> Result<Vec<u8>> {
        let signing_key = SigningKey::from(&self.inner);
        let prehash = digest.finalize();
        let signature: Signature = signing_key
            .sign_prehash(&prehash)
            .map_err(|e| Error::Signing(format!("ECDSA signing failed: {}", e)))?;
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

/// Verify a DER-encoded ECDSA signature against an SPKI DER public key
pub fn verify_with_spki_der<D: Digest>(
    spki_der: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<bool> {
    let public_key = PublicKey::from_public_key_der(spki_der)?;
    let verifying_key = VerifyingKey::from(&public_key);
    let signature = match Signature::from_der(signature) {
        Ok(sig) => sig,
        Err(_) => return Ok(false),
    };
    let prehash = D::digest(message);
    Ok(verifying_key.verify_prehash(&prehash, &signature).is_ok())
}
