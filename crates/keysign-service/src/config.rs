//! Signer configuration
//!
//! Every knob the signing pipeline has lives here with a validated default:
//! per-algorithm key size and digest, the read chunk size, the key file
//! encoding and the write policy. A YAML file can override any subset.
//!
//! ```yaml
//! rsa:
//!   key_size: 3072
//! dsa:
//!   key_size: 1024
//!   digest: sha1
//! chunk_size: 4096
//! key_encoding: pem
//! atomic_writes: false
//! ```

use std::{fs, path::Path};

use keysign_crypto::{
    CombinedScheme, DigestAlgorithm, KeyEncoding, SignatureAlgorithm, DEFAULT_CHUNK_SIZE,
};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Key size and digest used for one signature algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlgorithmSettings {
    pub key_size: usize,
    #[serde(default)]
    pub digest: DigestAlgorithm,
}

impl AlgorithmSettings {
    pub fn new(key_size: usize, digest: DigestAlgorithm) -> Self {
        Self { key_size, digest }
    }

    fn recommended(algorithm: SignatureAlgorithm) -> Self {
        Self::new(algorithm.default_key_size(), DigestAlgorithm::Sha256)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignerConfig {
    pub dsa: AlgorithmSettings,
    pub rsa: AlgorithmSettings,
    pub ec: AlgorithmSettings,
    /// Bytes read from the source per update
    pub chunk_size: usize,
    pub key_encoding: KeyEncoding,
    /// Stage artifacts in temporary files and rename them into place
    pub atomic_writes: bool,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            dsa: AlgorithmSettings::recommended(SignatureAlgorithm::Dsa),
            rsa: AlgorithmSettings::recommended(SignatureAlgorithm::Rsa),
            ec: AlgorithmSettings::recommended(SignatureAlgorithm::Ec),
            chunk_size: DEFAULT_CHUNK_SIZE,
            key_encoding: KeyEncoding::Der,
            atomic_writes: true,
        }
    }
}

impl SignerConfig {
    /// The historical behavior: 1024-bit keys, `SHA1withDSA` and
    /// `SHA256withRSA`, raw DER output, direct writes
    pub fn legacy() -> Self {
        Self {
            dsa: AlgorithmSettings::new(1024, DigestAlgorithm::Sha1),
            rsa: AlgorithmSettings::new(1024, DigestAlgorithm::Sha256),
            atomic_writes: false,
            ..Self::default()
        }
    }

    /// Load and validate a YAML configuration file
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let path = config_path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: SignerConfig = serde_yaml::from_str(&raw)
            .map_err(|e| Error::invalid_configuration(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: SignerConfig = serde_yaml::from_str(raw).map_err(Error::invalid_configuration)?;
        config.validate()?;
        Ok(config)
    }

    pub fn settings(&self, algorithm: SignatureAlgorithm) -> &AlgorithmSettings {
        match algorithm {
            SignatureAlgorithm::Dsa => &self.dsa,
            SignatureAlgorithm::Rsa => &self.rsa,
            SignatureAlgorithm::Ec => &self.ec,
        }
    }

    pub fn settings_mut(&mut self, algorithm: SignatureAlgorithm) -> &mut AlgorithmSettings {
        match algorithm {
            SignatureAlgorithm::Dsa => &mut self.dsa,
            SignatureAlgorithm::Rsa => &mut self.rsa,
            SignatureAlgorithm::Ec => &mut self.ec,
        }
    }

    pub fn scheme(&self, algorithm: SignatureAlgorithm) -> CombinedScheme {
        CombinedScheme::new(self.settings(algorithm).digest, algorithm)
    }

    /// Every algorithm with the scheme it currently maps to
    pub fn scheme_table(&self) -> Vec<(SignatureAlgorithm, CombinedScheme)> {
        SignatureAlgorithm::ALL
            .iter()
            .map(|&algorithm| (algorithm, self.scheme(algorithm)))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        for algorithm in SignatureAlgorithm::ALL {
            let settings = self.settings(algorithm);
            algorithm.check_key_size(settings.key_size)?;
        }
        if self.chunk_size == 0 {
            return Err(Error::invalid_configuration("chunk_size must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults_are_modern() {
        let config = SignerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.rsa.key_size, 2048);
        assert_eq!(config.dsa.key_size, 2048);
        assert_eq!(config.scheme(SignatureAlgorithm::Rsa).name(), "SHA256withRSA");
        assert_eq!(config.scheme(SignatureAlgorithm::Dsa).name(), "SHA256withDSA");
        assert_eq!(config.scheme(SignatureAlgorithm::Ec).name(), "SHA256withECDSA");
        assert_eq!(config.chunk_size, 1024);
        assert!(config.atomic_writes);
    }

    #[test]
    fn test_legacy_mapping() {
        let config = SignerConfig::legacy();
        config.validate().unwrap();
        assert_eq!(config.scheme(SignatureAlgorithm::Dsa).name(), "SHA1withDSA");
        assert_eq!(config.scheme(SignatureAlgorithm::Rsa).name(), "SHA256withRSA");
        assert_eq!(config.dsa.key_size, 1024);
        assert!(!config.atomic_writes);
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let config = SignerConfig::from_yaml_str(
            "rsa:\n  key_size: 3072\ndsa:\n  key_size: 1024\n  digest: sha1\nkey_encoding: pem\n",
        )
        .unwrap();
        assert_eq!(config.rsa, AlgorithmSettings::new(3072, DigestAlgorithm::Sha256));
        assert_eq!(config.dsa, AlgorithmSettings::new(1024, DigestAlgorithm::Sha1));
        assert_eq!(config.key_encoding, KeyEncoding::Pem);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_yaml_accepts_cli_spellings() {
        let config = SignerConfig::from_yaml_str(
            "ec:\n  key_size: 256\n  digest: SHA-384\nkey_encoding: PEM\n",
        )
        .unwrap();
        assert_eq!(config.ec.digest, DigestAlgorithm::Sha384);
        assert_eq!(config.key_encoding, KeyEncoding::Pem);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SignerConfig::from_yaml_str("rsa:\n  key_size: 1000\n").unwrap_err();
        assert_eq!(err.kind(), "invalid_configuration");

        let err = SignerConfig::from_yaml_str("chunk_size: 0\n").unwrap_err();
        assert_eq!(err.kind(), "invalid_configuration");

        let err = SignerConfig::from_yaml_str("rsa:\n  key_size: 2048\n  digest: md5\n").unwrap_err();
        assert_eq!(err.kind(), "invalid_configuration");

        let err = SignerConfig::from_yaml_str("unknown_knob: 1\n").unwrap_err();
        assert_eq!(err.kind(), "invalid_configuration");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "atomic_writes: false").unwrap();
        writeln!(file, "chunk_size: 64").unwrap();

        let config = SignerConfig::load(file.path()).unwrap();
        assert!(!config.atomic_writes);
        assert_eq!(config.chunk_size, 64);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SignerConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn test_scheme_table_lists_every_algorithm() {
        let table = SignerConfig::default().scheme_table();
        assert_eq!(table.len(), 3);
        assert!(table.iter().all(|(_, scheme)| !scheme.name().is_empty()));
    }
}
