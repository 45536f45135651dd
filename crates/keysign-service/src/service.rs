//! The signing pipeline: resolve scheme, generate keys, sign, persist

use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use keysign_crypto::{CombinedScheme, KeyPair, SignatureAlgorithm, SigningContext};
use tracing::{debug, info, warn};

use crate::{
    config::SignerConfig,
    error::{Error, Result},
    persist::{self, ArtifactPaths, Artifacts},
};

/// One signing run
#[derive(Debug, Clone)]
pub struct SignRequest {
    /// File whose bytes are signed
    pub source: PathBuf,
    /// Algorithm identifier, e.g. `"RSA"`
    pub algorithm: String,
    pub paths: ArtifactPaths,
}

impl SignRequest {
    pub fn new(source: impl Into<PathBuf>, algorithm: impl Into<String>, paths: ArtifactPaths) -> Self {
        Self {
            source: source.into(),
            algorithm: algorithm.into(),
            paths,
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct SignatureReport {
    pub scheme: String,
    pub key_size: usize,
    pub bytes_signed: u64,
    pub signature_len: usize,
    /// Hex SHA-256 over the SPKI DER public key
    pub fingerprint: String,
    pub paths: ArtifactPaths,
}

/// Signature bytes plus how much input they cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedData {
    pub signature: Vec<u8>,
    pub bytes_signed: u64,
}

/// Generates a key pair, signs a file, writes the artifacts
///
/// Holds only configuration; every call creates its own key pair and signing
/// context.
#[derive(Debug, Clone, Default)]
pub struct SignatureService {
    config: SignerConfig,
}

impl SignatureService {
    pub fn new(config: SignerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    /// Map an algorithm identifier onto its configured combined scheme
    pub fn resolve_scheme(&self, algorithm: &str) -> Result<CombinedScheme> {
        let algorithm: SignatureAlgorithm = algorithm.parse()?;
        Ok(self.config.scheme(algorithm))
    }

    pub fn generate_key_pair(&self, algorithm: SignatureAlgorithm, key_size: usize) -> Result<KeyPair> {
        if algorithm.is_legacy_key_size(key_size) {
            warn!(
                "{}-bit {} keys are a legacy size and unsuitable for long-term use",
                key_size, algorithm
            );
        }
        info!("Generating {}-bit {} key pair", key_size, algorithm);
        let key = KeyPair::generate(algorithm, key_size)?;
        Ok(key)
    }

    /// Sign everything `source` yields, in `chunk_size` reads
    pub fn sign<R: Read>(&self, key: &KeyPair, scheme: CombinedScheme, source: R) -> Result<SignedData> {
        self.sign_source(key, scheme, source, None)
    }

    pub fn sign_file(&self, key: &KeyPair, scheme: CombinedScheme, path: &Path) -> Result<SignedData> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        self.sign_source(key, scheme, BufReader::new(file), Some(path))
    }

    fn sign_source<R: Read>(
        &self,
        key: &KeyPair,
        scheme: CombinedScheme,
        source: R,
        path: Option<&Path>,
    ) -> Result<SignedData> {
        if scheme.digest.is_legacy() {
            warn!("{} uses SHA-1, which is unsuitable for new signatures", scheme);
        }
        let mut context = SigningContext::new(key, scheme)?;
        let bytes_signed = context
            .update_from_reader(source, self.config.chunk_size)
            .map_err(|e| match path {
                Some(path) => Error::io(path, e),
                None => Error::Read(e),
            })?;
        debug!(
            "Fed {} bytes into {} in {}-byte chunks",
            bytes_signed, scheme, self.config.chunk_size
        );
        let signature = context.finalize()?;
        Ok(SignedData {
            signature,
            bytes_signed,
        })
    }

    /// Encode the keys and write all artifacts
    ///
    /// The private key is encoded only when a destination for it exists.
    pub fn persist(&self, signature: &[u8], key: &KeyPair, paths: &ArtifactPaths) -> Result<()> {
        let encoding = self.config.key_encoding;
        let public_key = key.encode_public_key(encoding)?;
        let private_key = match paths.private_key {
            Some(_) => Some(key.encode_private_key(encoding)?),
            None => None,
        };

        let artifacts = Artifacts {
            signature,
            public_key: &public_key,
            private_key: private_key.as_deref(),
        };
        persist::persist(paths, &artifacts, self.config.atomic_writes)
    }

    /// Run the whole pipeline for `request`
    ///
    /// The algorithm is resolved, the output paths checked and the source
    /// opened before any key is generated, so a bad request creates no files
    /// and burns no entropy.
    pub fn generate_signature(&self, request: &SignRequest) -> Result<SignatureReport> {
        let scheme = self.resolve_scheme(&request.algorithm)?;
        request.paths.check_distinct(Some(&request.source))?;
        let key_size = self.config.settings(scheme.algorithm).key_size;
        info!("Signing {} with {}", request.source.display(), scheme);

        let source = File::open(&request.source).map_err(|e| Error::io(&request.source, e))?;

        let key = self.generate_key_pair(scheme.algorithm, key_size)?;
        let signed = self.sign_source(&key, scheme, BufReader::new(source), Some(&request.source))?;

        self.persist(&signed.signature, &key, &request.paths)?;
        info!(
            "Wrote signature to {} and public key to {}",
            request.paths.signature.display(),
            request.paths.public_key.display()
        );
        if let Some(private_key) = &request.paths.private_key {
            info!("Wrote unencrypted private key to {}", private_key.display());
        }

        Ok(SignatureReport {
            scheme: scheme.name(),
            key_size: key.size_bits(),
            bytes_signed: signed.bytes_signed,
            signature_len: signed.signature.len(),
            fingerprint: key.fingerprint_hex()?,
            paths: request.paths.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        io::Cursor,
        sync::{Arc, Mutex},
    };

    use keysign_crypto::{verify_signature, DigestAlgorithm};
    use tempfile::tempdir;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    fn fast_config() -> SignerConfig {
        let mut config = SignerConfig::default();
        config.dsa.key_size = 1024;
        config
    }

    #[test]
    fn test_resolve_scheme() {
        let service = SignatureService::default();
        assert_eq!(service.resolve_scheme("RSA").unwrap().name(), "SHA256withRSA");
        assert_eq!(service.resolve_scheme("dsa").unwrap().name(), "SHA256withDSA");
        assert_eq!(service.resolve_scheme("EC").unwrap().name(), "SHA256withECDSA");

        let err = service.resolve_scheme("Ed25519").unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(ref s) if s == "Ed25519"));
    }

    #[test]
    fn test_resolve_scheme_follows_config() {
        let service = SignatureService::new(SignerConfig::legacy()).unwrap();
        let scheme = service.resolve_scheme("DSA").unwrap();
        assert_eq!(scheme.digest, DigestAlgorithm::Sha1);
        assert_eq!(scheme.name(), "SHA1withDSA");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = SignerConfig::default();
        config.ec.key_size = 384;
        assert!(matches!(
            SignatureService::new(config),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_sign_reader_round_trip() {
        let service = SignatureService::new(fast_config()).unwrap();
        for algorithm in SignatureAlgorithm::ALL {
            let scheme = service.config().scheme(algorithm);
            let key = service
                .generate_key_pair(algorithm, service.config().settings(algorithm).key_size)
                .unwrap();

            let signed = service.sign(&key, scheme, Cursor::new(b"payload")).unwrap();
            assert_eq!(signed.bytes_signed, 7);

            let spki = key.public_key_der().unwrap();
            assert!(verify_signature(scheme, &spki, b"payload", &signed.signature).unwrap());
        }
    }

    #[test]
    fn test_sign_missing_file() {
        let service = SignatureService::default();
        let key = service.generate_key_pair(SignatureAlgorithm::Ec, 256).unwrap();
        let scheme = service.resolve_scheme("EC").unwrap();

        let err = service
            .sign_file(&key, scheme, Path::new("/no/such/input"))
            .unwrap_err();
        assert!(matches!(err, Error::Io { ref path, .. } if path == Path::new("/no/such/input")));
    }

    #[test]
    fn test_generate_signature_without_private_key() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("input.txt");
        fs::write(&source, b"hello world").unwrap();

        let paths = ArtifactPaths::new(dir.path().join("out.sig"), dir.path().join("out.pub"));
        let request = SignRequest::new(&source, "EC", paths);

        let report = SignatureService::default().generate_signature(&request).unwrap();
        assert_eq!(report.scheme, "SHA256withECDSA");
        assert_eq!(report.bytes_signed, 11);
        assert_eq!(report.fingerprint.len(), 64);

        assert!(dir.path().join("out.sig").exists());
        assert!(dir.path().join("out.pub").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_unsupported_algorithm_creates_nothing() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("input.txt");
        fs::write(&source, b"hello world").unwrap();

        let paths = ArtifactPaths::new(dir.path().join("out.sig"), dir.path().join("out.pub"))
            .with_private_key(dir.path().join("out.key"));
        let request = SignRequest::new(&source, "ECDH", paths);

        let err = SignatureService::default().generate_signature(&request).unwrap_err();
        assert_eq!(err.kind(), "unsupported_algorithm");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn logs_of(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_sha1_signing_warns() {
        let service = SignatureService::new(SignerConfig::legacy()).unwrap();
        let key = KeyPair::generate(SignatureAlgorithm::Dsa, 1024).unwrap();
        let legacy = service.resolve_scheme("DSA").unwrap();
        let modern = CombinedScheme::new(DigestAlgorithm::Sha256, SignatureAlgorithm::Dsa);

        let logs = logs_of(|| {
            service.sign(&key, legacy, Cursor::new(b"payload")).unwrap();
        });
        assert!(logs.contains("SHA1withDSA uses SHA-1"));

        let logs = logs_of(|| {
            service.sign(&key, modern, Cursor::new(b"payload")).unwrap();
        });
        assert!(logs.is_empty());
    }

    #[test]
    fn test_sign_reader_failure_has_no_path() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "device gone"))
            }
        }

        let service = SignatureService::default();
        let key = service.generate_key_pair(SignatureAlgorithm::Ec, 256).unwrap();
        let scheme = service.resolve_scheme("EC").unwrap();

        let err = service.sign(&key, scheme, Broken).unwrap_err();
        assert!(matches!(err, Error::Read(_)));
        assert_eq!(err.to_string(), "IO error while reading input: device gone");
    }

    #[test]
    fn test_shared_output_path_rejected() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("input.txt");
        fs::write(&source, b"hello world").unwrap();
        let out = dir.path().join("out");

        let paths = ArtifactPaths::new(&out, dir.path().join(".").join("out"));
        let request = SignRequest::new(&source, "EC", paths);

        let err = SignatureService::default().generate_signature(&request).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
        assert!(!out.exists());
    }

    #[test]
    fn test_output_over_source_rejected() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("input.txt");
        fs::write(&source, b"hello world").unwrap();

        let paths = ArtifactPaths::new(&source, dir.path().join("out.pub"));
        let request = SignRequest::new(&source, "EC", paths);

        let err = SignatureService::default().generate_signature(&request).unwrap_err();
        assert_eq!(err.kind(), "invalid_configuration");
        assert_eq!(fs::read(&source).unwrap(), b"hello world");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_source_creates_nothing() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path().join("out.sig"), dir.path().join("out.pub"));
        let request = SignRequest::new(dir.path().join("absent.txt"), "EC", paths);

        let err = SignatureService::default().generate_signature(&request).unwrap_err();
        assert_eq!(err.kind(), "io");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
