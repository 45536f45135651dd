use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use keysign_crypto::{DigestAlgorithm, KeyEncoding, SignatureAlgorithm};
use keysign_service::{ArtifactPaths, SignRequest, SignatureService, SignerConfig};

use crate::error::CliResult;

#[derive(Args, Debug)]
pub struct SignArgs {
    /// File to sign
    #[arg(short, long)]
    pub file: PathBuf,

    /// Signature algorithm (DSA, RSA or EC)
    #[arg(short, long, default_value = "RSA")]
    pub algorithm: String,

    /// Key size in bits, overrides the configured size for the algorithm
    #[arg(short, long)]
    pub key_size: Option<usize>,

    /// Digest (sha1, sha256, sha384, sha512), overrides the configured one
    #[arg(short, long)]
    pub digest: Option<String>,

    /// Signature output [default: <FILE>.sig]
    #[arg(short, long)]
    pub signature: Option<PathBuf>,

    /// Public key output [default: <FILE>.pub]
    #[arg(short, long)]
    pub public_key: Option<PathBuf>,

    /// Private key output; the private key is not exported unless given
    #[arg(long)]
    pub private_key: Option<PathBuf>,

    /// Key file encoding (der or pem)
    #[arg(long)]
    pub format: Option<String>,

    /// Read size in bytes
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Write artifacts directly instead of staging and renaming
    #[arg(long)]
    pub no_atomic: bool,
}

impl SignArgs {
    /// Fold command-line overrides into the loaded configuration
    fn apply_overrides(&self, mut config: SignerConfig) -> CliResult<SignerConfig> {
        if self.key_size.is_some() || self.digest.is_some() {
            let algorithm: SignatureAlgorithm = self.algorithm.parse()?;
            let settings = config.settings_mut(algorithm);
            if let Some(key_size) = self.key_size {
                settings.key_size = key_size;
            }
            if let Some(digest) = &self.digest {
                settings.digest = digest.parse::<DigestAlgorithm>()?;
            }
        }
        if let Some(format) = &self.format {
            config.key_encoding = format.parse::<KeyEncoding>()?;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if self.no_atomic {
            config.atomic_writes = false;
        }
        Ok(config)
    }

    fn artifact_paths(&self) -> ArtifactPaths {
        let defaults = ArtifactPaths::beside(&self.file);
        let paths = ArtifactPaths::new(
            self.signature.clone().unwrap_or(defaults.signature),
            self.public_key.clone().unwrap_or(defaults.public_key),
        );
        match &self.private_key {
            Some(path) => paths.with_private_key(path),
            None => paths,
        }
    }
}

pub fn handle(args: SignArgs, config: SignerConfig) -> CliResult<()> {
    let config = args.apply_overrides(config)?;
    let paths = args.artifact_paths();

    let service = SignatureService::new(config)?;
    let scheme = service.resolve_scheme(&args.algorithm)?;
    println!(
        "{}",
        format!("Signing {} with {}", args.file.display(), scheme).cyan()
    );

    let request = SignRequest::new(&args.file, &args.algorithm, paths);
    let report = service.generate_signature(&request)?;

    println!("{} Signature saved to: {}", "✓".green(), report.paths.signature.display());
    println!("{} Public key saved to: {}", "✓".green(), report.paths.public_key.display());
    if let Some(private_key) = &report.paths.private_key {
        println!(
            "{} Private key saved to: {} {}",
            "✓".green(),
            private_key.display(),
            "(unencrypted)".yellow()
        );
    }

    println!();
    println!("{}", "Signature details:".cyan());
    println!("  Scheme: {}", report.scheme);
    println!("  Key size: {} bits", report.key_size);
    println!("  Bytes signed: {}", report.bytes_signed);
    println!("  Signature length: {} bytes", report.signature_len);
    println!("  Public key fingerprint: {}", &report.fingerprint[..16]);

    Ok(())
}
