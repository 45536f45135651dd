pub mod config;
pub mod error;
pub mod persist;
pub mod service;

// Re-export core functionality
pub use config::{AlgorithmSettings, SignerConfig};
pub use error::{Error, Result};
pub use persist::{persist, ArtifactPaths, Artifacts};
pub use service::{SignRequest, SignatureReport, SignatureService, SignedData};
