use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Service(#[from] keysign_service::Error),

    #[error(transparent)]
    Crypto(#[from] keysign_crypto::Error),
}

pub type CliResult<T> = Result<T, CliError>;
