use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// A required argument was empty. Programmer error, never retried.
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("Invalid service URL '{0}'")]
    InvalidBaseUrl(String),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
