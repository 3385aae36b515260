use reqwest::StatusCode;
use thiserror::Error;

/// Failure reported by an authentication collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status} {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Requesting a CSRF token failed")]
    CsrfAcquisitionFailed,
    #[error("session initialization already in progress")]
    InitializationInProgress,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}
