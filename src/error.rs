use std::path::PathBuf;

/// Everything that can go wrong for a single requested rate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{field} must be a 3-letter uppercase code (got '{value}')")]
    InvalidCurrency { field: &'static str, value: String },
    #[error("{field} must be in YYYY-MM-DD format (got '{value}')")]
    InvalidDate { field: &'static str, value: String },
    #[error("{0}")]
    InvalidRange(String),
    #[error("request to {url} failed: {reason}")]
    NetworkError { url: String, reason: String },
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },
    #[error("invalid response from service: {0}")]
    MalformedResponse(String),
    #[error("{0}")]
    ServiceError(String),
    #[error("could not write {}: {source}", .path.display())]
    FileWriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Name of the failure kind, as written to the error log.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidCurrency { .. } => "InvalidCurrency",
            Error::InvalidDate { .. } => "InvalidDate",
            Error::InvalidRange(_) => "InvalidRange",
            Error::NetworkError { .. } => "NetworkError",
            Error::HttpError { .. } => "HttpError",
            Error::MalformedResponse(_) => "MalformedResponse",
            Error::ServiceError(_) => "ServiceError",
            Error::FileWriteError { .. } => "FileWriteError",
        }
    }
}
