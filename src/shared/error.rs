use thiserror::Error;
use serde::Serialize;

#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    /// Guard failure caught before any request is issued (empty editor,
    /// missing translation target, operation already running).
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Missing or unusable API credential. Rendered with a remediation
    /// message instead of the generic failure template.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider answered, but not with the shape we expect.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Any other provider-side failure: transport, auth, quota. The
    /// provider's own message is passed through verbatim.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("I/O Error: {0}")]
    Io(String),

    /// Preference store failure (redb open/read/write).
    #[error("Storage Error: {0}")]
    Storage(String),
}

impl AppError {
    /// The bare message, without the variant prefix `Display` adds. Used
    /// when rendering user-facing text from a caught error.
    pub fn message(&self) -> &str {
        match self {
            AppError::Precondition(msg)
            | AppError::Configuration(msg)
            | AppError::MalformedResponse(msg)
            | AppError::Provider(msg)
            | AppError::Io(msg)
            | AppError::Storage(msg) => msg,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Provider(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(format!("JSON error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
