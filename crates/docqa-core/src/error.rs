use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Input rejected locally, before any request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a search query")]
    EmptyQuery,

    #[error("Please enter a question")]
    EmptyQuestion,

    #[error("Please choose a file to upload")]
    MissingFile,

    #[error("File is {size} bytes; uploads are limited to {} MB", mib(.limit))]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Unsupported file type '.{extension}'")]
    UnsupportedFileType { extension: String },

    #[error("No document is selected")]
    NoActiveDocument,
}

fn mib(bytes: &u64) -> u64 {
    bytes / (1024 * 1024)
}

/// The single error shape every transport failure is coerced into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message} (status {status_code})")]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Error fields a backend may put in a failure body. Both are optional.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ApiError {
    pub const DEFAULT_STATUS: u16 = 500;
    pub const UNKNOWN: &'static str = "Unknown error";

    /// A failure with no HTTP response at all (DNS, refused connection, timeout).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            error: Self::UNKNOWN.to_string(),
            message: message.into(),
            status_code: Self::DEFAULT_STATUS,
        }
    }

    /// Normalize a failed HTTP exchange.
    ///
    /// Structured `error`/`message` fields in `body` win verbatim; anything missing
    /// falls back to `fallback_message` and the generic error kind.
    pub fn from_response(status: Option<u16>, body: &[u8], fallback_message: impl Into<String>) -> Self {
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
        Self {
            error: parsed.error.unwrap_or_else(|| Self::UNKNOWN.to_string()),
            message: parsed.message.unwrap_or_else(|| fallback_message.into()),
            status_code: status.unwrap_or(Self::DEFAULT_STATUS),
        }
    }
}
