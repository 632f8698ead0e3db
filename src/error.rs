// Control API error type
// Each variant maps to the HTTP status returned to the caller

use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("json decode: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Unsupported interval")]
    UnsupportedInterval(u64),

    #[error("json encode: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to read request body: {0}")]
    Body(String),
}

impl ControlError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Decode(_) | Self::UnsupportedInterval(_) | Self::Body(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
