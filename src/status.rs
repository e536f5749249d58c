use thiserror::Error;

const STATUS_OK: &str = "OK";
const STATUS_AUTH_ERROR: &str = "AUTH_ERROR";

/// An application-level status other than `OK`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("authentication error")]
    Authentication,

    #[error("unexpected status: {0:?}")]
    Unexpected(String),
}

/// Checks the status string returned by the status-bearing calls.
pub fn check_status(value: &str) -> Result<(), StatusError> {
    match value.trim() {
        STATUS_OK => Ok(()),
        STATUS_AUTH_ERROR => Err(StatusError::Authentication),
        other => Err(StatusError::Unexpected(other.to_string())),
    }
}
