use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The platform media layer could not fetch or decode a source.
    #[error("Media decode error: {0}")]
    Decode(String),

    /// The platform refused to start playback (autoplay policy, device busy).
    #[error("Playback rejected: {0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
