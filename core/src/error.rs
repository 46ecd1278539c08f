use thiserror::Error;

/// Failures surfaced by the journal's query operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Rejected before any storage access.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

pub type JournalResult<T> = std::result::Result<T, JournalError>;
