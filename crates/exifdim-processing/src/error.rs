//! Rewrite error type

use crate::metadata::ExifError;
use crate::validator::ValidationError;

/// Failure of a single rewrite
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The request itself is unusable (maps to 400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transcoding, metadata serialization or splicing failed (maps to 500)
    #[error("{0}")]
    Encoding(String),

    #[error("rewrite task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<ExifError> for RewriteError {
    fn from(err: ExifError) -> Self {
        RewriteError::Encoding(err.to_string())
    }
}
