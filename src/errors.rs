use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the card sheet library.
///
/// Unknown item kinds and content overflow are deliberately absent: both are
/// soft-fail paths that never reach the caller as errors.
#[derive(Debug, Error)]
pub enum CardError {
    #[error("invalid routine definition: {0}")]
    InvalidInput(#[from] serde_json::Error),
    #[error("routine name must not be empty")]
    EmptyName,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("unknown layout '{0}' (expected quarter, half, full or auto)")]
    UnknownLayout(String),
    #[error("PNG output needs a destination path")]
    MissingDestination,
    #[error("failed to encode page image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CardError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CardError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = CardError> = std::result::Result<T, E>;
