//! Media production error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entities::{CacheKey, VariantKind};

/// Reasons a media view ends up showing a placeholder.
///
/// These are logged for diagnostics and never surface to the container,
/// which only observes whether media is displayed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MediaError {
    #[error("attachment has unexpected type: {detail}")]
    UnexpectedType { detail: String },

    #[error("attachment missing unique id")]
    MissingIdentity,

    #[error("ignoring invalid {kind} attachment {key}")]
    InvalidMedia { key: CacheKey, kind: VariantKind },

    #[error("attachment {key} missing original file path")]
    MissingFilePath { key: CacheKey },

    #[error("could not decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("failed to produce media for {key}")]
    ProductionFailed { key: CacheKey },
}

impl MediaError {
    /// Creates unexpected type error.
    #[must_use]
    pub fn unexpected_type(detail: impl Into<String>) -> Self {
        Self::UnexpectedType {
            detail: detail.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns whether the error happened while classifying the attachment.
    #[must_use]
    pub const fn is_classification(&self) -> bool {
        matches!(self, Self::UnexpectedType { .. } | Self::MissingIdentity)
    }

    /// Returns whether the error stops all further production attempts when
    /// raised by a synchronous production. Asynchronous failures are retried.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidMedia { .. }
                | Self::MissingFilePath { .. }
                | Self::Decode { .. }
                | Self::ProductionFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = MediaError::InvalidMedia {
            key: CacheKey::new("abc"),
            kind: VariantKind::Video,
        };
        assert_eq!(err.to_string(), "ignoring invalid video attachment abc");

        let err = MediaError::decode("/tmp/x.gif", "bad header");
        assert_eq!(err.to_string(), "could not decode /tmp/x.gif: bad header");
    }

    #[test]
    fn test_classification_is_not_permanent() {
        assert!(MediaError::MissingIdentity.is_classification());
        assert!(!MediaError::MissingIdentity.is_permanent());
        assert!(
            MediaError::ProductionFailed {
                key: CacheKey::new("k")
            }
            .is_permanent()
        );
    }
}
