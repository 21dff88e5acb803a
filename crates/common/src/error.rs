//! Error types shared across Draftforge crates.

use std::fmt;
use std::path::PathBuf;

/// Top-level error type for Draftforge operations.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// Malformed timeline input (bad clip, empty timeline).
    #[error("Invalid input: {message}")]
    Input { message: String },

    /// Base template could not be read or parsed.
    #[error("Base template unavailable at {path}: {message}")]
    TemplateMissing { path: PathBuf, message: String },

    /// A synthesized document failed structural validation.
    #[error("Draft validation failed: {}", reasons.join("; "))]
    Validation { reasons: Vec<String> },

    /// Writing the serialized draft failed.
    #[error("Failed to write draft to {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using DraftError.
pub type DraftResult<T> = Result<T, DraftError>;

/// Coarse classification reported to callers alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Input,
    TemplateMissing,
    Validation,
    Persist,
    Config,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Input => "input",
            Self::TemplateMissing => "template-missing",
            Self::Validation => "validation",
            Self::Persist => "persist",
            Self::Config => "config",
            Self::Internal => "internal",
        };
        f.write_str(label)
    }
}

impl DraftError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    pub fn template_missing(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::TemplateMissing {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn validation(reasons: Vec<String>) -> Self {
        Self::Validation { reasons }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Classification used for the structured (kind + message) result.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input { .. } => ErrorKind::Input,
            Self::TemplateMissing { .. } => ErrorKind::TemplateMissing,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Persist { .. } => ErrorKind::Persist,
            Self::Config { .. } => ErrorKind::Config,
            Self::Io(_) | Self::Json(_) | Self::Other(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(DraftError::input("empty timeline").kind(), ErrorKind::Input);
        assert_eq!(
            DraftError::template_missing("/tmp/t.json", "not found").kind(),
            ErrorKind::TemplateMissing
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(DraftError::from(io).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_validation_message_lists_reasons() {
        let err = DraftError::validation(vec!["no tracks".into(), "no video track".into()]);
        assert_eq!(
            err.to_string(),
            "Draft validation failed: no tracks; no video track"
        );
    }
}
