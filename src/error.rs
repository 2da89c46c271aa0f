use thiserror::Error;

use crate::git::CommandError;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for semver-git-resource operations
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{message}")]
    Sync {
        message: String,
        #[source]
        cause: Option<BoxedCause>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        #[source]
        cause: Option<BoxedCause>,
    },

    #[error("push to branch '{branch}' was rejected {attempts} time(s)")]
    Conflict {
        branch: String,
        attempts: u32,
        #[source]
        cause: Option<CommandError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in semver-git-resource
pub type Result<T> = std::result::Result<T, ResourceError>;

impl ResourceError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ResourceError::Config(msg.into())
    }

    /// Create a sync error carrying the failed command
    pub fn sync(msg: impl Into<String>, cause: CommandError) -> Self {
        ResourceError::Sync {
            message: msg.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Create a validation error, optionally keeping the parser's error
    pub fn validation<E>(msg: impl Into<String>, cause: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ResourceError::Validation {
            message: msg.into(),
            cause: cause.map(|e| Box::new(e) as BoxedCause),
        }
    }

    /// True when a push kept being rejected by the remote
    pub fn is_conflict(&self) -> bool {
        matches!(self, ResourceError::Conflict { .. })
    }

    /// Prefix the message with `label`, keeping the original cause.
    ///
    /// Config, Sync and Validation keep their variant. Everything else is
    /// reported as a `Sync` failure wrapping the original error.
    pub fn context(self, label: &str) -> Self {
        match self {
            ResourceError::Config(msg) => ResourceError::Config(format!("{}: {}", label, msg)),
            ResourceError::Sync { message, cause } => ResourceError::Sync {
                message: format!("{}: {}", label, message),
                cause,
            },
            ResourceError::Validation { message, cause } => ResourceError::Validation {
                message: format!("{}: {}", label, message),
                cause,
            },
            other => ResourceError::Sync {
                message: format!("{}: {}", label, other),
                cause: Some(Box::new(other)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResourceError::config("missing git credentials");
        assert_eq!(
            err.to_string(),
            "configuration error: missing git credentials"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ResourceError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_context_keeps_variant_and_cause() {
        let cause = CommandError::new("git fetch origin version", "exit status 128", "fatal");
        let err = ResourceError::sync("git fetch of branch 'version' failed", cause)
            .context("error syncing version branch");

        assert_eq!(
            err.to_string(),
            "error syncing version branch: git fetch of branch 'version' failed"
        );
        assert!(matches!(err, ResourceError::Sync { cause: Some(_), .. }));
    }

    #[test]
    fn test_context_on_validation() {
        let err = ResourceError::validation::<std::io::Error>("invalid version: x", None)
            .context("error checking version");
        assert!(matches!(err, ResourceError::Validation { .. }));
        assert_eq!(err.to_string(), "error checking version: invalid version: x");
    }

    #[test]
    fn test_context_turns_conflict_into_sync() {
        let err = ResourceError::Conflict {
            branch: "version".to_string(),
            attempts: 3,
            cause: None,
        };
        assert!(err.is_conflict());

        let wrapped = err.context("error publishing bump");
        assert!(!wrapped.is_conflict());
        assert_eq!(
            wrapped.to_string(),
            "error publishing bump: push to branch 'version' was rejected 3 time(s)"
        );
        assert!(std::error::Error::source(&wrapped).is_some());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (ResourceError::config("x"), "configuration error"),
            (
                ResourceError::validation::<std::io::Error>("invalid version: x", None),
                "invalid version",
            ),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
