#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashError>;

#[derive(Debug, Error)]
pub enum DashError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("problem not found: {id}")]
    UnknownProblem { id: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("invalid configuration: {}", .problems.join("; "))]
    InvalidConfig { problems: Vec<String> },
}

impl DashError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } | Self::UnknownProblem { .. } => 2,
            Self::InvalidConfig { .. } | Self::Toml(_) => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DashError;

    #[test]
    fn invalid_constructor_formats_message() {
        let error = DashError::invalid("tier must be T1-T4");
        assert_eq!(error.to_string(), "invalid argument: tier must be T1-T4");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn config_errors_join_every_problem() {
        let error = DashError::InvalidConfig {
            problems: vec!["a".into(), "b".into()],
        };
        assert_eq!(error.to_string(), "invalid configuration: a; b");
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn io_errors_use_generic_exit_code() {
        let error = DashError::from(std::io::Error::other("disk"));
        assert_eq!(error.exit_code(), 1);
    }
}
