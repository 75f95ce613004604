//! Cloud abstraction error types

use thiserror::Error;

/// Errors raised while invoking external tools
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{0} not found on PATH")]
    ProgramNotFound(String),

    #[error("{program} exited with {}: {stderr}", code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Exit code of the failed command, if it exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CloudError::CommandFailed { code, .. } => *code,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let err = CloudError::CommandFailed {
            program: "gcloud".to_string(),
            code: Some(2),
            stderr: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "gcloud exited with 2: boom");
        assert_eq!(err.exit_code(), Some(2));

        let killed = CloudError::CommandFailed {
            program: "gcloud".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(killed.to_string().contains("signal"));
        assert_eq!(killed.exit_code(), None);
    }
}
