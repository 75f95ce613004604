//! Google Cloud provider error types

use cloudops_cloud::CloudError;
use cloudops_config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcpError {
    #[error("gcloud not found. Please install the Google Cloud SDK: https://cloud.google.com/sdk/docs/install")]
    GcloudNotFound,

    #[error("gcloud command failed: {stderr}")]
    CommandFailed { code: Option<i32>, stderr: String },

    #[error(
        "No billing account is linked to project {0}.\n\
        Enable billing at https://console.cloud.google.com/billing and re-run."
    )]
    BillingNotEnabled(String),

    #[error("Unexpected gcloud output: {0}")]
    UnexpectedOutput(String),

    #[error("Billing budgets API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Artifact error at {path}: {message}")]
    Artifact { path: String, message: String },

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GcpError {
    /// Process exit code for this error
    ///
    /// A failed gcloud invocation hands its own exit code through; every
    /// other fatal condition exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            GcpError::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

impl From<CloudError> for GcpError {
    fn from(err: CloudError) -> Self {
        match err {
            CloudError::ProgramNotFound(_) => GcpError::GcloudNotFound,
            CloudError::CommandFailed { code, stderr, .. } => {
                GcpError::CommandFailed { code, stderr }
            }
            CloudError::Io(e) => GcpError::IoError(e),
            CloudError::Json(e) => GcpError::JsonError(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, GcpError>;
