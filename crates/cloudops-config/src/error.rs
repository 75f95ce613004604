use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "PROJECT_ID is not set.\n\
        Set it with: export PROJECT_ID=your-project-id\n\
        or pass --project <id>"
    )]
    MissingProject,

    #[error(
        "No notification email provided.\n\
        Set it with: export NOTIFICATION_EMAIL=you@example.com\n\
        or pass --email <address>"
    )]
    MissingEmail,

    #[error("BUDGET_AMOUNT must be a whole number between 1 and 92233720368547758, got '{0}'")]
    InvalidAmount(String),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
