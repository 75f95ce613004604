pub mod error;

pub use error::*;

use serde::Serialize;

pub const ENV_PROJECT_ID: &str = "PROJECT_ID";
pub const ENV_REGION: &str = "REGION";
pub const ENV_SERVICE_NAME: &str = "SERVICE_NAME";
pub const ENV_REGISTRY_NAME: &str = "REGISTRY_NAME";
pub const ENV_BUDGET_NAME: &str = "BUDGET_NAME";
pub const ENV_BUDGET_AMOUNT: &str = "BUDGET_AMOUNT";
pub const ENV_NOTIFICATION_EMAIL: &str = "NOTIFICATION_EMAIL";

pub const DEFAULT_REGION: &str = "us-central1";
pub const DEFAULT_SERVICE_NAME: &str = "mcp-server";
pub const DEFAULT_REGISTRY_NAME: &str = "mcp-servers";
pub const DEFAULT_BUDGET_NAME: &str = "MCP Server Budget";
pub const DEFAULT_BUDGET_AMOUNT: u64 = 10;

/// Largest accepted budget amount
///
/// `Money.units` is an int64, and threshold dollar figures multiply the
/// amount by up to 100.
pub const MAX_BUDGET_AMOUNT: u64 = i64::MAX as u64 / 100;

/// Directory (relative to the working directory) for intermediate documents
pub const ARTIFACT_DIR: &str = ".cloudops";

/// Read a variable through `lookup`, treating empty values as unset
fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Settings for `cloudops deploy`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployConfig {
    pub project_id: String,
    pub region: String,
    pub service_name: String,
    pub registry_name: String,
}

impl DeployConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Load through an arbitrary variable lookup
    ///
    /// Everything but the project id falls back to a default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_id = non_empty(&lookup, ENV_PROJECT_ID).ok_or(ConfigError::MissingProject)?;

        Ok(Self {
            project_id,
            region: non_empty(&lookup, ENV_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            service_name: non_empty(&lookup, ENV_SERVICE_NAME)
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            registry_name: non_empty(&lookup, ENV_REGISTRY_NAME)
                .unwrap_or_else(|| DEFAULT_REGISTRY_NAME.to_string()),
        })
    }
}

/// Settings for `cloudops budget`
///
/// The notification email may be absent here; the CLI prompts for it and
/// calls [`BudgetConfig::require_email`] before any external call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetConfig {
    pub project_id: String,
    pub budget_name: String,
    /// Whole currency units (USD)
    pub amount: u64,
    pub notification_email: Option<String>,
}

impl BudgetConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_id = non_empty(&lookup, ENV_PROJECT_ID).ok_or(ConfigError::MissingProject)?;

        let amount = match non_empty(&lookup, ENV_BUDGET_AMOUNT) {
            Some(raw) => parse_amount(&raw)?,
            None => DEFAULT_BUDGET_AMOUNT,
        };

        let notification_email = non_empty(&lookup, ENV_NOTIFICATION_EMAIL)
            .map(|email| validate_email(&email).map(|_| email))
            .transpose()?;

        Ok(Self {
            project_id,
            budget_name: non_empty(&lookup, ENV_BUDGET_NAME)
                .unwrap_or_else(|| DEFAULT_BUDGET_NAME.to_string()),
            amount,
            notification_email,
        })
    }

    /// Fill in the email from an interactive answer
    pub fn with_email(mut self, email: impl Into<String>) -> Result<Self> {
        let email = email.into().trim().to_string();
        if email.is_empty() {
            return Err(ConfigError::MissingEmail);
        }
        validate_email(&email)?;
        self.notification_email = Some(email);
        Ok(self)
    }

    pub fn require_email(&self) -> Result<&str> {
        self.notification_email
            .as_deref()
            .ok_or(ConfigError::MissingEmail)
    }
}

fn parse_amount(raw: &str) -> Result<u64> {
    match raw.parse::<u64>() {
        Ok(amount) if amount > 0 && amount <= MAX_BUDGET_AMOUNT => Ok(amount),
        _ => Err(ConfigError::InvalidAmount(raw.to_string())),
    }
}

/// Minimal shape check: one `@` with a non-empty local part and a dotted domain
pub fn validate_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEmail(email.to_string()))
    }
}
