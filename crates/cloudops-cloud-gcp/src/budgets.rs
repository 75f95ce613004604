//! Cloud Billing Budget API client

use crate::budget::BudgetDefinition;
use crate::error::{GcpError, Result};
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://billingbudgets.googleapis.com/v1";

/// Minimal REST client for `billingAccounts.budgets.create`
pub struct BudgetsClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct CreatedBudget {
    name: String,
}

impl BudgetsClient {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn create_url(&self, billing_account: &str) -> String {
        format!("{}/billingAccounts/{}/budgets", self.endpoint, billing_account)
    }

    /// Submit a budget; returns the created resource name
    ///
    /// `quota_project` is sent as `x-goog-user-project`, required when the
    /// token belongs to user credentials.
    pub async fn create(
        &self,
        access_token: &str,
        quota_project: &str,
        billing_account: &str,
        budget: &BudgetDefinition,
    ) -> Result<String> {
        let url = self.create_url(billing_account);
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .header("x-goog-user-project", quota_project)
            .json(budget)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GcpError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedBudget = response.json().await?;
        Ok(created.name)
    }
}

impl Default for BudgetsClient {
    fn default() -> Self {
        Self::new()
    }
}
