//! Google Cloud provider
//!
//! [`GcpApi`] is the set of platform operations the procedures depend on.
//! [`GcpProvider`] implements it with the gcloud CLI plus the billing
//! budgets REST API.

use crate::budget::BudgetDefinition;
use crate::budgets::BudgetsClient;
use crate::error::Result;
use crate::gcloud::Gcloud;
use crate::service::RunService;
use async_trait::async_trait;
use cloudops_cloud::{CommandRunner, Outcome, ProcessRunner};
use std::path::Path;

/// Platform operations used by the deploy and budget procedures
#[async_trait]
pub trait GcpApi: Send + Sync {
    /// Create the docker repository unless it already exists
    async fn ensure_repository(
        &self,
        project: &str,
        region: &str,
        repository: &str,
    ) -> Result<Outcome>;

    /// Build `source` into `image` and push it
    async fn build_image(&self, project: &str, source: &Path, image: &str) -> Result<()>;

    /// Create or update the service
    async fn deploy_service(&self, project: &str, service: &RunService) -> Result<()>;

    async fn service_url(
        &self,
        project: &str,
        region: &str,
        service: &str,
    ) -> Result<Option<String>>;

    /// Billing account id bound to the project, `None` when billing is off
    async fn billing_account(&self, project: &str) -> Result<Option<String>>;

    /// Create the topic unless it already exists
    async fn ensure_topic(&self, project: &str, topic: &str) -> Result<Outcome>;

    /// Existing enabled email channel for `email`
    async fn find_email_channel(&self, project: &str, email: &str) -> Result<Option<String>>;

    /// Create an email channel; returns its resource name
    async fn create_email_channel(
        &self,
        project: &str,
        display_name: &str,
        email: &str,
    ) -> Result<String>;

    /// Submit a budget under the billing account; returns the budget name
    async fn create_budget(
        &self,
        project: &str,
        billing_account: &str,
        budget: &BudgetDefinition,
    ) -> Result<String>;
}

/// gcloud + REST backed [`GcpApi`]
pub struct GcpProvider<R = ProcessRunner> {
    gcloud: Gcloud<R>,
    budgets: BudgetsClient,
}

impl GcpProvider<ProcessRunner> {
    pub fn new() -> Self {
        Self {
            gcloud: Gcloud::new(),
            budgets: BudgetsClient::new(),
        }
    }
}

impl Default for GcpProvider<ProcessRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> GcpProvider<R> {
    pub fn with_parts(gcloud: Gcloud<R>, budgets: BudgetsClient) -> Self {
        Self { gcloud, budgets }
    }

    pub fn gcloud(&self) -> &Gcloud<R> {
        &self.gcloud
    }
}

#[async_trait]
impl<R: CommandRunner> GcpApi for GcpProvider<R> {
    async fn ensure_repository(
        &self,
        project: &str,
        region: &str,
        repository: &str,
    ) -> Result<Outcome> {
        self.gcloud
            .create_repository(project, region, repository)
            .await
    }

    async fn build_image(&self, project: &str, source: &Path, image: &str) -> Result<()> {
        self.gcloud.submit_build(project, source, image).await
    }

    async fn deploy_service(&self, project: &str, service: &RunService) -> Result<()> {
        self.gcloud.deploy(project, service).await
    }

    async fn service_url(
        &self,
        project: &str,
        region: &str,
        service: &str,
    ) -> Result<Option<String>> {
        self.gcloud.service_url(project, region, service).await
    }

    async fn billing_account(&self, project: &str) -> Result<Option<String>> {
        self.gcloud.billing_account(project).await
    }

    async fn ensure_topic(&self, project: &str, topic: &str) -> Result<Outcome> {
        self.gcloud.create_topic(project, topic).await
    }

    async fn find_email_channel(&self, project: &str, email: &str) -> Result<Option<String>> {
        let channels = self.gcloud.list_email_channels(project).await?;
        Ok(channels
            .into_iter()
            .find(|c| c.delivers_to(email))
            .map(|c| c.name))
    }

    async fn create_email_channel(
        &self,
        project: &str,
        display_name: &str,
        email: &str,
    ) -> Result<String> {
        self.gcloud
            .create_email_channel(project, display_name, email)
            .await
    }

    async fn create_budget(
        &self,
        project: &str,
        billing_account: &str,
        budget: &BudgetDefinition,
    ) -> Result<String> {
        let token = self.gcloud.access_token().await?;
        self.budgets
            .create(&token, project, billing_account, budget)
            .await
    }
}
