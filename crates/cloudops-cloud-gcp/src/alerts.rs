//! Budget alert provisioner
//!
//! Wires a budget to a Pub/Sub topic and an email notification channel.
//! The billing account, topic and channel are all resolved before the
//! budget is submitted.

use crate::artifacts::ArtifactDir;
use crate::budget::{BUDGET_TOPIC, BudgetDefinition};
use crate::error::{GcpError, Result};
use crate::gcloud::{
    GCLOUD, billing_account_args, create_email_channel_args, create_topic_args,
    list_email_channels_args,
};
use crate::provider::GcpApi;
use cloudops_cloud::{Action, ActionType, Outcome, Plan, RunReport};
use cloudops_config::{ARTIFACT_DIR, BudgetConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const STEP_BILLING: &str = "billing-account";
pub const STEP_TOPIC: &str = "topic";
pub const STEP_CHANNEL: &str = "notification-channel";
pub const STEP_BUDGET: &str = "budget";

pub const DRAFT_FILE: &str = "budget-draft.json";
pub const FINAL_FILE: &str = "budget.json";

pub const CHANNEL_DISPLAY_NAME: &str = "Budget alerts";

/// Result of a completed provisioning run
#[derive(Debug, Clone)]
pub struct BudgetOutcome {
    pub billing_account: String,
    pub channel: String,
    pub budget_name: String,
    /// Document as submitted
    pub document: BudgetDefinition,
    pub report: RunReport,
}

pub struct BudgetAlertProvisioner<'a, A: GcpApi + ?Sized> {
    api: &'a A,
    artifact_dir: PathBuf,
    reuse_channel: bool,
}

impl<'a, A: GcpApi + ?Sized> BudgetAlertProvisioner<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            artifact_dir: PathBuf::from(ARTIFACT_DIR),
            reuse_channel: true,
        }
    }

    pub fn with_artifact_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.artifact_dir = dir.as_ref().to_path_buf();
        self
    }

    /// When false, a new email channel is created on every run
    pub fn reuse_channel(mut self, reuse: bool) -> Self {
        self.reuse_channel = reuse;
        self
    }

    /// Budget document before the channel is known
    pub fn draft(&self, config: &BudgetConfig) -> BudgetDefinition {
        BudgetDefinition::new(&config.project_id, &config.budget_name, config.amount)
    }

    pub fn plan(&self, config: &BudgetConfig) -> Result<Plan> {
        let project = &config.project_id;
        let email = config.require_email()?;

        let mut plan = Plan::empty();
        plan.push(
            Action::new(
                STEP_BILLING,
                ActionType::Read,
                "billing-account",
                project,
                format!("Resolve billing account of {project}"),
            )
            .with_command(GCLOUD, &billing_account_args(project)),
        );
        plan.push(
            Action::new(
                STEP_TOPIC,
                ActionType::Ensure,
                "pubsub-topic",
                BUDGET_TOPIC,
                format!("Ensure topic {BUDGET_TOPIC}"),
            )
            .with_command(GCLOUD, &create_topic_args(project, BUDGET_TOPIC)),
        );
        if self.reuse_channel {
            plan.push(
                Action::new(
                    STEP_CHANNEL,
                    ActionType::Ensure,
                    "notification-channel",
                    email,
                    format!("Reuse or create email channel for {email}"),
                )
                .with_command(GCLOUD, &list_email_channels_args(project)),
            );
        } else {
            plan.push(
                Action::new(
                    STEP_CHANNEL,
                    ActionType::Create,
                    "notification-channel",
                    email,
                    format!("Create email channel for {email}"),
                )
                .with_command(
                    GCLOUD,
                    &create_email_channel_args(project, CHANNEL_DISPLAY_NAME, email),
                ),
            );
        }
        plan.push(Action::new(
            STEP_BUDGET,
            ActionType::Create,
            "budget",
            &config.budget_name,
            format!(
                "Create budget '{}' of {} USD",
                config.budget_name, config.amount
            ),
        ));
        Ok(plan)
    }

    pub async fn run(&self, config: &BudgetConfig) -> Result<BudgetOutcome> {
        let start = Instant::now();
        let mut report = RunReport::new();
        let project = config.project_id.as_str();
        let email = config.require_email()?;
        let mut artifacts = ArtifactDir::new(&self.artifact_dir);

        // 1. Billing account; nothing else is attempted without one
        let billing_account = self
            .api
            .billing_account(project)
            .await?
            .ok_or_else(|| GcpError::BillingNotEnabled(project.to_string()))?;
        tracing::info!("Billing account: {}", billing_account);
        report.record(STEP_BILLING, Outcome::Resolved, &billing_account);

        // 2. Draft document, channel list still empty
        artifacts.write_json(DRAFT_FILE, &self.draft(config)).await?;

        // 3. Topic
        let topic_outcome = self.api.ensure_topic(project, BUDGET_TOPIC).await?;
        if topic_outcome == Outcome::AlreadyExists {
            tracing::info!("Topic {} already exists, continuing", BUDGET_TOPIC);
        }
        report.record(STEP_TOPIC, topic_outcome, BUDGET_TOPIC);

        // 4. Notification channel
        let existing = if self.reuse_channel {
            self.api.find_email_channel(project, email).await?
        } else {
            None
        };
        let (channel, channel_outcome) = match existing {
            Some(channel) => {
                tracing::info!("Reusing notification channel {}", channel);
                (channel, Outcome::Reused)
            }
            None => {
                let channel = self
                    .api
                    .create_email_channel(project, CHANNEL_DISPLAY_NAME, email)
                    .await?;
                tracing::info!("Created notification channel {}", channel);
                (channel, Outcome::Created)
            }
        };
        report.record(STEP_CHANNEL, channel_outcome, &channel);

        // 5. Splice the channel into the stored draft
        let mut document: BudgetDefinition = artifacts.read_json(DRAFT_FILE).await?;
        document.splice_channel(&channel);
        artifacts.write_json(FINAL_FILE, &document).await?;

        // 6. Submit
        let budget_name = self
            .api
            .create_budget(project, &billing_account, &document)
            .await?;
        tracing::info!("Created budget {}", budget_name);
        report.record(STEP_BUDGET, Outcome::Created, &budget_name);

        // 7. Success only; failed runs keep their documents
        artifacts.cleanup().await?;

        report.finish(start.elapsed());
        Ok(BudgetOutcome {
            billing_account,
            channel,
            budget_name,
            document,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use cloudops_config::ConfigError;
    use tempfile::{TempDir, tempdir};

    fn config(amount: u64) -> BudgetConfig {
        BudgetConfig {
            project_id: "my-proj".to_string(),
            budget_name: "MCP Server Budget".to_string(),
            amount,
            notification_email: Some("ops@example.com".to_string()),
        }
    }

    fn provisioner(api: &FakeApi) -> (BudgetAlertProvisioner<'_, FakeApi>, TempDir) {
        let temp_dir = tempdir().unwrap();
        let provisioner =
            BudgetAlertProvisioner::new(api).with_artifact_dir(temp_dir.path().join(".cloudops"));
        (provisioner, temp_dir)
    }

    #[tokio::test]
    async fn test_spliced_channel_matches_created_channel() {
        let api = FakeApi {
            created_channel: "projects/my-proj/notificationChannels/8675309".to_string(),
            ..FakeApi::new()
        };
        let (provisioner, _temp) = provisioner(&api);

        let outcome = provisioner.run(&config(10)).await.unwrap();

        let submitted = api.submitted();
        assert_eq!(submitted.len(), 1);
        let (account, document) = &submitted[0];
        assert_eq!(account, "0123AB-4567CD-89EF01");
        assert_eq!(
            document.notifications_rule.monitoring_notification_channels,
            vec!["projects/my-proj/notificationChannels/8675309".to_string()]
        );
        assert_eq!(outcome.channel, "projects/my-proj/notificationChannels/8675309");
        assert_eq!(
            outcome.report.outcome(STEP_CHANNEL),
            Some(Outcome::Created)
        );
    }

    #[tokio::test]
    async fn test_step_order() {
        let api = FakeApi::new();
        let (provisioner, _temp) = provisioner(&api);
        provisioner.run(&config(10)).await.unwrap();

        assert_eq!(
            api.calls(),
            vec![
                "billing_account",
                "ensure_topic",
                "find_email_channel",
                "create_email_channel",
                "create_budget"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_billing_account_stops_early() {
        let api = FakeApi {
            billing_account: None,
            ..FakeApi::new()
        };
        let (provisioner, _temp) = provisioner(&api);

        let err = provisioner.run(&config(10)).await.unwrap_err();
        assert!(matches!(err, GcpError::BillingNotEnabled(_)));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(api.calls(), vec!["billing_account"]);
        assert!(api.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_missing_email_makes_no_calls() {
        let api = FakeApi::new();
        let (provisioner, _temp) = provisioner(&api);
        let mut config = config(10);
        config.notification_email = None;

        let err = provisioner.run(&config).await.unwrap_err();
        assert!(matches!(err, GcpError::Config(ConfigError::MissingEmail)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_thresholds_fixed_for_any_amount() {
        for amount in [1, 10, 250, 99_999] {
            let api = FakeApi::new();
            let (provisioner, _temp) = provisioner(&api);
            provisioner.run(&config(amount)).await.unwrap();

            let (_, document) = &api.submitted()[0];
            assert_eq!(document.thresholds(), vec![0.5, 0.8, 1.0]);
            assert_eq!(
                document.amount.specified_amount.units,
                amount.to_string()
            );
        }
    }

    #[tokio::test]
    async fn test_existing_topic_and_channel_reused() {
        let api = FakeApi {
            topic_exists: true,
            existing_channel: Some("projects/my-proj/notificationChannels/1".to_string()),
            ..FakeApi::new()
        };
        let (provisioner, _temp) = provisioner(&api);

        let outcome = provisioner.run(&config(10)).await.unwrap();
        assert_eq!(
            outcome.report.outcome(STEP_TOPIC),
            Some(Outcome::AlreadyExists)
        );
        assert_eq!(outcome.report.outcome(STEP_CHANNEL), Some(Outcome::Reused));
        assert!(!api.calls().contains(&"create_email_channel".to_string()));
        assert_eq!(outcome.channel, "projects/my-proj/notificationChannels/1");
    }

    #[tokio::test]
    async fn test_always_create_channel() {
        let api = FakeApi {
            existing_channel: Some("projects/my-proj/notificationChannels/1".to_string()),
            ..FakeApi::new()
        };
        let (provisioner, _temp) = provisioner(&api);
        let outcome = provisioner
            .reuse_channel(false)
            .run(&config(10))
            .await
            .unwrap();

        assert!(!api.calls().contains(&"find_email_channel".to_string()));
        assert_eq!(outcome.channel, api.created_channel);
    }

    #[tokio::test]
    async fn test_artifacts_removed_on_success() {
        let api = FakeApi::new();
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join(".cloudops");

        BudgetAlertProvisioner::new(&api)
            .with_artifact_dir(&dir)
            .run(&config(10))
            .await
            .unwrap();

        assert!(!dir.join(DRAFT_FILE).exists());
        assert!(!dir.join(FINAL_FILE).exists());
    }

    #[tokio::test]
    async fn test_artifacts_kept_on_failure() {
        let api = FakeApi {
            fail: Some(("create_budget", 1)),
            ..FakeApi::new()
        };
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join(".cloudops");

        BudgetAlertProvisioner::new(&api)
            .with_artifact_dir(&dir)
            .run(&config(10))
            .await
            .unwrap_err();

        assert!(dir.join(DRAFT_FILE).exists());
        let saved: BudgetDefinition =
            serde_json::from_str(&std::fs::read_to_string(dir.join(FINAL_FILE)).unwrap()).unwrap();
        assert_eq!(saved.channels(), [api.created_channel.clone()]);
    }

    #[test]
    fn test_plan_requires_email() {
        let api = FakeApi::new();
        let provisioner = BudgetAlertProvisioner::new(&api);
        let mut config = config(10);

        let plan = provisioner.plan(&config).unwrap();
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.actions[0].action_type, ActionType::Read);

        config.notification_email = None;
        assert!(provisioner.plan(&config).is_err());
    }
}
