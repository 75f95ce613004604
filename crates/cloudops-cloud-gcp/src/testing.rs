//! Test doubles for the command runner and the platform API

use crate::budget::BudgetDefinition;
use crate::error::{GcpError, Result};
use crate::provider::GcpApi;
use crate::service::RunService;
use async_trait::async_trait;
use cloudops_cloud::{CommandOutput, CommandRunner, Outcome};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

/// Replays queued outputs in order and records every invocation
#[derive(Default)]
pub struct ScriptedRunner {
    outputs: Mutex<VecDeque<CommandOutput>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, output: CommandOutput) {
        self.outputs.lock().unwrap().push_back(output);
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, _program: &str, args: &[String]) -> cloudops_cloud::Result<CommandOutput> {
        self.calls.lock().unwrap().push(args.to_vec());
        Ok(self
            .outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| CommandOutput::ok("")))
    }

    async fn is_installed(&self, _program: &str) -> bool {
        true
    }
}

/// In-memory [`GcpApi`] with switchable behaviour
pub struct FakeApi {
    pub repository_exists: bool,
    pub topic_exists: bool,
    pub billing_account: Option<String>,
    pub existing_channel: Option<String>,
    pub created_channel: String,
    pub service_url: Option<String>,
    /// Operation name that fails with the given exit code
    pub fail: Option<(&'static str, i32)>,
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) budgets: Mutex<Vec<(String, BudgetDefinition)>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            repository_exists: false,
            topic_exists: false,
            billing_account: Some("0123AB-4567CD-89EF01".to_string()),
            existing_channel: None,
            created_channel: "projects/p/notificationChannels/555".to_string(),
            service_url: Some("https://svc-abc-uc.a.run.app".to_string()),
            fail: None,
            calls: Mutex::new(Vec::new()),
            budgets: Mutex::new(Vec::new()),
        }
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<(String, BudgetDefinition)> {
        self.budgets.lock().unwrap().clone()
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(op.to_string());
        match self.fail {
            Some((name, code)) if name == op => Err(GcpError::CommandFailed {
                code: Some(code),
                stderr: format!("{op} failed"),
            }),
            _ => Ok(()),
        }
    }

    fn create_outcome(exists: bool) -> Outcome {
        if exists {
            Outcome::AlreadyExists
        } else {
            Outcome::Created
        }
    }
}

#[async_trait]
impl GcpApi for FakeApi {
    async fn ensure_repository(&self, _: &str, _: &str, _: &str) -> Result<Outcome> {
        self.enter("ensure_repository")?;
        Ok(Self::create_outcome(self.repository_exists))
    }

    async fn build_image(&self, _: &str, _: &Path, _: &str) -> Result<()> {
        self.enter("build_image")
    }

    async fn deploy_service(&self, _: &str, _: &RunService) -> Result<()> {
        self.enter("deploy_service")
    }

    async fn service_url(&self, _: &str, _: &str, _: &str) -> Result<Option<String>> {
        self.enter("service_url")?;
        Ok(self.service_url.clone())
    }

    async fn billing_account(&self, _: &str) -> Result<Option<String>> {
        self.enter("billing_account")?;
        Ok(self.billing_account.clone())
    }

    async fn ensure_topic(&self, _: &str, _: &str) -> Result<Outcome> {
        self.enter("ensure_topic")?;
        Ok(Self::create_outcome(self.topic_exists))
    }

    async fn find_email_channel(&self, _: &str, _: &str) -> Result<Option<String>> {
        self.enter("find_email_channel")?;
        Ok(self.existing_channel.clone())
    }

    async fn create_email_channel(&self, _: &str, _: &str, _: &str) -> Result<String> {
        self.enter("create_email_channel")?;
        Ok(self.created_channel.clone())
    }

    async fn create_budget(
        &self,
        _: &str,
        billing_account: &str,
        budget: &BudgetDefinition,
    ) -> Result<String> {
        self.enter("create_budget")?;
        self.budgets
            .lock()
            .unwrap()
            .push((billing_account.to_string(), budget.clone()));
        Ok(format!("billingAccounts/{billing_account}/budgets/fake"))
    }
}
