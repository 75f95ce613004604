//! gcloud CLI wrapper
//!
//! Wraps the gcloud commands used by the deploy and budget procedures.
//! Argument lists are built by free functions so that dry runs can print
//! exactly what would be executed.

use crate::error::{GcpError, Result};
use crate::service::RunService;
use cloudops_cloud::{CommandRunner, Outcome, ProcessRunner};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const GCLOUD: &str = "gcloud";

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// `gcloud artifacts repositories create`
pub fn create_repository_args(project: &str, region: &str, repository: &str) -> Vec<String> {
    let mut args = owned(&["artifacts", "repositories", "create", repository]);
    args.push("--repository-format=docker".to_string());
    args.push(format!("--location={region}"));
    args.push(format!("--project={project}"));
    args.push("--description=Container images deployed by cloudops".to_string());
    args.push("--quiet".to_string());
    args
}

/// `gcloud builds submit` (builds remotely and pushes the tag)
pub fn build_args(project: &str, source: &Path, image: &str) -> Vec<String> {
    vec![
        "builds".to_string(),
        "submit".to_string(),
        source.display().to_string(),
        format!("--tag={image}"),
        format!("--project={project}"),
        "--quiet".to_string(),
    ]
}

/// `gcloud run deploy` with the service's resource profile
pub fn deploy_args(project: &str, service: &RunService) -> Vec<String> {
    let profile = &service.profile;
    let mut args = owned(&["run", "deploy", service.name.as_str()]);
    args.push(format!("--image={}", service.image));
    args.push("--platform=managed".to_string());
    args.push(format!("--region={}", service.region));
    args.push(format!("--project={project}"));
    args.push(format!("--memory={}", profile.memory));
    args.push(format!("--cpu={}", profile.cpu));
    args.push(format!("--min-instances={}", profile.min_instances));
    args.push(format!("--max-instances={}", profile.max_instances));
    args.push(format!("--concurrency={}", profile.concurrency));
    args.push(format!("--timeout={}", profile.timeout_secs));
    args.push(format!("--port={}", profile.port));
    if profile.cpu_throttling {
        args.push("--cpu-throttling".to_string());
    } else {
        args.push("--no-cpu-throttling".to_string());
    }
    if !profile.env.is_empty() {
        let vars: Vec<String> = profile
            .env
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        args.push(format!("--set-env-vars={}", vars.join(",")));
    }
    args.push("--quiet".to_string());
    args
}

pub fn service_url_args(project: &str, region: &str, service: &str) -> Vec<String> {
    vec![
        "run".to_string(),
        "services".to_string(),
        "describe".to_string(),
        service.to_string(),
        format!("--region={region}"),
        format!("--project={project}"),
        "--format=value(status.url)".to_string(),
    ]
}

pub fn billing_account_args(project: &str) -> Vec<String> {
    vec![
        "billing".to_string(),
        "projects".to_string(),
        "describe".to_string(),
        project.to_string(),
        "--format=value(billingAccountName)".to_string(),
    ]
}

pub fn create_topic_args(project: &str, topic: &str) -> Vec<String> {
    vec![
        "pubsub".to_string(),
        "topics".to_string(),
        "create".to_string(),
        topic.to_string(),
        format!("--project={project}"),
    ]
}

pub fn list_email_channels_args(project: &str) -> Vec<String> {
    vec![
        "beta".to_string(),
        "monitoring".to_string(),
        "channels".to_string(),
        "list".to_string(),
        format!("--project={project}"),
        "--filter=type=\"email\"".to_string(),
        "--format=json".to_string(),
    ]
}

pub fn create_email_channel_args(project: &str, display_name: &str, email: &str) -> Vec<String> {
    vec![
        "beta".to_string(),
        "monitoring".to_string(),
        "channels".to_string(),
        "create".to_string(),
        format!("--display-name={display_name}"),
        "--type=email".to_string(),
        format!("--channel-labels=email_address={email}"),
        format!("--project={project}"),
        "--format=value(name)".to_string(),
    ]
}

pub fn access_token_args() -> Vec<String> {
    owned(&["auth", "print-access-token"])
}

/// Whether a failed create reported that the resource is already there
pub fn is_already_exists(stderr: &str) -> bool {
    stderr.contains("ALREADY_EXISTS") || stderr.to_ascii_lowercase().contains("already exists")
}

/// gcloud CLI wrapper
pub struct Gcloud<R = ProcessRunner> {
    runner: R,
}

impl Gcloud<ProcessRunner> {
    pub fn new() -> Self {
        Self {
            runner: ProcessRunner::new(),
        }
    }
}

impl Default for Gcloud<ProcessRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> Gcloud<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub async fn is_installed(&self) -> bool {
        self.runner.is_installed(GCLOUD).await
    }

    /// Run a gcloud command; any non-zero exit is fatal
    async fn run(&self, args: &[String]) -> Result<String> {
        let output = self.runner.run(GCLOUD, args).await?;
        Ok(output.into_result(GCLOUD)?)
    }

    /// Run a create command where "already exists" counts as success
    async fn run_create(&self, args: &[String]) -> Result<Outcome> {
        let output = self.runner.run(GCLOUD, args).await?;
        if output.success() {
            return Ok(Outcome::Created);
        }
        if is_already_exists(&output.stderr) {
            return Ok(Outcome::AlreadyExists);
        }
        Err(GcpError::CommandFailed {
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        })
    }

    pub async fn create_repository(
        &self,
        project: &str,
        region: &str,
        repository: &str,
    ) -> Result<Outcome> {
        self.run_create(&create_repository_args(project, region, repository))
            .await
    }

    pub async fn submit_build(&self, project: &str, source: &Path, image: &str) -> Result<()> {
        self.run(&build_args(project, source, image)).await?;
        Ok(())
    }

    pub async fn deploy(&self, project: &str, service: &RunService) -> Result<()> {
        self.run(&deploy_args(project, service)).await?;
        Ok(())
    }

    pub async fn service_url(
        &self,
        project: &str,
        region: &str,
        service: &str,
    ) -> Result<Option<String>> {
        let output = self.run(&service_url_args(project, region, service)).await?;
        Ok(non_empty_line(&output))
    }

    /// Billing account id linked to the project, without the
    /// `billingAccounts/` prefix
    pub async fn billing_account(&self, project: &str) -> Result<Option<String>> {
        let output = self.run(&billing_account_args(project)).await?;
        Ok(non_empty_line(&output).map(|name| match name.strip_prefix("billingAccounts/") {
            Some(id) => id.to_string(),
            None => name,
        }))
    }

    pub async fn create_topic(&self, project: &str, topic: &str) -> Result<Outcome> {
        self.run_create(&create_topic_args(project, topic)).await
    }

    pub async fn list_email_channels(&self, project: &str) -> Result<Vec<ChannelInfo>> {
        let output = self.run(&list_email_channels_args(project)).await?;

        if output.trim().is_empty() || output.trim() == "[]" {
            return Ok(Vec::new());
        }

        let channels: Vec<ChannelInfo> = serde_json::from_str(&output)?;
        Ok(channels)
    }

    /// Create an email channel and return its resource name
    pub async fn create_email_channel(
        &self,
        project: &str,
        display_name: &str,
        email: &str,
    ) -> Result<String> {
        let output = self
            .run(&create_email_channel_args(project, display_name, email))
            .await?;
        non_empty_line(&output).ok_or_else(|| {
            GcpError::UnexpectedOutput("channel create returned no channel name".to_string())
        })
    }

    pub async fn access_token(&self) -> Result<String> {
        let output = self.run(&access_token_args()).await?;
        non_empty_line(&output)
            .ok_or_else(|| GcpError::UnexpectedOutput("empty access token".to_string()))
    }
}

fn non_empty_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Notification channel as listed by `gcloud beta monitoring channels list`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub name: String,

    #[serde(rename = "type", default)]
    pub channel_type: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub labels: HashMap<String, String>,

    #[serde(default)]
    pub enabled: Option<bool>,
}

impl ChannelInfo {
    pub fn email_address(&self) -> Option<&str> {
        self.labels.get("email_address").map(String::as_str)
    }

    /// Email channel delivering to `email` (case-insensitive) that is not disabled
    pub fn delivers_to(&self, email: &str) -> bool {
        self.channel_type == "email"
            && self.enabled != Some(false)
            && self
                .email_address()
                .is_some_and(|addr| addr.eq_ignore_ascii_case(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceProfile;
    use crate::testing::ScriptedRunner;
    use cloudops_cloud::CommandOutput;

    #[test]
    fn test_deploy_args_profile() {
        let service = RunService {
            name: "svc".to_string(),
            region: "us-central1".to_string(),
            image: "us-central1-docker.pkg.dev/p/repo/svc:latest".to_string(),
            profile: ServiceProfile::default(),
        };
        let args = deploy_args("p", &service);

        assert_eq!(&args[..3], &["run", "deploy", "svc"]);
        for expected in [
            "--image=us-central1-docker.pkg.dev/p/repo/svc:latest",
            "--min-instances=0",
            "--cpu-throttling",
            "--set-env-vars=ENVIRONMENT=production",
            "--region=us-central1",
            "--project=p",
        ] {
            assert!(args.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn test_is_already_exists() {
        assert!(is_already_exists(
            "ERROR: (gcloud.artifacts.repositories.create) ALREADY_EXISTS: the repository already exists"
        ));
        assert!(is_already_exists(
            "ERROR: Failed to create topic [projects/p/topics/budget-alerts]: Resource already exists in the project"
        ));
        assert!(!is_already_exists("PERMISSION_DENIED"));
    }

    #[tokio::test]
    async fn test_create_repository_already_exists() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::failed(1, "ALREADY_EXISTS: repo exists"));
        let gcloud = Gcloud::with_runner(runner);

        let outcome = gcloud
            .create_repository("p", "us-central1", "repo")
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::AlreadyExists);
    }

    #[tokio::test]
    async fn test_create_topic_other_failure_is_fatal() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::failed(2, "PERMISSION_DENIED"));
        let gcloud = Gcloud::with_runner(runner);

        let err = gcloud.create_topic("p", "budget-alerts").await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_billing_account_strips_prefix() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::ok("billingAccounts/0123AB-4567CD-89EF01\n"));
        runner.push(CommandOutput::ok("\n"));
        let gcloud = Gcloud::with_runner(runner);

        assert_eq!(
            gcloud.billing_account("p").await.unwrap().as_deref(),
            Some("0123AB-4567CD-89EF01")
        );
        assert_eq!(gcloud.billing_account("p").await.unwrap(), None);

        let calls = gcloud.runner().calls();
        assert_eq!(calls[0], billing_account_args("p"));
    }

    #[tokio::test]
    async fn test_list_email_channels() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::ok(
            r#"[
              {"name": "projects/p/notificationChannels/111", "type": "email",
               "displayName": "Ops", "labels": {"email_address": "Ops@Example.com"}, "enabled": true},
              {"name": "projects/p/notificationChannels/222", "type": "email",
               "labels": {"email_address": "old@example.com"}, "enabled": false}
            ]"#,
        ));
        let gcloud = Gcloud::with_runner(runner);

        let channels = gcloud.list_email_channels("p").await.unwrap();
        assert_eq!(channels.len(), 2);
        assert!(channels[0].delivers_to("ops@example.com"));
        assert!(!channels[1].delivers_to("old@example.com"));
    }

    #[tokio::test]
    async fn test_create_email_channel_returns_name() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::ok("projects/p/notificationChannels/987\n"));
        let gcloud = Gcloud::with_runner(runner);

        let name = gcloud
            .create_email_channel("p", "Budget alerts", "ops@example.com")
            .await
            .unwrap();
        assert_eq!(name, "projects/p/notificationChannels/987");
        assert!(gcloud.runner().calls()[0]
            .contains(&"--channel-labels=email_address=ops@example.com".to_string()));
    }
}
