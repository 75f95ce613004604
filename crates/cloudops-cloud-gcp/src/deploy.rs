//! Deployment orchestrator
//!
//! Ensures the image repository, builds and pushes the image, then deploys
//! the Cloud Run service. Steps run strictly in order and the first fatal
//! error aborts the run. Nothing is rolled back: an image pushed before a
//! failed deploy stays in the registry.

use crate::error::Result;
use crate::gcloud::{GCLOUD, build_args, create_repository_args, deploy_args};
use crate::provider::GcpApi;
use crate::service::{RunService, ServiceProfile, image_reference};
use cloudops_cloud::{Action, ActionType, Outcome, Plan, RunReport};
use cloudops_config::DeployConfig;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const STEP_REGISTRY: &str = "registry";
pub const STEP_BUILD: &str = "build";
pub const STEP_DEPLOY: &str = "deploy";

/// Result of a completed deploy
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub image: String,
    pub url: Option<String>,
    pub report: RunReport,
}

pub struct DeployOrchestrator<'a, A: GcpApi + ?Sized> {
    api: &'a A,
    source_dir: PathBuf,
    profile: ServiceProfile,
}

impl<'a, A: GcpApi + ?Sized> DeployOrchestrator<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            source_dir: PathBuf::from("."),
            profile: ServiceProfile::default(),
        }
    }

    /// Directory uploaded as the build context
    pub fn with_source_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.source_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn image(&self, config: &DeployConfig) -> String {
        image_reference(
            &config.region,
            &config.project_id,
            &config.registry_name,
            &config.service_name,
        )
    }

    pub fn service(&self, config: &DeployConfig) -> RunService {
        RunService {
            name: config.service_name.clone(),
            region: config.region.clone(),
            image: self.image(config),
            profile: self.profile.clone(),
        }
    }

    /// Steps the run will take, with the exact gcloud command lines
    pub fn plan(&self, config: &DeployConfig) -> Plan {
        let image = self.image(config);
        let service = self.service(config);

        Plan::new(vec![
            Action::new(
                STEP_REGISTRY,
                ActionType::Ensure,
                "artifact-repository",
                &config.registry_name,
                format!(
                    "Ensure docker repository {} in {}",
                    config.registry_name, config.region
                ),
            )
            .with_command(
                GCLOUD,
                &create_repository_args(
                    &config.project_id,
                    &config.region,
                    &config.registry_name,
                ),
            ),
            Action::new(
                STEP_BUILD,
                ActionType::Create,
                "container-image",
                &image,
                format!("Build {} and push {}", self.source_dir.display(), image),
            )
            .with_command(
                GCLOUD,
                &build_args(&config.project_id, &self.source_dir, &image),
            ),
            Action::new(
                STEP_DEPLOY,
                ActionType::Apply,
                "run-service",
                &config.service_name,
                format!(
                    "Deploy {} to Cloud Run ({})",
                    config.service_name, config.region
                ),
            )
            .with_command(GCLOUD, &deploy_args(&config.project_id, &service)),
        ])
    }

    pub async fn run(&self, config: &DeployConfig) -> Result<DeployOutcome> {
        let start = Instant::now();
        let mut report = RunReport::new();
        let image = self.image(config);

        tracing::info!(
            project = %config.project_id,
            region = %config.region,
            service = %config.service_name,
            "Starting deploy"
        );

        // 1. Registry repository
        let outcome = self
            .api
            .ensure_repository(&config.project_id, &config.region, &config.registry_name)
            .await?;
        if outcome == Outcome::AlreadyExists {
            tracing::info!(
                "Repository {} already exists, continuing",
                config.registry_name
            );
        }
        report.record(STEP_REGISTRY, outcome, &config.registry_name);

        // 2. Build and push
        tracing::info!("Building {}", image);
        self.api
            .build_image(&config.project_id, &self.source_dir, &image)
            .await?;
        report.record(STEP_BUILD, Outcome::Created, &image);

        // 3. Deploy
        let service = self.service(config);
        tracing::info!("Deploying {}", service.name);
        self.api
            .deploy_service(&config.project_id, &service)
            .await?;
        report.record(STEP_DEPLOY, Outcome::Applied, &service.name);

        let url = match self
            .api
            .service_url(&config.project_id, &config.region, &config.service_name)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Could not read service URL: {}", e);
                None
            }
        };

        report.finish(start.elapsed());
        Ok(DeployOutcome { image, url, report })
    }
}
