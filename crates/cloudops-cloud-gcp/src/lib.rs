//! Google Cloud provider for cloudops
//!
//! Drives the gcloud CLI and the Cloud Billing Budget API to deploy a
//! container to Cloud Run and to wire a budget to email alerts.
//!
//! # Features
//!
//! - Artifact Registry repository, Cloud Build image, Cloud Run service
//! - Budget with Pub/Sub topic and email notification channel
//!
//! # Requirements
//!
//! - `gcloud` CLI must be installed and authenticated
//! - The target project must have billing enabled for budgets
//!
//! # Example
//!
//! ```ignore
//! use cloudops_cloud_gcp::{DeployOrchestrator, GcpProvider};
//! use cloudops_config::DeployConfig;
//!
//! let provider = GcpProvider::new();
//! let config = DeployConfig::from_env()?;
//!
//! let outcome = DeployOrchestrator::new(&provider).run(&config).await?;
//! println!("{}", outcome.image);
//! ```

pub mod alerts;
pub mod artifacts;
pub mod budget;
pub mod budgets;
pub mod deploy;
pub mod error;
pub mod gcloud;
pub mod provider;
pub mod service;

#[cfg(test)]
mod testing;

pub use alerts::{BudgetAlertProvisioner, BudgetOutcome};
pub use artifacts::ArtifactDir;
pub use budget::{BudgetDefinition, threshold_amounts, threshold_report};
pub use budgets::BudgetsClient;
pub use deploy::{DeployOrchestrator, DeployOutcome};
pub use error::{GcpError, Result};
pub use gcloud::{ChannelInfo, Gcloud};
pub use provider::{GcpApi, GcpProvider};
pub use service::{RunService, ServiceProfile, image_reference};
