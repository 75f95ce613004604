//! cloudops cloud abstractions
//!
//! This crate holds the provider-agnostic pieces shared by the cloudops
//! procedures: a seam for invoking external command-line tools, and the
//! plan/report types every procedure uses to describe and record its steps.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  cloudops CLI                    │
//! │            (cloudops deploy / budget)            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               cloudops-cloud-gcp                 │
//! │  DeployOrchestrator   BudgetAlertProvisioner     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │      trait GcpApi  (Gcloud + Budgets)     │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                cloudops-cloud                    │
//! │  trait CommandRunner   Plan / RunReport          │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! Procedures run strictly sequentially: every command is awaited before the
//! next one is issued.

pub mod error;
pub mod plan;
pub mod runner;

// Re-exports
pub use error::{CloudError, Result};
pub use plan::{Action, ActionType, Outcome, Plan, PlanSummary, RunReport, StepResult};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
