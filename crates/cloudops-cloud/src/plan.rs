//! Plan and report types for orchestration procedures

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One planned step of a procedure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Step identifier, unique within a plan (e.g. "registry", "build")
    pub id: String,

    /// What the step does to its resource
    pub action_type: ActionType,

    /// Resource type (e.g., "artifact-repository", "run-service", "budget")
    pub resource_type: String,

    /// Resource identifier
    pub resource_id: String,

    /// Human readable description
    pub description: String,

    /// Command line the step will run, when it shells out
    pub command: Option<Vec<String>>,
}

impl Action {
    pub fn new(
        id: impl Into<String>,
        action_type: ActionType,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            action_type,
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            description: description.into(),
            command: None,
        }
    }

    pub fn with_command(mut self, program: &str, args: &[String]) -> Self {
        let mut command = Vec::with_capacity(args.len() + 1);
        command.push(program.to_string());
        command.extend(args.iter().cloned());
        self.command = Some(command);
        self
    }

    /// Command line joined for display
    pub fn command_line(&self) -> Option<String> {
        self.command.as_ref().map(|c| c.join(" "))
    }
}

/// Type of step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create if missing; pre-existence is success
    Ensure,
    /// Always create
    Create,
    /// Create or update in place (platform reconciles)
    Apply,
    /// Read-only lookup
    Read,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Ensure => write!(f, "ensure"),
            ActionType::Create => write!(f, "create"),
            ActionType::Apply => write!(f, "apply"),
            ActionType::Read => write!(f, "read"),
        }
    }
}

/// Ordered list of steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn empty() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            ensure: self.actions_by_type(ActionType::Ensure).len(),
            create: self.actions_by_type(ActionType::Create).len(),
            apply: self.actions_by_type(ActionType::Apply).len(),
            read: self.actions_by_type(ActionType::Read).len(),
        }
    }
}

/// Summary of planned steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub ensure: usize,
    pub create: usize,
    pub apply: usize,
    pub read: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to ensure, {} to create, {} to apply, {} lookups",
            self.ensure, self.create, self.apply, self.read
        )
    }
}

/// How a completed step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created,
    AlreadyExists,
    Reused,
    Applied,
    Resolved,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Created => write!(f, "created"),
            Outcome::AlreadyExists => write!(f, "already exists"),
            Outcome::Reused => write!(f, "reused"),
            Outcome::Applied => write!(f, "applied"),
            Outcome::Resolved => write!(f, "resolved"),
        }
    }
}

/// Result of a single completed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub action_id: String,
    pub outcome: Outcome,
    pub message: String,
}

/// Record of a procedure run that reached the end
///
/// Procedures abort on the first fatal error, so a report only ever holds
/// completed steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub steps: Vec<StepResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        action_id: impl Into<String>,
        outcome: Outcome,
        message: impl Into<String>,
    ) {
        self.steps.push(StepResult {
            action_id: action_id.into(),
            outcome,
            message: message.into(),
        });
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.duration_ms = elapsed.as_millis() as u64;
    }

    pub fn get(&self, action_id: &str) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.action_id == action_id)
    }

    pub fn outcome(&self, action_id: &str) -> Option<Outcome> {
        self.get(action_id).map(|s| s.outcome)
    }
}
