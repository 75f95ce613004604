use cloudops_cloud::{Plan, RunReport};
use cloudops_cloud_gcp::GcpError;
use colored::Colorize;

/// Process exit code for a failed command
///
/// Provider errors carry the exit code of the failing gcloud call; anything
/// else, configuration errors included, exits with 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<GcpError>()
        .map(GcpError::exit_code)
        .unwrap_or(1)
}

/// Print planned steps with their command lines
pub fn print_plan(plan: &Plan) {
    println!("{}", "Planned steps:".bold());
    for (i, action) in plan.actions.iter().enumerate() {
        println!(
            "  {}. [{}] {}",
            i + 1,
            action.action_type.to_string().yellow(),
            action.description
        );
        if let Some(line) = action.command_line() {
            println!("     $ {}", line.dimmed());
        }
    }
    println!();
    println!("Plan: {}", plan.summary());
}

pub fn print_report(report: &RunReport) {
    for step in &report.steps {
        println!(
            "  ✓ {} {} ({})",
            step.action_id.cyan(),
            step.message,
            step.outcome.to_string().green()
        );
    }
}
