use crate::utils;
use cloudops_cloud_gcp::{DeployOrchestrator, GcpError, GcpProvider};
use cloudops_config::DeployConfig;
use colored::Colorize;
use std::path::Path;

pub async fn handle(config: &DeployConfig, source: &Path, dry_run: bool) -> anyhow::Result<()> {
    println!("{}", "Deploying to Cloud Run...".blue().bold());
    println!("  Project:  {}", config.project_id.cyan());
    println!("  Region:   {}", config.region.cyan());
    println!("  Service:  {}", config.service_name.cyan());
    println!("  Registry: {}", config.registry_name.cyan());
    println!();

    let provider = GcpProvider::new();
    let orchestrator = DeployOrchestrator::new(&provider).with_source_dir(source);

    utils::print_plan(&orchestrator.plan(config));
    if dry_run {
        println!();
        println!("{}", "Dry run: nothing was executed.".yellow());
        return Ok(());
    }

    if !provider.gcloud().is_installed().await {
        return Err(GcpError::GcloudNotFound.into());
    }

    println!();
    println!("{}", "Running...".blue());
    let outcome = orchestrator.run(config).await?;

    println!();
    utils::print_report(&outcome.report);
    println!();
    println!("{}", "✓ Deploy complete".green().bold());
    println!("  Image: {}", outcome.image.cyan());
    match outcome.url {
        Some(url) => println!("  URL:   {}", url.cyan()),
        None => println!("  URL:   {}", "(not available yet)".dimmed()),
    }
    println!(
        "  Done in {:.1}s",
        outcome.report.duration_ms as f64 / 1000.0
    );

    Ok(())
}
