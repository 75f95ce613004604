use crate::utils;
use cloudops_cloud_gcp::{BudgetAlertProvisioner, GcpError, GcpProvider, threshold_report};
use cloudops_config::{BudgetConfig, ConfigError};
use colored::Colorize;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use std::io::IsTerminal;

pub async fn handle(
    config: BudgetConfig,
    dry_run: bool,
    always_create_channel: bool,
) -> anyhow::Result<()> {
    println!("{}", "Setting up budget alerts...".blue().bold());
    println!("  Project: {}", config.project_id.cyan());
    println!("  Budget:  {} ({} USD)", config.budget_name.cyan(), config.amount);

    let config = resolve_email(config)?;
    if let Some(email) = &config.notification_email {
        println!("  Email:   {}", email.cyan());
    }
    println!();

    let provider = GcpProvider::new();
    let provisioner =
        BudgetAlertProvisioner::new(&provider).reuse_channel(!always_create_channel);

    if dry_run {
        utils::print_plan(&provisioner.plan(&config)?);
        println!();
        println!("{}", "Budget document:".bold());
        println!("{}", serde_json::to_string_pretty(&provisioner.draft(&config))?);
        println!();
        print_thresholds(config.amount);
        println!();
        println!("{}", "Dry run: nothing was executed.".yellow());
        return Ok(());
    }

    if !provider.gcloud().is_installed().await {
        return Err(GcpError::GcloudNotFound.into());
    }

    let outcome = provisioner.run(&config).await?;

    utils::print_report(&outcome.report);
    println!();
    println!("{}", "✓ Budget alerts configured".green().bold());
    println!("  Billing account: {}", outcome.billing_account.cyan());
    println!("  Channel:         {}", outcome.channel.cyan());
    println!("  Budget:          {}", outcome.budget_name.cyan());
    println!();
    print_thresholds(config.amount);

    Ok(())
}

/// Ask for the notification email when none was configured
///
/// Only prompts on an interactive terminal.
fn resolve_email(config: BudgetConfig) -> anyhow::Result<BudgetConfig> {
    if config.notification_email.is_some() {
        return Ok(config);
    }
    if !std::io::stdin().is_terminal() {
        return Err(ConfigError::MissingEmail.into());
    }

    let email: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Email address for budget alerts")
        .allow_empty(true)
        .interact_text()?;

    Ok(config.with_email(email)?)
}

fn print_thresholds(amount: u64) {
    println!("{}", "Alerts fire at:".bold());
    for line in threshold_report(amount) {
        println!("  • {}", line);
    }
}
