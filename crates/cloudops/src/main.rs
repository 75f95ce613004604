mod commands;
mod server;
mod utils;

use clap::{Parser, Subcommand};
use cloudops_config::{
    BudgetConfig, DeployConfig, ENV_BUDGET_AMOUNT, ENV_BUDGET_NAME, ENV_NOTIFICATION_EMAIL,
    ENV_PROJECT_ID, ENV_REGION, ENV_REGISTRY_NAME, ENV_SERVICE_NAME,
};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cloudops")]
#[command(about = "Deploy an MCP server to Cloud Run and keep its spend in check", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the container image and deploy it to Cloud Run
    Deploy {
        /// Google Cloud project id
        #[arg(short, long, env = "PROJECT_ID")]
        project: Option<String>,
        /// Region for the registry and the service
        #[arg(short, long, env = "REGION")]
        region: Option<String>,
        /// Cloud Run service name
        #[arg(short, long, env = "SERVICE_NAME")]
        service: Option<String>,
        /// Artifact Registry repository name
        #[arg(long, env = "REGISTRY_NAME")]
        registry: Option<String>,
        /// Directory uploaded as the build context
        #[arg(long, default_value = ".")]
        source: PathBuf,
        /// Print the planned gcloud commands without running them
        #[arg(long)]
        dry_run: bool,
    },
    /// Create a budget with email alerts at 50%, 80% and 100% of spend
    Budget {
        /// Google Cloud project id
        #[arg(short, long, env = "PROJECT_ID")]
        project: Option<String>,
        /// Budget display name
        #[arg(short, long, env = "BUDGET_NAME")]
        name: Option<String>,
        /// Budget amount in whole USD
        #[arg(short, long, env = "BUDGET_AMOUNT")]
        amount: Option<String>,
        /// Address that receives the alerts
        #[arg(short, long, env = "NOTIFICATION_EMAIL")]
        email: Option<String>,
        /// Print the budget document without calling Google Cloud
        #[arg(long)]
        dry_run: bool,
        /// Create a new email channel even when one exists for the address
        #[arg(long)]
        always_create_channel: bool,
    },
    /// Run the health endpoint served inside the container
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = server::DEFAULT_PORT)]
        port: u16,
        /// Environment name reported by the health endpoint
        #[arg(long, env = "ENVIRONMENT", default_value = "production")]
        environment: String,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(utils::exit_code(&e));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Deploy {
            project,
            region,
            service,
            registry,
            source,
            dry_run,
        } => {
            let config = DeployConfig::from_lookup(|key| match key {
                ENV_PROJECT_ID => project.clone(),
                ENV_REGION => region.clone(),
                ENV_SERVICE_NAME => service.clone(),
                ENV_REGISTRY_NAME => registry.clone(),
                _ => None,
            })?;
            commands::deploy::handle(&config, &source, dry_run).await?;
        }
        Commands::Budget {
            project,
            name,
            amount,
            email,
            dry_run,
            always_create_channel,
        } => {
            let config = BudgetConfig::from_lookup(|key| match key {
                ENV_PROJECT_ID => project.clone(),
                ENV_BUDGET_NAME => name.clone(),
                ENV_BUDGET_AMOUNT => amount.clone(),
                ENV_NOTIFICATION_EMAIL => email.clone(),
                _ => None,
            })?;
            commands::budget::handle(config, dry_run, always_create_channel).await?;
        }
        Commands::Serve { port, environment } => {
            server::serve(port, environment).await?;
        }
        Commands::Version => {
            println!("cloudops {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
