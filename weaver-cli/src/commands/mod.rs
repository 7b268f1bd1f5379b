//! Command definitions and dispatch

pub mod bundle;
pub mod generate;
pub mod job;
pub mod verify;

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use weaver_client::WeaverClient;

use crate::config::Config;

#[derive(Subcommand)]
pub enum Commands {
    /// Submit generation jobs
    #[command(subcommand)]
    Generate(generate::GenerateCommands),

    /// Inspect and manage jobs
    #[command(subcommand)]
    Job(job::JobCommands),

    /// Download a completed job's bundle to disk
    Bundle {
        /// Job ID
        id: String,

        /// Output directory
        #[arg(short, long, default_value = "./generated")]
        out: std::path::PathBuf,
    },

    /// Statically verify a local bundle directory (no server needed)
    Verify {
        /// Directory containing the bundle files
        dir: std::path::PathBuf,

        /// Bundle kind: "ui" or "agent"
        #[arg(short, long, default_value = "ui")]
        kind: String,
    },

    /// Check the server's environment configuration
    Validate,
}

/// Route commands to their handlers.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Generate(cmd) => generate::handle_generate_command(cmd, config).await,
        Commands::Job(cmd) => job::handle_job_command(cmd, config).await,
        Commands::Bundle { id, out } => bundle::fetch_bundle(config, &id, &out).await,
        Commands::Verify { dir, kind } => verify::verify_local(&dir, &kind),
        Commands::Validate => validate(config).await,
    }
}

async fn validate(config: &Config) -> Result<()> {
    let client = WeaverClient::new(&config.server_url);
    let summary = client.validate().await?;

    for check in &summary.checks {
        let marker = if check.ok { "✓".green() } else { "✗".red() };
        println!("{} {}: {}", marker, check.name.bold(), check.detail);
    }
    println!();
    if summary.ready {
        println!("{}", "Server is ready to accept jobs.".green());
    } else {
        println!("{}", "Server is not ready to accept jobs.".red());
    }

    Ok(())
}
