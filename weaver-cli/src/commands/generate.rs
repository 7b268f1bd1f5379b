//! Generation command handlers
//!
//! Submits UI and agent generation jobs, optionally polling until the job
//! reaches a terminal state.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use uuid::Uuid;

use weaver_client::WeaverClient;
use weaver_core::domain::job::JobStatus;
use weaver_core::dto::job::{CreateAgentJob, CreateUiJob};

use crate::commands::job::print_job_details;
use crate::config::Config;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Generate subcommands
#[derive(Subcommand)]
pub enum GenerateCommands {
    /// Generate an HTML/CSS/JS interface bundle for an AI agent
    Ui {
        /// What the agent does
        #[arg(long)]
        description: String,

        /// Agent capability (repeat for several)
        #[arg(long = "capability", required = true)]
        capabilities: Vec<String>,

        /// APIs the agent integrates with
        #[arg(long)]
        api: Option<String>,

        /// Design preferences as free text or JSON
        #[arg(long)]
        preferences: Option<String>,

        /// Poll until the job finishes
        #[arg(short, long)]
        wait: bool,
    },

    /// Generate a Python agent source bundle
    Agent {
        /// Plain-language idea for the agent
        #[arg(long)]
        idea: String,

        /// Human-friendly agent name
        #[arg(long)]
        name: Option<String>,

        /// Concrete goal (repeat for several)
        #[arg(long = "goal")]
        goals: Vec<String>,

        /// Constraint or guardrail (repeat for several)
        #[arg(long = "constraint")]
        constraints: Vec<String>,

        /// Poll until the job finishes
        #[arg(short, long)]
        wait: bool,
    },
}

pub async fn handle_generate_command(command: GenerateCommands, config: &Config) -> Result<()> {
    let client = WeaverClient::new(&config.server_url);

    match command {
        GenerateCommands::Ui { description, capabilities, api, preferences, wait } => {
            let req = CreateUiJob {
                agent_description: description,
                agent_capabilities: capabilities,
                agent_api: api,
                user_preferences: preferences.map(parse_preferences),
            };
            let created = client.create_ui_job(&req).await?;
            println!("Submitted UI job {}", created.job_id.to_string().bold());
            finish(&client, created.job_id, wait).await
        }
        GenerateCommands::Agent { idea, name, goals, constraints, wait } => {
            let req = CreateAgentJob { idea, agent_name: name, goals, constraints };
            let created = client.create_agent_job(&req).await?;
            println!("Submitted agent job {}", created.job_id.to_string().bold());
            finish(&client, created.job_id, wait).await
        }
    }
}

/// Preferences may be structured JSON; fall back to a plain string.
fn parse_preferences(raw: String) -> serde_json::Value {
    serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
}

async fn finish(client: &WeaverClient, job_id: Uuid, wait: bool) -> Result<()> {
    if !wait {
        println!("Poll with: {}", format!("weaver job get {}", job_id).dimmed());
        return Ok(());
    }
    wait_for_job(client, job_id).await
}

/// Poll until the job leaves Pending/Running, tailing its log as it runs,
/// then print the final view.
async fn wait_for_job(client: &WeaverClient, job_id: Uuid) -> Result<()> {
    let mut seen = 0usize;
    loop {
        let entries = client.get_job_logs(job_id, Some(seen)).await?;
        for entry in &entries {
            println!("  {}", entry.message.dimmed());
        }
        seen += entries.len();

        let details = client
            .get_job(job_id)
            .await
            .with_context(|| format!("failed to poll job {}", job_id))?;

        match details.status {
            JobStatus::Pending | JobStatus::Running => {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            _ => {
                // Entries written between the log fetch and the terminal
                // status land in one last tail.
                for entry in &client.get_job_logs(job_id, Some(seen)).await? {
                    println!("  {}", entry.message.dimmed());
                }
                println!();
                print_job_details(&details);
                return Ok(());
            }
        }
    }
}
