//! Job inspection and management commands

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use uuid::Uuid;

use weaver_client::WeaverClient;
use weaver_core::domain::job::{JobKind, JobStatus};
use weaver_core::domain::log::LogLevel;
use weaver_core::domain::report::VerificationReport;
use weaver_core::domain::stage::Strategy;
use weaver_core::dto::job::JobDetails;

use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// List jobs
    List {
        /// Filter by kind: "ui" or "agent"
        #[arg(short, long)]
        kind: Option<String>,

        /// Filter by status: pending, running, completed, failed, cancelled
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Show a job's status, stages and verification verdict
    Get {
        /// Job ID
        id: String,
    },

    /// Print a job's execution log
    Logs {
        /// Job ID
        id: String,
    },

    /// Print one file from a completed job's bundle
    File {
        /// Job ID
        id: String,

        /// Relative path inside the bundle (e.g. "index.html")
        path: String,
    },

    /// Request cancellation of a running job
    Cancel {
        /// Job ID
        id: String,
    },

    /// Delete a job (aborts it if still running)
    Delete {
        /// Job ID
        id: String,
    },
}

pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = WeaverClient::new(&config.server_url);

    match command {
        JobCommands::List { kind, status } => {
            let jobs = client.list_jobs(kind.as_deref(), status.as_deref()).await?;
            if jobs.is_empty() {
                println!("No jobs found.");
                return Ok(());
            }
            for job in jobs {
                println!(
                    "{}  {:<6} {:<10} created {}",
                    job.id.to_string().bold(),
                    kind_label(job.kind),
                    status_label(job.status),
                    job.created_at.format("%Y-%m-%d %H:%M:%S"),
                );
            }
            Ok(())
        }
        JobCommands::Get { id } => {
            let details = client.get_job(parse_id(&id)?).await?;
            print_job_details(&details);
            Ok(())
        }
        JobCommands::Logs { id } => {
            let logs = client.get_job_logs(parse_id(&id)?, None).await?;
            for entry in logs {
                let level = match entry.level {
                    LogLevel::Error => "ERROR".red(),
                    LogLevel::Warning => "WARN".yellow(),
                    LogLevel::Info => "INFO".normal(),
                    LogLevel::Debug => "DEBUG".dimmed(),
                };
                println!(
                    "{} {:<5} {}",
                    entry.timestamp.format("%H:%M:%S%.3f").to_string().dimmed(),
                    level,
                    entry.message,
                );
            }
            Ok(())
        }
        JobCommands::File { id, path } => {
            let content = client.get_file(parse_id(&id)?, &path).await?;
            print!("{content}");
            Ok(())
        }
        JobCommands::Cancel { id } => {
            client.cancel_job(parse_id(&id)?).await?;
            println!("Cancellation requested for job {}", id.bold());
            println!("The job stops at the next stage boundary.");
            Ok(())
        }
        JobCommands::Delete { id } => {
            client.delete_job(parse_id(&id)?).await?;
            println!("Deleted job {}", id.bold());
            Ok(())
        }
    }
}

fn parse_id(raw: &str) -> Result<Uuid> {
    raw.parse().with_context(|| format!("'{}' is not a valid job ID", raw))
}

fn strategy_label(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::TypedSchema => "typed-schema",
        Strategy::DirectJson => "direct-json",
        Strategy::FencedJson => "fenced-json",
        Strategy::None => "none",
    }
}

pub fn kind_label(kind: JobKind) -> &'static str {
    match kind {
        JobKind::UiBundle => "ui",
        JobKind::AgentBundle => "agent",
    }
}

pub fn status_label(status: JobStatus) -> ColoredString {
    match status {
        JobStatus::Pending => "pending".yellow(),
        JobStatus::Running => "running".cyan(),
        JobStatus::Completed => "completed".green(),
        JobStatus::Failed => "failed".red(),
        JobStatus::Cancelled => "cancelled".dimmed(),
    }
}

pub fn print_job_details(details: &JobDetails) {
    println!("{}: {}", "Job".bold(), details.id);
    println!("{}: {}", "Kind".bold(), kind_label(details.kind));
    println!("{}: {}", "Status".bold(), status_label(details.status));
    println!("{}: {}", "Created".bold(), details.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(completed) = details.completed_at {
        println!("{}: {}", "Finished".bold(), completed.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(error) = &details.error {
        println!("{}: {}", "Error".bold(), error.red());
    }

    if !details.stages.is_empty() {
        println!("\n{}:", "Stages".bold());
        for stage in &details.stages {
            println!(
                "  {}. {} ({})",
                stage.stage_index + 1,
                stage.name,
                strategy_label(stage.strategy),
            );
        }
    }

    if !details.files.is_empty() {
        println!("\n{}:", "Files".bold());
        for path in &details.files {
            println!("  {}", path);
        }
    }

    if let Some(report) = &details.report {
        println!();
        print_report(report);
    }
}

pub fn print_report(report: &VerificationReport) {
    let verdict = if report.passed { "passed".green() } else { "failed".red() };
    println!("{}: {}", "Verification".bold(), verdict);

    for (path, ok) in &report.per_file_syntax_ok {
        let marker = if *ok { "✓".green() } else { "✗".red() };
        println!("  {} {}", marker, path);
    }
    for issue in &report.issues {
        println!("  {} {}", "issue:".red(), issue);
    }
    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow(), warning);
    }
    for suggestion in &report.suggestions {
        println!("  {} {}", "suggestion:".dimmed(), suggestion);
    }
}
