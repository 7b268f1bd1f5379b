//! Bundle download command

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use uuid::Uuid;

use weaver_client::WeaverClient;

use crate::config::Config;

/// Download a completed job's bundle and write each file under `out`,
/// creating parent directories for nested paths.
pub async fn fetch_bundle(config: &Config, id: &str, out: &Path) -> Result<()> {
    let job_id: Uuid = id.parse().with_context(|| format!("'{}' is not a valid job ID", id))?;

    let client = WeaverClient::new(&config.server_url);
    let bundle = client.get_bundle(job_id).await?;

    if bundle.is_empty() {
        println!("Job {} produced no files.", id.bold());
        return Ok(());
    }

    fs::create_dir_all(out)
        .with_context(|| format!("failed to create output directory {}", out.display()))?;

    for (path, content) in bundle.iter() {
        let target = out.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&target, content)
            .with_context(|| format!("failed to write {}", target.display()))?;
        println!("  {} {}", "wrote".green(), target.display());
    }

    println!("\n{} files written to {}", bundle.len(), out.display().to_string().bold());
    Ok(())
}
