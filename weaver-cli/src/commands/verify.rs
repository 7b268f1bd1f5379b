//! Local bundle verification command
//!
//! Runs the same static checks the server applies after generation, against
//! files already on disk. No server connection needed.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::*;

use weaver_core::domain::bundle::FileBundle;
use weaver_core::domain::job::JobKind;
use weaver_core::pipeline::{required_files, required_symbols};

use crate::commands::job::print_report;

pub fn verify_local(dir: &Path, kind: &str) -> Result<()> {
    let kind: JobKind = kind.parse().map_err(anyhow::Error::msg)?;

    let mut bundle = FileBundle::new();
    collect_files(dir, dir, &mut bundle)?;
    if bundle.is_empty() {
        bail!("no files found under {}", dir.display());
    }
    println!("Verifying {} files from {}\n", bundle.len(), dir.display().to_string().bold());

    let report = weaver_core::verify::verify(&bundle, required_files(kind), required_symbols(kind));
    print_report(&report);

    if !report.passed {
        bail!("verification failed");
    }
    Ok(())
}

/// Walk `dir`, adding each regular file keyed by its path relative to `root`.
fn collect_files(root: &Path, dir: &Path, bundle: &mut FileBundle) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, bundle)?;
            continue;
        }
        let relative = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        bundle.insert(relative, content);
    }
    Ok(())
}
