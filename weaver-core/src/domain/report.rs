//! Verification report produced by the static verifier

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of statically verifying a file bundle.
///
/// `passed` is true iff no syntax check failed and no blocking issue
/// (missing file, parse failure) was recorded. Warnings and suggestions
/// are advisory and never affect `passed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub passed: bool,
    pub per_file_syntax_ok: BTreeMap<String, bool>,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl VerificationReport {
    pub fn passing() -> Self {
        Self { passed: true, ..Self::default() }
    }

    /// Record a blocking problem. Clears `passed`.
    pub fn push_issue(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
        self.passed = false;
    }
}
