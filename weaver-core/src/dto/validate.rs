//! Environment-validation DTOs

use serde::{Deserialize, Serialize};

/// One named environment check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvCheck {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

/// Aggregate view returned by GET /validate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub ready: bool,
    pub checks: Vec<EnvCheck>,
}
