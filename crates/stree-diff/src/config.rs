use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DiffResult;

/// Configuration for a diff session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Maximum number of nodes aligned per incremental slice. A sibling
    /// level is never split, so a slice may overshoot by one level.
    pub slice_budget: usize,
    /// Append each state's short ID to its name in display paths.
    pub display_ids: bool,
    /// Emit a `StateTreePropertiesChanged` entry when tree-level data
    /// differs.
    pub report_global_changes: bool,
    /// Append property-binding differences to the report.
    pub report_bindings: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            slice_budget: 256,
            display_ids: false,
            report_global_changes: true,
            report_bindings: true,
        }
    }
}

impl DiffConfig {
    /// Parse from TOML. Missing keys take their default values.
    pub fn from_toml_str(text: &str) -> DiffResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> DiffResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
