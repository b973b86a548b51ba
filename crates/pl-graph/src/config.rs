//! Registry configuration.
//!
//! ```yaml
//! duplicate_names: reject
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GraphResult;

/// What registering a second port under an already used name does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateNamePolicy {
    /// The name now resolves to the newer port. The older port is still
    /// reachable by index.
    #[default]
    Overwrite,
    /// Registration fails with `DuplicatePortName`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub duplicate_names: DuplicateNamePolicy,
}

impl RegistryConfig {
    pub fn with_duplicate_names(mut self, policy: DuplicateNamePolicy) -> Self {
        self.duplicate_names = policy;
        self
    }

    pub fn from_yaml_str(content: &str) -> GraphResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a file. `.json` files are parsed as JSON, everything else as
    /// YAML.
    pub fn load(path: &Path) -> GraphResult<Self> {
        let content = std::fs::read_to_string(path)?;
        if is_json(path) {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn save(&self, path: &Path) -> GraphResult<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
