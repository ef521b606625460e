//! Engine configuration
//!
//! Loaded from JSON. Every field has a default, so `{}` is a valid config.

use crate::error::{Result, RuleEngineError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What a comparison over an attribute that the record lacks evaluates to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAttributePolicy {
    /// Fail with `EvaluationError::UnknownAttribute`
    #[default]
    Error,
    /// The comparison is false
    False,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub missing_attribute: MissingAttributePolicy,
    /// Reject characters outside the rule grammar instead of skipping them
    pub strict_lexing: bool,
    /// Maximum number of parsed rules the engine's cache retains; 0 disables it
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            missing_attribute: MissingAttributePolicy::Error,
            strict_lexing: false,
            cache_capacity: 256,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RuleEngineError::InvalidConfig(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RuleEngineError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }
}
