//! Configuration loader
//!
//! Loads the declarative engine configuration from YAML: model metadata,
//! named action definitions, and selection lists. Action entries parse
//! individually so a file carrying definitions this engine does not support
//! (legacy import/export transfers, for instance) still loads; unsupported
//! entries are skipped with a warning.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::actions::ActionConfig;
use crate::error::ConfigError;
use crate::model::{ModelMeta, SelectionList};

/// Everything one engine loads at startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub models: Vec<ModelMeta>,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
    /// Selection lists, for gateway implementations that serve labels from
    /// config rather than persisted rows.
    #[serde(default)]
    pub selections: Vec<SelectionList>,
}

/// Raw shape with actions left unparsed for per-entry handling.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    models: Vec<ModelMeta>,
    #[serde(default)]
    actions: Vec<serde_yaml::Value>,
    #[serde(default)]
    selections: Vec<SelectionList>,
}

impl EngineConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(content)?;
        let mut actions = Vec::new();
        for entry in raw.actions {
            let name = entry
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or("<unnamed>")
                .to_string();
            match serde_yaml::from_value::<ActionConfig>(entry) {
                Ok(action) => actions.push(action),
                Err(e) => {
                    warn!(action = %name, error = %e, "skipping unsupported action definition");
                }
            }
        }
        Ok(Self {
            models: raw.models,
            actions,
            selections: raw.selections,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading engine configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        info!(
            models = config.models.len(),
            actions = config.actions.len(),
            selections = config.selections.len(),
            "engine configuration loaded"
        );
        Ok(config)
    }
}
