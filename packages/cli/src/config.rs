use composer_dataset::DatasetSettings;
use composer_rich::{BlockNewline, ChipStyle, ParseOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "composer.config.json";

/// Composer configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerConfig {
    /// Chip rendering for `render`
    #[serde(default)]
    pub chip: ChipStyle,

    /// Line break reconstruction for `parse`
    #[serde(default)]
    pub block_newline: BlockNewline,

    /// Export markers; replaces the snapshot's own settings when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<DatasetSettings>,
}

impl ComposerConfig {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: ComposerConfig = serde_json::from_str(&content)?;
            debug!(path = %config_path.display(), "Loaded config");
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(ComposerConfig::default())
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            block_newline: self.block_newline,
        }
    }
}
