//! Tool settings, loaded from YAML. Every section is optional.
//!
//! ```yaml
//! chain:
//!   prefix: Hair
//! transfer:
//!   max_distance: 0.05
//!   selected_only: false
//!   linear_scan_below: 64
//! export:
//!   skip_unweighted: false
//! presets:
//!   path: ./presets.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::rig::presets::PresetStore;
use crate::weights::{ExportOptions, TransferOptions};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub chain: ChainConfig,
    pub transfer: TransferOptions,
    pub export: ExportOptions,
    pub presets: PresetConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    /// JSON preset store; the built-in conventions are used when unset.
    pub path: Option<PathBuf>,
}

impl ToolConfig {
    pub fn preset_store(&self) -> Result<PresetStore> {
        let store = match &self.presets.path {
            Some(path) => PresetStore::load_from_path(path)
                .with_context(|| format!("load naming presets from {}", path.display()))?,
            None => PresetStore::builtin()?,
        };
        Ok(store)
    }
}

pub fn load_from_yaml_str(s: &str) -> Result<ToolConfig> {
    let cfg: ToolConfig = serde_yaml::from_str(s)?;
    Ok(cfg)
}

pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<ToolConfig> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    load_from_yaml_str(&data).with_context(|| format!("parse config {}", path.display()))
}
