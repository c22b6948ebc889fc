//! Naming convention presets.
//!
//! A preset store is a JSON object keyed by preset id:
//!
//! ```json
//! { "vroid": { "name": "VRoid", "description": "...", "bones": { "hips": "J_Bip_C_Hips" } } }
//! ```
//!
//! Roles (`hips`, `left_upper_arm`, ...) are free-form strings so users can extend the
//! store without touching code.

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::names::{build_mapping, NameMapping};
use crate::error::{BoneToolsError, Result};

const BUILTIN_PRESETS: &str = include_str!("../../presets/presets.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingPreset {
    #[serde(skip)]
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// role -> convention-specific bone name
    pub bones: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetStore {
    presets: IndexMap<String, NamingPreset>,
}

impl PresetStore {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let mut presets: IndexMap<String, NamingPreset> =
            serde_json::from_str(s).map_err(|e| BoneToolsError::PresetStore(e.to_string()))?;
        if presets.is_empty() {
            return Err(BoneToolsError::PresetStore("no presets defined".into()));
        }
        for (key, preset) in presets.iter_mut() {
            preset.key = key.clone();
        }
        Ok(Self { presets })
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Conventions bundled with the crate (VRoid, Mixamo, Unreal).
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_PRESETS)
    }

    pub fn get(&self, key: &str) -> Result<&NamingPreset> {
        self.presets.get(key).ok_or_else(|| BoneToolsError::UnknownPreset(key.to_string()))
    }

    /// `(key, display name, description)` in file order, for menus.
    pub fn items(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.presets
            .iter()
            .map(|(k, p)| (k.as_str(), p.name.as_str(), p.description.as_str()))
    }

    pub fn len(&self) -> usize { self.presets.len() }

    pub fn is_empty(&self) -> bool { self.presets.is_empty() }

    /// Same-key check comes before the lookups so a bad pair is reported as such.
    pub fn mapping(&self, source: &str, target: &str) -> Result<NameMapping> {
        if source == target {
            return Err(BoneToolsError::SamePreset(source.to_string()));
        }
        build_mapping(self.get(source)?, self.get(target)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_store_loads_in_file_order() {
        let store = PresetStore::builtin().expect("builtin presets");
        let keys: Vec<&str> = store.items().map(|(k, _, _)| k).collect();
        assert_eq!(keys, ["vroid", "mixamo", "unreal"]);
        let vroid = store.get("vroid").unwrap();
        assert_eq!(vroid.key, "vroid");
        assert_eq!(vroid.bones["hips"], "J_Bip_C_Hips");
    }

    #[test]
    fn unknown_and_same_keys_are_reported() {
        let store = PresetStore::builtin().unwrap();
        assert!(matches!(store.get("blender"), Err(BoneToolsError::UnknownPreset(_))));
        assert!(matches!(store.mapping("vroid", "vroid"), Err(BoneToolsError::SamePreset(_))));
        assert!(matches!(store.mapping("vroid", "nope"), Err(BoneToolsError::UnknownPreset(_))));
    }

    #[test]
    fn builtin_mapping_converts_vroid_to_unreal() {
        let store = PresetStore::builtin().unwrap();
        let mapping = store.mapping("vroid", "unreal").unwrap();
        assert_eq!(mapping["J_Bip_L_UpperArm"], "upperarm_l");
        assert_eq!(mapping["J_Bip_C_Hips"], "pelvis");
    }

    #[test]
    fn broken_or_empty_store_is_an_error() {
        assert!(matches!(PresetStore::from_json_str("[1, 2]"), Err(BoneToolsError::PresetStore(_))));
        assert!(matches!(PresetStore::from_json_str("{}"), Err(BoneToolsError::PresetStore(_))));
    }

    #[test]
    fn description_is_optional() {
        let store = PresetStore::from_json_str(r#"{ "a": { "name": "A", "bones": { "hips": "Hips" } } }"#).unwrap();
        assert_eq!(store.get("a").unwrap().description, "");
        assert_eq!(store.len(), 1);
    }
}
