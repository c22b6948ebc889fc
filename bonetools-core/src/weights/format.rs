//! JSON exchange format:
//!
//! ```json
//! {
//!   "vertex_groups": ["BoneA", "BoneB"],
//!   "vertices": [
//!     { "coord": [0.0, 1.2, 0.3], "weights": [ { "bone": "BoneA", "weight": 0.73 } ] }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use super::WeightFile;
use crate::error::{BoneToolsError, Result};

impl WeightFile {
    /// Parse and validate. Non-positive weights are dropped; anything else that breaks
    /// the format is [`BoneToolsError::MalformedFile`].
    pub fn from_json_str(s: &str) -> Result<Self> {
        let mut file: WeightFile =
            serde_json::from_str(s).map_err(|e| BoneToolsError::MalformedFile(e.to_string()))?;
        if file.vertices.is_empty() {
            return Err(BoneToolsError::EmptyData);
        }
        let dropped = file.drop_non_positive();
        if dropped > 0 {
            log::warn!("dropped {dropped} non-positive weight entries");
        }
        file.validate()?;
        Ok(file)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BoneToolsError::MalformedFile(e.to_string()))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Check the in-memory invariants: finite coordinates, positive finite weights, bone
    /// names unique per vertex and listed in `vertex_groups`.
    pub fn validate(&self) -> Result<()> {
        let groups: HashSet<&str> = self.vertex_groups.iter().map(String::as_str).collect();
        for (i, v) in self.vertices.iter().enumerate() {
            if !v.position.is_finite() {
                return Err(BoneToolsError::MalformedFile(format!("vertex {i} has a non-finite coordinate")));
            }
            let mut seen = HashSet::with_capacity(v.weights.len());
            for w in &v.weights {
                if !groups.contains(w.bone.as_str()) {
                    return Err(BoneToolsError::MalformedFile(format!(
                        "vertex {i} references group '{}' missing from vertex_groups",
                        w.bone
                    )));
                }
                if !seen.insert(w.bone.as_str()) {
                    return Err(BoneToolsError::MalformedFile(format!("vertex {i} lists group '{}' twice", w.bone)));
                }
                if !w.weight.is_finite() || w.weight <= 0.0 {
                    return Err(BoneToolsError::MalformedFile(format!(
                        "vertex {i} has invalid weight {} for '{}'",
                        w.weight, w.bone
                    )));
                }
            }
        }
        Ok(())
    }

    fn drop_non_positive(&mut self) -> usize {
        let mut dropped = 0;
        for v in &mut self.vertices {
            let before = v.weights.len();
            v.weights.retain(|w| w.weight > 0.0);
            dropped += before - v.weights.len();
        }
        dropped
    }

    /// Number of vertices carrying at least one weight.
    pub fn weighted_vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| !v.weights.is_empty()).count()
    }
}
