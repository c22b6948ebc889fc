//! Serializable mesh snapshot: the host side of an export or a transfer.
//!
//! Vertex coordinates are local; `matrix_world` (column-major, 16 floats, identity when
//! omitted) brings them into the world space the exchange format uses.

use std::path::Path;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::export::{export_weights, ExportOptions};
use super::transfer::{TargetPoint, TransferResult};
use super::{BoneWeight, WeightFile, WeightedVertex};
use crate::error::{BoneToolsError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshVertex {
    pub co: Vec3,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub weights: Vec<BoneWeight>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshSnapshot {
    #[serde(default)]
    pub matrix_world: Mat4,
    #[serde(default)]
    pub vertex_groups: Vec<String>,
    pub vertices: Vec<MeshVertex>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplyReport {
    pub created_groups: Vec<String>,
    pub updated_vertices: usize,
}

impl MeshSnapshot {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| BoneToolsError::InvalidSnapshot(e.to_string()))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BoneToolsError::InvalidSnapshot(e.to_string()))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn world_position(&self, co: Vec3) -> Vec3 {
        self.matrix_world.transform_point3(co)
    }

    pub fn world_vertices(&self) -> Vec<WeightedVertex> {
        self.vertices
            .iter()
            .map(|v| WeightedVertex { position: self.world_position(v.co), weights: v.weights.clone() })
            .collect()
    }

    pub fn export(&self, options: ExportOptions) -> WeightFile {
        export_weights(&self.world_vertices(), &self.vertex_groups, options)
    }

    pub fn targets(&self) -> Vec<TargetPoint> {
        self.vertices
            .iter()
            .map(|v| TargetPoint { position: self.world_position(v.co), selected: v.selected })
            .collect()
    }

    /// Apply a transfer result: create the missing groups after the existing ones, then
    /// clear and set weights on every matched vertex. Unmatched vertices keep their
    /// weights. Indices are checked up front so a bad result changes nothing.
    pub fn apply_transfer(&mut self, result: &TransferResult) -> Result<ApplyReport> {
        let len = self.vertices.len();
        if let Some(m) = result.matches.iter().find(|m| m.target >= len) {
            return Err(BoneToolsError::TargetOutOfRange { index: m.target, len });
        }

        let mut created_groups = Vec::new();
        for group in &result.referenced_groups {
            if !self.vertex_groups.contains(group) {
                self.vertex_groups.push(group.clone());
                created_groups.push(group.clone());
            }
        }

        for m in &result.matches {
            self.vertices[m.target].weights = m.weights.clone();
        }

        if !created_groups.is_empty() {
            log::info!("created {} vertex groups: {}", created_groups.len(), created_groups.join(", "));
        }
        Ok(ApplyReport { created_groups, updated_vertices: result.matches.len() })
    }
}
