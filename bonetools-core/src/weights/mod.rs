//! Skin weight export and nearest-neighbour transfer.
//!
//! Flow: the host exports a [`WeightFile`] from a weighted mesh (world-space positions),
//! later [`transfer::transfer`] maps every target vertex onto its closest source vertex,
//! and the host applies the [`transfer::TransferResult`] with clear-then-set semantics.

pub mod export;
pub mod format;
pub mod mesh;
pub mod spatial;
pub mod transfer;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use export::{export_weights, ExportOptions};
pub use mesh::{ApplyReport, MeshSnapshot, MeshVertex};
pub use transfer::{transfer, TargetPoint, TransferOptions, TransferResult, WeightMatch};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneWeight {
    pub bone: String,
    pub weight: f32,
}

impl BoneWeight {
    pub fn new(bone: impl Into<String>, weight: f32) -> Self {
        Self { bone: bone.into(), weight }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedVertex {
    /// World space.
    #[serde(rename = "coord")]
    pub position: Vec3,
    pub weights: Vec<BoneWeight>,
}

/// The exchange payload written to `.json` files or the clipboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightFile {
    /// Canonical group (bone) order; may list groups no vertex uses.
    pub vertex_groups: Vec<String>,
    pub vertices: Vec<WeightedVertex>,
}
