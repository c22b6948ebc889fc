use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoneToolsError {
    #[error("no bones selected")] NoSelection,
    #[error("no root bones found in selection")] NoRoot,
    #[error("invalid skeleton: {0}")] InvalidSkeleton(String),
    #[error("invalid snapshot: {0}")] InvalidSnapshot(String),
    #[error("bone name '{0}' would be used by more than one bone")] NameCollision(String),
    #[error("source and target presets are the same: {0}")] SamePreset(String),
    #[error("unknown naming preset: {0}")] UnknownPreset(String),
    #[error("failed to load naming presets: {0}")] PresetStore(String),
    #[error("malformed weight file: {0}")] MalformedFile(String),
    #[error("weight file is empty")] EmptyData,
    #[error("source point set is empty")] EmptySource,
    #[error("max distance must be finite and >= 0, got {0}")] InvalidMaxDistance(f32),
    #[error("no target vertices selected")] NoVerticesSelected,
    #[error("match targets vertex {index} but the mesh has {len} vertices")]
    TargetOutOfRange { index: usize, len: usize },
    #[error("i/o error: {0}")] Io(#[from] std::io::Error),
}

impl BoneToolsError {
    /// Only an empty source set makes a transfer meaningless; everything else is
    /// an input-validation failure the caller reports and recovers from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BoneToolsError::EmptySource)
    }
}

pub type Result<T> = std::result::Result<T, BoneToolsError>;
