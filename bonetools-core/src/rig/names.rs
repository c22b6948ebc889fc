//! Bone name conversion between naming conventions.

use std::collections::BTreeMap;

use super::presets::NamingPreset;
use super::Bone;
use crate::error::{BoneToolsError, Result};

/// Old name -> new name. Ordered so two builds from the same presets compare equal.
pub type NameMapping = BTreeMap<String, String>;

/// Anything with a renameable name: host bones, plain strings in tests and tools.
pub trait NamedNode {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
}

impl NamedNode for Bone {
    fn name(&self) -> &str { &self.name }
    fn set_name(&mut self, name: String) { self.name = name; }
}

impl NamedNode for String {
    fn name(&self) -> &str { self }
    fn set_name(&mut self, name: String) { *self = name; }
}

/// Pair up roles present in both presets. Roles missing on either side, or mapped to an
/// empty name, are skipped.
pub fn build_mapping(source: &NamingPreset, target: &NamingPreset) -> Result<NameMapping> {
    if source.key == target.key {
        return Err(BoneToolsError::SamePreset(source.key.clone()));
    }
    let mut mapping = NameMapping::new();
    for (role, source_name) in &source.bones {
        let Some(target_name) = target.bones.get(role) else { continue; };
        if source_name.is_empty() || target_name.is_empty() {
            continue;
        }
        mapping.insert(source_name.clone(), target_name.clone());
    }
    log::debug!("name mapping {} -> {}: {} pairs", source.key, target.key, mapping.len());
    Ok(mapping)
}

/// Renames a mapping pass would make, as `(node index, new name)` in node order. Each node
/// is looked up once by the name it has now.
pub fn plan_mapping<N: NamedNode>(nodes: &[N], mapping: &NameMapping) -> Vec<(usize, String)> {
    nodes
        .iter()
        .enumerate()
        .filter_map(|(i, node)| mapping.get(node.name()).map(|new_name| (i, new_name.clone())))
        .collect()
}

/// Rename nodes in place and return how many changed; zero just means nothing matched.
/// No uniqueness check here: skeletons go through [`super::Skeleton::apply_mapping`].
pub fn apply_mapping<N: NamedNode>(nodes: &mut [N], mapping: &NameMapping) -> usize {
    let plan = plan_mapping(nodes, mapping);
    for (i, new_name) in &plan {
        nodes[*i].set_name(new_name.clone());
    }
    log_renamed(plan.len());
    plan.len()
}

pub(crate) fn log_renamed(renamed: usize) {
    if renamed == 0 {
        log::info!("no matching bones found");
    } else {
        log::info!("renamed {renamed} bones");
    }
}
