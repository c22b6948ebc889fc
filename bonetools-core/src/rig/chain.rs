//! Hierarchical chain naming for physics bones (hair strands, skirts, tails).
//!
//! Names have the form `Prefix_M_C_B`:
//! - `M`: main chain, the 1-based position of the root bone in the selection
//! - `C`: chain within that tree; 1 is the main chain, branches count up from 2
//! - `B`: 1-based position of the bone along its chain
//!
//! ```text
//! Hair_1_1_1 ── Hair_1_1_2 ── Hair_1_1_3
//!                    └─────── Hair_1_2_1 ── Hair_1_2_2
//! ```

use std::collections::HashSet;

use serde::Serialize;

use super::{BoneId, Skeleton};
use crate::error::{BoneToolsError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameAssignment {
    pub bone: BoneId,
    pub name: String,
}

/// An empty prefix still yields a leading underscore (`_1_1_1`); existing rigs depend on it.
pub fn chain_name(prefix: &str, main_chain: usize, chain_id: usize, bone_num: usize) -> String {
    format!("{prefix}_{main_chain}_{chain_id}_{bone_num}")
}

/// Selected bones whose parent is absent or unselected, in selection order.
pub fn root_bones(skeleton: &Skeleton, selection: &[BoneId]) -> Vec<BoneId> {
    let selected: HashSet<BoneId> = selection.iter().copied().collect();
    let mut seen = HashSet::with_capacity(selection.len());
    selection
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .filter(|id| match skeleton.bone(*id).and_then(|b| b.parent) {
            Some(parent) => !selected.contains(&parent),
            None => true,
        })
        .collect()
}

/// Compute new names for every selected bone.
///
/// Roots are numbered by their position in `selection`, so the host's selection order
/// decides the main chain index. Nothing is written to the skeleton; apply the result
/// with [`Skeleton::apply_names`].
pub fn rename(skeleton: &Skeleton, selection: &[BoneId], prefix: &str) -> Result<Vec<NameAssignment>> {
    if selection.is_empty() {
        return Err(BoneToolsError::NoSelection);
    }
    if let Some(bad) = selection.iter().find(|id| skeleton.bone(**id).is_none()) {
        return Err(BoneToolsError::InvalidSkeleton(format!("selection refers to missing bone id {}", bad.0)));
    }

    let selected: HashSet<BoneId> = selection.iter().copied().collect();
    let roots = root_bones(skeleton, selection);
    if roots.is_empty() {
        return Err(BoneToolsError::NoRoot);
    }

    let mut out = Vec::with_capacity(selected.len());
    for (i, root) in roots.iter().enumerate() {
        name_tree(skeleton, &selected, *root, prefix, i + 1, &mut out);
    }
    log::debug!("chain namer: {} roots, {} bones named", roots.len(), out.len());
    Ok(out)
}

#[derive(Debug, Clone, Copy)]
enum ChainSlot {
    Continue(usize),
    Branch,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    bone: BoneId,
    slot: ChainSlot,
    bone_num: usize,
}

fn name_tree(
    skeleton: &Skeleton,
    selected: &HashSet<BoneId>,
    root: BoneId,
    prefix: &str,
    main_chain: usize,
    out: &mut Vec<NameAssignment>,
) {
    let mut next_chain = 2;
    let mut stack = vec![Frame { bone: root, slot: ChainSlot::Continue(1), bone_num: 1 }];

    while let Some(frame) = stack.pop() {
        // Branch ids are claimed when the branch is reached, not when it is queued.
        let chain_id = match frame.slot {
            ChainSlot::Continue(id) => id,
            ChainSlot::Branch => {
                next_chain += 1;
                next_chain - 1
            }
        };
        out.push(NameAssignment { bone: frame.bone, name: chain_name(prefix, main_chain, chain_id, frame.bone_num) });

        let Some(bone) = skeleton.bone(frame.bone) else { continue; };
        let children: Vec<BoneId> = bone.children.iter().copied().filter(|c| selected.contains(c)).collect();

        // Reverse push: the first child's whole subtree is named before any sibling branch.
        for (k, child) in children.iter().enumerate().rev() {
            let next = if k == 0 {
                Frame { bone: *child, slot: ChainSlot::Continue(chain_id), bone_num: frame.bone_num + 1 }
            } else {
                Frame { bone: *child, slot: ChainSlot::Branch, bone_num: 1 }
            };
            stack.push(next);
        }
    }
}
