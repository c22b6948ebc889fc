use std::collections::HashSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::spatial::SpatialIndex;
use super::{BoneWeight, WeightFile};
use crate::error::{BoneToolsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferOptions {
    /// 0 means unlimited: every target takes its globally nearest source.
    pub max_distance: f32,
    pub selected_only: bool,
    /// Source sets smaller than this are scanned linearly instead of indexed.
    pub linear_scan_below: usize,
}

impl Default for TransferOptions {
    fn default() -> Self { Self { max_distance: 0.0, selected_only: false, linear_scan_below: 64 } }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPoint {
    pub position: Vec3,
    pub selected: bool,
}

impl From<Vec3> for TargetPoint {
    fn from(position: Vec3) -> Self { Self { position, selected: true } }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightMatch {
    pub target: usize,
    pub source: usize,
    pub distance: f32,
    pub weights: Vec<BoneWeight>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransferResult {
    /// One entry per matched target, in target order.
    pub matches: Vec<WeightMatch>,
    /// Distinct bones used by `matches`; the caller must make sure these groups exist
    /// before applying.
    pub referenced_groups: Vec<String>,
    /// Targets considered but left without a match.
    pub skipped: usize,
}

/// Assign each target the weights of its nearest source vertex.
///
/// The index is built once per call and dropped on return. Preconditions are all checked
/// before any query runs, so an error never comes with partial results.
pub fn transfer(source: &WeightFile, targets: &[TargetPoint], options: &TransferOptions) -> Result<TransferResult> {
    if source.vertices.is_empty() {
        return Err(BoneToolsError::EmptySource);
    }
    if !options.max_distance.is_finite() || options.max_distance < 0.0 {
        return Err(BoneToolsError::InvalidMaxDistance(options.max_distance));
    }
    if targets.is_empty() {
        return Ok(TransferResult::default());
    }
    if options.selected_only && !targets.iter().any(|t| t.selected) {
        return Err(BoneToolsError::NoVerticesSelected);
    }

    let positions: Vec<Vec3> = source.vertices.iter().map(|v| v.position).collect();
    let index = SpatialIndex::build(&positions, options.linear_scan_below);
    let limit = (options.max_distance > 0.0).then_some(options.max_distance);

    let mut matches = Vec::new();
    let mut skipped = 0;
    for (target_idx, target) in targets.iter().enumerate() {
        if options.selected_only && !target.selected {
            continue;
        }
        if !target.position.is_finite() {
            log::warn!("target {target_idx} has a non-finite position; skipped");
            skipped += 1;
            continue;
        }
        match index.nearest(target.position, limit) {
            Some(n) => matches.push(WeightMatch {
                target: target_idx,
                source: n.index,
                distance: n.distance(),
                weights: source.vertices[n.index].weights.clone(),
            }),
            None => skipped += 1,
        }
    }

    let referenced_groups = referenced_groups(source, &matches);
    log::info!(
        "weight transfer: {} matched, {} skipped, {} groups referenced",
        matches.len(),
        skipped,
        referenced_groups.len()
    );
    Ok(TransferResult { matches, referenced_groups, skipped })
}

/// Bones used by the matches, in `vertex_groups` order; any not listed there follow in
/// first-use order.
fn referenced_groups(source: &WeightFile, matches: &[WeightMatch]) -> Vec<String> {
    let mut used: Vec<&str> = Vec::new();
    let mut used_set = HashSet::new();
    for w in matches.iter().flat_map(|m| &m.weights) {
        if used_set.insert(w.bone.as_str()) {
            used.push(w.bone.as_str());
        }
    }

    let mut out = Vec::with_capacity(used.len());
    let mut emitted = HashSet::with_capacity(used.len());
    for g in &source.vertex_groups {
        if used_set.contains(g.as_str()) && emitted.insert(g.as_str()) {
            out.push(g.clone());
        }
    }
    for name in used {
        if emitted.insert(name) {
            out.push(name.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::{export_weights, ExportOptions, WeightedVertex};
    use proptest::prelude::*;

    fn hip_source() -> WeightFile {
        WeightFile {
            vertex_groups: vec!["Hip".into()],
            vertices: vec![WeightedVertex { position: Vec3::ZERO, weights: vec![BoneWeight::new("Hip", 1.0)] }],
        }
    }

    fn opts(max_distance: f32) -> TransferOptions {
        TransferOptions { max_distance, ..Default::default() }
    }

    #[test]
    fn nearest_match_without_limit() {
        let targets = [TargetPoint::from(Vec3::new(0.0, 0.0, 0.001))];
        let result = transfer(&hip_source(), &targets, &opts(0.0)).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].weights, vec![BoneWeight::new("Hip", 1.0)]);
        assert_eq!(result.referenced_groups, ["Hip"]);
        assert_eq!(result.skipped, 0);
    }

    #[test]
    fn radius_excludes_distant_target() {
        let targets = [TargetPoint::from(Vec3::new(0.0, 0.0, 0.001))];
        let result = transfer(&hip_source(), &targets, &opts(0.0001)).unwrap();
        assert!(result.matches.is_empty());
        assert!(result.referenced_groups.is_empty());
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn far_target_matches_only_without_limit() {
        let targets = [TargetPoint::from(Vec3::new(100.0, 0.0, 0.0))];
        assert!(transfer(&hip_source(), &targets, &opts(5.0)).unwrap().matches.is_empty());
        assert_eq!(transfer(&hip_source(), &targets, &opts(0.0)).unwrap().matches.len(), 1);
    }

    #[test]
    fn degenerate_inputs() {
        let empty = WeightFile { vertex_groups: vec!["Hip".into()], vertices: vec![] };
        let err = transfer(&empty, &[TargetPoint::from(Vec3::ZERO)], &opts(0.0)).unwrap_err();
        assert!(matches!(err, BoneToolsError::EmptySource));
        assert!(err.is_fatal());

        let result = transfer(&hip_source(), &[], &opts(0.0)).unwrap();
        assert_eq!(result, TransferResult::default());

        for bad in [-1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                transfer(&hip_source(), &[TargetPoint::from(Vec3::ZERO)], &opts(bad)),
                Err(BoneToolsError::InvalidMaxDistance(_))
            ));
        }
    }

    #[test]
    fn selected_only_filters_targets() {
        let targets = [
            TargetPoint { position: Vec3::X, selected: false },
            TargetPoint { position: Vec3::Y, selected: true },
        ];
        let o = TransferOptions { selected_only: true, ..Default::default() };
        let result = transfer(&hip_source(), &targets, &o).unwrap();
        assert_eq!(result.matches.iter().map(|m| m.target).collect::<Vec<_>>(), vec![1]);

        let none = [TargetPoint { position: Vec3::X, selected: false }];
        assert!(matches!(transfer(&hip_source(), &none, &o), Err(BoneToolsError::NoVerticesSelected)));
    }

    #[test]
    fn equal_distances_pick_first_source() {
        let source = WeightFile {
            vertex_groups: vec!["L".into(), "R".into()],
            vertices: vec![
                WeightedVertex { position: Vec3::new(-1.0, 0.0, 0.0), weights: vec![BoneWeight::new("L", 1.0)] },
                WeightedVertex { position: Vec3::new(1.0, 0.0, 0.0), weights: vec![BoneWeight::new("R", 1.0)] },
            ],
        };
        let targets = [TargetPoint::from(Vec3::ZERO)];
        let tree = TransferOptions { linear_scan_below: 0, ..Default::default() };
        for o in [TransferOptions::default(), tree] {
            let result = transfer(&source, &targets, &o).unwrap();
            assert_eq!(result.matches[0].source, 0);
            assert_eq!(result.referenced_groups, ["L"]);
        }
    }

    #[test]
    fn referenced_groups_follow_file_order() {
        let source = WeightFile {
            vertex_groups: vec!["A".into(), "B".into(), "C".into()],
            vertices: vec![
                WeightedVertex { position: Vec3::ZERO, weights: vec![BoneWeight::new("C", 0.5), BoneWeight::new("A", 0.5)] },
                WeightedVertex { position: Vec3::X * 10.0, weights: vec![BoneWeight::new("B", 1.0)] },
            ],
        };
        let result = transfer(&source, &[TargetPoint::from(Vec3::ZERO)], &opts(0.0)).unwrap();
        assert_eq!(result.referenced_groups, ["A", "C"]);
    }

    #[test]
    fn non_finite_targets_are_skipped() {
        let targets = [TargetPoint::from(Vec3::new(f32::NAN, 0.0, 0.0)), TargetPoint::from(Vec3::ZERO)];
        let result = transfer(&hip_source(), &targets, &opts(0.0)).unwrap();
        assert_eq!(result.skipped, 1);
        assert_eq!(result.matches[0].target, 1);
    }

    fn mesh_strategy() -> impl Strategy<Value = Vec<WeightedVertex>> {
        let bones = ["Hip", "Spine", "Chest", "Neck"];
        let vertex = ((-50i32..50, -50i32..50, -50i32..50), prop::collection::vec((0usize..4, 0.01f32..1.0), 0..4));
        prop::collection::vec(vertex, 1..400).prop_map(move |raw| {
            let mut seen = HashSet::new();
            raw.into_iter()
                .filter(|((x, y, z), _)| seen.insert((*x, *y, *z)))
                .map(|((x, y, z), ws)| {
                    let mut used = HashSet::new();
                    let weights = ws
                        .into_iter()
                        .filter(|(b, _)| used.insert(*b))
                        .map(|(b, w)| BoneWeight::new(bones[b], w))
                        .collect();
                    WeightedVertex { position: Vec3::new(x as f32, y as f32, z as f32) * 0.1, weights }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn export_then_transfer_reproduces_weights(mesh in mesh_strategy(), linear_scan_below in 0usize..100) {
            let groups: Vec<String> = ["Hip", "Spine", "Chest", "Neck"].iter().map(|s| s.to_string()).collect();
            let file = export_weights(&mesh, &groups, ExportOptions::default());
            let targets: Vec<TargetPoint> = mesh.iter().map(|v| TargetPoint::from(v.position)).collect();
            let o = TransferOptions { linear_scan_below, ..Default::default() };
            let result = transfer(&file, &targets, &o).unwrap();

            prop_assert_eq!(result.matches.len(), mesh.len());
            for m in &result.matches {
                prop_assert_eq!(m.distance, 0.0);
                prop_assert_eq!(&m.weights, &mesh[m.target].weights);
            }
        }
    }
}
