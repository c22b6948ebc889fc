use serde::{Deserialize, Serialize};

use super::{BoneWeight, WeightFile, WeightedVertex};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Leave out vertices without any weight (older exports did this).
    pub skip_unweighted: bool,
}

/// Snapshot a mesh's weights. `group_order` is kept verbatim as the canonical column list;
/// a bone used by a vertex but absent from it is appended so the file stays self-consistent.
pub fn export_weights(mesh: &[WeightedVertex], group_order: &[String], options: ExportOptions) -> WeightFile {
    let mut vertex_groups = group_order.to_vec();
    let mut vertices = Vec::with_capacity(mesh.len());

    for v in mesh {
        let weights: Vec<BoneWeight> = v.weights.iter().filter(|w| w.weight > 0.0).cloned().collect();
        if weights.is_empty() && options.skip_unweighted {
            continue;
        }
        for w in &weights {
            if !vertex_groups.iter().any(|g| g == &w.bone) {
                log::warn!("group '{}' missing from group order; appending", w.bone);
                vertex_groups.push(w.bone.clone());
            }
        }
        vertices.push(WeightedVertex { position: v.position, weights });
    }

    log::debug!("exported {} of {} vertices, {} groups", vertices.len(), mesh.len(), vertex_groups.len());
    WeightFile { vertex_groups, vertices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keeps_group_order_and_drops_zero_weights() {
        let mesh = vec![
            WeightedVertex {
                position: Vec3::ZERO,
                weights: vec![BoneWeight::new("Spine", 0.0), BoneWeight::new("Hip", 1.0)],
            },
            WeightedVertex { position: Vec3::X, weights: vec![] },
        ];
        let file = export_weights(&mesh, &groups(&["Hip", "Spine", "Unused"]), ExportOptions::default());
        assert_eq!(file.vertex_groups, ["Hip", "Spine", "Unused"]);
        assert_eq!(file.vertices.len(), 2);
        assert_eq!(file.vertices[0].weights, vec![BoneWeight::new("Hip", 1.0)]);
        assert!(file.vertices[1].weights.is_empty());
        file.validate().expect("export output validates");
    }

    #[test]
    fn skip_unweighted_drops_bare_vertices() {
        let mesh = vec![
            WeightedVertex { position: Vec3::ZERO, weights: vec![BoneWeight::new("Hip", 0.0)] },
            WeightedVertex { position: Vec3::Y, weights: vec![BoneWeight::new("Hip", 0.5)] },
        ];
        let file = export_weights(&mesh, &groups(&["Hip"]), ExportOptions { skip_unweighted: true });
        assert_eq!(file.vertices.len(), 1);
        assert_eq!(file.vertices[0].position, Vec3::Y);
    }

    #[test]
    fn unlisted_bones_are_appended_to_group_order() {
        let mesh = vec![WeightedVertex { position: Vec3::ZERO, weights: vec![BoneWeight::new("Tail", 1.0)] }];
        let file = export_weights(&mesh, &groups(&["Hip"]), ExportOptions::default());
        assert_eq!(file.vertex_groups, ["Hip", "Tail"]);
    }
}
