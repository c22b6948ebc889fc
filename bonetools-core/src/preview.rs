//! Rainbow weight preview: one color per vertex group, blended per vertex.
//!
//! Everything here is computed per call; callers that want caching own the cache.

use std::collections::HashMap;

use crate::weights::{BoneWeight, MeshSnapshot};

pub type Rgba = [f32; 4];

const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];

/// High-contrast colors used while there are few enough groups to tell apart by eye.
const BASE_PALETTE: [Rgba; 10] = [
    [1.0, 0.0, 0.0, 1.0], // red
    [0.0, 0.0, 1.0, 1.0], // blue
    [0.0, 0.8, 0.0, 1.0], // green
    [1.0, 0.7, 0.0, 1.0], // orange
    [0.5, 0.0, 0.5, 1.0], // purple
    [0.0, 0.8, 0.8, 1.0], // cyan
    [1.0, 1.0, 0.0, 1.0], // yellow
    [1.0, 0.0, 1.0, 1.0], // magenta
    [0.5, 0.5, 0.0, 1.0], // olive
    [0.0, 0.5, 0.5, 1.0], // teal
];

const GOLDEN_RATIO_CONJUGATE: f32 = 0.618_034;

/// Colors for `count` groups. Beyond the fixed palette, hues step by the golden ratio
/// with a small deterministic per-index jitter.
pub fn group_palette(count: usize) -> Vec<Rgba> {
    if count <= BASE_PALETTE.len() {
        return BASE_PALETTE[..count].to_vec();
    }
    let mut hue = 0.5_f32;
    (0..count)
        .map(|i| {
            hue = (hue + GOLDEN_RATIO_CONJUGATE) % 1.0;
            let jitter = (i as f32 * 0.317 + 0.123) % 1.0;
            hue = (hue + jitter * 0.1) % 1.0;
            let [r, g, b] = hsv_to_rgb(hue, 0.95, 0.95);
            [r, g, b, 1.0]
        })
        .collect()
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [v, v, v];
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i32).rem_euclid(6) {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeightPalette {
    colors: HashMap<String, Rgba>,
}

impl WeightPalette {
    pub fn new(groups: &[String]) -> Self {
        let colors = groups.iter().cloned().zip(group_palette(groups.len())).collect();
        Self { colors }
    }

    pub fn color(&self, group: &str) -> Option<Rgba> {
        self.colors.get(group).copied()
    }

    /// Weight-normalized blend of the group colors over positive weights; black when
    /// there are none.
    pub fn vertex_color(&self, weights: &[BoneWeight]) -> Rgba {
        let positive = || weights.iter().filter(|w| w.weight > 0.0);
        let total: f32 = positive().map(|w| w.weight).sum();
        if total <= 0.0 {
            return BLACK;
        }
        let mut rgb = [0.0_f32; 3];
        for w in positive() {
            let Some(c) = self.color(&w.bone) else { continue; };
            let k = w.weight / total;
            rgb[0] += c[0] * k;
            rgb[1] += c[1] * k;
            rgb[2] += c[2] * k;
        }
        [rgb[0], rgb[1], rgb[2], 1.0]
    }
}

/// One preview color per mesh vertex.
pub fn preview_colors(mesh: &MeshSnapshot) -> Vec<Rgba> {
    let palette = WeightPalette::new(&mesh.vertex_groups);
    mesh.vertices.iter().map(|v| palette.vertex_color(&v.weights)).collect()
}
