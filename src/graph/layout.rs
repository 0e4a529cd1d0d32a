use std::f32::consts::PI;

use crate::geometry::{Vec3, vec3};
use crate::util::stable_unit;

use super::Node;

pub const BASE_RADIUS: f32 = 100.0;
pub const RADIUS_JITTER: f32 = 20.0;

/// Fibonacci-sphere placement. Depends only on node index and count; the
/// radial jitter is a stable hash of the index so repeated layouts agree.
pub fn layout(nodes: &[Node]) -> Vec<Vec3> {
    let count = nodes.len();
    (0..count).map(|index| sphere_point(index, count)).collect()
}

pub(super) fn sphere_point(index: usize, count: usize) -> Vec3 {
    let n = count as f32;
    let phi = (-1.0 + (2.0 * index as f32) / n).clamp(-1.0, 1.0).acos();
    let theta = (n * PI).sqrt() * phi;
    let radius = BASE_RADIUS + stable_unit(&index) * RADIUS_JITTER;

    vec3(
        radius * theta.cos() * phi.sin(),
        radius * theta.sin() * phi.sin(),
        radius * phi.cos(),
    )
}
