use crate::geometry::GeometryCache;
use glam::DVec3;

/// Poses every dynamic primitive for the angle `theta` (radians).
///
/// The tip lands on `(cos θ, sin θ, 0)`; the projection lines drop from the
/// tip onto each axis. Dash distances are recomputed afterwards so the dash
/// pattern keeps its world-space spacing as the lines change length.
pub fn apply_angle(cache: &mut GeometryCache, theta: f64) {
    let (y, x) = theta.sin_cos();
    let tip = DVec3::new(x, y, 0.0);

    cache.vector.set_position(1, tip);
    cache.marker.center = tip;

    cache.cos_projection.set_position(0, tip);
    cache.cos_projection.set_position(1, DVec3::new(x, 0.0, 0.0));
    cache.cos_projection.compute_line_distances();

    cache.sin_projection.set_position(0, tip);
    cache.sin_projection.set_position(1, DVec3::new(0.0, y, 0.0));
    cache.sin_projection.compute_line_distances();
}
