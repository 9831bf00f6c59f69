use glam::{DMat4, DVec3, DVec4};

/// Homogeneous clip-space position (depth range 0..w)
pub type ClipPoint = DVec4;

/// Transforms a world-space point into clip space
pub fn project_to_clip(view_projection: &DMat4, world: DVec3) -> ClipPoint {
    *view_projection * world.extend(1.0)
}

/// Whether a clip-space point lies on the visible side of the near plane
pub fn in_front_of_near(clip: ClipPoint) -> bool {
    clip.z >= 0.0 && clip.w > 0.0
}

/// Perspective divide and viewport transform.
///
/// Returns pixel coordinates (origin top-left, y down) and the normalized
/// depth, or `None` for points behind the near plane.
pub fn clip_to_screen(clip: ClipPoint, width: u32, height: u32) -> Option<[f64; 3]> {
    if !in_front_of_near(clip) {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    let x = (ndc.x + 1.0) * 0.5 * width as f64;
    let y = (1.0 - ndc.y) * 0.5 * height as f64;
    Some([x, y, ndc.z])
}

/// Clips the segment `a`-`b` against the near plane.
///
/// Returns the surviving endpoints together with their parameters along the
/// original segment, so per-vertex attributes can be re-interpolated.
pub fn clip_segment_near(
    a: ClipPoint,
    b: ClipPoint,
) -> Option<((ClipPoint, f64), (ClipPoint, f64))> {
    let a_in = in_front_of_near(a);
    let b_in = in_front_of_near(b);
    match (a_in, b_in) {
        (true, true) => Some(((a, 0.0), (b, 1.0))),
        (false, false) => None,
        _ => {
            let t = a.z / (a.z - b.z);
            let hit = a.lerp(b, t);
            if hit.w <= 0.0 {
                return None;
            }
            if a_in {
                Some(((a, 0.0), (hit, t)))
            } else {
                Some(((hit, t), (b, 1.0)))
            }
        }
    }
}

/// Clips the 2D segment `a`-`b` to the rectangle `min`..`max`
/// (Liang–Barsky). Returns the parameter range of the part inside.
pub fn clip_segment_rect(
    a: [f64; 2],
    b: [f64; 2],
    min: [f64; 2],
    max: [f64; 2],
) -> Option<(f64, f64)> {
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for axis in 0..2 {
        let d = b[axis] - a[axis];
        for (p, q) in [(-d, a[axis] - min[axis]), (d, max[axis] - a[axis])] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
    }
    Some((t0, t1))
}

/// Pixels per world unit at a given view-space depth
pub fn pixels_per_unit(fov_y: f64, height: u32, view_depth: f64) -> f64 {
    if view_depth <= 0.0 {
        return 0.0;
    }
    height as f64 / (2.0 * (fov_y * 0.5).tan() * view_depth)
}

/// Linear interpolation between two scalars
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
