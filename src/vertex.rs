use glam::DVec3;

/// Line vertex with its world position and cumulative distance along the line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: DVec3,
    pub line_distance: f64,
}

impl Vertex {
    pub fn new(position: DVec3) -> Self {
        Vertex {
            position,
            line_distance: 0.0,
        }
    }
}

/// Vertex after projection: pixel coordinates plus normalized depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub screen_position: [f64; 2],
    pub depth: f64,
    pub line_distance: f64,
}

impl ScreenVertex {
    /// Point at `t` along the way to `other`, with depth and dash distance
    /// carried along
    pub fn lerp(&self, other: &ScreenVertex, t: f64) -> ScreenVertex {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        ScreenVertex {
            screen_position: [
                mix(self.screen_position[0], other.screen_position[0]),
                mix(self.screen_position[1], other.screen_position[1]),
            ],
            depth: mix(self.depth, other.depth),
            line_distance: mix(self.line_distance, other.line_distance),
        }
    }
}
