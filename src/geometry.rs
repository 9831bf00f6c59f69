//! Line and marker primitives, plus the cache that holds the ones the
//! driving angle rewrites every time it changes.

use crate::color::{self, Rgb};
use crate::vertex::Vertex;
use glam::DVec3;

/// Dash pattern measured in world units along the line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dash {
    pub dash_size: f64,
    pub gap_size: f64,
}

impl Dash {
    /// Whether a point at `distance` along the line falls on a dash
    pub fn is_drawn(&self, distance: f64) -> bool {
        let period = self.dash_size + self.gap_size;
        if period <= 0.0 {
            return true;
        }
        distance.rem_euclid(period) < self.dash_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Rgb,
    pub opacity: f32,
    pub dash: Option<Dash>,
}

impl LineStyle {
    pub fn solid(color: Rgb) -> Self {
        LineStyle {
            color,
            opacity: 1.0,
            dash: None,
        }
    }

    pub fn translucent(color: Rgb, opacity: f32) -> Self {
        LineStyle {
            color,
            opacity,
            dash: None,
        }
    }

    pub fn dashed(mut self, dash_size: f64, gap_size: f64) -> Self {
        self.dash = Some(Dash {
            dash_size,
            gap_size,
        });
        self
    }

    pub fn is_opaque(&self) -> bool {
        self.opacity >= 1.0
    }
}

/// How the vertices of a line are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Consecutive vertices are joined: 0-1, 1-2, ...
    Strip,
    /// Vertices pair up into independent segments: 0-1, 2-3, ...
    Segments,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub vertices: Vec<Vertex>,
    pub topology: Topology,
    pub style: LineStyle,
}

impl Line {
    pub fn strip(points: &[DVec3], style: LineStyle) -> Self {
        let mut line = Line {
            vertices: points.iter().copied().map(Vertex::new).collect(),
            topology: Topology::Strip,
            style,
        };
        line.compute_line_distances();
        line
    }

    pub fn segments(points: &[DVec3], style: LineStyle) -> Self {
        let mut line = Line {
            vertices: points.iter().copied().map(Vertex::new).collect(),
            topology: Topology::Segments,
            style,
        };
        line.compute_line_distances();
        line
    }

    /// Overwrites a vertex position in place. Dash metadata is stale until
    /// [`Line::compute_line_distances`] runs again.
    pub fn set_position(&mut self, index: usize, position: DVec3) {
        if let Some(vertex) = self.vertices.get_mut(index) {
            vertex.position = position;
        }
    }

    /// Recomputes the cumulative distance stored on each vertex. Strips
    /// accumulate along the whole line; independent segments restart at zero.
    pub fn compute_line_distances(&mut self) {
        match self.topology {
            Topology::Strip => {
                let mut total = 0.0;
                let mut previous: Option<DVec3> = None;
                for vertex in self.vertices.iter_mut() {
                    if let Some(prev) = previous {
                        total += prev.distance(vertex.position);
                    }
                    vertex.line_distance = total;
                    previous = Some(vertex.position);
                }
            }
            Topology::Segments => {
                for pair in self.vertices.chunks_mut(2) {
                    pair[0].line_distance = 0.0;
                    if pair.len() == 2 {
                        pair[1].line_distance = pair[0].position.distance(pair[1].position);
                    }
                }
            }
        }
    }

    /// Iterates over the vertex pairs that make up the drawn segments
    pub fn segment_pairs(&self) -> Vec<(Vertex, Vertex)> {
        match self.topology {
            Topology::Strip => self.vertices.windows(2).map(|w| (w[0], w[1])).collect(),
            Topology::Segments => self
                .vertices
                .chunks_exact(2)
                .map(|c| (c[0], c[1]))
                .collect(),
        }
    }
}

/// Small solid sphere, drawn as a screen-facing disc
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub center: DVec3,
    pub radius: f64,
    pub color: Rgb,
}

pub const MARKER_RADIUS: f64 = 0.04;
pub const PROJECTION_DASH: f64 = 0.05;
pub const PROJECTION_GAP: f64 = 0.05;
pub const PROJECTION_OPACITY: f32 = 0.5;

/// Mutable buffers for the dynamic primitives.
///
/// The buffers are allocated once and rewritten in place; nothing here is
/// ever recreated while the renderer is alive.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryCache {
    pub vector: Line,
    pub cos_projection: Line,
    pub sin_projection: Line,
    pub marker: Marker,
}

impl GeometryCache {
    /// Buffers posed for θ = 0
    pub fn new() -> Self {
        let primary = Rgb::from_hex(color::PRIMARY);
        let projection = LineStyle::translucent(Rgb::WHITE, PROJECTION_OPACITY)
            .dashed(PROJECTION_DASH, PROJECTION_GAP);

        GeometryCache {
            vector: Line::strip(&[DVec3::ZERO, DVec3::X], LineStyle::solid(primary)),
            cos_projection: Line::strip(&[DVec3::X, DVec3::X], projection),
            sin_projection: Line::strip(&[DVec3::Y, DVec3::Y], projection),
            marker: Marker {
                center: DVec3::X,
                radius: MARKER_RADIUS,
                color: primary,
            },
        }
    }

    pub fn tip(&self) -> DVec3 {
        self.vector.vertices[1].position
    }

    pub fn lines(&self) -> [&Line; 3] {
        [&self.vector, &self.cos_projection, &self.sin_projection]
    }
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new()
    }
}
