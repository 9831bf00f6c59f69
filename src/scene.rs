//! Static scene content: grid, axes, unit circle and the overlay labels.
//!
//! Everything here is built once when the renderer is created and is never
//! touched by the driving angle.

use crate::color::{self, Rgb};
use crate::geometry::{GeometryCache, Line, LineStyle};
use glam::DVec3;
use std::f64::consts::TAU;

pub const GRID_SIZE: f64 = 4.0;
pub const GRID_DIVISIONS: usize = 10;
pub const AXIS_LENGTH: f64 = 2.5;
pub const AXIS_OPACITY: f32 = 0.5;
pub const CIRCLE_SEGMENTS: usize = 100;
/// Key-point labels sit this far out from the unit circle
pub const LABEL_OFFSET: f64 = 1.15;
pub const AXIS_LABEL_DISTANCE: f64 = 2.6;

/// Text anchored to a point in world space
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub anchor: DVec3,
    pub color: Rgb,
}

impl Label {
    pub fn new(text: &str, anchor: DVec3, color: Rgb) -> Self {
        Label {
            text: text.to_string(),
            anchor,
            color,
        }
    }
}

/// The full scene graph: immutable decorations plus the dynamic buffers
#[derive(Debug, Clone)]
pub struct Scene {
    pub decor: Vec<Line>,
    pub labels: Vec<Label>,
    pub dynamic: GeometryCache,
}

impl Scene {
    /// Builds the static decorations and allocates the dynamic buffers
    pub fn build() -> Self {
        let mut decor = vec![grid()];
        decor.extend(axes());
        decor.push(unit_circle());
        let labels = labels();
        log::debug!(
            "scene built: {} static lines, {} labels",
            decor.len(),
            labels.len()
        );

        Scene {
            decor,
            labels,
            dynamic: GeometryCache::new(),
        }
    }

    /// Static lines first, then the dynamic ones, in draw order
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.decor.iter().chain(self.dynamic.lines())
    }

    pub fn clear(&mut self) {
        self.decor.clear();
        self.labels.clear();
    }
}

/// Square grid in the XY plane centred on the origin
fn grid() -> Line {
    let half = GRID_SIZE / 2.0;
    let step = GRID_SIZE / GRID_DIVISIONS as f64;
    let mut points = Vec::with_capacity((GRID_DIVISIONS + 1) * 4);
    for i in 0..=GRID_DIVISIONS {
        let k = -half + i as f64 * step;
        points.push(DVec3::new(-half, k, 0.0));
        points.push(DVec3::new(half, k, 0.0));
        points.push(DVec3::new(k, -half, 0.0));
        points.push(DVec3::new(k, half, 0.0));
    }
    Line::segments(&points, LineStyle::solid(Rgb::from_hex(color::GRID)))
}

/// Positive X, Y and Z axes, one translucent line per axis colour
fn axes() -> Vec<Line> {
    [
        (DVec3::X, Rgb::new(1.0, 0.0, 0.0)),
        (DVec3::Y, Rgb::new(0.0, 1.0, 0.0)),
        (DVec3::Z, Rgb::new(0.0, 0.0, 1.0)),
    ]
    .into_iter()
    .map(|(dir, color)| {
        Line::segments(
            &[DVec3::ZERO, dir * AXIS_LENGTH],
            LineStyle::translucent(color, AXIS_OPACITY),
        )
    })
    .collect()
}

/// Closed polyline on the unit circle
fn unit_circle() -> Line {
    let points: Vec<DVec3> = (0..=CIRCLE_SEGMENTS)
        .map(|i| {
            let t = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
            DVec3::new(t.cos(), t.sin(), 0.0)
        })
        .collect();
    Line::strip(&points, LineStyle::solid(Rgb::from_hex(color::ACCENT)))
}

fn labels() -> Vec<Label> {
    let accent = Rgb::from_hex(color::ACCENT);
    let mut labels = vec![
        Label::new(
            "Re",
            DVec3::new(AXIS_LABEL_DISTANCE, 0.0, 0.0),
            Rgb::from_hex(color::LABEL_RE),
        ),
        Label::new(
            "Im",
            DVec3::new(0.0, AXIS_LABEL_DISTANCE, 0.0),
            Rgb::from_hex(color::LABEL_IM),
        ),
    ];
    for (text, point) in [
        ("1", DVec3::X),
        ("i", DVec3::Y),
        ("-1", -DVec3::X),
        ("-i", -DVec3::Y),
    ] {
        labels.push(Label::new(text, point * LABEL_OFFSET, accent));
    }
    labels
}
