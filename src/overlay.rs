use crate::camera::Camera;
use crate::color::Rgb;
use crate::math::clip_to_screen;
use crate::scene::Label;

/// A label placed for the current frame, centred on (x, y) in pixels
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub color: Rgb,
}

/// Screen-space text layer drawn over the 3D image.
///
/// Labels never take part in depth testing; they are only hidden when their
/// anchor falls behind the camera or past the far plane.
#[derive(Debug, Clone, Default)]
pub struct OverlayLayer {
    width: u32,
    height: u32,
    placed: Vec<PlacedLabel>,
}

impl OverlayLayer {
    pub fn new(width: u32, height: u32) -> Self {
        OverlayLayer {
            width,
            height,
            placed: Vec::new(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.placed.clear();
    }

    pub fn labels(&self) -> &[PlacedLabel] {
        &self.placed
    }

    /// Projects each anchor through `camera` and records where it lands
    pub fn render(&mut self, labels: &[Label], camera: &Camera) {
        self.placed.clear();
        for label in labels {
            let clip = camera.clip(label.anchor);
            let Some([x, y, depth]) = clip_to_screen(clip, self.width, self.height) else {
                continue;
            };
            if depth > 1.0 {
                continue;
            }
            self.placed.push(PlacedLabel {
                text: label.text.clone(),
                x,
                y,
                color: label.color,
            });
        }
    }

    pub fn clear(&mut self) {
        self.placed.clear();
    }
}
