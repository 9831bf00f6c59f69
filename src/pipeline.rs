//! Two-pass frame composition: the 3D pass with its glow, then the label
//! overlay projected through the very same camera.

use crate::bloom::BloomPass;
use crate::camera::Camera;
use crate::color::{self, Rgb};
use crate::config::BloomSettings;
use crate::graphics::{draw_marker, draw_polyline, Image, RenderTarget};
use crate::overlay::{OverlayLayer, PlacedLabel};
use crate::scene::Scene;

/// A finished frame: the composited image with labels layered on top
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub image: &'a Image,
    pub labels: &'a [PlacedLabel],
}

#[derive(Debug, Clone)]
pub struct CompositingPipeline {
    base: RenderTarget,
    bloom: BloomPass,
    overlay: OverlayLayer,
    background: Rgb,
}

impl CompositingPipeline {
    pub fn new(bloom: BloomSettings, width: u32, height: u32) -> Self {
        CompositingPipeline {
            base: RenderTarget::new(width, height),
            bloom: BloomPass::new(bloom, width, height),
            overlay: OverlayLayer::new(width, height),
            background: Rgb::from_hex(color::BACKGROUND),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.base.size()
    }

    pub fn base(&self) -> &RenderTarget {
        &self.base
    }

    pub fn bloom(&self) -> &BloomPass {
        &self.bloom
    }

    pub fn bloom_mut(&mut self) -> &mut BloomPass {
        &mut self.bloom
    }

    pub fn overlay(&self) -> &OverlayLayer {
        &self.overlay
    }

    /// Resizes every target together so the passes never disagree
    pub fn resize(&mut self, width: u32, height: u32) {
        self.base.resize(width, height);
        self.bloom.resize(width, height);
        self.overlay.resize(width, height);
    }

    /// Renders one frame. Returns `false` when there is nothing to draw into.
    pub fn render(&mut self, scene: &Scene, camera: &Camera) -> bool {
        if self.base.is_empty() {
            return false;
        }
        let view_projection = camera.view_projection();

        self.base.clear(self.background);
        for line in scene.lines() {
            draw_polyline(&mut self.base, &view_projection, line);
        }
        draw_marker(
            &mut self.base,
            &view_projection,
            camera.fov_y,
            &scene.dynamic.marker,
        );

        self.bloom.apply(self.base.color_mut());

        self.overlay.render(&scene.labels, camera);
        true
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            image: self.base.color(),
            labels: self.overlay.labels(),
        }
    }

    /// Drops every buffer; the pipeline renders nothing afterwards
    pub fn release(&mut self) {
        self.resize(0, 0);
        self.overlay.clear();
    }
}
