//! The renderer instance: owns the scene, camera rig, render targets and
//! frame loop, and exposes the imperative entry points the host calls when
//! its values change.
//!
//! Nothing here is thread-safe. Every entry point, including [`EulerRenderer::tick`],
//! must run on the same thread.

use crate::animation::{AnimationLoop, FrameScheduler, LoopState};
use crate::camera::{Camera, CameraRig, Orientation, ZoomDirection};
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::pipeline::{CompositingPipeline, Frame};
use crate::resize::ResizeCoordinator;
use crate::scene::Scene;
use crate::updater;

/// Something the renderer can draw into
pub trait Surface {
    /// Pixel size, or `None` when the surface is detached
    fn size(&self) -> Option<(u32, u32)>;
}

/// Host values at the time the renderer is created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialState {
    pub theta: f64,
    pub zoom: f64,
    pub rotation: Orientation,
}

/// Reports orientation changes made by direct manipulation back to the host
pub type RotationCallback = Box<dyn FnMut(Orientation)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new frame is ready in [`EulerRenderer::frame`]
    Rendered,
    /// The surface had no area; nothing was drawn
    Skipped,
    /// The loop has been torn down
    Stopped,
}

pub struct EulerRenderer<S, F> {
    surface: S,
    scheduler: F,
    scene: Scene,
    rig: CameraRig,
    pipeline: CompositingPipeline,
    resize: ResizeCoordinator,
    animation: AnimationLoop,
    on_rotation: Option<RotationCallback>,
    theta: f64,
}

impl<S: Surface, F: FrameScheduler> EulerRenderer<S, F> {
    /// Binds to `surface`, builds the scene and starts the frame loop.
    ///
    /// Fails without allocating anything if the surface is unavailable.
    pub fn new(
        surface: S,
        mut scheduler: F,
        config: &RendererConfig,
        initial: InitialState,
    ) -> Result<Self, RenderError> {
        let (width, height) = surface.size().ok_or(RenderError::SurfaceUnavailable)?;
        let aspect = if height > 0 {
            width as f64 / height as f64
        } else {
            1.0
        };

        let camera = Camera::new(config.fov_y_degrees, aspect, config.near, config.far);
        let mut rig = CameraRig::new(
            camera,
            config.damping,
            config.min_distance,
            config.max_distance,
        );
        rig.apply_zoom_state(initial.zoom);
        rig.apply_external_orientation(initial.rotation);

        let mut scene = Scene::build();
        updater::apply_angle(&mut scene.dynamic, initial.theta);

        let pipeline = CompositingPipeline::new(config.bloom, width, height);
        let animation = AnimationLoop::start(&mut scheduler);
        log::info!("renderer started on a {width}x{height} surface");

        Ok(EulerRenderer {
            surface,
            scheduler,
            scene,
            rig,
            pipeline,
            resize: ResizeCoordinator::new(width, height),
            animation,
            on_rotation: None,
            theta: initial.theta,
        })
    }

    pub fn with_rotation_callback(mut self, callback: RotationCallback) -> Self {
        self.on_rotation = Some(callback);
        self
    }

    pub fn is_running(&self) -> bool {
        self.animation.is_running()
    }

    pub fn state(&self) -> LoopState {
        self.animation.state()
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn camera(&self) -> &Camera {
        self.rig.camera()
    }

    pub fn pipeline(&self) -> &CompositingPipeline {
        &self.pipeline
    }

    pub fn animation(&self) -> &AnimationLoop {
        &self.animation
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    /// Re-poses the vector, marker and projection lines for `theta`
    pub fn apply_angle(&mut self, theta: f64) {
        if !self.is_running() {
            return;
        }
        self.theta = theta;
        updater::apply_angle(&mut self.scene.dynamic, theta);
    }

    pub fn apply_zoom_state(&mut self, distance: f64) {
        if self.is_running() {
            self.rig.apply_zoom_state(distance);
        }
    }

    pub fn set_zoom_request(&mut self, direction: ZoomDirection) {
        if self.is_running() {
            self.rig.set_zoom_request(direction);
        }
    }

    pub fn apply_external_orientation(&mut self, orientation: Orientation) {
        if self.is_running() {
            self.rig.apply_external_orientation(orientation);
        }
    }

    /// Drag input: turns the desired orientation and tells the host
    pub fn orbit_by(&mut self, delta_yaw: f64, delta_pitch: f64) {
        if !self.is_running() {
            return;
        }
        let orientation = self.rig.orbit_by(delta_yaw, delta_pitch);
        if let Some(callback) = self.on_rotation.as_mut() {
            callback(orientation);
        }
    }

    pub fn set_bloom_enabled(&mut self, enabled: bool) {
        self.pipeline.bloom_mut().set_enabled(enabled);
    }

    pub fn bloom_enabled(&self) -> bool {
        self.pipeline.bloom().settings().enabled
    }

    /// Size-change signal from the host
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if !self.is_running() {
            return;
        }
        self.resize
            .on_resize(width, height, &mut self.rig, &mut self.pipeline);
    }

    /// Runs one scheduled frame: damping, then composition, then the request
    /// for the next frame
    pub fn tick(&mut self) -> TickOutcome {
        if !self.animation.begin_frame() {
            return TickOutcome::Stopped;
        }
        self.rig.update();

        let outcome = match self.surface.size() {
            Some((width, height)) if width > 0 && height > 0 => {
                // Catches size changes the host has not signalled yet
                self.resize
                    .on_resize(width, height, &mut self.rig, &mut self.pipeline);
                if self.pipeline.render(&self.scene, self.rig.camera()) {
                    TickOutcome::Rendered
                } else {
                    TickOutcome::Skipped
                }
            }
            _ => TickOutcome::Skipped,
        };

        self.animation.reschedule(&mut self.scheduler);
        outcome
    }

    /// The most recently composited frame
    pub fn frame(&self) -> Frame<'_> {
        self.pipeline.frame()
    }

    /// Stops the loop and releases every buffer. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if !self.animation.stop(&mut self.scheduler) {
            log::debug!("teardown requested on a stopped renderer");
            return;
        }
        self.pipeline.release();
        self.scene.clear();
        self.on_rotation = None;
        log::info!(
            "renderer stopped after {} frames",
            self.animation.frames()
        );
    }
}
