use crate::camera::{DAMPING_FACTOR, MAX_DISTANCE, MIN_DISTANCE};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub enabled: bool,
    /// Overall intensity of the glow
    pub strength: f32,
    /// Spatial extent, 0 favours the tight blur levels and 1 the wide ones
    pub radius: f32,
    /// Luma above which a pixel contributes to the glow
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        BloomSettings {
            enabled: true,
            strength: 1.0,
            radius: 0.2,
            threshold: 0.1,
        }
    }
}

/// Renderer tuning. `Default` matches the stock scene.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub fov_y_degrees: f64,
    pub near: f64,
    pub far: f64,
    pub damping: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub bloom: BloomSettings,
    pub frame_interval: Duration,
}

impl RendererConfig {
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.frame_interval = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
        self
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        RendererConfig {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            damping: DAMPING_FACTOR,
            min_distance: MIN_DISTANCE,
            max_distance: MAX_DISTANCE,
            bloom: BloomSettings::default(),
            frame_interval: Duration::from_micros(16_667),
        }
    }
}
