use euler3d::Orientation;
use std::f64::consts::{FRAC_PI_4, FRAC_PI_6, TAU};

pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 10.0;
pub const DEFAULT_ZOOM: f64 = 5.0;
pub const MAX_SPEED: f64 = 2.0;
pub const SPEED_STEP: f64 = 0.1;
/// θ advance per frame at speed 1
pub const ANGLE_PER_FRAME: f64 = 0.01;
pub const DEFAULT_ROTATION: Orientation = Orientation::new(FRAC_PI_6, FRAC_PI_4);

/// Application state owned by the host, fed to the renderer as it changes
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// Current angle, kept in [0, 2π)
    pub theta: f64,
    /// Animation speed multiplier
    pub speed: f64,
    /// θ advances on every frame while playing
    pub playing: bool,
    /// Camera distance requested by the zoom controls
    pub zoom: f64,
    /// Orbit orientation requested by the host
    pub rotation: Orientation,
    /// Enable debug mode
    pub debug: bool,
    /// Glow pass enabled
    pub bloom: bool,
}

impl AppState {
    pub fn new(theta: f64, speed: f64, zoom: f64, bloom: bool) -> Self {
        AppState {
            theta: theta.rem_euclid(TAU),
            speed: speed.clamp(0.0, MAX_SPEED),
            playing: true,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            rotation: DEFAULT_ROTATION,
            debug: false,
            bloom,
        }
    }

    /// Advances θ by one frame. Returns whether θ changed.
    pub fn advance(&mut self) -> bool {
        if !self.playing || self.speed == 0.0 {
            return false;
        }
        self.theta = (self.theta + self.speed * ANGLE_PER_FRAME).rem_euclid(TAU);
        true
    }

    pub fn scrub(&mut self, delta: f64) {
        self.theta = (self.theta + delta).rem_euclid(TAU);
    }

    pub fn change_speed(&mut self, delta: f64) {
        let stepped = ((self.speed + delta) / SPEED_STEP).round() * SPEED_STEP;
        self.speed = stepped.clamp(0.0, MAX_SPEED);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom - 1.0).max(MIN_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom + 1.0).min(MAX_ZOOM);
    }

    /// Back to θ = 0, default zoom and rotation, playing
    pub fn reset(&mut self) {
        self.theta = 0.0;
        self.zoom = DEFAULT_ZOOM;
        self.rotation = DEFAULT_ROTATION;
        self.playing = true;
    }

    pub fn degrees(&self) -> f64 {
        self.theta.to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advancing_wraps_theta() {
        let mut state = AppState::new(TAU - 0.001, 0.5, 5.0, true);
        assert!(state.advance());
        assert!(state.theta < 0.01);
        assert!((state.theta - 0.004).abs() < 1e-9);
    }

    #[test]
    fn paused_state_holds_theta() {
        let mut state = AppState::new(1.0, 0.5, 5.0, true);
        state.playing = false;
        assert!(!state.advance());
        assert_eq!(state.theta, 1.0);
    }

    #[test]
    fn zoom_controls_clamp() {
        let mut state = AppState::new(0.0, 0.5, 5.0, true);
        for _ in 0..10 {
            state.zoom_in();
        }
        assert_eq!(state.zoom, MIN_ZOOM);
        for _ in 0..20 {
            state.zoom_out();
        }
        assert_eq!(state.zoom, MAX_ZOOM);
    }

    #[test]
    fn speed_snaps_to_steps() {
        let mut state = AppState::new(0.0, 0.5, 5.0, true);
        state.change_speed(SPEED_STEP);
        assert!((state.speed - 0.6).abs() < 1e-9);
        for _ in 0..30 {
            state.change_speed(SPEED_STEP);
        }
        assert_eq!(state.speed, MAX_SPEED);
        for _ in 0..30 {
            state.change_speed(-SPEED_STEP);
        }
        assert_eq!(state.speed, 0.0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = AppState::new(3.0, 1.5, 9.0, true);
        state.playing = false;
        state.rotation = Orientation::new(0.0, 0.0);
        state.reset();
        assert_eq!(state.theta, 0.0);
        assert_eq!(state.zoom, DEFAULT_ZOOM);
        assert_eq!(state.rotation, DEFAULT_ROTATION);
        assert!(state.playing);
        assert!((state.speed - 1.5).abs() < 1e-12);
    }
}
