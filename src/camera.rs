//! Perspective camera and the damped orbit rig that steers it.
//!
//! The rig keeps two poses around a fixed target: the *current* pose the
//! camera is rendered from, and the *desired* pose requested from outside.
//! Every tick the current pose approaches the desired one by a constant
//! fraction, so motion eases out without ever overshooting.

use crate::math::{project_to_clip, ClipPoint};
use glam::{DMat4, DVec3};
use std::f64::consts::FRAC_PI_2;

/// Orbit orientation around the target.
///
/// `pitch` is the elevation above the XZ plane and `yaw` the rotation about
/// +Y measured from +Z, both in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub pitch: f64,
    pub yaw: f64,
}

impl Orientation {
    pub const fn new(pitch: f64, yaw: f64) -> Self {
        Orientation { pitch, yaw }
    }

    /// Orientation that looks at the origin from `offset`
    pub fn from_offset(offset: DVec3) -> Self {
        let horizontal = (offset.x * offset.x + offset.z * offset.z).sqrt();
        Orientation {
            pitch: offset.y.atan2(horizontal),
            yaw: offset.x.atan2(offset.z),
        }
    }

    /// Unit vector from the target towards the eye
    pub fn offset_direction(&self) -> DVec3 {
        let (sp, cp) = self.pitch.sin_cos();
        let (sy, cy) = self.yaw.sin_cos();
        DVec3::new(cp * sy, sp, cp * cy)
    }

    fn clamped(self) -> Self {
        Orientation {
            pitch: self.pitch.clamp(-MAX_PITCH, MAX_PITCH),
            yaw: self.yaw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Keeps the camera off the poles, where the up vector degenerates
pub const MAX_PITCH: f64 = FRAC_PI_2 - 0.01;
pub const MIN_DISTANCE: f64 = 2.0;
pub const MAX_DISTANCE: f64 = 15.0;
pub const DAMPING_FACTOR: f64 = 0.05;
pub const ZOOM_STEP: f64 = 1.0;
/// Differences smaller than this snap straight to the target
const SETTLE_EPSILON: f64 = 1e-9;

/// Starting eye position before any external zoom or orientation arrives
pub const INITIAL_POSITION: DVec3 = DVec3::new(1.5, 1.5, 3.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    pub target: DVec3,
    pub fov_y: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera {
    pub fn new(fov_y_degrees: f64, aspect: f64, near: f64, far: f64) -> Self {
        Camera {
            position: INITIAL_POSITION,
            target: DVec3::ZERO,
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.position, self.target, DVec3::Y)
    }

    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Unit vector the camera looks along
    pub fn view_direction(&self) -> DVec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn distance(&self) -> f64 {
        self.position.distance(self.target)
    }

    pub fn clip(&self, world: DVec3) -> ClipPoint {
        project_to_clip(&self.view_projection(), world)
    }
}

/// Damped orbit controls around a target fixed at the origin
#[derive(Debug, Clone)]
pub struct CameraRig {
    camera: Camera,
    orientation: Orientation,
    distance: f64,
    desired_orientation: Orientation,
    desired_distance: f64,
    damping: f64,
    min_distance: f64,
    max_distance: f64,
}

impl CameraRig {
    pub fn new(camera: Camera, damping: f64, min_distance: f64, max_distance: f64) -> Self {
        let offset = camera.position - camera.target;
        let orientation = Orientation::from_offset(offset).clamped();
        let distance = offset.length().clamp(min_distance, max_distance);
        let mut rig = CameraRig {
            camera,
            orientation,
            distance,
            desired_orientation: orientation,
            desired_distance: distance,
            damping: damping.clamp(0.0, 1.0),
            min_distance,
            max_distance,
        };
        rig.sync_camera();
        rig
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn desired_orientation(&self) -> Orientation {
        self.desired_orientation
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn desired_distance(&self) -> f64 {
        self.desired_distance
    }

    pub fn set_aspect(&mut self, aspect: f64) {
        self.camera.aspect = aspect;
    }

    /// Moves the desired distance one step in or out
    pub fn set_zoom_request(&mut self, direction: ZoomDirection) {
        let step = match direction {
            ZoomDirection::In => -ZOOM_STEP,
            ZoomDirection::Out => ZOOM_STEP,
        };
        self.desired_distance = self.clamp_distance(self.desired_distance + step);
    }

    /// Sets the orientation the camera drifts towards
    pub fn apply_external_orientation(&mut self, orientation: Orientation) {
        self.desired_orientation = orientation.clamped();
    }

    /// Nudges the desired orientation, as a drag gesture would
    pub fn orbit_by(&mut self, delta_yaw: f64, delta_pitch: f64) -> Orientation {
        let o = self.desired_orientation;
        self.apply_external_orientation(Orientation::new(o.pitch + delta_pitch, o.yaw + delta_yaw));
        self.desired_orientation
    }

    /// Places the camera at `distance` along the current view direction,
    /// keeping its orientation. Takes effect immediately.
    pub fn apply_zoom_state(&mut self, distance: f64) {
        let distance = self.clamp_distance(distance);
        self.distance = distance;
        self.desired_distance = distance;
        let direction = self.camera.view_direction();
        let direction = if direction == DVec3::ZERO {
            -self.orientation.offset_direction()
        } else {
            direction
        };
        self.camera.position = self.camera.target - direction * distance;
    }

    /// Advances the damping by one tick. Returns whether the camera moved.
    pub fn update(&mut self) -> bool {
        let pitch = approach(self.orientation.pitch, self.desired_orientation.pitch, self.damping);
        let yaw = approach(self.orientation.yaw, self.desired_orientation.yaw, self.damping);
        let distance = approach(self.distance, self.desired_distance, self.damping);
        let moved = pitch != self.orientation.pitch
            || yaw != self.orientation.yaw
            || distance != self.distance;

        self.orientation = Orientation::new(pitch, yaw);
        self.distance = self.clamp_distance(distance);
        if moved {
            self.sync_camera();
        }
        moved
    }

    fn clamp_distance(&self, distance: f64) -> f64 {
        if distance.is_nan() {
            return self.distance;
        }
        distance.clamp(self.min_distance, self.max_distance)
    }

    fn sync_camera(&mut self) {
        self.camera.position =
            self.camera.target + self.orientation.offset_direction() * self.distance;
    }
}

/// Exponential approach of `current` towards `target`
fn approach(current: f64, target: f64, factor: f64) -> f64 {
    let delta = target - current;
    if delta.abs() < SETTLE_EPSILON {
        target
    } else {
        current + delta * factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_4, FRAC_PI_6};

    fn rig() -> CameraRig {
        CameraRig::new(
            Camera::new(75.0, 1.0, 0.1, 1000.0),
            DAMPING_FACTOR,
            MIN_DISTANCE,
            MAX_DISTANCE,
        )
    }

    #[test]
    fn starts_at_the_initial_position() {
        let rig = rig();
        assert!(rig.camera().position.distance(INITIAL_POSITION) < 1e-9);
        assert_eq!(rig.camera().target, DVec3::ZERO);
    }

    #[test]
    fn zoom_requests_stay_clamped_every_tick() {
        let mut rig = rig();
        let requests = [ZoomDirection::In; 10]
            .into_iter()
            .chain([ZoomDirection::Out; 30])
            .chain([ZoomDirection::In; 5]);
        for request in requests {
            rig.set_zoom_request(request);
            assert!((MIN_DISTANCE..=MAX_DISTANCE).contains(&rig.desired_distance()));
            for _ in 0..3 {
                rig.update();
                assert!((MIN_DISTANCE..=MAX_DISTANCE).contains(&rig.distance()));
                let d = rig.camera().distance();
                assert!(d >= MIN_DISTANCE - 1e-9 && d <= MAX_DISTANCE + 1e-9);
            }
        }
    }

    #[test]
    fn zoom_request_moves_by_one_unit() {
        let mut rig = rig();
        rig.apply_zoom_state(5.0);
        rig.set_zoom_request(ZoomDirection::In);
        assert!((rig.desired_distance() - 4.0).abs() < 1e-12);
        rig.set_zoom_request(ZoomDirection::Out);
        rig.set_zoom_request(ZoomDirection::Out);
        assert!((rig.desired_distance() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn zoom_state_preserves_the_view_direction() {
        let mut rig = rig();
        let before = rig.camera().view_direction();
        rig.apply_zoom_state(7.0);
        assert!(rig.camera().view_direction().distance(before) < 1e-12);
        assert!((rig.camera().distance() - 7.0).abs() < 1e-12);

        rig.apply_zoom_state(100.0);
        assert!((rig.camera().distance() - MAX_DISTANCE).abs() < 1e-12);
        rig.apply_zoom_state(-3.0);
        assert!((rig.camera().distance() - MIN_DISTANCE).abs() < 1e-12);
    }

    #[test]
    fn orientation_is_damped_without_overshoot() {
        let mut rig = rig();
        let target = Orientation::new(FRAC_PI_6, FRAC_PI_4);
        let start = rig.orientation();
        rig.apply_external_orientation(target);

        rig.update();
        let first = rig.orientation();
        let expected_pitch = start.pitch + (target.pitch - start.pitch) * DAMPING_FACTOR;
        assert!((first.pitch - expected_pitch).abs() < 1e-12);

        let mut previous_gap = (target.yaw - first.yaw).abs();
        for _ in 0..500 {
            rig.update();
            let gap = (target.yaw - rig.orientation().yaw).abs();
            assert!(gap <= previous_gap);
            previous_gap = gap;
        }
        assert_eq!(rig.orientation(), target);
        assert!(!rig.update());
    }

    #[test]
    fn pitch_is_kept_off_the_poles() {
        let mut rig = rig();
        rig.apply_external_orientation(Orientation::new(10.0, 0.0));
        assert_eq!(rig.desired_orientation().pitch, MAX_PITCH);
        let o = rig.orbit_by(0.5, -20.0);
        assert_eq!(o.pitch, -MAX_PITCH);
        assert!((o.yaw - 0.5).abs() < 1e-12);
    }

    #[test]
    fn orientation_round_trips_through_offset() {
        let o = Orientation::new(0.3, -1.2);
        let back = Orientation::from_offset(o.offset_direction() * 4.0);
        assert!((back.pitch - o.pitch).abs() < 1e-12);
        assert!((back.yaw - o.yaw).abs() < 1e-12);
    }
}
