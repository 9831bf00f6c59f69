use crate::camera::CameraRig;
use crate::pipeline::CompositingPipeline;

/// Keeps the camera projection and every render target on the surface's
/// pixel size
#[derive(Debug, Clone, Default)]
pub struct ResizeCoordinator {
    size: (u32, u32),
}

impl ResizeCoordinator {
    pub fn new(width: u32, height: u32) -> Self {
        ResizeCoordinator {
            size: (width, height),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Applies a new surface size. Returns whether anything changed.
    pub fn on_resize(
        &mut self,
        width: u32,
        height: u32,
        rig: &mut CameraRig,
        pipeline: &mut CompositingPipeline,
    ) -> bool {
        if self.size == (width, height) && pipeline.size() == (width, height) {
            return false;
        }
        log::debug!(
            "resizing from {}x{} to {}x{}",
            self.size.0,
            self.size.1,
            width,
            height
        );
        self.size = (width, height);
        if height > 0 {
            rig.set_aspect(width as f64 / height as f64);
        }
        pipeline.resize(width, height);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::config::BloomSettings;

    #[test]
    fn resize_updates_aspect_and_targets_together() {
        let mut rig = CameraRig::new(Camera::new(75.0, 1.0, 0.1, 1000.0), 0.05, 2.0, 15.0);
        let mut pipeline = CompositingPipeline::new(BloomSettings::default(), 40, 40);
        let mut coordinator = ResizeCoordinator::new(40, 40);

        assert!(coordinator.on_resize(160, 90, &mut rig, &mut pipeline));
        assert!((rig.camera().aspect - 160.0 / 90.0).abs() < 1e-12);
        assert_eq!(pipeline.base().size(), (160, 90));
        assert_eq!(pipeline.bloom().size(), (160, 90));
        assert_eq!(pipeline.overlay().size(), (160, 90));

        assert!(!coordinator.on_resize(160, 90, &mut rig, &mut pipeline));
    }

    #[test]
    fn zero_height_keeps_the_last_aspect() {
        let mut rig = CameraRig::new(Camera::new(75.0, 2.0, 0.1, 1000.0), 0.05, 2.0, 15.0);
        let mut pipeline = CompositingPipeline::new(BloomSettings::default(), 40, 20);
        let mut coordinator = ResizeCoordinator::new(40, 20);

        assert!(coordinator.on_resize(40, 0, &mut rig, &mut pipeline));
        assert_eq!(rig.camera().aspect, 2.0);
        assert_eq!(pipeline.size(), (40, 0));
    }
}
