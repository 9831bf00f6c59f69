//! Real-time renderer for e^{iθ} = cos θ + i sin θ: a vector sweeping the
//! unit circle on the complex plane, seen through a damped orbit camera,
//! with a glow pass and screen-facing labels.

pub mod animation;
pub mod bloom;
pub mod camera;
pub mod classify;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod graphics;
pub mod math;
pub mod overlay;
pub mod pipeline;
pub mod renderer;
pub mod resize;
pub mod scene;
pub mod updater;
pub mod vertex;

pub use animation::{AnimationLoop, FrameClock, FrameHandle, FrameScheduler, LoopState};
pub use camera::{Camera, CameraRig, Orientation, ZoomDirection};
pub use classify::{classify, Highlight, HighlightTracker, IdentityClassifier, LocalClassifier};
pub use config::{BloomSettings, RendererConfig};
pub use error::{ClassifyError, RenderError};
pub use pipeline::Frame;
pub use renderer::{EulerRenderer, InitialState, RotationCallback, Surface, TickOutcome};
