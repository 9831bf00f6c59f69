use clap::Parser;
use euler3d::{BloomSettings, RendererConfig};
use std::path::PathBuf;

/// Euler's formula e^(iθ) = cos θ + i sin θ, animated on the complex plane
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Initial animation speed (0 to 2)
    #[arg(long, default_value_t = 0.5)]
    pub speed: f64,

    /// Initial angle in radians
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub theta: f64,

    /// Initial camera distance (2 to 10)
    #[arg(long, default_value_t = 5.0)]
    pub zoom: f64,

    /// Start with the glow pass turned off
    #[arg(long)]
    pub no_bloom: bool,

    #[arg(long, default_value_t = 1.0)]
    pub bloom_strength: f32,

    #[arg(long, default_value_t = 0.2)]
    pub bloom_radius: f32,

    #[arg(long, default_value_t = 0.1)]
    pub bloom_threshold: f32,

    /// Write log output to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig {
            bloom: BloomSettings {
                enabled: !self.no_bloom,
                strength: self.bloom_strength.max(0.0),
                radius: self.bloom_radius.clamp(0.0, 1.0),
                threshold: self.bloom_threshold.max(0.0),
            },
            ..RendererConfig::default()
        }
        .with_fps(self.fps)
    }
}
