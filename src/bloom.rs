//! Glow post-process.
//!
//! Bright regions are extracted with a soft luminosity threshold, blurred
//! over a chain of successively halved targets and added back on top of the
//! base image. The `radius` setting shifts weight between the tight upper
//! levels and the wide lower ones.

use crate::color::Rgb;
use crate::config::BloomSettings;
use crate::graphics::Image;

pub const MIP_LEVELS: usize = 5;
const KERNEL_RADII: [usize; MIP_LEVELS] = [3, 5, 7, 9, 11];
const BLOOM_FACTORS: [f32; MIP_LEVELS] = [1.0, 0.8, 0.6, 0.4, 0.2];
/// Width of the smoothstep above the threshold
const SMOOTH_WIDTH: f32 = 0.01;

/// One level of the blur chain
#[derive(Debug, Clone)]
struct MipLevel {
    scratch: Image,
    blurred: Image,
    weights: Vec<f32>,
}

impl MipLevel {
    fn new(width: u32, height: u32, kernel_radius: usize) -> Self {
        MipLevel {
            scratch: Image::new(width, height),
            blurred: Image::new(width, height),
            weights: gaussian_weights(kernel_radius),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.scratch.resize(width, height);
        self.blurred.resize(width, height);
    }
}

#[derive(Debug, Clone)]
pub struct BloomPass {
    settings: BloomSettings,
    bright: Image,
    levels: Vec<MipLevel>,
}

impl BloomPass {
    pub fn new(settings: BloomSettings, width: u32, height: u32) -> Self {
        let levels = mip_sizes(width, height)
            .into_iter()
            .zip(KERNEL_RADII)
            .map(|((w, h), radius)| MipLevel::new(w, h, radius))
            .collect();
        BloomPass {
            settings,
            bright: Image::new(width, height),
            levels,
        }
    }

    /// Size of the full-resolution bright target
    pub fn size(&self) -> (u32, u32) {
        self.bright.size()
    }

    pub fn level_sizes(&self) -> Vec<(u32, u32)> {
        self.levels.iter().map(|l| l.blurred.size()).collect()
    }

    pub fn settings(&self) -> &BloomSettings {
        &self.settings
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.enabled = enabled;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.bright.resize(width, height);
        for (level, (w, h)) in self.levels.iter_mut().zip(mip_sizes(width, height)) {
            level.resize(w, h);
        }
    }

    pub fn release(&mut self) {
        self.resize(0, 0);
    }

    /// Adds the glow of `base` back onto it in place
    pub fn apply(&mut self, base: &mut Image) {
        if !self.settings.enabled || base.is_empty() || base.size() != self.bright.size() {
            return;
        }

        self.extract_bright(base);

        for index in 0..self.levels.len() {
            let (done, rest) = self.levels.split_at_mut(index);
            let source = match done.last() {
                Some(previous) => &previous.blurred,
                None => &self.bright,
            };
            let level = &mut rest[0];
            downsample(source, &mut level.blurred);
            blur_horizontal(&level.blurred, &mut level.scratch, &level.weights);
            blur_vertical(&level.scratch, &mut level.blurred, &level.weights);
        }

        self.composite(base);
    }

    /// Luminosity high pass: colour weighted by a smoothstep over the threshold
    fn extract_bright(&mut self, base: &Image) {
        let threshold = self.settings.threshold;
        for (bright, &pixel) in self.bright.pixels_mut().iter_mut().zip(base.pixels()) {
            let weight = smoothstep(threshold, threshold + SMOOTH_WIDTH, pixel.luma());
            *bright = pixel.scale(weight);
        }
    }

    fn composite(&self, base: &mut Image) {
        let (width, height) = base.size();
        let factors: Vec<f32> = BLOOM_FACTORS
            .iter()
            .map(|&f| self.settings.strength * lerp_bloom_factor(f, self.settings.radius))
            .collect();

        for y in 0..height {
            let v = (y as f64 + 0.5) / height as f64;
            for x in 0..width {
                let u = (x as f64 + 0.5) / width as f64;
                let glow = self
                    .levels
                    .iter()
                    .zip(&factors)
                    .fold(Rgb::BLACK, |acc, (level, &factor)| {
                        acc.add(level.blurred.sample_bilinear(u, v).scale(factor))
                    });
                let pixel = base.get(x, y).add(glow);
                base.set(x, y, pixel);
            }
        }
    }
}

/// Sizes of the blur chain, each half the previous and never below one pixel
fn mip_sizes(width: u32, height: u32) -> Vec<(u32, u32)> {
    let mut sizes = Vec::with_capacity(MIP_LEVELS);
    let (mut w, mut h) = (width, height);
    for _ in 0..MIP_LEVELS {
        w = if w == 0 { 0 } else { (w / 2).max(1) };
        h = if h == 0 { 0 } else { (h / 2).max(1) };
        sizes.push((w, h));
    }
    sizes
}

/// Normalized one-sided Gaussian weights with sigma equal to the radius
fn gaussian_weights(radius: usize) -> Vec<f32> {
    let sigma = radius as f32;
    let pdf = |i: usize| {
        let x = i as f32;
        0.398_94 * (-0.5 * x * x / (sigma * sigma)).exp() / sigma
    };
    let raw: Vec<f32> = (0..radius).map(pdf).collect();
    let total = raw[0] + 2.0 * raw[1..].iter().sum::<f32>();
    raw.into_iter().map(|w| w / total).collect()
}

/// Mirrors the factor around 0.6 as `radius` goes from 0 to 1
fn lerp_bloom_factor(factor: f32, radius: f32) -> f32 {
    factor + (1.2 - factor - factor) * radius
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn downsample(source: &Image, target: &mut Image) {
    let (width, height) = target.size();
    for y in 0..height {
        let v = (y as f64 + 0.5) / height as f64;
        for x in 0..width {
            let u = (x as f64 + 0.5) / width as f64;
            target.set(x, y, source.sample_bilinear(u, v));
        }
    }
}

fn blur_horizontal(source: &Image, target: &mut Image, weights: &[f32]) {
    let (width, height) = source.size();
    for y in 0..height {
        for x in 0..width {
            let mut sum = source.get(x, y).scale(weights[0]);
            for (i, &w) in weights.iter().enumerate().skip(1) {
                let i = i as i64;
                let left = source.get_clamped(x as i64 - i, y as i64);
                let right = source.get_clamped(x as i64 + i, y as i64);
                sum = sum.add(left.add(right).scale(w));
            }
            target.set(x, y, sum);
        }
    }
}

fn blur_vertical(source: &Image, target: &mut Image, weights: &[f32]) {
    let (width, height) = source.size();
    for y in 0..height {
        for x in 0..width {
            let mut sum = source.get(x, y).scale(weights[0]);
            for (i, &w) in weights.iter().enumerate().skip(1) {
                let i = i as i64;
                let up = source.get_clamped(x as i64, y as i64 - i);
                let down = source.get_clamped(x as i64, y as i64 + i);
                sum = sum.add(up.add(down).scale(w));
            }
            target.set(x, y, sum);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> BloomSettings {
        BloomSettings::default()
    }

    #[test]
    fn weights_sum_to_one() {
        for radius in KERNEL_RADII {
            let w = gaussian_weights(radius);
            let total = w[0] + 2.0 * w[1..].iter().sum::<f32>();
            assert!((total - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn mip_chain_halves_down_to_one_pixel() {
        assert_eq!(
            mip_sizes(100, 40),
            vec![(50, 20), (25, 10), (12, 5), (6, 2), (3, 1)]
        );
        assert_eq!(mip_sizes(3, 3)[4], (1, 1));
        assert_eq!(mip_sizes(0, 0)[0], (0, 0));
    }

    #[test]
    fn radius_mirrors_the_factors() {
        assert_eq!(lerp_bloom_factor(1.0, 0.0), 1.0);
        assert!((lerp_bloom_factor(1.0, 1.0) - 0.2).abs() < 1e-6);
        assert!((lerp_bloom_factor(0.6, 0.7) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn dark_pixels_do_not_glow() {
        let mut base = Image::new(32, 32);
        base.fill(Rgb::from_hex(crate::color::GRID));
        let before = base.clone();
        let mut bloom = BloomPass::new(settings(), 32, 32);
        bloom.apply(&mut base);
        assert_eq!(base, before);
    }

    #[test]
    fn bright_pixels_spread_into_their_neighbourhood() {
        let mut base = Image::new(32, 32);
        for x in 14..18 {
            for y in 14..18 {
                base.set(x, y, Rgb::from_hex(crate::color::ACCENT));
            }
        }
        let mut bloom = BloomPass::new(settings(), 32, 32);
        bloom.apply(&mut base);

        assert!(base.get(19, 16).g > 0.0, "glow should reach past the source");
        assert!(base.get(16, 16).g > Rgb::from_hex(crate::color::ACCENT).g);
        assert_eq!(base.get(16, 16).r, 0.0);
    }

    #[test]
    fn disabled_bloom_leaves_the_image_alone() {
        let mut base = Image::new(8, 8);
        base.fill(Rgb::WHITE);
        let mut bloom = BloomPass::new(settings(), 8, 8);
        bloom.set_enabled(false);
        bloom.apply(&mut base);
        assert!(base.pixels().iter().all(|p| *p == Rgb::WHITE));
    }

    #[test]
    fn resize_keeps_all_targets_together() {
        let mut bloom = BloomPass::new(settings(), 10, 10);
        bloom.resize(64, 32);
        assert_eq!(bloom.size(), (64, 32));
        assert_eq!(bloom.level_sizes()[0], (32, 16));
        bloom.release();
        assert_eq!(bloom.size(), (0, 0));
        assert!(bloom.level_sizes().iter().all(|s| *s == (0, 0)));
    }
}
