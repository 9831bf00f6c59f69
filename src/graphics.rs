use crate::color::Rgb;
use crate::geometry::{Line, LineStyle, Marker};
use crate::math::{
    clip_segment_near, clip_segment_rect, clip_to_screen, lerp, pixels_per_unit, project_to_clip,
};
use crate::vertex::ScreenVertex;
use glam::DMat4;

/// Depth values within this distance count as equal, so later primitives on
/// the same plane win over earlier ones
const DEPTH_TOLERANCE: f32 = 1e-4;

/// A plain colour image in linear RGB
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Image {
    pub fn new(width: u32, height: u32) -> Self {
        Image {
            width,
            height,
            pixels: vec![Rgb::BLACK; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize(width as usize * height as usize, Rgb::BLACK);
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.iter_mut().for_each(|p| *p = color);
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Rgb {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Rgb) {
        let offset = (y * self.width + x) as usize;
        self.pixels[offset] = color;
    }

    /// Edge-clamped pixel fetch with signed coordinates
    pub fn get_clamped(&self, x: i64, y: i64) -> Rgb {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.get(x, y)
    }

    /// Bilinear sample at normalized coordinates, texel centres at half pixels
    pub fn sample_bilinear(&self, u: f64, v: f64) -> Rgb {
        if self.is_empty() {
            return Rgb::BLACK;
        }
        let x = u * self.width as f64 - 0.5;
        let y = v * self.height as f64 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = (x - x0) as f32;
        let fy = (y - y0) as f32;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top = self
            .get_clamped(x0, y0)
            .scale(1.0 - fx)
            .add(self.get_clamped(x0 + 1, y0).scale(fx));
        let bottom = self
            .get_clamped(x0, y0 + 1)
            .scale(1.0 - fx)
            .add(self.get_clamped(x0 + 1, y0 + 1).scale(fx));
        top.scale(1.0 - fy).add(bottom.scale(fy))
    }
}

/// Colour plus depth buffer for the 3D pass
#[derive(Debug, Clone)]
pub struct RenderTarget {
    color: Image,
    depth: Vec<f32>,
}

impl RenderTarget {
    pub fn new(width: u32, height: u32) -> Self {
        RenderTarget {
            color: Image::new(width, height),
            depth: vec![f32::INFINITY; width as usize * height as usize],
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.color.size()
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_empty()
    }

    pub fn color(&self) -> &Image {
        &self.color
    }

    pub fn color_mut(&mut self) -> &mut Image {
        &mut self.color
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.color.resize(width, height);
        self.depth.clear();
        self.depth
            .resize(width as usize * height as usize, f32::INFINITY);
    }

    pub fn clear(&mut self, background: Rgb) {
        self.color.fill(background);
        self.depth.iter_mut().for_each(|d| *d = f32::INFINITY);
    }

    /// Depth-tested write. Translucent fragments blend but leave depth alone.
    fn plot(&mut self, x: i64, y: i64, depth: f32, style: &LineStyle) {
        let (width, height) = self.size();
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            return;
        }
        let offset = y as usize * width as usize + x as usize;
        if depth > self.depth[offset] + DEPTH_TOLERANCE {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if style.is_opaque() {
            self.depth[offset] = depth;
            self.color.set(x, y, style.color);
        } else {
            let blended = style.color.over(self.color.get(x, y), style.opacity);
            self.color.set(x, y, blended);
        }
    }

    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depth[(y * self.color.width() + x) as usize]
    }
}

/// Projects and rasterizes every segment of `line`
pub fn draw_polyline(target: &mut RenderTarget, view_projection: &DMat4, line: &Line) {
    let (width, height) = target.size();
    for (a, b) in line.segment_pairs() {
        let ca = project_to_clip(view_projection, a.position);
        let cb = project_to_clip(view_projection, b.position);
        let Some(((ca, ta), (cb, tb))) = clip_segment_near(ca, cb) else {
            continue;
        };
        let (Some(sa), Some(sb)) = (
            clip_to_screen(ca, width, height),
            clip_to_screen(cb, width, height),
        ) else {
            continue;
        };
        let v0 = ScreenVertex {
            screen_position: [sa[0], sa[1]],
            depth: sa[2],
            line_distance: lerp(a.line_distance, b.line_distance, ta),
        };
        let v1 = ScreenVertex {
            screen_position: [sb[0], sb[1]],
            depth: sb[2],
            line_distance: lerp(a.line_distance, b.line_distance, tb),
        };
        draw_line(target, &v0, &v1, &line.style);
    }
}

/// Draws a line between two projected vertices using Bresenham's algorithm,
/// interpolating depth and dash distance along the major axis.
///
/// The segment is first trimmed to the viewport (plus a one pixel margin),
/// so endpoints far off screen still leave their visible part behind.
pub fn draw_line(target: &mut RenderTarget, v0: &ScreenVertex, v1: &ScreenVertex, style: &LineStyle) {
    let (width, height) = target.size();
    if [v0.screen_position, v1.screen_position]
        .iter()
        .flatten()
        .any(|c| !c.is_finite())
    {
        return;
    }
    let Some((t0, t1)) = clip_segment_rect(
        v0.screen_position,
        v1.screen_position,
        [-1.0, -1.0],
        [width as f64 + 1.0, height as f64 + 1.0],
    ) else {
        return;
    };
    let (v0, v1) = (v0.lerp(v1, t0), v0.lerp(v1, t1));

    let (mut x0, mut y0, x1, y1) = (
        v0.screen_position[0].floor() as i64,
        v0.screen_position[1].floor() as i64,
        v1.screen_position[0].floor() as i64,
        v1.screen_position[1].floor() as i64,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let steps = dx.max(-dy).max(1) as f64;
    let mut step = 0;

    loop {
        let t = step as f64 / steps;
        let drawn = style
            .dash
            .map_or(true, |dash| dash.is_drawn(lerp(v0.line_distance, v1.line_distance, t)));
        if drawn {
            let depth = lerp(v0.depth, v1.depth, t) as f32;
            target.plot(x0, y0, depth, style);
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
        step += 1;
    }
}

/// Draws a marker as a filled, screen-facing disc at least one pixel wide
pub fn draw_marker(target: &mut RenderTarget, view_projection: &DMat4, fov_y: f64, marker: &Marker) {
    let (width, height) = target.size();
    let clip = project_to_clip(view_projection, marker.center);
    let Some([cx, cy, depth]) = clip_to_screen(clip, width, height) else {
        return;
    };
    // For a perspective projection clip.w is the view-space depth
    let radius = marker.radius * pixels_per_unit(fov_y, height, clip.w);
    let depth = depth as f32;
    let style = LineStyle::solid(marker.color);
    let (px, py) = (cx.floor() as i64, cy.floor() as i64);
    target.plot(px, py, depth, &style);

    let reach = radius.ceil() as i64;
    for y in (py - reach)..=(py + reach) {
        for x in (px - reach)..=(px + reach) {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= radius * radius {
                target.plot(x, y, depth, &style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::geometry::Dash;
    use glam::DVec3;

    fn vertex(x: f64, y: f64, depth: f64, distance: f64) -> ScreenVertex {
        ScreenVertex {
            screen_position: [x, y],
            depth,
            line_distance: distance,
        }
    }

    fn lit(target: &RenderTarget) -> usize {
        target
            .color()
            .pixels()
            .iter()
            .filter(|p| **p != Rgb::BLACK)
            .count()
    }

    #[test]
    fn horizontal_line_covers_every_pixel() {
        let mut target = RenderTarget::new(16, 4);
        target.clear(Rgb::BLACK);
        draw_line(
            &mut target,
            &vertex(0.5, 1.5, 0.5, 0.0),
            &vertex(10.5, 1.5, 0.5, 1.0),
            &LineStyle::solid(Rgb::WHITE),
        );
        assert_eq!(lit(&target), 11);
        assert_eq!(target.color().get(10, 1), Rgb::WHITE);
    }

    #[test]
    fn dashed_line_leaves_gaps() {
        let mut target = RenderTarget::new(32, 2);
        target.clear(Rgb::BLACK);
        let style = LineStyle::solid(Rgb::WHITE).dashed(0.25, 0.25);
        draw_line(
            &mut target,
            &vertex(0.5, 0.5, 0.5, 0.0),
            &vertex(31.5, 0.5, 0.5, 3.1),
            &style,
        );
        let drawn = lit(&target);
        assert!(drawn > 8 && drawn < 24, "drawn {drawn}");
        assert!(Dash {
            dash_size: 0.25,
            gap_size: 0.25
        }
        .is_drawn(0.0));
        assert_eq!(target.color().get(0, 0), Rgb::WHITE);
    }

    #[test]
    fn nearer_fragments_win_the_depth_test() {
        let mut target = RenderTarget::new(8, 1);
        target.clear(Rgb::BLACK);
        let red = LineStyle::solid(Rgb::new(1.0, 0.0, 0.0));
        let blue = LineStyle::solid(Rgb::new(0.0, 0.0, 1.0));
        draw_line(&mut target, &vertex(0.5, 0.5, 0.2, 0.0), &vertex(7.5, 0.5, 0.2, 0.0), &red);
        draw_line(&mut target, &vertex(0.5, 0.5, 0.8, 0.0), &vertex(7.5, 0.5, 0.8, 0.0), &blue);
        assert_eq!(target.color().get(3, 0), Rgb::new(1.0, 0.0, 0.0));
        assert!((target.depth_at(3, 0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn translucent_lines_do_not_write_depth() {
        let mut target = RenderTarget::new(4, 1);
        target.clear(Rgb::BLACK);
        let ghost = LineStyle::translucent(Rgb::WHITE, 0.5);
        draw_line(&mut target, &vertex(0.5, 0.5, 0.1, 0.0), &vertex(3.5, 0.5, 0.1, 0.0), &ghost);
        assert_eq!(target.depth_at(1, 0), f32::INFINITY);
        assert!((target.color().get(1, 0).r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn lines_far_off_screen_keep_their_visible_part() {
        let mut target = RenderTarget::new(4, 4);
        target.clear(Rgb::BLACK);
        draw_line(
            &mut target,
            &vertex(-1e9, 0.5, 0.5, 0.0),
            &vertex(1e9, 0.5, 0.5, 0.0),
            &LineStyle::solid(Rgb::WHITE),
        );
        assert_eq!(lit(&target), 4);
        assert!((0..4).all(|x| target.color().get(x, 0) == Rgb::WHITE));
    }

    #[test]
    fn lines_outside_the_viewport_draw_nothing() {
        let mut target = RenderTarget::new(4, 4);
        target.clear(Rgb::BLACK);
        draw_line(
            &mut target,
            &vertex(-1e9, 50.0, 0.5, 0.0),
            &vertex(1e9, 60.0, 0.5, 0.0),
            &LineStyle::solid(Rgb::WHITE),
        );
        assert_eq!(lit(&target), 0);
    }

    #[test]
    fn segments_through_the_near_plane_stay_visible() {
        let mut camera = Camera::new(75.0, 1.0, 0.1, 1000.0);
        camera.position = DVec3::new(0.0, 0.0, 2.0);
        let mut target = RenderTarget::new(100, 100);
        target.clear(Rgb::BLACK);

        // Runs from the screen centre to a point just past the near plane
        let line = Line::segments(
            &[DVec3::ZERO, DVec3::new(3.0, 0.0, 1.95)],
            LineStyle::solid(Rgb::WHITE),
        );
        draw_polyline(&mut target, &camera.view_projection(), &line);

        assert!((50..100).all(|x| target.color().get(x, 50) == Rgb::WHITE));
        assert_eq!(lit(&target), 50);
    }

    #[test]
    fn clipped_lines_keep_depth_and_dashes_in_place() {
        let mut target = RenderTarget::new(10, 1);
        target.clear(Rgb::BLACK);
        let style = LineStyle::solid(Rgb::WHITE).dashed(3.0, 3.0);
        draw_line(
            &mut target,
            &vertex(-9.5, 0.5, 0.0, 0.0),
            &vertex(10.5, 0.5, 1.0, 20.0),
            &style,
        );
        let image = target.color();
        for x in [0, 1, 6, 7] {
            assert_eq!(image.get(x, 0), Rgb::BLACK, "x {x}");
        }
        for x in [3, 4] {
            assert_eq!(image.get(x, 0), Rgb::WHITE, "x {x}");
        }
        assert!((target.depth_at(4, 0) - 0.7).abs() < 0.03);
    }

    #[test]
    fn marker_is_at_least_one_pixel() {
        let mut target = RenderTarget::new(20, 20);
        target.clear(Rgb::BLACK);
        let view = DMat4::look_at_rh(DVec3::new(0.0, 0.0, 15.0), DVec3::ZERO, DVec3::Y);
        let vp = DMat4::perspective_rh(1.3, 1.0, 0.1, 1000.0) * view;
        let marker = Marker {
            center: DVec3::ZERO,
            radius: 0.001,
            color: Rgb::WHITE,
        };
        draw_marker(&mut target, &vp, 1.3, &marker);
        assert_eq!(lit(&target), 1);
        assert_eq!(target.color().get(10, 10), Rgb::WHITE);
    }

    #[test]
    fn bilinear_sampling_blends_neighbours() {
        let mut image = Image::new(2, 1);
        image.set(1, 0, Rgb::WHITE);
        let mid = image.sample_bilinear(0.5, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert_eq!(image.sample_bilinear(0.0, 0.5), Rgb::BLACK);
        assert_eq!(image.sample_bilinear(1.0, 0.5), Rgb::WHITE);
    }
}
