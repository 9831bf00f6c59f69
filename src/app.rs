use crate::cli::Args;
use crate::state::AppState;
use crate::terminal::{viewport_pixels, Annotation, Presenter, TerminalSurface};
use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use euler3d::color::{Rgb, ACCENT};
use euler3d::{
    EulerRenderer, FrameClock, HighlightTracker, InitialState, LocalClassifier, Orientation,
    ZoomDirection,
};
use std::cell::Cell;
use std::f64::consts::TAU;
use std::io::{self, BufWriter, Stdout};
use std::rc::Rc;
use std::time::Instant;

/// θ change per arrow key press
const SCRUB_STEP: f64 = 0.05;
/// Orbit per i/j/k/l press
const ORBIT_STEP: f64 = 0.1;
/// Fraction of the half extents at which the highlight card sits
const CARD_RADIUS: f64 = 0.58;
const CARD_FG: (u8, u8, u8) = (10, 10, 20);

/// Frames per second over the last full second
struct FpsCounter {
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl FpsCounter {
    fn new() -> Self {
        FpsCounter {
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    fn frame(&mut self, now: Instant) {
        self.frames_since_last_update += 1;
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }
    }
}

/// Where the highlight card goes for `theta` in a `width` x `height` viewport
pub fn card_position(theta: f64, width: u32, height: u32) -> (f64, f64) {
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    (
        cx + CARD_RADIUS * cx * theta.cos(),
        cy - CARD_RADIUS * cy * theta.sin(),
    )
}

/// Terminal host: owns the application state and feeds it to the renderer
pub struct App {
    state: AppState,
    renderer: EulerRenderer<TerminalSurface, FrameClock>,
    highlight: HighlightTracker<LocalClassifier>,
    rotation_feedback: Rc<Cell<Option<Orientation>>>,
    presenter: Presenter<BufWriter<Stdout>>,
    fps: FpsCounter,
    drag_from: Option<(u16, u16)>,
    quit: bool,
}

impl App {
    pub fn new(args: &Args) -> anyhow::Result<Self> {
        let config = args.renderer_config();
        let state = AppState::new(args.theta, args.speed, args.zoom, config.bloom.enabled);
        let initial = InitialState {
            theta: state.theta,
            zoom: state.zoom,
            rotation: state.rotation,
        };

        let rotation_feedback = Rc::new(Cell::new(None));
        let sink = Rc::clone(&rotation_feedback);
        let renderer = EulerRenderer::new(
            TerminalSurface,
            FrameClock::new(config.frame_interval),
            &config,
            initial,
        )
        .context("no terminal to draw into")?
        .with_rotation_callback(Box::new(move |orientation: Orientation| {
            sink.set(Some(orientation))
        }));

        let mut highlight = HighlightTracker::new(LocalClassifier);
        let now = Instant::now();
        highlight.observe(state.theta, now);
        highlight.poll(now);

        Ok(App {
            state,
            renderer,
            highlight,
            rotation_feedback,
            presenter: Presenter::new(BufWriter::new(io::stdout())),
            fps: FpsCounter::new(),
            drag_from: None,
            quit: false,
        })
    }

    /// Runs until the user quits, then tears the renderer down
    pub fn run(&mut self) -> anyhow::Result<()> {
        while !self.quit {
            let Some(deadline) = self.renderer.scheduler().deadline() else {
                break;
            };
            loop {
                let wait = deadline.saturating_duration_since(Instant::now());
                if !event::poll(wait)? {
                    break;
                }
                self.handle_event(event::read()?);
                if self.quit {
                    break;
                }
            }
            if !self.quit {
                self.frame();
            }
        }
        self.renderer.teardown();
        Ok(())
    }

    fn frame(&mut self) {
        let now = Instant::now();
        if self.state.advance() {
            self.renderer.apply_angle(self.state.theta);
        }
        if let Some(orientation) = self.rotation_feedback.take() {
            self.state.rotation = orientation;
        }
        self.highlight.observe(self.state.theta, now);
        self.highlight.poll(now);

        self.renderer.tick();
        self.fps.frame(now);

        let annotations = self.annotations();
        let hud = self.hud();
        let status = self.status();
        if let Err(err) = self
            .presenter
            .present(&self.renderer.frame(), &annotations, &hud, &status)
        {
            log::warn!("failed to present frame: {err}");
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => {
                let (width, height) = viewport_pixels(cols, rows);
                log::debug!("terminal resized to {cols}x{rows} cells");
                self.renderer.on_resize(width, height);
                self.presenter.invalidate();
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
                self.state.playing = !self.state.playing;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.state.zoom_in();
                self.renderer.apply_zoom_state(self.state.zoom);
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                self.state.zoom_out();
                self.renderer.apply_zoom_state(self.state.zoom);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.state.reset();
                self.renderer.apply_angle(self.state.theta);
                self.renderer.apply_zoom_state(self.state.zoom);
                self.renderer.apply_external_orientation(self.state.rotation);
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                self.state.bloom = !self.state.bloom;
                self.renderer.set_bloom_enabled(self.state.bloom);
            }
            KeyCode::Char('d') | KeyCode::Char('D') => self.state.debug = !self.state.debug,
            KeyCode::Left => {
                self.state.scrub(-SCRUB_STEP);
                self.renderer.apply_angle(self.state.theta);
            }
            KeyCode::Right => {
                self.state.scrub(SCRUB_STEP);
                self.renderer.apply_angle(self.state.theta);
            }
            KeyCode::Up => self.state.change_speed(crate::state::SPEED_STEP),
            KeyCode::Down => self.state.change_speed(-crate::state::SPEED_STEP),
            KeyCode::Char('j') => self.renderer.orbit_by(-ORBIT_STEP, 0.0),
            KeyCode::Char('l') => self.renderer.orbit_by(ORBIT_STEP, 0.0),
            KeyCode::Char('i') => self.renderer.orbit_by(0.0, ORBIT_STEP),
            KeyCode::Char('k') => self.renderer.orbit_by(0.0, -ORBIT_STEP),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_from = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some((col, row)) = self.drag_from else {
                    self.drag_from = Some((mouse.column, mouse.row));
                    return;
                };
                let (_, height) = self.renderer.pipeline().size();
                let height = height.max(1) as f64;
                // One cell is one pixel wide and two pixels tall
                let dx = mouse.column as f64 - col as f64;
                let dy = (mouse.row as f64 - row as f64) * 2.0;
                self.renderer
                    .orbit_by(-TAU * dx / height, TAU * dy / height);
                self.drag_from = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag_from = None,
            MouseEventKind::ScrollUp => self.renderer.set_zoom_request(ZoomDirection::In),
            MouseEventKind::ScrollDown => self.renderer.set_zoom_request(ZoomDirection::Out),
            _ => {}
        }
    }

    fn annotations(&self) -> Vec<Annotation> {
        let Some((card, visible)) = self.highlight.card() else {
            return Vec::new();
        };
        let (width, height) = self.renderer.pipeline().size();
        let (x, y) = card_position(self.state.theta, width, height);
        let accent = Rgb::from_hex(ACCENT);
        let bg = if visible {
            accent.to_srgb8()
        } else {
            accent.scale(0.35).to_srgb8()
        };
        vec![Annotation {
            text: format!(" {} ", card.identity),
            x,
            y,
            fg: CARD_FG,
            bg: Some(bg),
        }]
    }

    fn hud(&self) -> Vec<String> {
        if !self.state.debug {
            return Vec::new();
        }
        let camera = self.renderer.camera();
        let orientation = self.renderer.rig().orientation();
        let (width, height) = self.renderer.pipeline().size();
        vec![
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!(
                "FPS: {:.2} (target {:.0})",
                self.fps.fps,
                1.0 / self.renderer.scheduler().interval().as_secs_f64()
            ),
            format!("θ: {:.4} rad", self.state.theta),
            format!("Viewport: {width}x{height}"),
            format!(
                "Pitch: {:.2}, Yaw: {:.2}",
                orientation.pitch, orientation.yaw
            ),
            format!(
                "Distance: {:.2} (target {:.2})",
                camera.distance(),
                self.renderer.rig().desired_distance()
            ),
            format!("Bloom: {}", if self.state.bloom { "on" } else { "off" }),
            format!("Frames: {}", self.renderer.animation().frames()),
        ]
    }

    fn status(&self) -> Vec<String> {
        let theta = self.state.theta;
        let mode = if self.state.playing { "Playing" } else { "Paused" };
        vec![
            format!(
                " θ = {:.1}°  speed {:.1}  e^(i·θ) = {:.3} + i({:.3})  [{mode}]",
                self.state.degrees(),
                self.state.speed,
                theta.cos(),
                theta.sin()
            ),
            " space play/pause  ←/→ scrub  ↑/↓ speed  +/- zoom  drag/ijkl orbit  b bloom  r reset  d debug  q quit"
                .to_string(),
        ]
    }
}
