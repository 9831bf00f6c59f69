use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use euler3d::{Frame, Surface};
use std::io::{self, Write};

/// Rows kept free under the viewport for the status bar
pub const STATUS_ROWS: u16 = 2;
/// Each cell shows two pixels stacked with an upper half block
const HALF_BLOCK: char = '▀';

/// Pixel size of the viewport for a terminal of `cols` x `rows` cells
pub fn viewport_pixels(cols: u16, rows: u16) -> (u32, u32) {
    (cols as u32, rows.saturating_sub(STATUS_ROWS) as u32 * 2)
}

/// The terminal as a drawing surface
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalSurface;

impl Surface for TerminalSurface {
    fn size(&self) -> Option<(u32, u32)> {
        termsize::get().map(|size| viewport_pixels(size.cols, size.rows))
    }
}

/// Puts the terminal into raw, full-screen mode and restores it on drop
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide, EnableMouseCapture)?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            DisableMouseCapture,
            ResetColor,
            Show,
            LeaveAlternateScreen
        );
        let _ = disable_raw_mode();
    }
}

/// Text drawn over the image, centred on a pixel position
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub fg: (u8, u8, u8),
    pub bg: Option<(u8, u8, u8)>,
}

/// Where a centred run of `len` characters lands in the cell grid: column,
/// row, and how many leading characters fall off the left edge
pub fn place_text(x: f64, y: f64, len: usize, cols: u16, rows: u16) -> Option<(u16, u16, usize)> {
    let row = (y / 2.0).floor() as i64;
    if row < 0 || row >= rows as i64 {
        return None;
    }
    let start = (x - len as f64 / 2.0).round() as i64;
    let end = start + len as i64;
    if end <= 0 || start >= cols as i64 {
        return None;
    }
    let skip = (-start).max(0) as usize;
    Some((start.max(0) as u16, row as u16, skip))
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb { r, g, b }
}

/// Writes frames to the terminal as half-block cells
pub struct Presenter<W: Write> {
    out: W,
    clear_pending: bool,
}

impl<W: Write> Presenter<W> {
    pub fn new(out: W) -> Self {
        Presenter {
            out,
            clear_pending: true,
        }
    }

    /// Wipes the screen before the next frame, e.g. after a resize
    pub fn invalidate(&mut self) {
        self.clear_pending = true;
    }

    pub fn present(
        &mut self,
        frame: &Frame<'_>,
        annotations: &[Annotation],
        hud: &[String],
        status: &[String],
    ) -> io::Result<()> {
        if self.clear_pending {
            queue!(self.out, ResetColor, Clear(ClearType::All))?;
            self.clear_pending = false;
        }

        let image = frame.image;
        let (width, height) = image.size();
        let cols = width.min(u16::MAX as u32) as u16;
        let rows = (height / 2).min(u16::MAX as u32) as u16;

        for row in 0..rows {
            queue!(self.out, MoveTo(0, row))?;
            let mut last = None;
            for x in 0..cols as u32 {
                let top = image.get(x, row as u32 * 2).to_srgb8();
                let bottom = image.get(x, row as u32 * 2 + 1).to_srgb8();
                if last != Some((top, bottom)) {
                    queue!(
                        self.out,
                        SetForegroundColor(rgb(top)),
                        SetBackgroundColor(rgb(bottom))
                    )?;
                    last = Some((top, bottom));
                }
                queue!(self.out, Print(HALF_BLOCK))?;
            }
        }

        let labels = frame.labels.iter().map(|label| Annotation {
            text: label.text.clone(),
            x: label.x,
            y: label.y,
            fg: label.color.to_srgb8(),
            bg: None,
        });
        for annotation in labels.chain(annotations.iter().cloned()) {
            let len = annotation.text.chars().count();
            let Some((col, row, skip)) = place_text(annotation.x, annotation.y, len, cols, rows)
            else {
                continue;
            };
            let bg = annotation
                .bg
                .unwrap_or_else(|| image.get(col as u32, row as u32 * 2).to_srgb8());
            let visible: String = annotation
                .text
                .chars()
                .skip(skip)
                .take((cols - col) as usize)
                .collect();
            queue!(
                self.out,
                MoveTo(col, row),
                SetForegroundColor(rgb(annotation.fg)),
                SetBackgroundColor(rgb(bg)),
                Print(visible)
            )?;
        }

        queue!(self.out, ResetColor)?;
        for (row, line) in hud.iter().enumerate().take(rows as usize) {
            queue!(self.out, MoveTo(1, row as u16), Print(line))?;
        }
        for (offset, line) in status.iter().enumerate().take(STATUS_ROWS as usize) {
            let text: String = line.chars().take(cols as usize).collect();
            queue!(
                self.out,
                MoveTo(0, rows + offset as u16),
                Clear(ClearType::CurrentLine),
                Print(text)
            )?;
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use euler3d::graphics::Image;

    #[test]
    fn viewport_reserves_status_rows() {
        assert_eq!(viewport_pixels(80, 24), (80, 44));
        assert_eq!(viewport_pixels(80, 1), (80, 0));
    }

    #[test]
    fn text_is_centred_and_clipped() {
        assert_eq!(place_text(40.0, 10.0, 2, 80, 22), Some((39, 5, 0)));
        assert_eq!(place_text(0.0, 10.0, 4, 80, 22), Some((0, 5, 2)));
        assert_eq!(place_text(200.0, 10.0, 4, 80, 22), None);
        assert_eq!(place_text(40.0, 60.0, 4, 80, 22), None);
        assert_eq!(place_text(40.0, -1.0, 4, 80, 22), None);
    }

    #[test]
    fn presents_without_error() {
        let mut image = Image::new(4, 4);
        image.fill(euler3d::color::Rgb::WHITE);
        let frame = Frame {
            image: &image,
            labels: &[],
        };
        let mut presenter = Presenter::new(Vec::new());
        let note = Annotation {
            text: "e^(i·π)=-1".to_string(),
            x: 2.0,
            y: 1.0,
            fg: (0, 0, 0),
            bg: Some((0, 255, 255)),
        };
        presenter
            .present(&frame, &[note], &[], &["status".to_string()])
            .unwrap();
        let written = String::from_utf8(presenter.out).unwrap();
        assert!(written.contains(HALF_BLOCK));
        assert!(written.contains("status"));
    }
}
