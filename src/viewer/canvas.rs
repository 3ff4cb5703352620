//! # Canvas
//!
//! Character-cell drawing surface handed to renderers.
//!
//! Renderers draw into an in-memory grid; the render loop then presents the
//! grid to a [`RenderStream`] in one pass, downgrading colors to whatever the
//! terminal supports.

use crate::viewer::io::RenderStream;
use anyhow::Result;
use crossterm::style::Color;

/// Character set used for glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasMode {
    /// 7-bit output only
    Ascii,
    #[default]
    Unicode,
}

/// Color depth of the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSupport {
    /// 1-bit, no color escapes at all
    Mono,
    /// 4-bit, the 16 ANSI colors
    Ansi16,
    /// 24-bit RGB
    TrueColor,
    /// Resolve from the environment at canvas construction
    #[default]
    AutoDetect,
}

impl ColorSupport {
    /// Resolve `AutoDetect` from `COLORTERM`, `TERM` and whether stdout is a tty
    pub fn detect() -> Self {
        let colorterm = std::env::var("COLORTERM").ok();
        let term = std::env::var("TERM").ok();
        let is_tty = atty::is(atty::Stream::Stdout);
        Self::detect_from(colorterm.as_deref(), term.as_deref(), is_tty)
    }

    pub fn detect_from(colorterm: Option<&str>, term: Option<&str>, is_tty: bool) -> Self {
        if !is_tty || term == Some("dumb") {
            return ColorSupport::Mono;
        }
        if matches!(colorterm, Some("truecolor") | Some("24bit")) {
            return ColorSupport::TrueColor;
        }
        match term {
            Some(t) if t.contains("color") => ColorSupport::Ansi16,
            _ => ColorSupport::Mono,
        }
    }

    fn resolve(self) -> Self {
        match self {
            ColorSupport::AutoDetect => Self::detect(),
            other => other,
        }
    }
}

/// 24-bit color as drawn by renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GREY: Rgb = Rgb(128, 128, 128);
    pub const RED: Rgb = Rgb(255, 64, 64);
    pub const GREEN: Rgb = Rgb(64, 255, 64);
    pub const BLUE: Rgb = Rgb(64, 128, 255);
    pub const YELLOW: Rgb = Rgb(255, 255, 64);
    pub const CYAN: Rgb = Rgb(64, 255, 255);
}

/// The 16 ANSI colors with their conventional xterm RGB values
const ANSI16: [(Rgb, Color); 16] = [
    (Rgb(0, 0, 0), Color::Black),
    (Rgb(128, 0, 0), Color::DarkRed),
    (Rgb(0, 128, 0), Color::DarkGreen),
    (Rgb(128, 128, 0), Color::DarkYellow),
    (Rgb(0, 0, 128), Color::DarkBlue),
    (Rgb(128, 0, 128), Color::DarkMagenta),
    (Rgb(0, 128, 128), Color::DarkCyan),
    (Rgb(192, 192, 192), Color::Grey),
    (Rgb(128, 128, 128), Color::DarkGrey),
    (Rgb(255, 0, 0), Color::Red),
    (Rgb(0, 255, 0), Color::Green),
    (Rgb(255, 255, 0), Color::Yellow),
    (Rgb(0, 0, 255), Color::Blue),
    (Rgb(255, 0, 255), Color::Magenta),
    (Rgb(0, 255, 255), Color::Cyan),
    (Rgb(255, 255, 255), Color::White),
];

fn nearest_ansi16(rgb: Rgb) -> Color {
    let distance = |c: Rgb| {
        let dr = i32::from(rgb.0) - i32::from(c.0);
        let dg = i32::from(rgb.1) - i32::from(c.1);
        let db = i32::from(rgb.2) - i32::from(c.2);
        dr * dr + dg * dg + db * db
    };
    ANSI16
        .iter()
        .min_by_key(|(c, _)| distance(*c))
        .map(|(_, color)| *color)
        .unwrap_or(Color::White)
}

/// One character cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: Option<Rgb>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            glyph: ' ',
            color: None,
        }
    }
}

/// Drawing surface
#[derive(Debug, Clone)]
pub struct Canvas {
    mode: CanvasMode,
    color_support: ColorSupport,
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    /// Create a canvas; `AutoDetect` is resolved here, once.
    pub fn new(mode: CanvasMode, color_support: ColorSupport) -> Self {
        Self {
            mode,
            color_support: color_support.resolve(),
            width: 0,
            height: 0,
            cells: Vec::new(),
        }
    }

    pub fn mode(&self) -> CanvasMode {
        self.mode
    }

    /// Resolved color depth, never `AutoDetect`
    pub fn color_support(&self) -> ColorSupport {
        self.color_support
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Resize the grid, clearing its contents when the size changes
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::default(); usize::from(width) * usize::from(height)];
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        Some(y as usize * usize::from(self.width) + x as usize)
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(i32::from(x), i32::from(y)).map(|i| &self.cells[i])
    }

    /// Put a single glyph; out-of-bounds positions are ignored
    pub fn put(&mut self, x: i32, y: i32, glyph: char, color: Option<Rgb>) {
        let glyph = match self.mode {
            CanvasMode::Ascii if !glyph.is_ascii() => '?',
            _ => glyph,
        };
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell { glyph, color };
        }
    }

    /// Write text starting at (x, y), clipped at the right edge
    pub fn text(&mut self, x: i32, y: i32, text: &str, color: Option<Rgb>) {
        for (offset, ch) in text.chars().enumerate() {
            self.put(x + offset as i32, y, ch, color);
        }
    }

    /// Plot a data point
    pub fn point(&mut self, x: i32, y: i32, color: Option<Rgb>) {
        let glyph = self.point_glyph();
        self.put(x, y, glyph, color);
    }

    /// Straight line between two cells (Bresenham)
    pub fn line(&mut self, from: (i32, i32), to: (i32, i32), color: Option<Rgb>) {
        let glyph = if from.1 == to.1 {
            self.hline_glyph()
        } else if from.0 == to.0 {
            self.vline_glyph()
        } else {
            self.point_glyph()
        };

        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put(x, y, glyph, color);
            if (x, y) == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn point_glyph(&self) -> char {
        match self.mode {
            CanvasMode::Ascii => '*',
            CanvasMode::Unicode => '•',
        }
    }

    pub fn hline_glyph(&self) -> char {
        match self.mode {
            CanvasMode::Ascii => '-',
            CanvasMode::Unicode => '─',
        }
    }

    pub fn vline_glyph(&self) -> char {
        match self.mode {
            CanvasMode::Ascii => '|',
            CanvasMode::Unicode => '│',
        }
    }

    pub fn fill_glyph(&self) -> char {
        match self.mode {
            CanvasMode::Ascii => '#',
            CanvasMode::Unicode => '█',
        }
    }

    /// Text of one row, for inspection
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.cell(x, y))
            .map(|c| c.glyph)
            .collect()
    }

    fn terminal_color(&self, color: Option<Rgb>) -> Option<Color> {
        let rgb = color?;
        match self.color_support {
            ColorSupport::TrueColor => Some(Color::Rgb {
                r: rgb.0,
                g: rgb.1,
                b: rgb.2,
            }),
            ColorSupport::Ansi16 => Some(nearest_ansi16(rgb)),
            ColorSupport::Mono | ColorSupport::AutoDetect => None,
        }
    }

    /// Write the whole grid to the terminal and flush
    pub fn present<RS: RenderStream + ?Sized>(&self, out: &mut RS) -> Result<()> {
        let mut current: Option<Color> = None;
        out.set_foreground(None)?;

        for y in 0..self.height {
            out.move_cursor(0, y)?;
            let mut run = String::with_capacity(usize::from(self.width));

            for x in 0..self.width {
                let Some(cell) = self.cell(x, y) else { continue };
                let color = self.terminal_color(cell.color);
                if color != current {
                    if !run.is_empty() {
                        out.write_all(run.as_bytes())?;
                        run.clear();
                    }
                    out.set_foreground(color)?;
                    current = color;
                }
                run.push(cell.glyph);
            }

            if !run.is_empty() {
                out.write_all(run.as_bytes())?;
            }
        }

        if current.is_some() {
            out.set_foreground(None)?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::io::{MockRenderStream, RenderCommand};

    fn canvas(mode: CanvasMode, color: ColorSupport) -> Canvas {
        let mut canvas = Canvas::new(mode, color);
        canvas.resize(8, 3);
        canvas
    }

    #[test]
    fn detect_should_prefer_truecolor_and_fall_back_to_mono() {
        assert_eq!(
            ColorSupport::detect_from(Some("truecolor"), Some("xterm-256color"), true),
            ColorSupport::TrueColor
        );
        assert_eq!(
            ColorSupport::detect_from(None, Some("xterm-256color"), true),
            ColorSupport::Ansi16
        );
        assert_eq!(
            ColorSupport::detect_from(Some("truecolor"), Some("xterm"), false),
            ColorSupport::Mono
        );
        assert_eq!(ColorSupport::detect_from(None, Some("dumb"), true), ColorSupport::Mono);
    }

    #[test]
    fn text_should_clip_at_edges() {
        let mut canvas = canvas(CanvasMode::Unicode, ColorSupport::Mono);
        canvas.text(5, 1, "abcdef", None);
        canvas.text(-2, 2, "xyz", None);
        assert_eq!(canvas.row_text(1), "     abc");
        assert_eq!(canvas.row_text(2), "z       ");
    }

    #[test]
    fn ascii_mode_should_replace_non_ascii_glyphs() {
        let mut canvas = canvas(CanvasMode::Ascii, ColorSupport::Mono);
        canvas.text(0, 0, "a°b", None);
        canvas.line((0, 1), (3, 1), None);
        assert_eq!(canvas.row_text(0), "a?b     ");
        assert_eq!(canvas.row_text(1), "----    ");
    }

    #[test]
    fn line_should_reach_both_endpoints() {
        let mut canvas = canvas(CanvasMode::Unicode, ColorSupport::Mono);
        canvas.line((0, 0), (7, 2), None);
        assert_eq!(canvas.cell(0, 0).map(|c| c.glyph), Some('•'));
        assert_eq!(canvas.cell(7, 2).map(|c| c.glyph), Some('•'));
    }

    #[test]
    fn present_should_downgrade_colors_to_ansi16() {
        let mut canvas = canvas(CanvasMode::Unicode, ColorSupport::Ansi16);
        canvas.text(0, 0, "hi", Some(Rgb(250, 10, 10)));

        let mut out = MockRenderStream::with_size((8, 3));
        canvas.present(&mut out).unwrap();

        let commands = out.get_commands();
        assert!(commands.contains(&RenderCommand::SetForeground(Some(Color::Red))));
        assert_eq!(commands.last(), Some(&RenderCommand::Flush));
        assert!(out.written_text().starts_with("hi"));
    }

    #[test]
    fn present_should_emit_no_colors_in_mono() {
        let mut canvas = canvas(CanvasMode::Unicode, ColorSupport::Mono);
        canvas.text(0, 0, "hi", Some(Rgb::RED));

        let mut out = MockRenderStream::new();
        canvas.present(&mut out).unwrap();

        assert!(out
            .get_commands()
            .iter()
            .all(|c| !matches!(c, RenderCommand::SetForeground(Some(_)))));
    }
}
