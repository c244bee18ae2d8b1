use std::io::Write;
use std::sync::OnceLock;

use unicode_width::UnicodeWidthChar;

pub type Rgb = (u8, u8, u8);

// slate-950, the night sky behind the card
pub const DEFAULT_BG: Rgb = (2, 6, 23);

static BG_COLOR: OnceLock<Rgb> = OnceLock::new();

pub fn set_background(color: Rgb) {
    // first call wins
    let _ = BG_COLOR.set(color);
}

pub fn background() -> Rgb {
    *BG_COLOR.get().unwrap_or(&DEFAULT_BG)
}

pub fn lerp_rgb(from: Rgb, to: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    (
        (from.0 as f32 * (1.0 - t) + to.0 as f32 * t) as u8,
        (from.1 as f32 * (1.0 - t) + to.1 as f32 * t) as u8,
        (from.2 as f32 * (1.0 - t) + to.2 as f32 * t) as u8,
    )
}

/// A raster of half-block pixels.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: usize,
    height: usize,
    // floats, so repeated translucent washes converge instead of stalling
    // on rounding
    pixels: Vec<[f32; 3]>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, fill: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![to_f32(fill); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize, fill: Rgb) {
        // old contents are discarded, like a browser canvas
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, to_f32(fill));
    }

    pub fn fill(&mut self, color: Rgb) {
        let c = to_f32(color);
        self.pixels.fill(c);
    }

    pub fn fade(&mut self, color: Rgb, alpha: f32) {
        let c = to_f32(color);
        let a = alpha.clamp(0.0, 1.0);
        for px in self.pixels.iter_mut() {
            for i in 0..3 {
                px[i] += (c[i] - px[i]) * a;
            }
        }
    }

    pub fn blend(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        // source-over; off-canvas writes are dropped
        if alpha <= 0.0 || x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let a = alpha.min(1.0);
        let c = to_f32(color);
        let px = &mut self.pixels[y as usize * self.width + x as usize];
        for i in 0..3 {
            px[i] += (c[i] - px[i]) * a;
        }
    }

    pub fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        // sub-pixel discs still cover the pixel they sit in
        if radius < 0.75 {
            self.blend(cx.floor() as i32, cy.floor() as i32, color, alpha);
            return;
        }

        let r2 = radius * radius;
        let x0 = (cx - radius).floor() as i32;
        let x1 = (cx + radius).ceil() as i32;
        let y0 = (cy - radius).floor() as i32;
        let y1 = (cy + radius).ceil() as i32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let px = self.pixels[y * self.width + x];
        Some((px[0].round() as u8, px[1].round() as u8, px[2].round() as u8))
    }

    pub fn copy_from(&mut self, other: &Canvas) {
        // anchored top-left, clipped to the smaller of the two
        let w = self.width.min(other.width);
        let h = self.height.min(other.height);
        for y in 0..h {
            let dst = y * self.width;
            let src = y * other.width;
            self.pixels[dst..dst + w].copy_from_slice(&other.pixels[src..src + w]);
        }
    }
}

fn to_f32(c: Rgb) -> [f32; 3] {
    [c.0 as f32, c.1 as f32, c.2 as f32]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub fg: Rgb,
    pub bold: bool,
}

impl Style {
    pub const fn new(fg: Rgb) -> Self {
        Self { fg, bold: false }
    }

    pub const fn bold(self) -> Self {
        Self { fg: self.fg, bold: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Cell {
    Empty,
    Glyph(char, Style),
    // right half of a double-width glyph
    Wide,
}

/// One screen's worth of output: a pixel canvas (two pixels per terminal
/// row) with a layer of text cells on top.
pub struct Frame {
    cols: usize,
    rows: usize,
    canvas: Canvas,
    cells: Vec<Cell>,
}

impl Frame {
    pub fn new(cols: usize, rows: usize, fill: Rgb) -> Self {
        Self {
            cols,
            rows,
            canvas: Canvas::new(cols, rows * 2, fill),
            cells: vec![Cell::Empty; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn resize(&mut self, cols: usize, rows: usize, fill: Rgb) {
        self.cols = cols;
        self.rows = rows;
        self.canvas.resize(cols, rows * 2, fill);
        self.cells.clear();
        self.cells.resize(cols * rows, Cell::Empty);
    }

    pub fn clear(&mut self, fill: Rgb) {
        self.canvas.fill(fill);
        self.cells.fill(Cell::Empty);
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Writes `text` starting at `(col, row)`, clipped at the right edge.
    /// Returns the number of columns used.
    pub fn put_str(&mut self, col: usize, row: usize, text: &str, style: Style) -> usize {
        if row >= self.rows {
            return 0;
        }
        let mut x = col;
        for ch in text.chars() {
            // zero-width and control characters are skipped
            let w = match ch.width() {
                Some(w) if w > 0 && !ch.is_control() => w,
                _ => continue,
            };
            if x + w > self.cols {
                break;
            }
            let idx = row * self.cols + x;
            self.cells[idx] = Cell::Glyph(ch, style);
            if w == 2 {
                self.cells[idx + 1] = Cell::Wide;
            }
            x += w;
        }
        x - col
    }

    pub fn put_centered(&mut self, row: usize, text: &str, style: Style) {
        let width = text_width(text);
        let col = self.cols.saturating_sub(width) / 2;
        self.put_str(col, row, text, style);
    }

    pub fn row_text(&self, row: usize) -> String {
        if row >= self.rows {
            return String::new();
        }
        let mut out = String::new();
        for cell in &self.cells[row * self.cols..(row + 1) * self.cols] {
            match cell {
                Cell::Empty => out.push(' '),
                Cell::Glyph(ch, _) => out.push(*ch),
                Cell::Wide => {}
            }
        }
        out.trim_end().to_string()
    }

    pub fn text(&self) -> String {
        (0..self.rows)
            .map(|r| self.row_text(r))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// ANSI truecolor output, two pixels per cell via the lower half block.
    pub fn encode(&self, out: &mut Vec<u8>) -> std::io::Result<()> {
        // cursor home, then overwrite everything
        out.extend_from_slice(b"\x1b[H");

        let mut prev_bg: Option<Rgb> = None;
        let mut prev_fg: Option<Rgb> = None;
        let mut prev_bold = false;

        for row in 0..self.rows {
            for col in 0..self.cols {
                let top = self.canvas.get(col, row * 2).unwrap_or(DEFAULT_BG);
                let bot = self.canvas.get(col, row * 2 + 1).unwrap_or(top);

                // text sits on the average of the two pixels behind it
                let (bg, fg, bold, ch) = match self.cells[row * self.cols + col] {
                    Cell::Wide => continue,
                    Cell::Empty => (top, bot, false, '▄'),
                    Cell::Glyph(ch, style) => (lerp_rgb(top, bot, 0.5), style.fg, style.bold, ch),
                };

                // only emit escapes when something changes
                if bold != prev_bold {
                    out.extend_from_slice(if bold { b"\x1b[1m" } else { b"\x1b[22m" });
                    prev_bold = bold;
                }
                if prev_bg != Some(bg) {
                    write!(out, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
                    prev_bg = Some(bg);
                }
                if prev_fg != Some(fg) {
                    write!(out, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
                    prev_fg = Some(fg);
                }

                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            // reset per row so a resize never bleeds color
            out.extend_from_slice(b"\x1b[0m");
            prev_bg = None;
            prev_fg = None;
            prev_bold = false;
            if row + 1 < self.rows {
                out.extend_from_slice(b"\r\n");
            }
        }
        Ok(())
    }
}

pub fn text_width(text: &str) -> usize {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|c| c.width().unwrap_or(0))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_moves_toward_overlay_without_clearing() {
        let mut canvas = Canvas::new(2, 2, (0, 0, 0));
        canvas.fill((200, 200, 200));
        canvas.fade((0, 0, 0), 0.2);
        assert_eq!(canvas.get(0, 0), Some((160, 160, 160)));
    }

    #[test]
    fn blend_ignores_out_of_bounds() {
        let mut canvas = Canvas::new(4, 4, (0, 0, 0));
        canvas.blend(-1, 0, (255, 0, 0), 1.0);
        canvas.blend(4, 4, (255, 0, 0), 1.0);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(canvas.get(x, y), Some((0, 0, 0)));
            }
        }
    }

    #[test]
    fn tiny_disc_covers_its_pixel() {
        let mut canvas = Canvas::new(10, 10, (0, 0, 0));
        canvas.fill_disc(3.4, 5.9, 0.3, (255, 255, 255), 1.0);
        assert_eq!(canvas.get(3, 5), Some((255, 255, 255)));
        assert_eq!(canvas.get(4, 5), Some((0, 0, 0)));
    }

    #[test]
    fn disc_uses_alpha() {
        let mut canvas = Canvas::new(10, 10, (0, 0, 0));
        canvas.fill_disc(5.0, 5.0, 2.0, (200, 100, 0), 0.5);
        assert_eq!(canvas.get(5, 5), Some((100, 50, 0)));
        assert_eq!(canvas.get(0, 0), Some((0, 0, 0)));
    }

    #[test]
    fn resize_resets_contents() {
        let mut canvas = Canvas::new(2, 2, (0, 0, 0));
        canvas.fill((9, 9, 9));
        canvas.resize(3, 1, (1, 2, 3));
        assert_eq!(canvas.width(), 3);
        assert_eq!(canvas.height(), 1);
        assert_eq!(canvas.get(2, 0), Some((1, 2, 3)));
        assert_eq!(canvas.get(0, 1), None);
    }

    #[test]
    fn put_str_clips_and_handles_wide_chars() {
        let mut frame = Frame::new(6, 2, DEFAULT_BG);
        assert_eq!(frame.put_str(0, 0, "héllo world", Style::new((255, 255, 255))), 6);
        assert_eq!(frame.row_text(0), "héllo");
        frame.put_str(1, 1, "日本", Style::new((255, 255, 255)));
        assert_eq!(frame.row_text(1), " 日本");
    }

    #[test]
    fn put_centered_centers() {
        let mut frame = Frame::new(10, 1, DEFAULT_BG);
        frame.put_centered(0, "abcd", Style::new((255, 255, 255)));
        assert_eq!(frame.row_text(0), "   abcd");
    }

    #[test]
    fn encode_emits_half_blocks_and_text() {
        let mut frame = Frame::new(3, 2, (0, 0, 0));
        frame.put_str(1, 1, "x", Style::new((255, 0, 0)).bold());
        let mut out = Vec::new();
        frame.encode(&mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.starts_with("\x1b[H"));
        assert!(s.contains('▄'));
        assert!(s.contains("\x1b[1m"));
        assert!(s.contains("\x1b[38;2;255;0;0mx"));
        assert_eq!(s.matches("\r\n").count(), 1);
    }
}
