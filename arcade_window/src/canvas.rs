//! ARGB framebuffer and drawing helpers.

/// Axis-aligned rectangle in board coordinates (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> f32 { self.x + self.w }
    pub fn bottom(&self) -> f32 { self.y + self.h }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

pub struct Canvas {
    width:  usize,
    height: usize,
    buf:    Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, buf: vec![0xFF000000; width * height] }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn pixels(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn clear(&mut self, color: u32) {
        self.buf.fill(color);
    }

    /// Fill `r`, clipped to the canvas.  Coordinates are truncated the way
    /// integer rects are.
    pub fn fill_rect(&mut self, r: Rect, color: u32) {
        let x0 = (r.x as i64).clamp(0, self.width as i64) as usize;
        let y0 = (r.y as i64).clamp(0, self.height as i64) as usize;
        let x1 = (r.x as i64 + r.w as i64).clamp(0, self.width as i64) as usize;
        let y1 = (r.y as i64 + r.h as i64).clamp(0, self.height as i64) as usize;
        if x1 <= x0 || y1 <= y0 { return; }
        for row in y0..y1 {
            self.buf[row * self.width + x0..row * self.width + x1].fill(color);
        }
    }

    /// Fill the ellipse inscribed in `r`.
    pub fn fill_ellipse(&mut self, r: Rect, color: u32) {
        let (rx, ry) = (r.w / 2.0, r.h / 2.0);
        if rx <= 0.0 || ry <= 0.0 { return; }
        let (cx, cy) = (r.x + rx, r.y + ry);
        let y0 = r.y.max(0.0) as usize;
        let y1 = (r.bottom().max(0.0) as usize).min(self.height);
        for row in y0..y1 {
            let dy = (row as f32 + 0.5 - cy) / ry;
            if dy.abs() > 1.0 { continue; }
            let half = rx * (1.0 - dy * dy).sqrt();
            self.fill_rect(Rect::new(cx - half, row as f32, 2.0 * half, 1.0), color);
        }
    }

    pub fn vline(&mut self, x: usize, color: u32) {
        if x >= self.width { return; }
        for row in 0..self.height {
            self.buf[row * self.width + x] = color;
        }
    }

    fn set(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    /// Draw `text` with the 3×5 font, each font pixel `scale`² screen pixels.
    pub fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let g = glyph(ch);
            for row in 0..5 {
                for col in 0..3 {
                    if g & (1 << (14 - (row * 3 + col))) == 0 { continue; }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            self.set(cx + col * scale + sx, y + row * scale + sy, color);
                        }
                    }
                }
            }
            cx += 4 * scale;
            if cx >= self.width { break; }
        }
    }
}

/// Width in pixels of `text` as drawn by [`Canvas::draw_text`].
pub fn text_width(text: &str, scale: usize) -> usize {
    let n = text.chars().count();
    if n == 0 { 0 } else { (n * 4 - 1) * scale.max(1) }
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 font, rows packed top to bottom, 3 bits per row, MSB = left column
// ────────────────────────────────────────────────────────────────────────────

const fn rows(r: [u16; 5]) -> u16 {
    (r[0] << 12) | (r[1] << 9) | (r[2] << 6) | (r[3] << 3) | r[4]
}

fn glyph(c: char) -> u16 {
    match c.to_ascii_uppercase() {
        '0' => rows([7, 5, 5, 5, 7]),
        '1' => rows([2, 6, 2, 2, 7]),
        '2' => rows([7, 1, 7, 4, 7]),
        '3' => rows([7, 1, 3, 1, 7]),
        '4' => rows([5, 5, 7, 1, 1]),
        '5' => rows([7, 4, 7, 1, 7]),
        '6' => rows([7, 4, 7, 5, 7]),
        '7' => rows([7, 1, 1, 2, 2]),
        '8' => rows([7, 5, 7, 5, 7]),
        '9' => rows([7, 5, 7, 1, 7]),
        'A' => rows([2, 5, 7, 5, 5]),
        'B' => rows([6, 5, 6, 5, 6]),
        'C' => rows([3, 4, 4, 4, 3]),
        'D' => rows([6, 5, 5, 5, 6]),
        'E' => rows([7, 4, 6, 4, 7]),
        'F' => rows([7, 4, 6, 4, 4]),
        'G' => rows([3, 4, 5, 5, 3]),
        'H' => rows([5, 5, 7, 5, 5]),
        'I' => rows([7, 2, 2, 2, 7]),
        'J' => rows([1, 1, 1, 5, 2]),
        'K' => rows([5, 5, 6, 5, 5]),
        'L' => rows([4, 4, 4, 4, 7]),
        'M' => rows([5, 7, 7, 5, 5]),
        'N' => rows([6, 5, 5, 5, 5]),
        'O' => rows([2, 5, 5, 5, 2]),
        'P' => rows([6, 5, 6, 4, 4]),
        'Q' => rows([2, 5, 5, 6, 3]),
        'R' => rows([6, 5, 6, 5, 5]),
        'S' => rows([3, 4, 2, 1, 6]),
        'T' => rows([7, 2, 2, 2, 2]),
        'U' => rows([5, 5, 5, 5, 7]),
        'V' => rows([5, 5, 5, 5, 2]),
        'W' => rows([5, 5, 7, 7, 5]),
        'X' => rows([5, 5, 2, 5, 5]),
        'Y' => rows([5, 5, 2, 2, 2]),
        'Z' => rows([7, 1, 2, 4, 7]),
        ':' => rows([0, 2, 0, 2, 0]),
        '|' => rows([2, 2, 2, 2, 2]),
        '=' => rows([0, 7, 0, 7, 0]),
        '-' => rows([0, 0, 7, 0, 0]),
        '.' => rows([0, 0, 0, 0, 2]),
        '!' => rows([2, 2, 2, 0, 2]),
        ' ' => 0,
        _   => rows([0, 0, 2, 0, 0]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersects_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(9.0, 9.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(0.0, 10.0, 5.0, 5.0)));
    }

    #[test]
    fn fill_rect_clips_to_canvas() {
        let mut c = Canvas::new(10, 10);
        c.fill_rect(Rect::new(-5.0, 8.0, 8.0, 20.0), 0xFFFFFFFF);
        assert_eq!(c.pixel(0, 9), Some(0xFFFFFFFF));
        assert_eq!(c.pixel(2, 9), Some(0xFFFFFFFF));
        assert_eq!(c.pixel(3, 9), Some(0xFF000000));
        assert_eq!(c.pixel(0, 7), Some(0xFF000000));
    }

    #[test]
    fn fill_rect_fully_outside_is_noop() {
        let mut c = Canvas::new(4, 4);
        c.fill_rect(Rect::new(50.0, 50.0, 3.0, 3.0), 0xFFFFFFFF);
        assert!(c.pixels().iter().all(|&p| p == 0xFF000000));
    }

    #[test]
    fn ellipse_fills_center_not_corner() {
        let mut c = Canvas::new(20, 20);
        c.fill_ellipse(Rect::new(0.0, 0.0, 20.0, 20.0), 0xFFFFFFFF);
        assert_eq!(c.pixel(10, 10), Some(0xFFFFFFFF));
        assert_eq!(c.pixel(0, 0), Some(0xFF000000));
    }

    #[test]
    fn text_draws_and_measures() {
        let mut c = Canvas::new(40, 10);
        c.draw_text("1", 0, 0, 1, 0xFFFFFFFF);
        // top row of '1' is .X.
        assert_eq!(c.pixel(1, 0), Some(0xFFFFFFFF));
        assert_eq!(c.pixel(0, 0), Some(0xFF000000));
        assert_eq!(text_width("AB", 2), 14);
        assert_eq!(text_width("", 2), 0);
    }
}
