//! Bitmap text for callout labels.
//!
//! Numbers and short labels are drawn from the 8x8 `font8x8` glyph set,
//! scaled to the requested pixel size. Each set glyph bit becomes one filled
//! square, so text stays crisp at any callout size without a font file.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use tiny_skia::{Color, Paint, Pixmap, Rect as SkRect, Transform};

use crate::geometry::Point;

/// Glyph cell size in font units.
const CELL: usize = 8;

/// Width and height of `text` drawn at `size` pixels per glyph cell.
pub fn measure(text: &str, size: f32) -> (f32, f32) {
    (text.chars().count() as f32 * size, size)
}

/// Largest glyph size that fits `text` into `max_width` x `max_height`.
pub fn fit_size(text: &str, max_width: f32, max_height: f32) -> f32 {
    let chars = text.chars().count().max(1) as f32;
    (max_width / chars).min(max_height).max(0.0)
}

/// Draw `text` with its top-left corner at `(x, y)`.
pub fn draw_text(pixmap: &mut Pixmap, text: &str, x: f32, y: f32, size: f32, color: Color) {
    if size <= 0.0 {
        return;
    }
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = false;

    let dot = size / CELL as f32;
    let mut cursor_x = x;
    for ch in text.chars() {
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'));
        if let Some(glyph) = glyph {
            for (row_idx, &row) in glyph.iter().enumerate() {
                for col_idx in 0..CELL {
                    if (row >> col_idx) & 1 == 0 {
                        continue;
                    }
                    let px = cursor_x + col_idx as f32 * dot;
                    let py = y + row_idx as f32 * dot;
                    if let Some(rect) = SkRect::from_xywh(px, py, dot, dot) {
                        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                    }
                }
            }
        }
        cursor_x += size;
    }
}

/// Draw `text` centred on `center`.
///
/// # Examples
///
/// ```
/// use snapguide::geometry::Point;
/// use snapguide::raster::glyphs::draw_text_centered;
/// use tiny_skia::{Color, Pixmap};
///
/// let mut pixmap = Pixmap::new(32, 32).unwrap();
/// draw_text_centered(&mut pixmap, "1", Point::new(16.0, 16.0), 16.0, Color::BLACK);
/// assert!(pixmap.pixels().iter().any(|p| p.alpha() > 0));
/// ```
pub fn draw_text_centered(pixmap: &mut Pixmap, text: &str, center: Point, size: f32, color: Color) {
    let (w, h) = measure(text, size);
    draw_text(pixmap, text, center.x - w / 2.0, center.y - h / 2.0, size, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure() {
        assert_eq!(measure("12", 10.0), (20.0, 10.0));
        assert_eq!(measure("", 10.0), (0.0, 10.0));
    }

    #[test]
    fn test_fit_size() {
        assert_eq!(fit_size("abcd", 40.0, 20.0), 10.0);
        assert_eq!(fit_size("a", 40.0, 20.0), 20.0);
    }

    #[test]
    fn test_draw_stays_inside_box() {
        let mut pixmap = Pixmap::new(40, 40).unwrap();
        draw_text(&mut pixmap, "8", 8.0, 8.0, 16.0, Color::BLACK);
        let width = pixmap.width() as usize;
        for (i, p) in pixmap.pixels().iter().enumerate() {
            if p.alpha() > 0 {
                let (x, y) = (i % width, i / width);
                assert!((8..24).contains(&x) && (8..24).contains(&y));
            }
        }
    }

    #[test]
    fn test_zero_size_draws_nothing() {
        let mut pixmap = Pixmap::new(8, 8).unwrap();
        draw_text(&mut pixmap, "1", 0.0, 0.0, 0.0, Color::BLACK);
        assert!(pixmap.pixels().iter().all(|p| p.alpha() == 0));
    }
}
