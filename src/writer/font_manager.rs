//! Font metrics for PDF generation.
//!
//! The manual uses two Base-14 fonts, Helvetica and Helvetica-Bold, which
//! every viewer provides without embedding. Widths come from the standard
//! Adobe AFM files in units of 1/1000 em and are looked up by WinAnsi code,
//! so a measured string is exactly the string that gets drawn.

use super::content_stream::win_ansi_byte;
use super::pdf_writer::{FONT_BOLD, FONT_REGULAR};

/// Horizontal ellipsis, drawn as a single WinAnsi glyph.
pub const ELLIPSIS: char = '\u{2026}';

/// A text font used by the manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Helvetica
    Regular,
    /// Helvetica-Bold
    Bold,
}

impl Font {
    /// Page resource name (`F1`, `F2`).
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => FONT_REGULAR,
            Font::Bold => FONT_BOLD,
        }
    }

    /// PostScript name of the Base-14 font.
    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }

    /// Ascender height in em units.
    pub fn ascent(&self) -> f32 {
        0.718
    }

    /// Recommended baseline-to-baseline distance at `size`.
    pub fn line_height(&self, size: f32) -> f32 {
        size * 1.25
    }

    /// Width of one glyph in 1/1000 em.
    fn glyph_width(&self, code: u8) -> u16 {
        let table = match self {
            Font::Regular => &HELVETICA_WIDTHS,
            Font::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        match code {
            0x20..=0x7E => table[(code - 0x20) as usize],
            0x85 | 0x97 | 0x89 => 1000,
            0x91 | 0x92 => match self {
                Font::Regular => 222,
                Font::Bold => 278,
            },
            0x93 | 0x94 => match self {
                Font::Regular => 333,
                Font::Bold => 500,
            },
            0x95 => 350,
            0x96 => 556,
            0xA9 | 0xAE => 737,
            _ => 556,
        }
    }
}

/// Helvetica widths for codes 0x20..=0x7E.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

/// Helvetica-Bold widths for codes 0x20..=0x7E.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0x30
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 0x50
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 0x60
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 0x70
];

/// Width of `text` in points at `size`.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|ch| font.glyph_width(win_ansi_byte(ch)) as u32)
        .sum();
    units as f32 * size / 1000.0
}

/// Shorten `text` with a trailing ellipsis until it fits `max_width`.
///
/// Text that already fits is returned unchanged. If not even the ellipsis
/// fits, the result is empty.
///
/// # Examples
///
/// ```
/// use snapguide::writer::{text_width, truncate_to_width, Font};
///
/// let long = "Open the account settings and choose billing";
/// let short = truncate_to_width(long, Font::Regular, 10.0, 100.0);
/// assert!(short.ends_with('\u{2026}'));
/// assert!(text_width(&short, Font::Regular, 10.0) <= 100.0);
/// ```
pub fn truncate_to_width(text: &str, font: Font, size: f32, max_width: f32) -> String {
    if text_width(text, font, size) <= max_width {
        return text.to_string();
    }
    let ellipsis = text_width(&ELLIPSIS.to_string(), font, size);
    if ellipsis > max_width {
        return String::new();
    }

    let mut width = ellipsis;
    let mut out = String::new();
    for ch in text.chars() {
        let w = font.glyph_width(win_ansi_byte(ch)) as f32 * size / 1000.0;
        if width + w > max_width {
            break;
        }
        width += w;
        out.push(ch);
    }
    let mut out = out.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

/// Greedy word wrap to `max_width`.
///
/// Words longer than a full line are split between characters. Explicit
/// newlines start a new line; empty input yields no lines.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let space = text_width(" ", font, size);

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0;
        for word in paragraph.split_whitespace() {
            let word_width = text_width(word, font, size);
            if !current.is_empty() && current_width + space + word_width <= max_width {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_width;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if word_width <= max_width {
                current = word.to_string();
                current_width = word_width;
            } else {
                let mut pieces = split_word(word, font, size, max_width);
                let last = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
                current_width = text_width(&last, font, size);
                current = last;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

fn split_word(word: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0;
    for ch in word.chars() {
        let w = font.glyph_width(win_ansi_byte(ch)) as f32 * size / 1000.0;
        if !piece.is_empty() && width + w > max_width {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(ch);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        // "Hi" = H(722) + i(222)
        assert!((text_width("Hi", Font::Regular, 10.0) - 9.44).abs() < 1e-4);
        assert!(text_width("Hi", Font::Bold, 10.0) > text_width("Hi", Font::Regular, 10.0));
        assert_eq!(text_width("", Font::Regular, 12.0), 0.0);
    }

    #[test]
    fn test_proportional_variance() {
        let narrow = text_width("iiii", Font::Regular, 12.0);
        let wide = text_width("WWWW", Font::Regular, 12.0);
        assert!(wide > narrow * 3.0);
    }

    #[test]
    fn test_truncate_uses_measured_width() {
        // same character count, different widths
        let narrow = truncate_to_width("iiiiiiiiiiiiiiiiiiii", Font::Regular, 10.0, 60.0);
        let wide = truncate_to_width("WWWWWWWWWWWWWWWWWWWW", Font::Regular, 10.0, 60.0);
        assert!(narrow.chars().count() > wide.chars().count());
        assert!(text_width(&wide, Font::Regular, 10.0) <= 60.0);
        assert_eq!(truncate_to_width("fits", Font::Regular, 10.0, 60.0), "fits");
        assert_eq!(truncate_to_width("anything", Font::Regular, 10.0, 1.0), "");
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three four five six", Font::Regular, 10.0, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::Regular, 10.0) <= 60.0);
        }
        assert_eq!(lines.join(" "), "one two three four five six");
    }

    #[test]
    fn test_wrap_splits_long_words_and_newlines() {
        let lines = wrap_text("WWWWWWWWWWWW\nok", Font::Regular, 10.0, 30.0);
        assert_eq!(lines.last().map(String::as_str), Some("ok"));
        assert!(lines.len() >= 4);
        assert!(wrap_text("", Font::Regular, 10.0, 30.0).is_empty());
    }
}
