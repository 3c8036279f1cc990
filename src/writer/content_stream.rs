//! PDF content stream builder.
//!
//! Builds PDF content streams containing graphics and text operators
//! according to PDF specification ISO 32000-1:2008 Section 8-9.
//!
//! Coordinates are PDF user space: origin at the bottom-left of the page,
//! y growing upward. Text is shown with the Base-14 fonts and is encoded
//! to WinAnsi before it reaches the stream.

use super::object_serializer::format_real;

/// Operations that can be added to a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Set transformation matrix (cm)
    Transform(f32, f32, f32, f32, f32, f32),
    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,
    /// Set font and size (Tf)
    SetFont(String, f32),
    /// Set text matrix (Tm)
    SetTextMatrix(f32, f32, f32, f32, f32, f32),
    /// Show text (Tj), WinAnsi bytes
    ShowText(Vec<u8>),
    /// Set fill color RGB (rg)
    SetFillColorRGB(f32, f32, f32),
    /// Set stroke color RGB (RG)
    SetStrokeColorRGB(f32, f32, f32),
    /// Set line width (w)
    SetLineWidth(f32),
    /// Move to (m)
    MoveTo(f32, f32),
    /// Line to (l)
    LineTo(f32, f32),
    /// Curve to (c)
    CurveTo(f32, f32, f32, f32, f32, f32),
    /// Rectangle (re)
    Rectangle(f32, f32, f32, f32),
    /// Close path (h)
    ClosePath,
    /// Stroke (S)
    Stroke,
    /// Fill (f)
    Fill,
    /// Fill and stroke (B)
    FillStroke,
    /// Paint XObject (Do)
    PaintXObject(String),
}

/// Builder for PDF content streams.
#[derive(Debug, Default)]
pub struct ContentStreamBuilder {
    /// Operations in the stream
    operations: Vec<ContentStreamOp>,
    /// Current font name
    current_font: Option<String>,
    /// Current font size
    current_font_size: f32,
    /// Whether we're in a text object
    in_text_object: bool,
    /// XObject names painted so far, in first-use order
    xobjects: Vec<String>,
}

impl ContentStreamBuilder {
    /// Create a new content stream builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation to the stream.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Operations recorded so far.
    pub fn operations(&self) -> &[ContentStreamOp] {
        &self.operations
    }

    /// XObjects referenced by `Do`, in first-use order.
    pub fn xobjects(&self) -> &[String] {
        &self.xobjects
    }

    /// Begin a text object.
    pub fn begin_text(&mut self) -> &mut Self {
        if !self.in_text_object {
            self.op(ContentStreamOp::BeginText);
            self.in_text_object = true;
        }
        self
    }

    /// End a text object.
    pub fn end_text(&mut self) -> &mut Self {
        if self.in_text_object {
            self.op(ContentStreamOp::EndText);
            self.in_text_object = false;
        }
        self
    }

    /// Set font for text operations.
    pub fn set_font(&mut self, font_name: &str, size: f32) -> &mut Self {
        if self.current_font.as_deref() != Some(font_name) || self.current_font_size != size {
            self.op(ContentStreamOp::SetFont(font_name.to_string(), size));
            self.current_font = Some(font_name.to_string());
            self.current_font_size = size;
        }
        self
    }

    /// Show text with its baseline origin at `(x, y)`.
    pub fn text(&mut self, text: &str, x: f32, y: f32) -> &mut Self {
        self.begin_text();
        self.op(ContentStreamOp::SetTextMatrix(1.0, 0.0, 0.0, 1.0, x, y));
        self.op(ContentStreamOp::ShowText(encode_win_ansi(text)))
    }

    /// Set font, show one line of text and close the text object.
    pub fn text_line(&mut self, font: &str, size: f32, text: &str, x: f32, y: f32) -> &mut Self {
        self.begin_text();
        self.set_font(font, size);
        self.text(text, x, y);
        self.end_text()
    }

    /// Paint an image XObject into the box with lower-left corner `(x, y)`.
    pub fn draw_image(
        &mut self,
        resource_id: &str,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> &mut Self {
        self.end_text();
        if !self.xobjects.iter().any(|name| name == resource_id) {
            self.xobjects.push(resource_id.to_string());
        }

        self.op(ContentStreamOp::SaveState);
        self.op(ContentStreamOp::Transform(width, 0.0, 0.0, height, x, y));
        self.op(ContentStreamOp::PaintXObject(resource_id.to_string()));
        self.op(ContentStreamOp::RestoreState)
    }

    /// Set fill color, components in 0..=1.
    pub fn set_fill_color(&mut self, r: f32, g: f32, b: f32) -> &mut Self {
        self.op(ContentStreamOp::SetFillColorRGB(r, g, b))
    }

    /// Set stroke color, components in 0..=1.
    pub fn set_stroke_color(&mut self, r: f32, g: f32, b: f32) -> &mut Self {
        self.op(ContentStreamOp::SetStrokeColorRGB(r, g, b))
    }

    /// Set line width.
    pub fn set_line_width(&mut self, width: f32) -> &mut Self {
        self.op(ContentStreamOp::SetLineWidth(width))
    }

    /// Begin a new subpath.
    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.op(ContentStreamOp::MoveTo(x, y))
    }

    /// Straight segment to `(x, y)`.
    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.op(ContentStreamOp::LineTo(x, y))
    }

    /// Cubic Bézier segment.
    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> &mut Self {
        self.op(ContentStreamOp::CurveTo(x1, y1, x2, y2, x3, y3))
    }

    /// Rectangle path.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.op(ContentStreamOp::Rectangle(x, y, width, height))
    }

    /// Stroke the current path.
    pub fn stroke(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Stroke)
    }

    /// Fill the current path.
    pub fn fill(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Fill)
    }

    /// Fill, then stroke, the current path.
    pub fn fill_stroke(&mut self) -> &mut Self {
        self.op(ContentStreamOp::FillStroke)
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) -> &mut Self {
        self.op(ContentStreamOp::ClosePath)
    }

    /// Save graphics state.
    pub fn save_state(&mut self) -> &mut Self {
        self.end_text();
        self.op(ContentStreamOp::SaveState)
    }

    /// Restore graphics state.
    ///
    /// The font is part of the graphics state, so it is re-emitted on next use.
    pub fn restore_state(&mut self) -> &mut Self {
        self.end_text();
        self.current_font = None;
        self.op(ContentStreamOp::RestoreState)
    }

    /// Rounded rectangle with per-corner radii, clockwise from lower-left:
    /// `[lower_left, upper_left, upper_right, lower_right]`.
    ///
    /// Used for the two-tone step pill, whose halves round only their outer
    /// corners.
    pub fn rounded_rect_corners(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radii: [f32; 4],
    ) -> &mut Self {
        let max = (width / 2.0).min(height / 2.0).max(0.0);
        let [ll, ul, ur, lr] = radii.map(|r| r.clamp(0.0, max));
        let k = 0.552_284_8;
        let (x1, y1) = (x + width, y + height);

        self.move_to(x + ll, y)
            .line_to(x1 - lr, y)
            .curve_to(x1 - lr + lr * k, y, x1, y + lr - lr * k, x1, y + lr)
            .line_to(x1, y1 - ur)
            .curve_to(x1, y1 - ur + ur * k, x1 - ur + ur * k, y1, x1 - ur, y1)
            .line_to(x + ul, y1)
            .curve_to(x + ul - ul * k, y1, x, y1 - ul + ul * k, x, y1 - ul)
            .line_to(x, y + ll)
            .curve_to(x, y + ll - ll * k, x + ll - ll * k, y, x + ll, y)
            .close_path()
    }

    /// Build the content stream to bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for op in &self.operations {
            write_op(&mut buf, op);
            buf.push(b'\n');
        }
        // an unterminated text object is a syntax error in the stream
        if self.in_text_object {
            buf.extend_from_slice(b"ET\n");
        }
        buf
    }
}

fn num(v: f32) -> String {
    format_real(v as f64)
}

fn nums(values: &[f32]) -> String {
    values.iter().map(|v| num(*v)).collect::<Vec<_>>().join(" ")
}

/// Write a single operation to the buffer.
fn write_op(w: &mut Vec<u8>, op: &ContentStreamOp) {
    let line = match op {
        ContentStreamOp::SaveState => "q".to_string(),
        ContentStreamOp::RestoreState => "Q".to_string(),
        ContentStreamOp::Transform(a, b, c, d, e, f) => {
            format!("{} cm", nums(&[*a, *b, *c, *d, *e, *f]))
        },
        ContentStreamOp::BeginText => "BT".to_string(),
        ContentStreamOp::EndText => "ET".to_string(),
        ContentStreamOp::SetFont(name, size) => format!("/{} {} Tf", name, num(*size)),
        ContentStreamOp::SetTextMatrix(a, b, c, d, e, f) => {
            format!("{} Tm", nums(&[*a, *b, *c, *d, *e, *f]))
        },
        ContentStreamOp::ShowText(bytes) => {
            w.push(b'(');
            write_escaped(w, bytes);
            ") Tj".to_string()
        },
        ContentStreamOp::SetFillColorRGB(r, g, b) => format!("{} rg", nums(&[*r, *g, *b])),
        ContentStreamOp::SetStrokeColorRGB(r, g, b) => format!("{} RG", nums(&[*r, *g, *b])),
        ContentStreamOp::SetLineWidth(width) => format!("{} w", num(*width)),
        ContentStreamOp::MoveTo(x, y) => format!("{} m", nums(&[*x, *y])),
        ContentStreamOp::LineTo(x, y) => format!("{} l", nums(&[*x, *y])),
        ContentStreamOp::CurveTo(x1, y1, x2, y2, x3, y3) => {
            format!("{} c", nums(&[*x1, *y1, *x2, *y2, *x3, *y3]))
        },
        ContentStreamOp::Rectangle(x, y, width, height) => {
            format!("{} re", nums(&[*x, *y, *width, *height]))
        },
        ContentStreamOp::ClosePath => "h".to_string(),
        ContentStreamOp::Stroke => "S".to_string(),
        ContentStreamOp::Fill => "f".to_string(),
        ContentStreamOp::FillStroke => "B".to_string(),
        ContentStreamOp::PaintXObject(name) => format!("/{} Do", name),
    };
    w.extend_from_slice(line.as_bytes());
}

/// Escape special characters in a literal string body.
fn write_escaped(w: &mut Vec<u8>, bytes: &[u8]) {
    for &byte in bytes {
        match byte {
            b'(' => w.extend_from_slice(b"\\("),
            b')' => w.extend_from_slice(b"\\)"),
            b'\\' => w.extend_from_slice(b"\\\\"),
            b'\n' => w.extend_from_slice(b"\\n"),
            b'\r' => w.extend_from_slice(b"\\r"),
            _ => w.push(byte),
        }
    }
}

/// Encode text to WinAnsiEncoding (the Base-14 text encoding).
///
/// Characters outside the code page become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

/// WinAnsi code for a character, `?` when unmapped.
pub fn win_ansi_byte(ch: char) -> u8 {
    match ch {
        '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        '\t' => b' ',
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => b'?',
    }
}
