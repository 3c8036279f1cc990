//! Page templates for footers and page numbers.
//!
//! Footers are applied after every page has been laid out, because
//! "page X of Y" needs the final page count. A template holds one or more
//! footer rows; each row has up to three aligned elements whose text may
//! contain placeholders.
//!
//! # Example
//!
//! ```
//! use snapguide::writer::{HeaderFooter, PageTemplate, PdfWriter, PlaceholderContext};
//!
//! let template = PageTemplate::new()
//!     .footer(HeaderFooter::right("Page {page} of {pages}"))
//!     .skip_first_page();
//!
//! let mut writer = PdfWriter::new();
//! writer.add_a4_page();
//! writer.add_a4_page();
//! template.apply(&mut writer, &PlaceholderContext::new(2024));
//! ```

use super::content_stream::ContentStreamBuilder;
use super::font_manager::{text_width, truncate_to_width, Font};
use super::pdf_writer::PdfWriter;

/// Placeholder tokens that can be used in footers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Current page number (1-indexed)
    PageNumber,
    /// Total number of pages
    TotalPages,
    /// Copyright year
    Year,
    /// Company name
    Company,
    /// Document title
    Title,
}

impl Placeholder {
    const ALL: [Placeholder; 5] = [
        Placeholder::PageNumber,
        Placeholder::TotalPages,
        Placeholder::Year,
        Placeholder::Company,
        Placeholder::Title,
    ];

    /// Get the placeholder token string.
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::PageNumber => "{page}",
            Placeholder::TotalPages => "{pages}",
            Placeholder::Year => "{year}",
            Placeholder::Company => "{company}",
            Placeholder::Title => "{title}",
        }
    }
}

/// Text alignment for footer content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HFAlignment {
    /// Align to the left margin
    Left,
    /// Center horizontally
    #[default]
    Center,
    /// Align to the right margin
    Right,
}

/// Style configuration for footer text.
#[derive(Debug, Clone, PartialEq)]
pub struct HFStyle {
    /// Font
    pub font: Font,
    /// Font size in points
    pub font_size: f32,
    /// Text color (RGB, 0.0-1.0)
    pub color: (f32, f32, f32),
    /// Separator line width above the row, if any
    pub separator: Option<f32>,
}

impl Default for HFStyle {
    fn default() -> Self {
        Self {
            font: Font::Regular,
            font_size: 8.0,
            color: (0.42, 0.45, 0.5),
            separator: None,
        }
    }
}

impl HFStyle {
    /// Set the font.
    pub fn font(mut self, font: Font, size: f32) -> Self {
        self.font = font;
        self.font_size = size;
        self
    }

    /// Set text color.
    pub fn color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = (r, g, b);
        self
    }

    /// Draw a separator line above the row.
    pub fn with_separator(mut self, width: f32) -> Self {
        self.separator = Some(width);
        self
    }
}

/// A single positioned text element in a footer row.
#[derive(Debug, Clone, PartialEq)]
pub struct HFElement {
    /// The text content (may include placeholders)
    pub text: String,
    /// Horizontal alignment
    pub alignment: HFAlignment,
}

impl HFElement {
    fn new(text: impl Into<String>, alignment: HFAlignment) -> Self {
        Self {
            text: text.into(),
            alignment,
        }
    }

    /// Resolve placeholders in the text.
    pub fn resolve(&self, context: &PlaceholderContext) -> String {
        let mut result = self.text.clone();
        for ph in Placeholder::ALL {
            let value = match ph {
                Placeholder::PageNumber => context.page_number.to_string(),
                Placeholder::TotalPages => context.total_pages.to_string(),
                Placeholder::Year => context.year.to_string(),
                Placeholder::Company => context.company.clone(),
                Placeholder::Title => context.title.clone(),
            };
            result = result.replace(ph.token(), &value);
        }
        result
    }
}

/// One footer row.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderFooter {
    /// Left-aligned element
    pub left: Option<HFElement>,
    /// Center-aligned element
    pub center: Option<HFElement>,
    /// Right-aligned element
    pub right: Option<HFElement>,
    /// Style for all elements
    pub style: HFStyle,
    /// Baseline distance from the bottom page edge (points)
    pub offset: f32,
}

impl Default for HeaderFooter {
    fn default() -> Self {
        Self {
            left: None,
            center: None,
            right: None,
            style: HFStyle::default(),
            offset: 28.0,
        }
    }
}

impl HeaderFooter {
    /// Create a new empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a single left-aligned element.
    pub fn left(text: impl Into<String>) -> Self {
        Self::new().with_left(text)
    }

    /// Create with a single centered element.
    pub fn center(text: impl Into<String>) -> Self {
        Self::new().with_center(text)
    }

    /// Create with a single right-aligned element.
    pub fn right(text: impl Into<String>) -> Self {
        Self::new().with_right(text)
    }

    /// Set the left element.
    pub fn with_left(mut self, text: impl Into<String>) -> Self {
        self.left = Some(HFElement::new(text, HFAlignment::Left));
        self
    }

    /// Set the center element.
    pub fn with_center(mut self, text: impl Into<String>) -> Self {
        self.center = Some(HFElement::new(text, HFAlignment::Center));
        self
    }

    /// Set the right element.
    pub fn with_right(mut self, text: impl Into<String>) -> Self {
        self.right = Some(HFElement::new(text, HFAlignment::Right));
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: HFStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the offset from the bottom edge.
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    /// Check if this row has any content.
    pub fn is_empty(&self) -> bool {
        self.elements().is_empty()
    }

    /// Get all elements, left to right.
    pub fn elements(&self) -> Vec<&HFElement> {
        [&self.left, &self.center, &self.right]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Draw the row on a page of the given width.
    fn draw(
        &self,
        content: &mut ContentStreamBuilder,
        page_width: f32,
        margin_left: f32,
        margin_right: f32,
        context: &PlaceholderContext,
    ) {
        let style = &self.style;
        let (r, g, b) = style.color;
        let usable = (page_width - margin_left - margin_right).max(0.0);

        if let Some(line_width) = style.separator {
            let y = self.offset + style.font_size + 4.0;
            content
                .set_stroke_color(r, g, b)
                .set_line_width(line_width)
                .move_to(margin_left, y)
                .line_to(page_width - margin_right, y)
                .stroke();
        }

        content.set_fill_color(r, g, b);
        // a third of the width each when several elements share the row
        let slot = if self.elements().len() > 1 { usable / 3.0 } else { usable };
        for element in self.elements() {
            let text = truncate_to_width(&element.resolve(context), style.font, style.font_size, slot);
            let width = text_width(&text, style.font, style.font_size);
            let x = match element.alignment {
                HFAlignment::Left => margin_left,
                HFAlignment::Center => margin_left + (usable - width) / 2.0,
                HFAlignment::Right => page_width - margin_right - width,
            };
            content.text_line(style.font.resource_name(), style.font_size, &text, x, self.offset);
        }
    }
}

/// Context for resolving placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderContext {
    /// Current page number (1-indexed)
    pub page_number: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// Copyright year
    pub year: i32,
    /// Company name
    pub company: String,
    /// Document title
    pub title: String,
}

impl PlaceholderContext {
    /// Create a context; page numbers are filled in per page.
    pub fn new(year: i32) -> Self {
        Self {
            page_number: 1,
            total_pages: 1,
            year,
            company: String::new(),
            title: String::new(),
        }
    }

    /// Set the company name.
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// The same context for a specific page.
    pub fn for_page(&self, page_number: usize, total_pages: usize) -> Self {
        Self {
            page_number,
            total_pages,
            ..self.clone()
        }
    }
}

/// A page template: footer rows applied to every page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageTemplate {
    /// Footer rows, bottom-up offsets are per row
    pub footers: Vec<HeaderFooter>,
    /// Whether to skip the first page
    pub skip_first_page: bool,
    /// Left margin (points)
    pub margin_left: f32,
    /// Right margin (points)
    pub margin_right: f32,
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTemplate {
    /// Create a new empty page template.
    pub fn new() -> Self {
        Self {
            footers: Vec::new(),
            skip_first_page: false,
            margin_left: 40.0,
            margin_right: 40.0,
        }
    }

    /// Add a footer row.
    pub fn footer(mut self, footer: HeaderFooter) -> Self {
        self.footers.push(footer);
        self
    }

    /// Set to skip footers on the first page.
    pub fn skip_first_page(mut self) -> Self {
        self.skip_first_page = true;
        self
    }

    /// Set margins.
    pub fn margins(mut self, left: f32, right: f32) -> Self {
        self.margin_left = left;
        self.margin_right = right;
        self
    }

    /// Check if the template has any content.
    pub fn is_empty(&self) -> bool {
        self.footers.iter().all(HeaderFooter::is_empty)
    }

    /// Draw footers on every page of `writer`.
    ///
    /// Must run after the last page is added; page totals are taken from
    /// the writer at call time.
    pub fn apply(&self, writer: &mut PdfWriter, context: &PlaceholderContext) {
        let total = writer.page_count();
        for (index, page) in writer.pages_mut().enumerate() {
            let number = index + 1;
            if number == 1 && self.skip_first_page {
                continue;
            }
            let ctx = context.for_page(number, total);
            page.content.save_state();
            for row in &self.footers {
                row.draw(&mut page.content, page.width, self.margin_left, self.margin_right, &ctx);
            }
            page.content.restore_state();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_text(writer: PdfWriter) -> String {
        let mut w = writer;
        let mut out = Vec::new();
        for page in w.pages_mut() {
            out.push(String::from_utf8_lossy(&page.content.build()).to_string());
        }
        out.join("\n---\n")
    }

    #[test]
    fn test_resolve() {
        let ctx = PlaceholderContext::new(2025).with_company("Acme").for_page(2, 5);
        let element = HFElement::new("\u{a9} {year} {company} | {page}/{pages}", HFAlignment::Left);
        assert_eq!(element.resolve(&ctx), "\u{a9} 2025 Acme | 2/5");
    }

    #[test]
    fn test_apply_numbers_every_page() {
        let mut writer = PdfWriter::new();
        for _ in 0..3 {
            writer.add_a4_page();
        }
        PageTemplate::new()
            .footer(HeaderFooter::right("Page {page} of {pages}"))
            .apply(&mut writer, &PlaceholderContext::new(2025));
        let text = page_text(writer);
        assert!(text.contains("(Page 1 of 3) Tj"));
        assert!(text.contains("(Page 3 of 3) Tj"));
    }

    #[test]
    fn test_skip_first_page() {
        let mut writer = PdfWriter::new();
        writer.add_a4_page();
        writer.add_a4_page();
        PageTemplate::new()
            .footer(HeaderFooter::center("{page}"))
            .skip_first_page()
            .apply(&mut writer, &PlaceholderContext::new(2025));
        let text = page_text(writer);
        assert!(!text.contains("(1) Tj"));
        assert!(text.contains("(2) Tj"));
    }

    #[test]
    fn test_is_empty() {
        assert!(PageTemplate::new().is_empty());
        assert!(!PageTemplate::new().footer(HeaderFooter::left("x")).is_empty());
    }
}
