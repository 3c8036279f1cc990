//! Painting a [`LayoutPlan`] onto PDF pages.
//!
//! Layout rectangles are top-left in points; PDF user space is bottom-left,
//! so every placement goes through [`pdf_y`] exactly once.

use super::layout::{
    LayoutPlan, PageKind, Placement, PlacementKind, BODY_SIZE, CONTENT_WIDTH, MARGIN, PAGE_HEIGHT,
    PAGE_WIDTH,
};
use super::theme::PdfTheme;
use crate::error::{Error, Result};
use crate::geometry::{fit_within, resolve_padded, Rect};
use crate::model::{Callout, Document};
use crate::writer::{
    text_width, truncate_to_width, wrap_text, ContentStreamBuilder, Font, HFStyle, HeaderFooter,
    PageTemplate, PdfPage, PdfWriter, TextAnnotation, TextAnnotationIcon,
};

/// Static disclaimer printed in every footer.
pub const DISCLAIMER: &str =
    "For training purposes only. Screens may differ from your installation.";

const PILL_RADIUS: f32 = 13.0;
const PILL_PADDING: f32 = 12.0;
const PILL_TEXT_SIZE: f32 = 11.0;
const REVEAL_ICON: f32 = 14.0;
const LOGO_BOX: (f32, f32) = (160.0, 80.0);

/// A raster embedded in the writer.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedImage {
    /// XObject resource name
    pub name: String,
    /// Encoded width in pixels, frame included
    pub width: u32,
    /// Encoded height in pixels, frame included
    pub height: u32,
    /// Frame padding in pixels on each side
    pub padding: u32,
    /// Callouts that become sticky-note annotations
    pub reveals: Vec<Callout>,
}

impl PlacedImage {
    /// Sticky-note annotations for the reveal callouts of an image drawn at
    /// `rect` (top-left page coordinates).
    pub fn reveal_annotations(&self, rect: &Rect, step_number: usize) -> Vec<TextAnnotation> {
        if self.width == 0 || self.height == 0 {
            return Vec::new();
        }
        let pad = self.padding as f32;
        let content_w = (self.width as f32 - 2.0 * pad).max(1.0);
        let content_h = (self.height as f32 - 2.0 * pad).max(1.0);
        let scale = rect.width / self.width as f32;

        self.reveals
            .iter()
            .filter_map(|callout| {
                let text = callout.reveal_text()?;
                if let Some(problem) = callout.problem() {
                    log::warn!("Skipping reveal note for callout {}: {}", callout.id, problem);
                    return None;
                }
                let hit = resolve_padded(callout, content_w, content_h, pad);
                let center = hit.center();
                let cx = rect.x + center.x * scale;
                let cy = rect.y + center.y * scale;
                let half = REVEAL_ICON / 2.0;
                let label = match callout.number() {
                    Some(n) => format!("Step {} - {}", step_number, n),
                    None => format!("Step {}", step_number),
                };
                Some(
                    TextAnnotation::new(
                        Rect::new(cx - half, PAGE_HEIGHT - cy - half, REVEAL_ICON, REVEAL_ICON),
                        text,
                    )
                    .with_icon(TextAnnotationIcon::Comment)
                    .with_title(label),
                )
            })
            .collect()
    }
}

/// Embedded rasters of one screenshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotAssets {
    /// Primary raster, `None` when it failed to render
    pub primary: Option<PlacedImage>,
    /// Whether the screenshot has a secondary raster at all
    pub has_secondary: bool,
    /// Secondary raster, `None` when absent or failed
    pub secondary: Option<PlacedImage>,
}

/// Convert a top-left rectangle to its PDF lower edge.
pub fn pdf_y(rect: &Rect) -> f32 {
    PAGE_HEIGHT - rect.y - rect.height
}

fn baseline(top: f32, size: f32, font: Font) -> f32 {
    PAGE_HEIGHT - top - size * font.ascent()
}

fn fill(content: &mut ContentStreamBuilder, color: (f32, f32, f32)) {
    content.set_fill_color(color.0, color.1, color.2);
}

fn stroke(content: &mut ContentStreamBuilder, color: (f32, f32, f32)) {
    content.set_stroke_color(color.0, color.1, color.2);
}

/// Draws planned pages.
pub struct Painter<'a> {
    /// Colours
    pub theme: &'a PdfTheme,
    /// Source document
    pub document: &'a Document,
    /// Page plan
    pub plan: &'a LayoutPlan,
    /// Embedded rasters, indexed `[step][screenshot]`
    pub assets: &'a [Vec<ShotAssets>],
    /// Cover logo
    pub logo: Option<&'a PlacedImage>,
    /// Draw a hairline around unframed images
    pub border_images: bool,
}

impl<'a> Painter<'a> {
    /// Add one writer page per planned page and paint it.
    pub fn paint(&self, writer: &mut PdfWriter) -> Result<()> {
        for (number, planned) in self.plan.pages.iter().enumerate() {
            let index = writer.add_a4_page();
            let page = writer
                .page_mut(index)
                .ok_or_else(|| Error::Pdf(format!("page {} vanished", index + 1)))?;
            if planned.kind == PageKind::Cover {
                self.cover(&mut page.content);
            }
            for placement in &planned.placements {
                self.placement(planned.kind, placement, page);
            }
            log::debug!(
                "Painted page {} ({:?}, {} placements)",
                number + 1,
                planned.kind,
                planned.placements.len()
            );
        }
        Ok(())
    }

    fn cover(&self, content: &mut ContentStreamBuilder) {
        let meta = &self.document.metadata;
        let theme = self.theme;

        fill(content, theme.primary_rgb());
        content.rect(0.0, PAGE_HEIGHT - 12.0, PAGE_WIDTH, 12.0).fill();
        fill(content, theme.accent_rgb());
        content.rect(0.0, 0.0, PAGE_WIDTH, 6.0).fill();

        let mut top = 200.0;
        if let Some(logo) = self.logo {
            let (w, h) = fit_within(logo.width as f32, logo.height as f32, LOGO_BOX.0, LOGO_BOX.1);
            if w > 0.0 && h > 0.0 {
                let rect = Rect::new((PAGE_WIDTH - w) / 2.0, top + (LOGO_BOX.1 - h) / 2.0, w, h);
                content.draw_image(&logo.name, rect.x, pdf_y(&rect), w, h);
            }
            top += LOGO_BOX.1 + 40.0;
        } else {
            top += 60.0;
        }

        let title = if meta.title.trim().is_empty() { "Training Manual" } else { meta.title.as_str() };
        fill(content, theme.primary_rgb());
        for line in wrap_text(title, Font::Bold, 28.0, CONTENT_WIDTH) {
            centered(content, Font::Bold, 28.0, &line, top);
            top += Font::Bold.line_height(28.0);
        }

        top += 6.0;
        stroke(content, theme.accent_rgb());
        content
            .set_line_width(2.0)
            .move_to(PAGE_WIDTH / 2.0 - 40.0, PAGE_HEIGHT - top)
            .line_to(PAGE_WIDTH / 2.0 + 40.0, PAGE_HEIGHT - top)
            .stroke();
        top += 20.0;

        if let Some(topic) = meta.topic.as_deref().filter(|t| !t.trim().is_empty()) {
            fill(content, theme.text_rgb());
            for line in wrap_text(topic, Font::Regular, 14.0, CONTENT_WIDTH) {
                centered(content, Font::Regular, 14.0, &line, top);
                top += Font::Regular.line_height(14.0);
            }
            top += 10.0;
        }

        fill(content, theme.muted_rgb());
        for extra in [meta.date.as_deref(), meta.company.as_deref()].into_iter().flatten() {
            if extra.trim().is_empty() {
                continue;
            }
            let line = truncate_to_width(extra, Font::Regular, 11.0, CONTENT_WIDTH);
            centered(content, Font::Regular, 11.0, &line, top);
            top += Font::Regular.line_height(11.0);
        }
    }

    fn placement(&self, kind: PageKind, placement: &Placement, page: &mut PdfPage) {
        let rect = &placement.rect;
        let step = placement.step_index;
        match &placement.kind {
            PlacementKind::Pill => {
                if let Some(step) = step {
                    self.pill(&mut page.content, rect, step);
                }
            },
            PlacementKind::Progress => {
                if let Some(step) = step {
                    let label = format!("Step {} of {}", step + 1, self.document.steps.len());
                    fill(&mut page.content, self.theme.accent_rgb());
                    page.content.text_line(
                        Font::Regular.resource_name(),
                        9.0,
                        &label,
                        rect.x,
                        baseline(rect.y, 9.0, Font::Regular),
                    );
                }
            },
            PlacementKind::Body { lines } => {
                fill(&mut page.content, self.theme.text_rgb());
                let lh = Font::Regular.line_height(BODY_SIZE);
                for (i, line) in lines.iter().enumerate() {
                    let y = baseline(rect.y + i as f32 * lh, BODY_SIZE, Font::Regular);
                    page.content
                        .text_line(Font::Regular.resource_name(), BODY_SIZE, line, rect.x, y);
                }
            },
            PlacementKind::Image { screenshot } => {
                let asset = step
                    .and_then(|s| self.assets.get(s))
                    .and_then(|shots| shots.get(*screenshot))
                    .and_then(|a| a.primary.as_ref());
                self.image(page, rect, asset, step);
            },
            PlacementKind::SecondaryImage { screenshot } => {
                let asset = step
                    .and_then(|s| self.assets.get(s))
                    .and_then(|shots| shots.get(*screenshot))
                    .and_then(|a| a.secondary.as_ref());
                self.image(page, rect, asset, step);
            },
            PlacementKind::ImageGap { .. } => {
                let label = "Image unavailable";
                fill(&mut page.content, self.theme.muted_rgb());
                let w = text_width(label, Font::Regular, 9.0);
                page.content.text_line(
                    Font::Regular.resource_name(),
                    9.0,
                    label,
                    rect.x + (rect.width - w) / 2.0,
                    pdf_y(rect) + rect.height / 2.0 - 3.0,
                );
            },
            PlacementKind::Heading { text } => {
                if kind == PageKind::Toc {
                    fill(&mut page.content, self.theme.primary_rgb());
                    page.content.text_line(
                        Font::Bold.resource_name(),
                        20.0,
                        text,
                        rect.x,
                        baseline(rect.y, 20.0, Font::Bold),
                    );
                    stroke(&mut page.content, self.theme.accent_rgb());
                    let y = PAGE_HEIGHT - rect.y - 30.0;
                    page.content
                        .set_line_width(1.0)
                        .move_to(rect.x, y)
                        .line_to(rect.right(), y)
                        .stroke();
                } else {
                    fill(&mut page.content, self.theme.muted_rgb());
                    page.content.text_line(
                        Font::Regular.resource_name(),
                        10.0,
                        text,
                        rect.x,
                        baseline(rect.y, 10.0, Font::Regular),
                    );
                }
            },
            PlacementKind::TocRow { entry } => {
                if let Some(entry) = self.plan.toc.get(*entry) {
                    self.toc_row(&mut page.content, rect, entry.step_index, &entry.title, entry.page_number);
                }
            },
        }
    }

    /// Two-tone step header: a primary number segment and a surface
    /// description segment, the description truncated by measured width.
    fn pill(&self, content: &mut ContentStreamBuilder, rect: &Rect, step: usize) {
        let theme = self.theme;
        let label = format!("Step {}", step + 1);
        let number_w = text_width(&label, Font::Bold, PILL_TEXT_SIZE) + 2.0 * PILL_PADDING;
        let y = pdf_y(rect);
        let h = rect.height;
        let r = PILL_RADIUS.min(h / 2.0);
        let desc_w = (rect.width - number_w).max(0.0);

        fill(content, theme.surface_rgb());
        stroke(content, theme.primary_rgb());
        content
            .set_line_width(1.0)
            .rounded_rect_corners(rect.x + number_w, y, desc_w, h, [0.0, 0.0, r, r])
            .fill_stroke();

        fill(content, theme.primary_rgb());
        content
            .rounded_rect_corners(rect.x, y, number_w, h, [r, r, 0.0, 0.0])
            .fill();

        let text_y = y + h / 2.0 - PILL_TEXT_SIZE * 0.35;
        fill(content, (1.0, 1.0, 1.0));
        content.text_line(
            Font::Bold.resource_name(),
            PILL_TEXT_SIZE,
            &label,
            rect.x + PILL_PADDING,
            text_y,
        );

        let description = self
            .document
            .steps
            .get(step)
            .map(|s| s.description.as_str())
            .unwrap_or_default();
        let available = desc_w - 2.0 * PILL_PADDING;
        let shown = truncate_to_width(description, Font::Regular, PILL_TEXT_SIZE, available);
        if !shown.is_empty() {
            fill(content, theme.text_rgb());
            content.text_line(
                Font::Regular.resource_name(),
                PILL_TEXT_SIZE,
                &shown,
                rect.x + number_w + PILL_PADDING,
                text_y,
            );
        }
    }

    fn image(&self, page: &mut PdfPage, rect: &Rect, asset: Option<&PlacedImage>, step: Option<usize>) {
        let Some(asset) = asset else {
            log::warn!("No embedded image for placement at {:?}", rect);
            return;
        };
        let y = pdf_y(rect);
        page.content.draw_image(&asset.name, rect.x, y, rect.width, rect.height);
        if self.border_images {
            stroke(&mut page.content, self.theme.muted_rgb());
            page.content
                .set_line_width(0.5)
                .rect(rect.x, y, rect.width, rect.height)
                .stroke();
        }
        let step_number = step.map(|s| s + 1).unwrap_or_default();
        page.annotations
            .extend(asset.reveal_annotations(rect, step_number));
    }

    fn toc_row(
        &self,
        content: &mut ContentStreamBuilder,
        rect: &Rect,
        step: usize,
        title: &str,
        page_number: usize,
    ) {
        let size = 10.0;
        let y = baseline(rect.y, size, Font::Regular);
        let prefix = format!("Step {}  ", step + 1);
        let number = page_number.to_string();
        let prefix_w = text_width(&prefix, Font::Bold, size);
        let number_w = text_width(&number, Font::Regular, size);
        let dot_w = text_width(".", Font::Regular, size);

        let title_room = (rect.width - prefix_w - number_w - 8.0 * dot_w).max(0.0);
        let title = truncate_to_width(title, Font::Regular, size, title_room);
        let title_w = text_width(&title, Font::Regular, size);

        fill(content, self.theme.primary_rgb());
        content.text_line(Font::Bold.resource_name(), size, &prefix, rect.x, y);
        fill(content, self.theme.text_rgb());
        content.text_line(Font::Regular.resource_name(), size, &title, rect.x + prefix_w, y);

        let leader_start = rect.x + prefix_w + title_w + dot_w;
        let leader_end = rect.right() - number_w - dot_w;
        if leader_end > leader_start && dot_w > 0.0 {
            let dots = ((leader_end - leader_start) / dot_w).floor() as usize;
            fill(content, self.theme.muted_rgb());
            content.text_line(Font::Regular.resource_name(), size, &".".repeat(dots), leader_start, y);
        }
        fill(content, self.theme.text_rgb());
        content.text_line(Font::Regular.resource_name(), size, &number, rect.right() - number_w, y);
    }
}

fn centered(content: &mut ContentStreamBuilder, font: Font, size: f32, text: &str, top: f32) {
    let w = text_width(text, font, size);
    content.text_line(
        font.resource_name(),
        size,
        text,
        (PAGE_WIDTH - w) / 2.0,
        baseline(top, size, font),
    );
}

/// Footer template: copyright and page number, then the disclaimer.
pub fn footer_template(theme: &PdfTheme) -> PageTemplate {
    let (r, g, b) = theme.muted_rgb();
    let style = HFStyle::default().color(r, g, b);
    PageTemplate::new()
        .margins(MARGIN, MARGIN)
        .footer(
            HeaderFooter::left("\u{a9} {year} {company}")
                .with_right("Page {page} of {pages}")
                .with_style(style.clone().with_separator(0.5))
                .with_offset(32.0),
        )
        .footer(
            HeaderFooter::center(DISCLAIMER)
                .with_style(style.font(Font::Regular, 7.0))
                .with_offset(18.0),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CalloutKind;

    #[test]
    fn test_pdf_y_flips() {
        let rect = Rect::new(40.0, 40.0, 100.0, 26.0);
        assert_eq!(pdf_y(&rect), PAGE_HEIGHT - 66.0);
    }

    #[test]
    fn test_reveal_annotation_position() {
        let mut callout = Callout::new(
            "c1",
            CalloutKind::Number {
                number: 1,
                reveal_text: Some("Click here".to_string()),
            },
            50.0,
            50.0,
            10.0,
            10.0,
        );
        callout.color = "#ef4444".to_string();
        let image = PlacedImage {
            name: "Im1".to_string(),
            width: 200,
            height: 100,
            padding: 0,
            reveals: vec![callout],
        };
        // drawn at half size
        let rect = Rect::new(100.0, 200.0, 100.0, 50.0);
        let notes = image.reveal_annotations(&rect, 3);
        assert_eq!(notes.len(), 1);
        let note = &notes[0];
        // callout centre is at 55% x 55% of the image
        let cx = note.rect.x + note.rect.width / 2.0;
        let cy = PAGE_HEIGHT - (note.rect.y + note.rect.height / 2.0);
        assert!((cx - 155.0).abs() < 0.01);
        assert!((cy - 227.5).abs() < 0.01);
        assert_eq!(note.contents, "Click here");
        assert_eq!(note.title.as_deref(), Some("Step 3 - 1"));
    }

    #[test]
    fn test_reveal_annotation_accounts_for_frame() {
        let callout = Callout::new(
            "c1",
            CalloutKind::Number {
                number: 2,
                reveal_text: Some("x".to_string()),
            },
            0.0,
            0.0,
            0.0,
            0.0,
        );
        let image = PlacedImage {
            name: "Im1".to_string(),
            width: 132,
            height: 132,
            padding: 16,
            reveals: vec![callout],
        };
        let rect = Rect::new(0.0, 0.0, 132.0, 132.0);
        let notes = image.reveal_annotations(&rect, 1);
        let cx = notes[0].rect.x + REVEAL_ICON / 2.0;
        assert!((cx - 16.0).abs() < 0.01);
    }

    #[test]
    fn test_footer_template_rows() {
        let template = footer_template(&PdfTheme::default());
        assert_eq!(template.footers.len(), 2);
        assert!(!template.skip_first_page);
    }
}
