//! Page planning for the manual.
//!
//! Planning is separated from drawing: [`plan`] turns step blocks (titles,
//! body text, measured raster sizes) into a [`LayoutPlan`] of pages with
//! positioned placements, and the renderer only paints what the plan says.
//! All rectangles here use a top-left origin in points.
//!
//! Page sequence is cover, then the table of contents (optional), then
//! content pages. Content pages follow the pairing rules:
//!
//! - a step with exactly one screenshot and no secondary raster may share a
//!   page with one other such step, stacked below it;
//! - a page never holds images from more than two steps;
//! - a step whose image would overflow the page starts a new page;
//! - a paired step followed by a step without a screenshot ends the page;
//! - a secondary raster always gets a dedicated page of its own;
//! - a raster that failed to render leaves a fixed gap instead.

use crate::geometry::{fit_within, Rect};
use crate::writer::{text_width, wrap_text, Font, A4};

/// Page width in points.
pub const PAGE_WIDTH: f32 = A4.0;
/// Page height in points.
pub const PAGE_HEIGHT: f32 = A4.1;
/// Outer margin.
pub const MARGIN: f32 = 40.0;
/// Space reserved at the bottom of every page for footers.
pub const FOOTER_HEIGHT: f32 = 60.0;
/// Usable width.
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Lowest y any content may reach.
pub const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - FOOTER_HEIGHT;

/// Step header pill height.
pub const PILL_HEIGHT: f32 = 26.0;
/// Progress line height.
pub const PROGRESS_HEIGHT: f32 = 14.0;
/// Body text size.
pub const BODY_SIZE: f32 = 10.0;
/// Gap left where a raster failed to render.
pub const FAILED_IMAGE_GAP: f32 = 24.0;
/// Gap between blocks of one step.
pub const BLOCK_GAP: f32 = 8.0;
/// Gap after each step.
pub const STEP_SPACING: f32 = 20.0;
/// Table of contents row height.
pub const TOC_ROW: f32 = 18.0;
/// Height of the heading on table of contents and detail pages.
pub const HEADING_HEIGHT: f32 = 44.0;

/// Outcome of rendering one raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Raster {
    /// Rendered, with pixel dimensions
    Ready {
        /// Width in pixels
        width: f32,
        /// Height in pixels
        height: f32,
    },
    /// Decode or composite failed
    Failed,
}

impl Raster {
    /// Rendered raster of `width` x `height` pixels.
    pub fn ready(width: u32, height: u32) -> Self {
        Raster::Ready {
            width: width as f32,
            height: height as f32,
        }
    }

    /// Display size inside a `max_width` x `max_height` box.
    fn display_size(&self, max_width: f32, max_height: f32) -> Option<(f32, f32)> {
        match *self {
            Raster::Ready { width, height } => {
                let size = fit_within(width, height, max_width, max_height);
                (size.0 > 0.0 && size.1 > 0.0).then_some(size)
            },
            Raster::Failed => None,
        }
    }

    fn display_height(&self, max_width: f32, max_height: f32) -> f32 {
        self.display_size(max_width, max_height)
            .map(|(_, h)| h)
            .unwrap_or(FAILED_IMAGE_GAP)
    }
}

/// One screenshot of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBlock {
    /// Primary raster
    pub primary: Raster,
    /// Secondary raster, if the screenshot has one
    pub secondary: Option<Raster>,
}

/// Everything the planner needs to know about a step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepBlock {
    /// Index into the document's steps
    pub step_index: usize,
    /// Pill description
    pub title: String,
    /// Paragraphs below the pill, unwrapped
    pub body: Vec<String>,
    /// Screenshots, in display order
    pub images: Vec<ImageBlock>,
}

impl StepBlock {
    /// A step with a title and nothing else.
    pub fn new(step_index: usize, title: impl Into<String>) -> Self {
        Self {
            step_index,
            title: title.into(),
            body: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Add a paragraph.
    pub fn with_body(mut self, paragraph: impl Into<String>) -> Self {
        self.body.push(paragraph.into());
        self
    }

    /// Add a screenshot.
    pub fn with_image(mut self, primary: Raster, secondary: Option<Raster>) -> Self {
        self.images.push(ImageBlock { primary, secondary });
        self
    }

    /// Exactly one screenshot and no secondary raster.
    pub fn is_pairable(&self) -> bool {
        self.images.len() == 1 && self.images[0].secondary.is_none()
    }
}

/// Layout knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Emit table of contents pages
    pub include_toc: bool,
    /// Emit "Step i of n" under each pill
    pub include_progress: bool,
    /// Tallest image on a content page
    pub image_max_height: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            include_toc: true,
            include_progress: false,
            image_max_height: 280.0,
        }
    }
}

/// What a placement draws.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementKind {
    /// Two-tone step header
    Pill,
    /// "Step i of n"
    Progress,
    /// Wrapped body text lines
    Body {
        /// One entry per line
        lines: Vec<String>,
    },
    /// Primary raster of screenshot `screenshot`
    Image {
        /// Index into the step's screenshots
        screenshot: usize,
    },
    /// Secondary raster of screenshot `screenshot`
    SecondaryImage {
        /// Index into the step's screenshots
        screenshot: usize,
    },
    /// Space left by a raster that failed to render
    ImageGap {
        /// Index into the step's screenshots
        screenshot: usize,
    },
    /// Heading on table of contents and detail pages
    Heading {
        /// Heading text
        text: String,
    },
    /// Table of contents row
    TocRow {
        /// Index into [`LayoutPlan::toc`]
        entry: usize,
    },
}

/// A positioned item on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Step this placement belongs to (`None` for page furniture)
    pub step_index: Option<usize>,
    /// What to draw
    pub kind: PlacementKind,
    /// Where, in points from the top-left page corner
    pub rect: Rect,
}

/// Kind of page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Title page
    Cover,
    /// Table of contents
    Toc,
    /// Step cards
    Content,
    /// Dedicated page for a secondary raster
    Detail,
}

/// A planned page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPage {
    /// Page kind
    pub kind: PageKind,
    /// Items in paint order
    pub placements: Vec<Placement>,
}

impl PlannedPage {
    fn new(kind: PageKind) -> Self {
        Self {
            kind,
            placements: Vec::new(),
        }
    }

    /// Steps with a primary or secondary image slot on this page.
    pub fn image_steps(&self) -> Vec<usize> {
        let mut steps = Vec::new();
        for p in &self.placements {
            let is_image = matches!(
                p.kind,
                PlacementKind::Image { .. }
                    | PlacementKind::SecondaryImage { .. }
                    | PlacementKind::ImageGap { .. }
            );
            if let (true, Some(step)) = (is_image, p.step_index) {
                if !steps.contains(&step) {
                    steps.push(step);
                }
            }
        }
        steps
    }

    /// Pill rectangles on this page.
    pub fn pills(&self) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(|p| p.kind == PlacementKind::Pill)
    }
}

/// Table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Index into the document's steps
    pub step_index: usize,
    /// Step description
    pub title: String,
    /// 1-based page number where the step starts
    pub page_number: usize,
}

/// The complete page plan.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    /// All pages, cover first
    pub pages: Vec<PlannedPage>,
    /// Table of contents entries (empty without a TOC)
    pub toc: Vec<TocEntry>,
}

impl LayoutPlan {
    /// Content and detail pages, with their 0-based page index.
    pub fn body_pages(&self) -> impl Iterator<Item = (usize, &PlannedPage)> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, p)| matches!(p.kind, PageKind::Content | PageKind::Detail))
    }

    /// Index of the first page holding a placement for `step_index`.
    pub fn page_of_step(&self, step_index: usize) -> Option<usize> {
        self.pages
            .iter()
            .position(|p| p.placements.iter().any(|pl| pl.step_index == Some(step_index)))
    }
}

/// Running state of the content page being filled.
struct Cursor {
    pages: Vec<PlannedPage>,
    page: Option<PlannedPage>,
    y: f32,
    image_steps: usize,
    pair_open: bool,
    closed: bool,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            page: None,
            y: MARGIN,
            image_steps: 0,
            pair_open: false,
            closed: false,
        }
    }

    fn remaining(&self) -> f32 {
        CONTENT_BOTTOM - self.y
    }

    fn is_fresh(&self) -> bool {
        self.page.as_ref().map_or(true, |p| p.placements.is_empty())
    }

    fn flush(&mut self) {
        if let Some(page) = self.page.take() {
            if !page.placements.is_empty() {
                self.pages.push(page);
            }
        }
    }

    fn new_page(&mut self) {
        self.flush();
        self.page = Some(PlannedPage::new(PageKind::Content));
        self.y = MARGIN;
        self.image_steps = 0;
        self.pair_open = false;
        self.closed = false;
    }

    fn ensure_page(&mut self) {
        if self.page.is_none() {
            self.new_page();
        }
    }

    fn place(&mut self, step: usize, kind: PlacementKind, x: f32, width: f32, height: f32) {
        self.ensure_page();
        let rect = Rect::new(x, self.y, width, height);
        if let Some(page) = self.page.as_mut() {
            page.placements.push(Placement {
                step_index: Some(step),
                kind,
                rect,
            });
        }
        self.y += height;
    }

    fn push_detail(&mut self, page: PlannedPage) {
        self.flush();
        self.pages.push(page);
    }
}

fn body_lines(block: &StepBlock) -> Vec<String> {
    block
        .body
        .iter()
        .flat_map(|p| wrap_text(p, Font::Regular, BODY_SIZE, CONTENT_WIDTH))
        .collect()
}

fn line_height() -> f32 {
    Font::Regular.line_height(BODY_SIZE)
}

fn header_height(lines: usize, options: &LayoutOptions) -> f32 {
    let mut h = PILL_HEIGHT + BLOCK_GAP;
    if options.include_progress {
        h += PROGRESS_HEIGHT;
    }
    if lines > 0 {
        h += lines as f32 * line_height() + BLOCK_GAP;
    }
    h
}

/// Plan every page of the manual.
pub fn plan(blocks: &[StepBlock], options: &LayoutOptions) -> LayoutPlan {
    let content = plan_content(blocks, options);

    let per_toc_page = (((CONTENT_BOTTOM - MARGIN - HEADING_HEIGHT) / TOC_ROW).floor() as usize).max(1);
    let toc_pages = if options.include_toc {
        blocks.len().div_ceil(per_toc_page).max(1)
    } else {
        0
    };
    let first_body_page = 1 + toc_pages;

    let mut toc = Vec::new();
    if options.include_toc {
        for block in blocks {
            let page_index = content
                .iter()
                .position(|p| p.placements.iter().any(|pl| pl.step_index == Some(block.step_index)));
            if let Some(index) = page_index {
                toc.push(TocEntry {
                    step_index: block.step_index,
                    title: block.title.clone(),
                    page_number: first_body_page + index + 1,
                });
            }
        }
    }

    let mut pages = vec![PlannedPage::new(PageKind::Cover)];
    for (chunk_index, chunk) in toc_chunks(toc.len(), per_toc_page, toc_pages).into_iter().enumerate() {
        let mut page = PlannedPage::new(PageKind::Toc);
        let heading = if chunk_index == 0 { "Contents" } else { "Contents (continued)" };
        page.placements.push(Placement {
            step_index: None,
            kind: PlacementKind::Heading {
                text: heading.to_string(),
            },
            rect: Rect::new(MARGIN, MARGIN, CONTENT_WIDTH, HEADING_HEIGHT),
        });
        for (row, entry) in chunk.enumerate() {
            page.placements.push(Placement {
                step_index: None,
                kind: PlacementKind::TocRow { entry },
                rect: Rect::new(
                    MARGIN,
                    MARGIN + HEADING_HEIGHT + row as f32 * TOC_ROW,
                    CONTENT_WIDTH,
                    TOC_ROW,
                ),
            });
        }
        pages.push(page);
    }
    pages.extend(content);

    LayoutPlan { pages, toc }
}

fn toc_chunks(
    entries: usize,
    per_page: usize,
    pages: usize,
) -> Vec<std::ops::Range<usize>> {
    (0..pages)
        .map(|p| (p * per_page).min(entries)..((p + 1) * per_page).min(entries))
        .collect()
}

fn plan_content(blocks: &[StepBlock], options: &LayoutOptions) -> Vec<PlannedPage> {
    let mut cursor = Cursor::new();
    let total = blocks.len();

    for (pos, block) in blocks.iter().enumerate() {
        let step = block.step_index;
        let lines = body_lines(block);
        let has_images = !block.images.is_empty();
        let pairable = block.is_pairable();

        let first_image_h = block
            .images
            .first()
            .map(|img| img.primary.display_height(CONTENT_WIDTH, options.image_max_height) + BLOCK_GAP)
            .unwrap_or(0.0);
        let needed = header_height(lines.len(), options) + first_image_h;

        let joins_pair = pairable && cursor.pair_open;
        let page_has_images = cursor.image_steps > 0;
        let must_break = cursor.closed
            || (has_images && page_has_images && !joins_pair)
            || needed > cursor.remaining();
        if cursor.page.is_none() || (must_break && !cursor.is_fresh()) {
            cursor.new_page();
        }

        // header
        let pill_width = CONTENT_WIDTH;
        cursor.place(step, PlacementKind::Pill, MARGIN, pill_width, PILL_HEIGHT);
        cursor.y += BLOCK_GAP;
        if options.include_progress {
            let label = format!("Step {} of {}", pos + 1, total);
            let w = text_width(&label, Font::Regular, 9.0);
            cursor.place(step, PlacementKind::Progress, MARGIN, w, PROGRESS_HEIGHT);
        }
        place_body(&mut cursor, step, lines);

        // screenshots
        let mut details = Vec::new();
        for (k, image) in block.images.iter().enumerate() {
            let (kind, size) = match image.primary.display_size(CONTENT_WIDTH, options.image_max_height) {
                Some(size) => (PlacementKind::Image { screenshot: k }, size),
                None => {
                    log::debug!("Step {}: screenshot {} leaves a gap", step + 1, k + 1);
                    (PlacementKind::ImageGap { screenshot: k }, (CONTENT_WIDTH, FAILED_IMAGE_GAP))
                },
            };
            if size.1 > cursor.remaining() && !cursor.is_fresh() {
                cursor.new_page();
                cursor.image_steps = 1;
            }
            let x = MARGIN + (CONTENT_WIDTH - size.0) / 2.0;
            cursor.place(step, kind, x, size.0, size.1);
            cursor.y += BLOCK_GAP;
            if let Some(secondary) = image.secondary {
                details.push(detail_page(block, k, secondary));
            }
        }
        cursor.y += STEP_SPACING;

        if has_images {
            cursor.image_steps += 1;
        }
        cursor.pair_open = pairable && cursor.image_steps == 1;
        let next_lacks_screenshot = blocks.get(pos + 1).is_some_and(|b| b.images.is_empty());
        if cursor.image_steps >= 2
            || (has_images && !pairable)
            || (pairable && next_lacks_screenshot)
        {
            cursor.closed = true;
        }

        for page in details {
            cursor.push_detail(page);
        }
    }

    cursor.flush();
    cursor.pages
}

/// Place body lines, continuing on new pages when they run out of room.
fn place_body(cursor: &mut Cursor, step: usize, lines: Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let lh = line_height();
    let mut rest = lines.as_slice();
    while !rest.is_empty() {
        let fit = ((cursor.remaining() / lh).floor() as usize).min(rest.len());
        if fit == 0 {
            cursor.new_page();
            continue;
        }
        let (chunk, tail) = rest.split_at(fit);
        cursor.place(
            step,
            PlacementKind::Body {
                lines: chunk.to_vec(),
            },
            MARGIN,
            CONTENT_WIDTH,
            chunk.len() as f32 * lh,
        );
        rest = tail;
    }
    cursor.y += BLOCK_GAP;
}

fn detail_page(block: &StepBlock, screenshot: usize, raster: Raster) -> PlannedPage {
    let step = block.step_index;
    let mut page = PlannedPage::new(PageKind::Detail);
    page.placements.push(Placement {
        step_index: Some(step),
        kind: PlacementKind::Pill,
        rect: Rect::new(MARGIN, MARGIN, CONTENT_WIDTH, PILL_HEIGHT),
    });
    let top = MARGIN + PILL_HEIGHT + BLOCK_GAP;
    page.placements.push(Placement {
        step_index: Some(step),
        kind: PlacementKind::Heading {
            text: "Detail view".to_string(),
        },
        rect: Rect::new(MARGIN, top, CONTENT_WIDTH, 16.0),
    });
    let image_top = top + 16.0 + BLOCK_GAP;
    let max_height = CONTENT_BOTTOM - image_top;
    let (kind, (w, h)) = match raster.display_size(CONTENT_WIDTH, max_height) {
        Some(size) => (PlacementKind::SecondaryImage { screenshot }, size),
        None => (PlacementKind::ImageGap { screenshot }, (CONTENT_WIDTH, FAILED_IMAGE_GAP)),
    };
    page.placements.push(Placement {
        step_index: Some(step),
        kind,
        rect: Rect::new(MARGIN + (CONTENT_WIDTH - w) / 2.0, image_top, w, h),
    });
    page
}
