//! PDF manual generation.
//!
//! Rendering runs in three passes over the document:
//!
//! 1. every screenshot is composited and embedded as a JPEG XObject, in
//!    document order, so object numbering is stable;
//! 2. [`layout::plan`] places step cards and images on pages;
//! 3. the [`render::Painter`] draws the plan, then the footer template runs
//!    over all pages once the total page count is known.
//!
//! A screenshot that fails to decode or composite is logged and leaves a
//! fixed gap; only PDF serialisation errors abort the render.

pub mod layout;
pub mod render;
pub mod theme;

pub use layout::{
    plan, ImageBlock, LayoutOptions, LayoutPlan, PageKind, Placement, PlacementKind, PlannedPage,
    Raster, StepBlock, TocEntry,
};
pub use render::{PlacedImage, ShotAssets, DISCLAIMER};
pub use theme::PdfTheme;

use chrono::Datelike;
use lazy_static::lazy_static;
use regex::Regex;

use crate::cancel::CancellationToken;
use crate::config::ExportOptions;
use crate::error::Result;
use crate::model::{Callout, Document, Step};
use crate::raster::{encode_data_url, render_raw, render_screenshot, ImageSettings};
use crate::writer::{ImageData, PdfWriter, PdfWriterConfig, PlaceholderContext};
use render::{footer_template, Painter};

lazy_static! {
    /// Four digits at the start of a date string ("2024-03-01", "2024")
    static ref LEADING_YEAR: Regex = Regex::new(r"^\s*(\d{4})").unwrap();
}

/// A rendered manual together with the plan it was drawn from.
#[derive(Debug, Clone)]
pub struct Manual {
    /// Page plan
    pub plan: LayoutPlan,
    /// PDF bytes
    pub bytes: Vec<u8>,
}

/// Render a document to PDF bytes.
pub fn render_pdf(
    document: &Document,
    options: &ExportOptions,
    token: &CancellationToken,
) -> Result<Vec<u8>> {
    Ok(render_manual(document, options, token)?.bytes)
}

/// Render a document and keep the layout plan.
pub fn render_manual(
    document: &Document,
    options: &ExportOptions,
    token: &CancellationToken,
) -> Result<Manual> {
    let meta = &document.metadata;
    let theme = PdfTheme::by_name(&options.theme).with_primary_override(meta.accent_color.as_deref());
    let settings = ImageSettings::from_options(options);

    let mut config = PdfWriterConfig::default()
        .with_title(meta.title.clone())
        .with_compress(options.compress_pdf);
    if let Some(company) = &meta.company {
        config = config.with_author(company.clone());
    }
    if let Some(topic) = &meta.topic {
        config = config.with_subject(topic.clone());
    }
    let mut writer = PdfWriter::with_config(config);

    let logo = meta.logo.as_deref().and_then(|url| {
        embed(&mut writer, "logo", render_raw(url, &ImageSettings::thumbnail(400, 90)), 0, &[])
    });

    let mut assets = Vec::with_capacity(document.steps.len());
    for (index, step) in document.steps.iter().enumerate() {
        token.checkpoint()?;
        assets.push(embed_step(&mut writer, index, step, &settings, token)?);
    }

    let blocks: Vec<StepBlock> = document
        .steps
        .iter()
        .zip(&assets)
        .enumerate()
        .map(|(index, (step, shots))| step_block(index, step, shots))
        .collect();
    let layout_options = LayoutOptions {
        include_toc: options.include_toc,
        include_progress: options.include_progress,
        ..LayoutOptions::default()
    };
    let plan = layout::plan(&blocks, &layout_options);
    token.checkpoint()?;

    let painter = Painter {
        theme: &theme,
        document,
        plan: &plan,
        assets: &assets,
        logo: logo.as_ref(),
        border_images: settings.frame.is_none(),
    };
    painter.paint(&mut writer)?;

    let company = meta
        .company
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| meta.title.clone());
    let context = PlaceholderContext::new(copyright_year(meta.date.as_deref()))
        .with_company(company)
        .with_title(meta.title.clone());
    footer_template(&theme).apply(&mut writer, &context);

    let bytes = writer.finish().map_err(|e| {
        log::error!("PDF serialisation failed: {}", e);
        e
    })?;
    log::debug!("Rendered {} pages, {} bytes", plan.pages.len(), bytes.len());
    Ok(Manual { plan, bytes })
}

/// Encode PDF bytes as a `data:application/pdf;base64,...` URI.
pub fn pdf_data_uri(bytes: &[u8]) -> String {
    encode_data_url("application/pdf", bytes)
}

/// Year for the copyright line: the leading four digits of the document
/// date, otherwise the current year.
pub fn copyright_year(date: Option<&str>) -> i32 {
    date.and_then(|d| LEADING_YEAR.captures(d))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_else(|| chrono::Utc::now().year())
}

fn embed_step(
    writer: &mut PdfWriter,
    index: usize,
    step: &Step,
    settings: &ImageSettings,
    token: &CancellationToken,
) -> Result<Vec<ShotAssets>> {
    let padding = settings.frame.as_ref().map(|f| f.padding).unwrap_or(0);
    let mut shots = Vec::new();
    for (k, shot) in step.screenshots().enumerate() {
        token.checkpoint()?;
        let label = format!("step {} screenshot {}", index + 1, k + 1);
        let reveals: Vec<Callout> = shot.reveal_callouts().cloned().collect();
        let primary = embed(
            writer,
            &label,
            render_screenshot(&shot.data_url, &shot.callouts, settings),
            padding,
            &reveals,
        );
        let secondary = shot.secondary.as_ref().and_then(|sec| {
            let reveals: Vec<Callout> =
                sec.callouts.iter().filter(|c| c.reveal_text().is_some()).cloned().collect();
            embed(
                writer,
                &format!("{} (secondary)", label),
                render_screenshot(&sec.data_url, &sec.callouts, settings),
                padding,
                &reveals,
            )
        });
        shots.push(ShotAssets {
            primary,
            has_secondary: shot.secondary.is_some(),
            secondary,
        });
    }
    Ok(shots)
}

fn embed(
    writer: &mut PdfWriter,
    label: &str,
    rendered: Result<crate::raster::RenderedImage>,
    padding: u32,
    reveals: &[Callout],
) -> Option<PlacedImage> {
    let rendered = match rendered {
        Ok(r) => r,
        Err(e) => {
            log::warn!("Skipping {}: {}", label, e);
            return None;
        },
    };
    let (width, height) = (rendered.width, rendered.height);
    match ImageData::from_jpeg(rendered.jpeg) {
        Ok(data) => Some(PlacedImage {
            name: writer.add_image(data),
            width,
            height,
            padding,
            reveals: reveals.to_vec(),
        }),
        Err(e) => {
            log::warn!("Skipping {}: {}", label, e);
            None
        },
    }
}

fn raster_of(image: Option<&PlacedImage>) -> Raster {
    image
        .map(|i| Raster::ready(i.width, i.height))
        .unwrap_or(Raster::Failed)
}

fn step_block(index: usize, step: &Step, shots: &[ShotAssets]) -> StepBlock {
    let mut block = StepBlock::new(index, step.description.clone());
    if let Some(text) = step.instructions.as_deref().filter(|t| !t.trim().is_empty()) {
        block = block.with_body(text);
    }
    if let Some(notes) = step.notes.as_deref().filter(|t| !t.trim().is_empty()) {
        block = block.with_body(format!("Note: {}", notes));
    }
    if !step.tags.is_empty() {
        block = block.with_body(format!("Tags: {}", step.tags.join(", ")));
    }
    for resource in &step.resources {
        block = block.with_body(format!("{}: {}", resource.title, resource.url));
    }
    for shot in shots {
        let secondary = shot.has_secondary.then(|| raster_of(shot.secondary.as_ref()));
        block = block.with_image(raster_of(shot.primary.as_ref()), secondary);
    }
    block
}
