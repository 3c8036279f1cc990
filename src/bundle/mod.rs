//! ZIP training bundle.
//!
//! Layout of the archive:
//!
//! ```text
//! manual/training-manual.pdf
//! interactive/training-module.html
//! resources/style-guide.md           (optional)
//! resources/quick-reference.txt      (optional)
//! resources/thumbnails/step-{n}.jpg  (optional)
//! README.txt
//! package-info.json
//! ```
//!
//! The PDF and the HTML module are required: if either fails the whole
//! bundle fails and no archive is produced. Resources are best effort;
//! a failing resource is logged and left out of the archive and manifest.

pub mod archive;
mod resources;

pub use archive::Archive;
pub use resources::{quick_reference, readme, style_guide};

use chrono::SecondsFormat;
use serde::Serialize;

use crate::cancel::CancellationToken;
use crate::config::ExportOptions;
use crate::error::Result;
use crate::html::render_standalone;
use crate::model::Document;
use crate::pdf::render_pdf;
use crate::raster::{render_screenshot, ImageSettings};

/// Path of the PDF manual inside the bundle.
pub const MANUAL_PATH: &str = "manual/training-manual.pdf";
/// Path of the HTML module inside the bundle.
pub const MODULE_PATH: &str = "interactive/training-module.html";
/// Path of the manifest.
pub const MANIFEST_PATH: &str = "package-info.json";

/// Document summary recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// Document id
    pub id: String,
    /// Title
    pub title: String,
    /// Subtitle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Document date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Company
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// `package-info.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    /// Package name derived from the title
    pub name: String,
    /// Package version
    pub version: String,
    /// RFC 3339 timestamp
    pub generated_at: String,
    /// Document metadata
    pub document: DocumentSummary,
    /// Number of steps
    pub step_count: usize,
    /// Number of screenshots
    pub screenshot_count: usize,
    /// Options the bundle was rendered with (password omitted)
    pub options: ExportOptions,
    /// Archive entries, manifest last
    pub files: Vec<String>,
}

/// A rendered bundle.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// ZIP bytes
    pub bytes: Vec<u8>,
    /// The manifest written into the archive
    pub manifest: PackageInfo,
}

/// Render the bundle ZIP.
pub fn render_bundle(
    document: &Document,
    options: &ExportOptions,
    token: &CancellationToken,
) -> Result<Vec<u8>> {
    Ok(build_bundle(document, options, token)?.bytes)
}

/// Render the bundle and keep its manifest.
pub fn build_bundle(
    document: &Document,
    options: &ExportOptions,
    token: &CancellationToken,
) -> Result<Bundle> {
    let bundle_options = &options.bundle;

    let pdf = render_pdf(document, options, token).map_err(|e| {
        log::error!("Bundle aborted, PDF manual failed: {}", e);
        e
    })?;
    token.checkpoint()?;
    let html = render_standalone(document, options, token).map_err(|e| {
        log::error!("Bundle aborted, HTML module failed: {}", e);
        e
    })?;

    let mut archive = Archive::new();
    archive.add(MANUAL_PATH, &pdf)?;
    archive.add(MODULE_PATH, html.as_bytes())?;

    if bundle_options.include_style_guide {
        archive.add("resources/style-guide.md", style_guide(document, options).as_bytes())?;
    }
    if bundle_options.include_quick_reference {
        archive.add("resources/quick-reference.txt", quick_reference(document).as_bytes())?;
    }
    if bundle_options.include_thumbnails {
        add_thumbnails(&mut archive, document, options, token)?;
    }

    let mut files: Vec<String> = archive.entries().to_vec();
    files.push("README.txt".to_string());
    files.push(MANIFEST_PATH.to_string());
    archive.add("README.txt", readme(document, &files).as_bytes())?;

    let manifest = manifest(document, options, files);
    let json = serde_json::to_string_pretty(&manifest)?;
    archive.add(MANIFEST_PATH, json.as_bytes())?;

    let bytes = archive.finish().map_err(|e| {
        log::error!("Bundle aborted, ZIP serialisation failed: {}", e);
        e
    })?;
    log::debug!("Bundle written: {} files, {} bytes", manifest.files.len(), bytes.len());
    Ok(Bundle { bytes, manifest })
}

fn add_thumbnails(
    archive: &mut Archive,
    document: &Document,
    options: &ExportOptions,
    token: &CancellationToken,
) -> Result<()> {
    let settings = ImageSettings::thumbnail(options.bundle.thumbnail_width, 80);
    for (index, step) in document.steps.iter().enumerate() {
        token.checkpoint()?;
        let Some(shot) = step.screenshots().next() else {
            continue;
        };
        match render_screenshot(&shot.data_url, &shot.callouts, &settings) {
            Ok(image) => {
                archive.add(&format!("resources/thumbnails/step-{}.jpg", index + 1), &image.jpeg)?
            },
            Err(e) => log::warn!("Skipping thumbnail for step {}: {}", index + 1, e),
        }
    }
    Ok(())
}

fn manifest(document: &Document, options: &ExportOptions, files: Vec<String>) -> PackageInfo {
    let meta = &document.metadata;
    let name = crate::html::text::slug(&meta.title);
    let generated_at = options
        .bundle
        .generated_at
        .clone()
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    PackageInfo {
        name: if name.is_empty() { "training-package".to_string() } else { name },
        version: options.bundle.version.clone(),
        generated_at,
        document: DocumentSummary {
            id: document.id.clone(),
            title: meta.title.clone(),
            topic: meta.topic.clone(),
            date: meta.date.clone(),
            company: meta.company.clone(),
        },
        step_count: document.steps.len(),
        screenshot_count: document.screenshot_count(),
        options: options.clone(),
        files,
    }
}
