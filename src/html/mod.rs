//! Interactive HTML training module.
//!
//! Two packagings of the same page:
//!
//! - [`HtmlMode::Standalone`]: one HTML file, every screenshot inlined as a
//!   base64 `data:` URL;
//! - [`HtmlMode::Zip`]: `index.html` plus `assets/step-{n}-{k}.jpg`.
//!
//! Screenshots are composited before embedding, so callouts are already in
//! the pixels. Number callouts with reveal text additionally get a clickable
//! hotspot positioned with the same percentage box the compositor resolves.
//! A screenshot whose compositing fails falls back to the raw image.
//!
//! Output depends only on the document and options: no clocks, stable asset
//! names and a fixed JSON field order.

pub mod script;
pub mod template;
pub mod text;

pub use script::{password_digest, ScriptConfig, VIEWER_SCRIPT};
pub use text::{escape_html, linkify};

use crate::bundle::archive::Archive;
use crate::cancel::CancellationToken;
use crate::config::{ExportOptions, HtmlMode};
use crate::error::Result;
use crate::model::{Callout, Document, Screenshot, Step};
use crate::overlay::{overlay_elements, OverlayMode};
use crate::pdf::PdfTheme;
use crate::raster::{render_raw, render_screenshot, ImageSettings, RenderedImage};
use text::{paragraphs, safe_href, slug, TagKeys};

/// Rendered HTML with externalised assets.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlExport {
    /// The page
    pub html: String,
    /// `(path, bytes)` for each asset the page references, empty in
    /// standalone mode
    pub assets: Vec<(String, Vec<u8>)>,
}

impl HtmlExport {
    /// Package as a ZIP with `index.html` and the assets.
    pub fn to_zip(&self) -> Result<Vec<u8>> {
        let mut archive = Archive::new();
        archive.add("index.html", self.html.as_bytes())?;
        for (path, bytes) in &self.assets {
            archive.add(path, bytes)?;
        }
        archive.finish()
    }
}

/// Where an image's bytes end up.
struct ImageSink<'a> {
    mode: HtmlMode,
    assets: &'a mut Vec<(String, Vec<u8>)>,
}

impl ImageSink<'_> {
    /// `src` attribute for an image, storing the bytes in zip mode.
    fn src(&mut self, name: &str, image: &RenderedImage) -> String {
        match self.mode {
            HtmlMode::Standalone => image.data_url(),
            HtmlMode::Zip => {
                let path = format!("assets/{}.jpg", name);
                self.assets.push((path.clone(), image.jpeg.clone()));
                path
            },
        }
    }
}

/// Render the module as a standalone page or a page plus assets, depending
/// on `options.html_mode`.
pub fn render_html(
    document: &Document,
    options: &ExportOptions,
    token: &CancellationToken,
) -> Result<HtmlExport> {
    let meta = &document.metadata;
    let theme = PdfTheme::by_name(&options.theme).with_primary_override(meta.accent_color.as_deref());
    let settings = ImageSettings::from_options(options);
    let mut assets = Vec::new();
    let mut sink = ImageSink {
        mode: options.html_mode,
        assets: &mut assets,
    };

    let logo_src = meta.logo.as_deref().and_then(|url| {
        match render_raw(url, &ImageSettings::thumbnail(240, 90)) {
            Ok(image) => Some(sink.src("logo", &image)),
            Err(e) => {
                log::warn!("Skipping logo: {}", e);
                None
            },
        }
    });

    let tags = document.tags();
    let tag_keys = TagKeys::new(tags.iter().copied());
    let mut steps_html = String::new();
    for (index, step) in document.steps.iter().enumerate() {
        token.checkpoint()?;
        steps_html.push_str(&step_section(index, step, &tag_keys, &settings, &mut sink));
    }

    let password_hash = options
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(password_digest);
    let config = ScriptConfig {
        storage_key: storage_key(document),
        total_steps: document.steps.len(),
        password_hash: password_hash.clone(),
        lms: options.lms,
        dark_mode: meta.dark_mode,
    };

    let title = if meta.title.trim().is_empty() { "Training Module" } else { meta.title.as_str() };
    let mut html = String::with_capacity(steps_html.len() + 16 * 1024);
    html.push_str("<!DOCTYPE html>\n");
    html.push_str(&format!(
        "<html lang=\"en\" data-theme=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <meta name=\"generator\" content=\"snapguide\">\n<title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n",
        if meta.dark_mode { "dark" } else { "light" },
        escape_html(title),
        template::stylesheet(&theme),
    ));
    html.push_str(&template::header(meta, logo_src.as_deref()));
    html.push('\n');
    if password_hash.is_some() {
        html.push_str(template::password_gate());
        html.push('\n');
        html.push_str("<main id=\"content\" hidden>\n");
    } else {
        html.push_str("<main id=\"content\">\n");
    }
    html.push_str(template::progress_bar());
    html.push('\n');
    let tag_index = template::tag_buttons(&tags, &tag_keys);
    if !tag_index.is_empty() {
        html.push_str(&format!(
            "<nav class=\"tag-index\" aria-label=\"Tags\">{}</nav>\n",
            tag_index
        ));
    }
    html.push_str("<ol class=\"steps\">\n");
    html.push_str(&steps_html);
    html.push_str("</ol>\n</main>\n");
    html.push_str(&config.to_html()?);
    html.push_str("\n<script>\n");
    html.push_str(VIEWER_SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");

    log::debug!(
        "Rendered HTML module: {} steps, {} bytes, {} assets",
        document.steps.len(),
        html.len(),
        assets.len()
    );
    Ok(HtmlExport { html, assets })
}

/// Render a standalone HTML string, whatever `options.html_mode` says.
pub fn render_standalone(
    document: &Document,
    options: &ExportOptions,
    token: &CancellationToken,
) -> Result<String> {
    let options = ExportOptions {
        html_mode: HtmlMode::Standalone,
        ..options.clone()
    };
    Ok(render_html(document, &options, token)?.html)
}

/// `localStorage` key for a document's progress.
fn storage_key(document: &Document) -> String {
    let id = if document.id.is_empty() { slug(&document.metadata.title) } else { document.id.clone() };
    format!("snapguide-progress-{}", id)
}

fn step_section(
    index: usize,
    step: &Step,
    tag_keys: &TagKeys,
    settings: &ImageSettings,
    sink: &mut ImageSink,
) -> String {
    let n = index + 1;
    let mut step_keys: Vec<&str> = Vec::new();
    for key in step.tags.iter().filter_map(|t| tag_keys.key(t)) {
        if !step_keys.contains(&key) {
            step_keys.push(key);
        }
    }
    let mut html = format!(
        "<li class=\"step\" id=\"step-{}\" data-tags=\"{}\">\n<div class=\"step-header\">\
         <span class=\"step-number\">Step {}</span><h2 class=\"step-title\">{}</h2>\
         <label class=\"step-done\"><input type=\"checkbox\" class=\"step-complete\" data-step=\"{}\"> Done</label></div>\n",
        n,
        step_keys.join(" "),
        n,
        escape_html(&step.description),
        escape_html(&step.id),
    );

    if let Some(text) = step.instructions.as_deref() {
        html.push_str(&paragraphs(text));
    }
    for (k, shot) in step.screenshots().enumerate() {
        html.push_str(&screenshot_figure(n, k + 1, shot, settings, sink));
        html.push('\n');
    }
    if let Some(notes) = step.notes.as_deref().filter(|t| !t.trim().is_empty()) {
        html.push_str(&format!("<aside class=\"note\">{}</aside>", paragraphs(notes)));
    }
    let tags: Vec<&str> = step.tags.iter().map(String::as_str).collect();
    let buttons = template::tag_buttons(&tags, tag_keys);
    if !buttons.is_empty() {
        html.push_str(&format!("<div class=\"tags\">{}</div>", buttons));
    }
    if !step.resources.is_empty() {
        html.push_str("<ul class=\"resources\">");
        for resource in &step.resources {
            match safe_href(&resource.url) {
                Some(url) => html.push_str(&format!(
                    "<li><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></li>",
                    escape_html(url),
                    escape_html(&resource.title)
                )),
                None => {
                    log::warn!(
                        "Step {}: resource '{}' has an unsupported link scheme, listing it as text",
                        n,
                        resource.title
                    );
                    html.push_str(&format!("<li>{}</li>", escape_html(&resource.title)));
                },
            }
        }
        html.push_str("</ul>");
    }
    if let Some(quiz) = step.quiz.as_ref().and_then(|q| template::quiz(q, n)) {
        html.push_str(&quiz);
    }
    html.push_str("\n</li>\n");
    html
}

/// Composite a raster, falling back to the raw image.
fn render_with_fallback(
    data_url: &str,
    callouts: &[Callout],
    settings: &ImageSettings,
    label: &str,
) -> Option<RenderedImage> {
    match render_screenshot(data_url, callouts, settings) {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("Compositing {} failed, using raw image: {}", label, e);
            match render_raw(data_url, settings) {
                Ok(image) => Some(image),
                Err(e) => {
                    log::warn!("Skipping {}: {}", label, e);
                    None
                },
            }
        },
    }
}

fn screenshot_figure(
    step: usize,
    k: usize,
    shot: &Screenshot,
    settings: &ImageSettings,
    sink: &mut ImageSink,
) -> String {
    let padding = settings.frame.as_ref().map(|f| f.padding).unwrap_or(0);
    let label = format!("step {} screenshot {}", step, k);
    let mut html = String::from("<figure class=\"screenshot\">");

    let primary = render_with_fallback(&shot.data_url, &shot.callouts, settings, &label);
    html.push_str(&image_frame(
        &format!("step-{}-{}", step, k),
        primary.as_ref(),
        &shot.callouts,
        padding,
        &format!("Step {} screenshot {}", step, k),
        sink,
    ));

    if let Some(secondary) = &shot.secondary {
        let image = render_with_fallback(
            &secondary.data_url,
            &secondary.callouts,
            settings,
            &format!("{} (secondary)", label),
        );
        html.push_str(&image_frame(
            &format!("step-{}-{}-after", step, k),
            image.as_ref(),
            &secondary.callouts,
            padding,
            &format!("Step {} screenshot {}, after", step, k),
            sink,
        ));
        html.push_str("<figcaption>Before and after</figcaption>");
    }
    html.push_str("</figure>");
    html
}

fn image_frame(
    name: &str,
    image: Option<&RenderedImage>,
    callouts: &[Callout],
    padding: u32,
    alt: &str,
    sink: &mut ImageSink,
) -> String {
    let Some(image) = image else {
        return "<p class=\"image-missing\">Image unavailable</p>".to_string();
    };
    let src = sink.src(name, image);
    let mut html = format!(
        "<div class=\"screenshot-frame\"><img src=\"{}\" width=\"{}\" height=\"{}\" alt=\"{}\">",
        escape_html(&src),
        image.width,
        image.height,
        escape_html(alt)
    );

    let hotspots = overlay_elements(callouts, OverlayMode::Viewing);
    if !hotspots.is_empty() {
        // hotspot percentages refer to the image inside the frame padding
        let inset_x = padding as f32 * 100.0 / image.width.max(1) as f32;
        let inset_y = padding as f32 * 100.0 / image.height.max(1) as f32;
        html.push_str(&format!(
            "<div class=\"hotspots\" style=\"left:{x:.2}%;top:{y:.2}%;right:{x:.2}%;bottom:{y:.2}%\">",
            x = inset_x,
            y = inset_y
        ));
        for element in hotspots {
            html.push_str(&element.to_html(name));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CalloutKind;
    use crate::raster::{encode_data_url, encode_png};
    use image::{Rgba, RgbaImage};

    fn png(w: u32, h: u32) -> String {
        let img = RgbaImage::from_pixel(w, h, Rgba([200, 200, 200, 255]));
        encode_data_url("image/png", &encode_png(&img).unwrap())
    }

    fn doc() -> Document {
        let shot = Screenshot::new("shot-1", png(40, 30)).with_callout(Callout::new(
            "c1",
            CalloutKind::Number {
                number: 1,
                reveal_text: Some("Click Save".to_string()),
            },
            10.0,
            10.0,
            8.0,
            8.0,
        ));
        Document::new("Guide")
            .with_step(Step::new("s1", "Open settings").with_screenshot(shot).with_tag("Setup"))
            .with_step(Step::new("s2", "Done").with_tag("setup"))
    }

    #[test]
    fn test_standalone_inlines_images() {
        let out = render_html(&doc(), &ExportOptions::default(), &CancellationToken::new()).unwrap();
        assert!(out.assets.is_empty());
        assert!(out.html.contains("src=\"data:image/jpeg;base64,"));
        assert!(out.html.contains("class=\"callout callout-number reveal-hotspot\""));
        assert!(out.html.contains("Click Save"));
    }

    #[test]
    fn test_zip_mode_externalises_assets() {
        let options = ExportOptions::default().with_html_mode(HtmlMode::Zip);
        let out = render_html(&doc(), &options, &CancellationToken::new()).unwrap();
        assert_eq!(out.assets.len(), 1);
        assert_eq!(out.assets[0].0, "assets/step-1-1.jpg");
        assert!(out.html.contains("src=\"assets/step-1-1.jpg\""));
        assert!(!out.html.contains("data:image/jpeg"));
    }

    #[test]
    fn test_tags_differing_in_case_share_key() {
        let out = render_html(&doc(), &ExportOptions::default(), &CancellationToken::new()).unwrap();
        assert!(out.html.contains("id=\"step-1\" data-tags=\"tag-1\""));
        assert!(out.html.contains("id=\"step-2\" data-tags=\"tag-1\""));
    }

    #[test]
    fn test_broken_image_falls_back() {
        let shot = Screenshot::new("bad", "data:image/png;base64,AAAA");
        let doc = Document::new("x").with_step(Step::new("s1", "Broken").with_screenshot(shot));
        let out = render_html(&doc, &ExportOptions::default(), &CancellationToken::new()).unwrap();
        assert!(out.html.contains("Image unavailable"));
    }

    #[test]
    fn test_password_gate() {
        let options = ExportOptions::default().with_password("pw");
        let out = render_html(&doc(), &options, &CancellationToken::new()).unwrap();
        assert!(out.html.contains("id=\"password-gate\""));
        assert!(out.html.contains("<main id=\"content\" hidden>"));
        assert!(out.html.contains(&password_digest("pw")));
        assert!(!out.html.contains("\"pw\""));
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key(&Document::new("My Guide")), "snapguide-progress-my-guide");
    }
}
