//! The export entry point.
//!
//! [`render`] is a pure function of the document and the options: the same
//! inputs always produce the same output (bundle manifests carry a
//! timestamp unless one is pinned in [`crate::config::BundleOptions`]).

use crate::cancel::CancellationToken;
use crate::config::{ExportFormat, ExportOptions, HtmlMode};
use crate::error::Result;
use crate::model::Document;

/// Output of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutput {
    /// PDF bytes
    Pdf(Vec<u8>),
    /// Standalone HTML page
    Html(String),
    /// ZIP archive (HTML zip mode or training bundle)
    Zip(Vec<u8>),
}

impl ExportOutput {
    /// Raw bytes, for writing to a file.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ExportOutput::Pdf(bytes) | ExportOutput::Zip(bytes) => bytes,
            ExportOutput::Html(html) => html.into_bytes(),
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportOutput::Pdf(_) => "pdf",
            ExportOutput::Html(_) => "html",
            ExportOutput::Zip(_) => "zip",
        }
    }
}

/// Render a document in the format selected by `options`.
///
/// # Examples
///
/// ```
/// use snapguide::config::ExportOptions;
/// use snapguide::export::{render, ExportOutput};
/// use snapguide::model::{Document, Step};
///
/// let doc = Document::new("Guide").with_step(Step::new("s1", "Open the app"));
/// let output = render(&doc, &ExportOptions::default()).unwrap();
/// assert!(matches!(output, ExportOutput::Pdf(ref bytes) if bytes.starts_with(b"%PDF-")));
/// ```
pub fn render(document: &Document, options: &ExportOptions) -> Result<ExportOutput> {
    render_with_token(document, options, &CancellationToken::new())
}

/// Like [`render`], checking `token` between steps and images.
pub fn render_with_token(
    document: &Document,
    options: &ExportOptions,
    token: &CancellationToken,
) -> Result<ExportOutput> {
    document.validate()?;
    log::debug!(
        "Exporting '{}' as {:?}: {} steps, {} screenshots",
        document.metadata.title,
        options.format,
        document.steps.len(),
        document.screenshot_count()
    );
    match options.format {
        ExportFormat::Pdf => Ok(ExportOutput::Pdf(crate::pdf::render_pdf(document, options, token)?)),
        ExportFormat::Html => {
            let export = crate::html::render_html(document, options, token)?;
            match options.html_mode {
                HtmlMode::Standalone => Ok(ExportOutput::Html(export.html)),
                HtmlMode::Zip => Ok(ExportOutput::Zip(export.to_zip()?)),
            }
        },
        ExportFormat::Bundle => Ok(ExportOutput::Zip(crate::bundle::render_bundle(
            document, options, token,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::Step;

    #[test]
    fn test_invalid_document_rejected() {
        let doc = Document::new("x").with_step(Step::new("", "no id"));
        assert!(matches!(
            render(&doc, &ExportOptions::default()),
            Err(Error::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_html_standalone() {
        let doc = Document::new("x").with_step(Step::new("s1", "one"));
        let options = ExportOptions::default().with_format(ExportFormat::Html);
        let out = render(&doc, &options).unwrap();
        assert_eq!(out.extension(), "html");
        assert!(String::from_utf8(out.into_bytes()).unwrap().starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_html_zip() {
        let doc = Document::new("x").with_step(Step::new("s1", "one"));
        let options = ExportOptions::default()
            .with_format(ExportFormat::Html)
            .with_html_mode(HtmlMode::Zip);
        let out = render(&doc, &options).unwrap();
        assert!(matches!(out, ExportOutput::Zip(ref b) if b.starts_with(b"PK")));
    }
}
