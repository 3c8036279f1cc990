//! Export configuration.
//!
//! Options are plain values passed into [`crate::export::render`]; nothing is
//! read from the environment. They deserialise from camelCase JSON so the CLI
//! can load an options file, and serialise back into bundle manifests.

use serde::{Deserialize, Serialize};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Paginated PDF manual
    #[default]
    Pdf,
    /// Interactive HTML module
    Html,
    /// ZIP bundle with PDF, HTML and resources
    Bundle,
}

impl ExportFormat {
    /// Parse a format name (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(ExportFormat::Pdf),
            "html" => Some(ExportFormat::Html),
            "bundle" | "zip" => Some(ExportFormat::Bundle),
            _ => None,
        }
    }
}

/// How the HTML exporter packages images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlMode {
    /// One file with base64 images
    #[default]
    Standalone,
    /// `index.html` plus an `assets/` folder in a ZIP
    Zip,
}

/// Image quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    /// 1024px, JPEG quality 60
    Low,
    /// 1280px, JPEG quality 75
    Medium,
    /// 1600px, JPEG quality 85
    #[default]
    High,
}

impl QualityLevel {
    /// Parse a preset name (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "low" => Some(QualityLevel::Low),
            "medium" => Some(QualityLevel::Medium),
            "high" => Some(QualityLevel::High),
            _ => None,
        }
    }

    /// Maximum raster width in pixels.
    pub fn max_width(self) -> u32 {
        match self {
            QualityLevel::Low => 1024,
            QualityLevel::Medium => 1280,
            QualityLevel::High => 1600,
        }
    }

    /// JPEG quality, 1..=100.
    pub fn jpeg_quality(self) -> u8 {
        match self {
            QualityLevel::Low => 60,
            QualityLevel::Medium => 75,
            QualityLevel::High => 85,
        }
    }
}

/// Export options.
///
/// # Examples
///
/// ```
/// use snapguide::config::{ExportFormat, ExportOptions, QualityLevel};
///
/// let options = ExportOptions::new()
///     .with_format(ExportFormat::Html)
///     .with_quality(QualityLevel::Low)
///     .with_toc(false);
/// assert_eq!(options.quality.max_width(), 1024);
/// assert!(!options.include_toc);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// Output format
    pub format: ExportFormat,
    /// HTML packaging
    pub html_mode: HtmlMode,
    /// PDF theme name
    pub theme: String,
    /// Image quality preset
    pub quality: QualityLevel,
    /// Emit a table of contents page
    pub include_toc: bool,
    /// Print "Step i of n" under each step header
    pub include_progress: bool,
    /// Frame exported screenshots (padding, rounded corners, shadow)
    pub frame_images: bool,
    /// Flate-compress PDF content streams
    pub compress_pdf: bool,
    /// Password protecting the HTML module
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Report completion to a SCORM 1.2 LMS
    pub lms: bool,
    /// Bundle-only options
    pub bundle: BundleOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self {
            format: ExportFormat::Pdf,
            html_mode: HtmlMode::Standalone,
            theme: "professional".to_string(),
            quality: QualityLevel::High,
            include_toc: true,
            include_progress: false,
            frame_images: true,
            compress_pdf: true,
            password: None,
            lms: false,
            bundle: BundleOptions::default(),
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the HTML packaging mode.
    pub fn with_html_mode(mut self, mode: HtmlMode) -> Self {
        self.html_mode = mode;
        self
    }

    /// Set the PDF theme.
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Set the quality preset.
    pub fn with_quality(mut self, quality: QualityLevel) -> Self {
        self.quality = quality;
        self
    }

    /// Enable or disable the table of contents.
    pub fn with_toc(mut self, enable: bool) -> Self {
        self.include_toc = enable;
        self
    }

    /// Enable or disable progress lines.
    pub fn with_progress(mut self, enable: bool) -> Self {
        self.include_progress = enable;
        self
    }

    /// Enable or disable image framing.
    pub fn with_frame(mut self, enable: bool) -> Self {
        self.frame_images = enable;
        self
    }

    /// Enable or disable PDF stream compression.
    pub fn with_pdf_compression(mut self, enable: bool) -> Self {
        self.compress_pdf = enable;
        self
    }

    /// Protect the HTML module with a password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Enable SCORM reporting.
    pub fn with_lms(mut self, enable: bool) -> Self {
        self.lms = enable;
        self
    }

    /// Set bundle options.
    pub fn with_bundle(mut self, bundle: BundleOptions) -> Self {
        self.bundle = bundle;
        self
    }
}

/// Options for the ZIP training bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BundleOptions {
    /// Include `resources/style-guide.md`
    pub include_style_guide: bool,
    /// Include `resources/quick-reference.txt`
    pub include_quick_reference: bool,
    /// Include `resources/thumbnails/step-{n}.jpg`
    pub include_thumbnails: bool,
    /// Thumbnail width in pixels
    pub thumbnail_width: u32,
    /// Package version recorded in the manifest
    pub version: String,
    /// Manifest timestamp; the current UTC time when unset
    pub generated_at: Option<String>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            include_style_guide: true,
            include_quick_reference: true,
            include_thumbnails: true,
            thumbnail_width: 320,
            version: "1.0.0".to_string(),
            generated_at: None,
        }
    }
}

impl BundleOptions {
    /// Enable or disable the style guide.
    pub fn with_style_guide(mut self, enable: bool) -> Self {
        self.include_style_guide = enable;
        self
    }

    /// Enable or disable the quick reference.
    pub fn with_quick_reference(mut self, enable: bool) -> Self {
        self.include_quick_reference = enable;
        self
    }

    /// Enable or disable thumbnails.
    pub fn with_thumbnails(mut self, enable: bool) -> Self {
        self.include_thumbnails = enable;
        self
    }

    /// Pin the manifest timestamp.
    pub fn with_generated_at(mut self, timestamp: impl Into<String>) -> Self {
        self.generated_at = Some(timestamp.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExportOptions::default();
        assert_eq!(options.format, ExportFormat::Pdf);
        assert_eq!(options.theme, "professional");
        assert!(options.include_toc);
        assert_eq!(options.bundle.thumbnail_width, 320);
    }

    #[test]
    fn test_quality_presets() {
        assert_eq!(QualityLevel::Low.max_width(), 1024);
        assert_eq!(QualityLevel::Medium.jpeg_quality(), 75);
        assert_eq!(QualityLevel::High.max_width(), 1600);
        assert_eq!(QualityLevel::parse("MEDIUM"), Some(QualityLevel::Medium));
        assert_eq!(QualityLevel::parse("ultra"), None);
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(ExportFormat::parse("html"), Some(ExportFormat::Html));
        assert_eq!(ExportFormat::parse("zip"), Some(ExportFormat::Bundle));
        assert_eq!(ExportFormat::parse("svg"), None);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let options: ExportOptions = serde_json::from_str(
            r#"{"format":"bundle","htmlMode":"zip","quality":"low","bundle":{"includeThumbnails":false}}"#,
        )
        .unwrap();
        assert_eq!(options.format, ExportFormat::Bundle);
        assert_eq!(options.html_mode, HtmlMode::Zip);
        assert_eq!(options.quality, QualityLevel::Low);
        assert!(!options.bundle.include_thumbnails);
        assert!(options.bundle.include_style_guide);
        assert!(options.include_toc);
    }

    #[test]
    fn test_password_not_serialized() {
        let options = ExportOptions::new().with_password("secret");
        let json = serde_json::to_string(&options).unwrap();
        assert!(!json.contains("secret"));
    }
}
