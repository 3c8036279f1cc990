//! Named colour themes for the manual.

use crate::raster::color::{parse_color, to_rgb_f32};

/// Theme used when a name is not recognised.
pub const DEFAULT_THEME: &str = "professional";

/// A PDF colour theme. Colours are `#rrggbb` strings so the HTML exporter
/// and the style guide can reuse them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfTheme {
    /// Theme name
    pub name: &'static str,
    /// Cover band, pill number segment, headings
    pub primary: String,
    /// Secondary highlights (TOC leaders, progress text)
    pub accent: String,
    /// Body text
    pub text: String,
    /// Footer and caption text
    pub muted: String,
    /// Pill description segment fill
    pub surface: String,
}

impl PdfTheme {
    /// Names of all built-in themes.
    pub const NAMES: [&'static str; 4] = ["professional", "modern", "minimal", "vibrant"];

    fn build(name: &'static str, colors: [&str; 5]) -> Self {
        let [primary, accent, text, muted, surface] = colors.map(str::to_string);
        Self {
            name,
            primary,
            accent,
            text,
            muted,
            surface,
        }
    }

    /// Look up a theme by name (case-insensitive).
    ///
    /// Unknown names fall back to `professional` with a warning.
    pub fn by_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "professional" => {
                Self::build("professional", ["#1e3a8a", "#3b82f6", "#1f2937", "#6b7280", "#ffffff"])
            },
            "modern" => Self::build("modern", ["#0f766e", "#14b8a6", "#111827", "#6b7280", "#f8fafc"]),
            "minimal" => Self::build("minimal", ["#111827", "#4b5563", "#111827", "#9ca3af", "#ffffff"]),
            "vibrant" => Self::build("vibrant", ["#7c3aed", "#f59e0b", "#1f2937", "#6b7280", "#fffbeb"]),
            other => {
                log::warn!("Unknown theme '{}', using {}", other, DEFAULT_THEME);
                Self::by_name(DEFAULT_THEME)
            },
        }
    }

    /// Replace the primary colour when `accent` parses as a colour.
    pub fn with_primary_override(mut self, accent: Option<&str>) -> Self {
        if let Some(color) = accent.filter(|c| parse_color(c).is_some()) {
            self.primary = color.to_string();
        }
        self
    }

    /// Primary colour as PDF RGB components.
    pub fn primary_rgb(&self) -> (f32, f32, f32) {
        rgb(&self.primary)
    }

    /// Accent colour as PDF RGB components.
    pub fn accent_rgb(&self) -> (f32, f32, f32) {
        rgb(&self.accent)
    }

    /// Text colour as PDF RGB components.
    pub fn text_rgb(&self) -> (f32, f32, f32) {
        rgb(&self.text)
    }

    /// Muted colour as PDF RGB components.
    pub fn muted_rgb(&self) -> (f32, f32, f32) {
        rgb(&self.muted)
    }

    /// Surface colour as PDF RGB components.
    pub fn surface_rgb(&self) -> (f32, f32, f32) {
        rgb(&self.surface)
    }
}

impl Default for PdfTheme {
    fn default() -> Self {
        Self::by_name(DEFAULT_THEME)
    }
}

fn rgb(hex: &str) -> (f32, f32, f32) {
    parse_color(hex).map(to_rgb_f32).unwrap_or((0.0, 0.0, 0.0))
}
