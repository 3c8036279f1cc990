//! Text resources shipped in the bundle.

use std::fmt::Write;

use indexmap::IndexMap;

use crate::config::ExportOptions;
use crate::model::Document;
use crate::pdf::PdfTheme;

/// Markdown style guide: theme colours, fonts and the callout colour legend.
pub fn style_guide(document: &Document, options: &ExportOptions) -> String {
    let meta = &document.metadata;
    let theme = PdfTheme::by_name(&options.theme).with_primary_override(meta.accent_color.as_deref());
    let mut out = String::new();

    let _ = writeln!(out, "# {} - Style Guide\n", title_or_default(document));
    let _ = writeln!(out, "## Theme\n");
    let _ = writeln!(out, "Theme: **{}**\n", theme.name);
    let _ = writeln!(out, "| Role | Colour |");
    let _ = writeln!(out, "|------|--------|");
    for (role, color) in [
        ("Primary", &theme.primary),
        ("Accent", &theme.accent),
        ("Text", &theme.text),
        ("Muted", &theme.muted),
        ("Surface", &theme.surface),
    ] {
        let _ = writeln!(out, "| {} | `{}` |", role, color);
    }

    let _ = writeln!(out, "\n## Fonts\n");
    let _ = writeln!(out, "- PDF headings: Helvetica-Bold");
    let _ = writeln!(out, "- PDF body: Helvetica");
    let _ = writeln!(out, "- HTML: system sans-serif stack");

    // colour -> (shape -> count), in first-seen order
    let mut legend: IndexMap<String, IndexMap<String, usize>> = IndexMap::new();
    for step in &document.steps {
        for shot in step.screenshots() {
            let secondary = shot.secondary.iter().flat_map(|s| s.callouts.iter());
            for callout in shot.callouts.iter().chain(secondary) {
                *legend
                    .entry(callout.color.to_ascii_lowercase())
                    .or_default()
                    .entry(callout.kind.shape_name().to_string())
                    .or_default() += 1;
            }
        }
    }

    let _ = writeln!(out, "\n## Callout Legend\n");
    if legend.is_empty() {
        let _ = writeln!(out, "This document has no callouts.");
    } else {
        let _ = writeln!(out, "| Colour | Used for |");
        let _ = writeln!(out, "|--------|----------|");
        for (color, shapes) in &legend {
            let uses: Vec<String> = shapes
                .iter()
                .map(|(shape, count)| format!("{} x{}", shape, count))
                .collect();
            let _ = writeln!(out, "| `{}` | {} |", color, uses.join(", "));
        }
    }
    out
}

/// Plain-text quick reference, one entry per step.
pub fn quick_reference(document: &Document) -> String {
    let title = format!("{} - Quick Reference", title_or_default(document));
    let mut out = format!("{}\n{}\n\n", title, "=".repeat(title.chars().count()));
    for (index, step) in document.steps.iter().enumerate() {
        let _ = write!(out, "{:>3}. {}", index + 1, step.description.trim());
        if !step.tags.is_empty() {
            let _ = write!(out, "  [{}]", step.tags.join(", "));
        }
        out.push('\n');
        if let Some(first) = step
            .instructions
            .as_deref()
            .and_then(|t| t.lines().map(str::trim).find(|l| !l.is_empty()))
        {
            let _ = writeln!(out, "     {}", first);
        }
    }
    if document.steps.is_empty() {
        out.push_str("(no steps)\n");
    }
    out
}

/// `README.txt` describing the bundle layout.
pub fn readme(document: &Document, files: &[String]) -> String {
    let mut out = format!("{}\n\n", title_or_default(document));
    if let Some(topic) = document.metadata.topic.as_deref() {
        let _ = writeln!(out, "{}\n", topic);
    }
    out.push_str("This package contains the same training content in two formats.\n\n");
    out.push_str("  manual/training-manual.pdf        Printable manual\n");
    out.push_str("  interactive/training-module.html  Interactive module, open in any browser\n");
    out.push_str("  resources/                        Style guide, quick reference, thumbnails\n");
    out.push_str("  package-info.json                 Package manifest\n\n");
    out.push_str("Files:\n");
    for file in files {
        let _ = writeln!(out, "  {}", file);
    }
    out
}

fn title_or_default(document: &Document) -> &str {
    let title = document.metadata.title.trim();
    if title.is_empty() {
        "Training Package"
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Callout, CalloutKind, Screenshot, Step};

    fn doc() -> Document {
        let shot = Screenshot::new("a", "data:image/png;base64,")
            .with_callout(Callout::new("c1", CalloutKind::Arrow, 0.0, 0.0, 1.0, 1.0))
            .with_callout(Callout::new("c2", CalloutKind::Arrow, 0.0, 0.0, 1.0, 1.0))
            .with_callout(
                Callout::new("c3", CalloutKind::Oval, 0.0, 0.0, 1.0, 1.0).with_color("#00FF00"),
            );
        let mut step = Step::new("s1", "Open the app")
            .with_screenshot(shot)
            .with_tag("setup");
        step.instructions = Some("\nClick the icon.\nThen wait.".to_string());
        Document::new("Guide").with_step(step)
    }

    #[test]
    fn test_style_guide_legend() {
        let md = style_guide(&doc(), &ExportOptions::default());
        assert!(md.starts_with("# Guide - Style Guide"));
        assert!(md.contains("| `#ef4444` | arrow x2 |"));
        assert!(md.contains("| `#00ff00` | oval x1 |"));
    }

    #[test]
    fn test_quick_reference() {
        let text = quick_reference(&doc());
        assert!(text.contains("  1. Open the app  [setup]\n"));
        assert!(text.contains("     Click the icon.\n"));
        assert!(!text.contains("Then wait."));
    }

    #[test]
    fn test_readme_lists_files() {
        let text = readme(&doc(), &["README.txt".to_string()]);
        assert!(text.contains("  README.txt\n"));
    }
}
