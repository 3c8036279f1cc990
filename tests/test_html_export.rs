//! Interactive HTML module output.

use image::{Rgba, RgbaImage};
use snapguide::cancel::CancellationToken;
use snapguide::config::{ExportOptions, HtmlMode};
use snapguide::html::{render_html, render_standalone};
use snapguide::model::{Callout, CalloutKind, Document, Quiz, Resource, Screenshot, Step};
use snapguide::raster::{encode_data_url, encode_png};

fn png_url(w: u32, h: u32) -> String {
    let image = RgbaImage::from_fn(w, h, |x, _| Rgba([(x % 256) as u8, 120, 200, 255]));
    encode_data_url("image/png", &encode_png(&image).unwrap())
}

fn module() -> Document {
    let hint = Callout::new(
        "n1",
        CalloutKind::Number {
            number: 1,
            reveal_text: Some("The <Save> button".to_string()),
        },
        60.0,
        10.0,
        8.0,
        8.0,
    );
    let mut first = Step::new("save", "Save your draft")
        .with_screenshot(Screenshot::new("a", png_url(200, 120)).with_callout(hint))
        .with_tag("Drafts");
    first.instructions = Some("Press Save.\n\nSee https://example.com/help for details.".to_string());
    first.quiz = Some(Quiz {
        question: "Where is Save?".to_string(),
        options: vec!["Top right".to_string(), "Bottom left".to_string()],
        answer_index: 0,
        explanation: None,
    });

    let mut second = Step::new("share", "Share it").with_tag("Drafts");
    second.notes = Some("Sharing needs edit rights.".to_string());

    let mut doc = Document::new("Drafts 101").with_step(first).with_step(second);
    doc.id = "drafts-101".to_string();
    doc
}

#[test]
fn test_render_is_deterministic() {
    let doc = module();
    let options = ExportOptions::default();
    let token = CancellationToken::new();
    let a = render_standalone(&doc, &options, &token).unwrap();
    let b = render_standalone(&doc, &options, &token).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_reveal_hotspot_and_viewer_script() {
    let html = render_standalone(&module(), &ExportOptions::default(), &CancellationToken::new()).unwrap();

    assert!(html.contains("id=\"step-1-1-n1\""));
    assert!(html.contains("class=\"callout callout-number reveal-hotspot\""));
    assert!(html.contains("The &lt;Save&gt; button"));
    assert!(!html.contains("The <Save> button"));
    // the viewer wires hotspots up by class
    assert!(html.contains(".reveal-hotspot"));
}

#[test]
fn test_step_sections_in_order() {
    let html = render_standalone(&module(), &ExportOptions::default(), &CancellationToken::new()).unwrap();
    let first = html.find("id=\"step-1\"").unwrap();
    let second = html.find("id=\"step-2\"").unwrap();
    assert!(first < second);
    assert!(html.contains("data-tags=\"tag-1\""));
    assert!(html.contains("<a href=\"https://example.com/help\""));
    assert!(html.contains("class=\"quiz\" data-answer=\"0\""));
    assert!(html.contains("Sharing needs edit rights."));
    assert!(html.contains("snapguide-progress-drafts-101"));
}

#[test]
fn test_zip_mode_externalises_images() {
    let options = ExportOptions::default().with_html_mode(HtmlMode::Zip);
    let export = render_html(&module(), &options, &CancellationToken::new()).unwrap();

    assert_eq!(export.assets.len(), 1);
    assert_eq!(export.assets[0].0, "assets/step-1-1.jpg");
    assert!(export.html.contains("src=\"assets/step-1-1.jpg\""));
    assert!(!export.html.contains("data:image/jpeg"));

    let zip = export.to_zip().unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip)).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(names, vec!["index.html", "assets/step-1-1.jpg"]);
}

#[test]
fn test_password_protected_module_hides_content() {
    let options = ExportOptions::default().with_password("s3cret");
    let html = render_standalone(&module(), &options, &CancellationToken::new()).unwrap();
    assert!(html.contains("<main id=\"content\" hidden>"));
    assert!(!html.contains("s3cret"));
    assert!(html.contains(&snapguide::html::password_digest("s3cret")));
}

#[test]
fn test_tags_with_same_letters_stay_apart() {
    let doc = Document::new("Languages")
        .with_step(Step::new("cpp", "Compile C++").with_tag("C++"))
        .with_step(Step::new("cs", "Compile C#").with_tag("C#"))
        .with_step(Step::new("misc", "Anything else").with_tag("!!!"))
        .with_step(Step::new("none", "No tags"));
    let html = render_standalone(&doc, &ExportOptions::default(), &CancellationToken::new()).unwrap();

    assert!(html.contains("id=\"step-1\" data-tags=\"tag-1\""));
    assert!(html.contains("id=\"step-2\" data-tags=\"tag-2\""));
    assert!(html.contains("id=\"step-3\" data-tags=\"tag-3\""));
    assert!(html.contains("id=\"step-4\" data-tags=\"\""));
    // one button in the index and one on the step, per tag
    assert_eq!(html.matches("data-tag=\"tag-1\"").count(), 2);
    assert_eq!(html.matches("data-tag=\"tag-2\"").count(), 2);
    assert!(!html.contains("data-tag=\"\""));
}

#[test]
fn test_script_links_are_not_clickable() {
    let mut step = Step::new("links", "Useful links");
    step.resources = vec![
        Resource {
            title: "Help centre".to_string(),
            url: "https://example.com/help".to_string(),
        },
        Resource {
            title: "Sneaky".to_string(),
            url: "javascript:alert(document.cookie)".to_string(),
        },
    ];
    let doc = Document::new("Links").with_step(step);
    let html = render_standalone(&doc, &ExportOptions::default(), &CancellationToken::new()).unwrap();

    assert!(html.contains("<a href=\"https://example.com/help\""));
    assert!(!html.contains("javascript:alert"));
    assert!(html.contains("<li>Sneaky</li>"));
}

#[test]
fn test_malformed_callouts_are_skipped() {
    let good = Callout::new(
        "good",
        CalloutKind::Number {
            number: 1,
            reveal_text: Some("Still here".to_string()),
        },
        20.0,
        20.0,
        20.0,
        20.0,
    );
    let negative = Callout::new(
        "negative",
        CalloutKind::Number {
            number: 2,
            reveal_text: Some("Gone".to_string()),
        },
        10.0,
        10.0,
        -5.0,
        10.0,
    );
    let nan = Callout::new("nan", CalloutKind::Oval, f32::NAN, 10.0, 10.0, 10.0);
    let huge: Callout = serde_json::from_str(
        r#"{"id":"huge","shape":"polygon","x":5,"y":5,"width":30,"height":30,"polygonStyle":{"sides":4294967295}}"#,
    )
    .unwrap();
    let unknown: Callout =
        serde_json::from_str(r#"{"id":"odd","shape":"hexagram","x":60,"y":60,"width":10,"height":10}"#).unwrap();

    let shot = Screenshot::new("a", png_url(200, 120))
        .with_callout(negative)
        .with_callout(nan)
        .with_callout(huge)
        .with_callout(unknown)
        .with_callout(good);
    let doc = Document::new("Hostile").with_step(Step::new("s1", "Look").with_screenshot(shot));
    let html = render_standalone(&doc, &ExportOptions::default(), &CancellationToken::new()).unwrap();

    // the composited image is still embedded, not the fallback
    assert!(html.contains("data:image/jpeg;base64,"));
    assert!(!html.contains("Image unavailable"));
    assert!(html.contains("id=\"step-1-1-good\""));
    assert!(html.contains("Still here"));
    assert!(!html.contains("step-1-1-negative"));
    assert!(!html.contains("Gone"));
}
