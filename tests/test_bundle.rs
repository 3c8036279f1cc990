//! Training bundle archive contents.

use std::fs::File;
use std::io::{Read, Write};

use image::{Rgba, RgbaImage};
use snapguide::config::{BundleOptions, ExportFormat, ExportOptions};
use snapguide::export::{render, ExportOutput};
use snapguide::model::{Callout, CalloutKind, Document, Screenshot, Step};
use snapguide::raster::{encode_data_url, encode_png};
use zip::ZipArchive;

fn png_url(w: u32, h: u32) -> String {
    let image = RgbaImage::from_pixel(w, h, Rgba([30, 60, 90, 255]));
    encode_data_url("image/png", &encode_png(&image).unwrap())
}

fn three_steps() -> Document {
    let hint = Callout::new(
        "tip",
        CalloutKind::Number {
            number: 1,
            reveal_text: Some("Start here".to_string()),
        },
        10.0,
        10.0,
        12.0,
        12.0,
    );
    Document::new("Inventory Counts")
        .with_step(
            Step::new("s1", "Open inventory")
                .with_screenshot(Screenshot::new("a", png_url(240, 160)).with_callout(hint)),
        )
        .with_step(Step::new("s2", "Pick a warehouse"))
        .with_step(
            Step::new("s3", "Confirm counts").with_screenshot(
                Screenshot::new("b", png_url(240, 160)).with_secondary(png_url(240, 160), Vec::new()),
            ),
        )
}

fn options() -> ExportOptions {
    ExportOptions::default()
        .with_format(ExportFormat::Bundle)
        .with_bundle(BundleOptions::default().with_generated_at("2024-05-01T12:00:00Z"))
}

fn bundle_bytes(doc: &Document, options: &ExportOptions) -> Vec<u8> {
    match render(doc, options).unwrap() {
        ExportOutput::Zip(bytes) => bytes,
        other => panic!("expected a zip, got .{}", other.extension()),
    }
}

fn read_entry<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>, name: &str) -> Vec<u8> {
    let mut entry = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}

#[test]
fn test_bundle_round_trips_through_disk() {
    let bytes = bundle_bytes(&three_steps(), &options());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.zip");
    File::create(&path).unwrap().write_all(&bytes).unwrap();

    let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "manual/training-manual.pdf",
            "interactive/training-module.html",
            "resources/style-guide.md",
            "resources/quick-reference.txt",
            "resources/thumbnails/step-1.jpg",
            "resources/thumbnails/step-3.jpg",
            "README.txt",
            "package-info.json",
        ]
    );

    let pdf = read_entry(&mut archive, "manual/training-manual.pdf");
    assert!(pdf.starts_with(b"%PDF-"));

    let html = String::from_utf8(read_entry(&mut archive, "interactive/training-module.html")).unwrap();
    assert!(html.contains("reveal-hotspot"));
    assert!(html.contains("data:image/jpeg;base64,"));

    let manifest: serde_json::Value =
        serde_json::from_slice(&read_entry(&mut archive, "package-info.json")).unwrap();
    assert_eq!(manifest["stepCount"], 3);
    assert_eq!(manifest["screenshotCount"], 2);
    assert_eq!(manifest["generatedAt"], "2024-05-01T12:00:00Z");
    assert_eq!(manifest["name"], "inventory-counts");
    assert_eq!(manifest["files"].as_array().unwrap().len(), names.len());

    let readme = String::from_utf8(read_entry(&mut archive, "README.txt")).unwrap();
    assert!(readme.contains("Inventory Counts"));
}

#[test]
fn test_bundle_is_deterministic_with_pinned_timestamp() {
    let doc = three_steps();
    assert_eq!(bundle_bytes(&doc, &options()), bundle_bytes(&doc, &options()));
}

#[test]
fn test_optional_resources_can_be_switched_off() {
    let options = ExportOptions::default().with_format(ExportFormat::Bundle).with_bundle(
        BundleOptions::default()
            .with_style_guide(false)
            .with_quick_reference(false)
            .with_thumbnails(false)
            .with_generated_at("2024-05-01T12:00:00Z"),
    );
    let bytes = bundle_bytes(&three_steps(), &options);
    let archive = ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    assert_eq!(names.len(), 4);
    assert!(!names.iter().any(|n| n.starts_with("resources/")));
}
