//! Compositor dispatch and image processor properties.

use image::{Rgba, RgbaImage};
use snapguide::model::{Callout, CalloutKind, Screenshot};
use snapguide::raster::{
    composite, composite_image, compress, crop, decode_data_url, encode_data_url, encode_png, frame,
    render_screenshot, undo_crop, FrameStyle, ImageSettings, PixelCropRect,
};

fn white(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
}

fn png_url(image: &RgbaImage) -> String {
    encode_data_url("image/png", &encode_png(image).unwrap())
}

#[test]
fn test_unknown_shape_from_json_renders_as_circle() {
    let unknown: Callout = serde_json::from_str(
        r##"{"id":"u","shape":"hexagram","color":"#16a34a","x":20,"y":20,"width":60,"height":60}"##,
    )
    .unwrap();
    assert!(matches!(unknown.kind, CalloutKind::Unrecognized { .. }));
    let circle = Callout::new("u", CalloutKind::Circle { number: None }, 20.0, 20.0, 60.0, 60.0)
        .with_color("#16a34a");

    let image = white(120, 120);
    let a = composite_image(&image, &[unknown]).unwrap();
    let b = composite_image(&image, &[circle]).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, image, "the fallback must draw something");
}

#[test]
fn test_every_shape_draws() {
    let image = white(100, 100);
    let shapes = vec![
        CalloutKind::Circle { number: Some(3) },
        CalloutKind::Number {
            number: 1,
            reveal_text: None,
        },
        CalloutKind::Rectangle {
            text: Some("OK".to_string()),
        },
        CalloutKind::Arrow,
        CalloutKind::Oval,
        CalloutKind::Polygon { sides: 6 },
    ];
    for kind in shapes {
        let name = kind.shape_name().to_string();
        let c = Callout::new("c", kind, 10.0, 10.0, 80.0, 80.0);
        let out = composite_image(&image, &[c]).unwrap();
        assert_ne!(out, image, "{} drew nothing", name);
    }
}

#[test]
fn test_padded_canvas_keeps_band_clear() {
    let image = RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 255]));
    let out = composite(&image, &[], 70, 70, 10.0).unwrap();
    assert_eq!(out.dimensions(), (70, 70));
    assert_eq!(out.get_pixel(2, 2).0[3], 0);
    assert_eq!(out.get_pixel(35, 35).0, [0, 0, 0, 255]);
}

#[test]
fn test_crop_then_undo_is_identity() {
    let source = RgbaImage::from_fn(64, 48, |x, y| Rgba([x as u8 * 3, y as u8 * 5, 9, 255]));
    let shot = Screenshot::new("s", png_url(&source));

    let cropped = crop(&shot, PixelCropRect::new(8, 8, 20, 10));
    assert!(cropped.is_cropped);
    assert_eq!(cropped.original_data_url.as_deref(), Some(shot.data_url.as_str()));
    assert_eq!(decode_data_url(&cropped.data_url).unwrap().dimensions(), (20, 10));

    let restored = undo_crop(&cropped);
    assert_eq!(restored.data_url, shot.data_url);
    assert!(!restored.is_cropped);
}

#[test]
fn test_second_crop_keeps_first_original() {
    let shot = Screenshot::new("s", png_url(&white(40, 40)));
    let once = crop(&shot, PixelCropRect::new(0, 0, 30, 30));
    let twice = crop(&once, PixelCropRect::new(0, 0, 10, 10));
    assert_eq!(twice.original_data_url.as_deref(), Some(shot.data_url.as_str()));
    assert_eq!(undo_crop(&twice).data_url, shot.data_url);
}

#[test]
fn test_crop_of_undecodable_image_is_noop() {
    let shot = Screenshot::new("s", "data:image/png;base64,bm90IGFuIGltYWdl");
    assert_eq!(crop(&shot, PixelCropRect::new(0, 0, 5, 5)), shot);
}

#[test]
fn test_compress_is_idempotent_below_threshold() {
    let small = white(300, 200);
    let once = compress(&small, 1024);
    assert_eq!(once.dimensions(), (300, 200));
    assert_eq!(compress(&once, 1024).dimensions(), (300, 200));

    let big = white(2048, 1024);
    let shrunk = compress(&big, 1024);
    assert_eq!(shrunk.dimensions(), (1024, 512));
    assert_eq!(compress(&shrunk, 1024).dimensions(), (1024, 512));
}

#[test]
fn test_frame_adds_padding() {
    let style = FrameStyle {
        padding: 10,
        ..FrameStyle::default()
    };
    let framed = frame(&white(30, 20), &style).unwrap();
    assert_eq!(framed.dimensions(), (50, 40));
}

#[test]
fn test_render_screenshot_pipeline() {
    let url = png_url(&white(2000, 1000));
    let settings = ImageSettings {
        max_width: 500,
        quality: 70,
        frame: Some(FrameStyle::default()),
    };
    let callout = Callout::new("a", CalloutKind::Arrow, 10.0, 10.0, 30.0, 10.0);
    let rendered = render_screenshot(&url, &[callout], &settings).unwrap();
    assert_eq!((rendered.width, rendered.height), (532, 282));
    assert!(rendered.jpeg.starts_with(&[0xFF, 0xD8]));
    assert!(rendered.data_url().starts_with("data:image/jpeg;base64,"));
}

#[test]
fn test_render_screenshot_rejects_garbage() {
    let settings = ImageSettings::thumbnail(100, 60);
    assert!(render_screenshot("not a data url", &[], &settings).is_err());
}
