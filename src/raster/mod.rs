//! Raster pipeline: decode, resize, composite, frame, encode.
//!
//! Screenshots arrive as `data:` URLs. Every exporter turns them into JPEG
//! bytes through [`render_screenshot`], which runs the same steps in the same
//! order: decode, [`compress`] to the quality preset's width, burn callouts in
//! with the [`compositor`], optionally [`frame`], then encode.
//!
//! Pixmaps are allocated per call and never shared between renders.

pub mod color;
pub mod compositor;
pub mod data_url;
pub mod effects;
pub mod glyphs;
pub mod processor;

pub use color::parse_color;
pub use compositor::{composite, composite_image};
pub use data_url::{encode_data_url, DataUrl};
pub use processor::{
    compress, compress_data_url, crop, frame, undo_crop, FrameStyle, PixelCropRect,
};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbImage, RgbaImage};
use tiny_skia::{ColorU8, IntSize, Path, PathBuilder, Pixmap};

use crate::config::ExportOptions;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::model::Callout;

/// Decode PNG or JPEG bytes.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Decode an image `data:` URL.
pub fn decode_data_url(url: &str) -> Result<RgbaImage> {
    let parsed = DataUrl::parse(url)?;
    if !parsed.is_image() {
        return Err(Error::InvalidDataUrl(format!(
            "expected an image, got {}",
            parsed.mime
        )));
    }
    decode_image(&parsed.data)
}

/// Encode as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(buf)
}

/// Encode as baseline JPEG, flattening transparency onto white.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = flatten(image);
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ColorType::Rgb8,
    )?;
    Ok(buf)
}

fn flatten(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let a = a as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Copy an image into a premultiplied pixmap.
pub fn to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())
        .ok_or_else(|| Error::Render("image has zero size".to_string()))?;
    let mut data = Vec::with_capacity(image.as_raw().len());
    for p in image.pixels() {
        let c = ColorU8::from_rgba(p[0], p[1], p[2], p[3]).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Pixmap::from_vec(data, size).ok_or_else(|| Error::Render("cannot allocate pixmap".to_string()))
}

/// Copy a premultiplied pixmap back into a straight-alpha image.
pub fn from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    out
}

/// Rounded rectangle path; the radius is clamped to half the shorter side.
pub fn rounded_rect_path(rect: &Rect, radius: f32) -> Result<Path> {
    let r = radius.clamp(0.0, rect.min_side() / 2.0);
    // cubic approximation of a quarter circle
    let k = r * 0.552_284_8;
    let (l, t, rt, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());

    let mut pb = PathBuilder::new();
    pb.move_to(l + r, t);
    pb.line_to(rt - r, t);
    pb.cubic_to(rt - r + k, t, rt, t + r - k, rt, t + r);
    pb.line_to(rt, b - r);
    pb.cubic_to(rt, b - r + k, rt - r + k, b, rt - r, b);
    pb.line_to(l + r, b);
    pb.cubic_to(l + r - k, b, l, b - r + k, l, b - r);
    pb.line_to(l, t + r);
    pb.cubic_to(l, t + r - k, l + r - k, t, l + r, t);
    pb.close();
    pb.finish()
        .ok_or_else(|| Error::Render(format!("degenerate rounded rectangle {:?}", rect)))
}

/// Image settings shared by all exporters.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSettings {
    /// Maximum width before compositing
    pub max_width: u32,
    /// JPEG quality
    pub quality: u8,
    /// Optional presentation frame
    pub frame: Option<FrameStyle>,
}

impl ImageSettings {
    /// Settings for an export.
    pub fn from_options(options: &ExportOptions) -> Self {
        Self {
            max_width: options.quality.max_width(),
            quality: options.quality.jpeg_quality(),
            frame: options.frame_images.then(FrameStyle::default),
        }
    }

    /// Thumbnail settings: fixed width, no frame.
    pub fn thumbnail(width: u32, quality: u8) -> Self {
        Self {
            max_width: width,
            quality,
            frame: None,
        }
    }
}

/// An encoded JPEG ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    /// JPEG bytes
    pub jpeg: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl RenderedImage {
    /// Encode a raster.
    pub fn encode(image: &RgbaImage, quality: u8) -> Result<Self> {
        Ok(Self {
            jpeg: encode_jpeg(image, quality)?,
            width: image.width(),
            height: image.height(),
        })
    }

    /// As a `data:image/jpeg;base64,...` URL.
    pub fn data_url(&self) -> String {
        encode_data_url("image/jpeg", &self.jpeg)
    }
}

/// Decode, resize, composite callouts, frame and encode one screenshot.
pub fn render_screenshot(
    data_url: &str,
    callouts: &[Callout],
    settings: &ImageSettings,
) -> Result<RenderedImage> {
    let decoded = decode_data_url(data_url)?;
    let resized = compress(&decoded, settings.max_width);
    let composited = composite_image(&resized, callouts)?;
    let finished = match &settings.frame {
        Some(style) => frame(&composited, style)?,
        None => composited,
    };
    RenderedImage::encode(&finished, settings.quality)
}

/// Like [`render_screenshot`] without callouts, for fallbacks.
pub fn render_raw(data_url: &str, settings: &ImageSettings) -> Result<RenderedImage> {
    let decoded = decode_data_url(data_url)?;
    let resized = compress(&decoded, settings.max_width);
    RenderedImage::encode(&resized, settings.quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn png_data_url(w: u32, h: u32) -> String {
        let img = RgbaImage::from_pixel(w, h, Rgba([10, 120, 200, 255]));
        encode_data_url("image/png", &encode_png(&img).unwrap())
    }

    #[test]
    fn test_pixmap_round_trip_opaque() {
        let img = RgbaImage::from_fn(4, 3, |x, y| Rgba([x as u8 * 60, y as u8 * 80, 7, 255]));
        let back = from_pixmap(&to_pixmap(&img).unwrap());
        assert_eq!(back, img);
    }

    #[test]
    fn test_jpeg_flattens_on_white() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        let jpeg = encode_jpeg(&img, 90).unwrap();
        let decoded = decode_image(&jpeg).unwrap();
        assert!(decoded.get_pixel(4, 4).0[0] > 240);
    }

    #[test]
    fn test_decode_rejects_non_images() {
        assert!(matches!(
            decode_data_url("data:text/plain,hello"),
            Err(Error::InvalidDataUrl(_))
        ));
        assert!(decode_data_url("data:image/png;base64,AAAA").is_err());
    }

    #[test]
    fn test_render_screenshot_resizes() {
        let settings = ImageSettings {
            max_width: 50,
            quality: 80,
            frame: None,
        };
        let out = render_screenshot(&png_data_url(200, 100), &[], &settings).unwrap();
        assert_eq!((out.width, out.height), (50, 25));
        assert!(out.data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_render_screenshot_framed() {
        let style = FrameStyle::default();
        let settings = ImageSettings {
            max_width: 1000,
            quality: 80,
            frame: Some(style.clone()),
        };
        let out = render_screenshot(&png_data_url(60, 40), &[], &settings).unwrap();
        assert_eq!(out.width, 60 + 2 * style.padding);
        assert_eq!(out.height, 40 + 2 * style.padding);
    }

    #[test]
    fn test_rounded_rect_clamps_radius() {
        let path = rounded_rect_path(&Rect::new(0.0, 0.0, 10.0, 4.0), 50.0).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.width(), 10.0);
        assert_eq!(bounds.height(), 4.0);
    }
}
