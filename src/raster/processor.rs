//! Image processor: crop, compress and presentation framing.
//!
//! Operations on data URLs never fail outright. A source that cannot be
//! decoded is logged and handed back untouched so one bad screenshot degrades
//! instead of aborting an export.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tiny_skia::{
    Color, FillRule, FilterQuality, Paint, Pattern, Pixmap, SpreadMode, Transform,
};

use super::{
    decode_data_url, encode_data_url, encode_jpeg, encode_png, from_pixmap, rounded_rect_path,
    to_pixmap,
};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::model::Screenshot;

/// Crop rectangle in source pixels, as produced by the crop tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelCropRect {
    /// Left column
    pub x: u32,
    /// Top row
    pub y: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl PixelCropRect {
    /// Create a crop rectangle.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clip to an image; `None` when the result is empty.
    fn clip(&self, image_width: u32, image_height: u32) -> Option<PixelCropRect> {
        let x = self.x.min(image_width);
        let y = self.y.min(image_height);
        let width = self.width.min(image_width - x);
        let height = self.height.min(image_height - y);
        (width > 0 && height > 0).then_some(PixelCropRect::new(x, y, width, height))
    }
}

/// Crop a screenshot's primary raster.
///
/// The result is a PNG at the crop's pixel size. The pre-crop raster is kept
/// in `original_data_url` unless an earlier crop already stored it, so
/// [`undo_crop`] always returns to the uploaded image.
pub fn crop(screenshot: &Screenshot, rect: PixelCropRect) -> Screenshot {
    match try_crop(&screenshot.data_url, rect) {
        Ok(data_url) => Screenshot {
            original_data_url: screenshot
                .original_data_url
                .clone()
                .or_else(|| Some(screenshot.data_url.clone())),
            data_url,
            is_cropped: true,
            ..screenshot.clone()
        },
        Err(e) => {
            log::warn!("Crop of screenshot {} skipped: {}", screenshot.id, e);
            screenshot.clone()
        },
    }
}

fn try_crop(data_url: &str, rect: PixelCropRect) -> Result<String> {
    let image = decode_data_url(data_url)?;
    let clip = rect.clip(image.width(), image.height()).ok_or_else(|| {
        Error::Image(format!(
            "crop {:?} is outside the {}x{} image",
            rect,
            image.width(),
            image.height()
        ))
    })?;
    let cropped = imageops::crop_imm(&image, clip.x, clip.y, clip.width, clip.height).to_image();
    Ok(encode_data_url("image/png", &encode_png(&cropped)?))
}

/// Restore the pre-crop raster.
///
/// A screenshot that was never cropped is returned unchanged.
pub fn undo_crop(screenshot: &Screenshot) -> Screenshot {
    match (&screenshot.original_data_url, screenshot.is_cropped) {
        (Some(original), true) => Screenshot {
            data_url: original.clone(),
            is_cropped: false,
            ..screenshot.clone()
        },
        _ => screenshot.clone(),
    }
}

/// Downscale to at most `max_width`, keeping aspect ratio.
///
/// Images at or below the limit are returned as-is.
pub fn compress(image: &RgbaImage, max_width: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    if w <= max_width || max_width == 0 {
        return image.clone();
    }
    let new_h = ((h as u64 * max_width as u64 + w as u64 / 2) / w as u64).max(1) as u32;
    imageops::resize(image, max_width, new_h, FilterType::Triangle)
}

/// Compress a data URL and re-encode it as JPEG at `quality`.
///
/// Undecodable input is returned unchanged.
pub fn compress_data_url(data_url: &str, max_width: u32, quality: u8) -> String {
    let result = decode_data_url(data_url)
        .and_then(|image| encode_jpeg(&compress(&image, max_width), quality))
        .map(|jpeg| encode_data_url("image/jpeg", &jpeg));
    match result {
        Ok(url) => url,
        Err(e) => {
            log::warn!("Keeping original image, compression failed: {}", e);
            data_url.to_string()
        },
    }
}

/// Presentation frame for exported screenshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameStyle {
    /// Padding around the image in pixels
    pub padding: u32,
    /// Corner radius in pixels
    pub corner_radius: f32,
    /// Shadow spread in pixels
    pub shadow_blur: f32,
    /// Vertical shadow offset in pixels
    pub shadow_offset: f32,
    /// Shadow opacity, 0..=1
    pub shadow_opacity: f32,
    /// Canvas background (`None` is transparent)
    pub background: Option<String>,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            padding: 16,
            corner_radius: 10.0,
            shadow_blur: 10.0,
            shadow_offset: 4.0,
            shadow_opacity: 0.25,
            background: Some("#ffffff".to_string()),
        }
    }
}

/// Wrap an image in padding, rounded corners and a drop shadow.
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use snapguide::raster::{frame, FrameStyle};
///
/// let image = RgbaImage::from_pixel(40, 30, Rgba([0, 0, 0, 255]));
/// let framed = frame(&image, &FrameStyle::default()).unwrap();
/// assert_eq!(framed.dimensions(), (72, 62));
/// ```
pub fn frame(image: &RgbaImage, style: &FrameStyle) -> Result<RgbaImage> {
    let pad = style.padding;
    let (w, h) = image.dimensions();
    let mut canvas = Pixmap::new(w + 2 * pad, h + 2 * pad).ok_or_else(|| {
        Error::Render(format!("cannot allocate frame for {}x{} image", w, h))
    })?;
    if let Some(bg) = style.background.as_deref().and_then(super::parse_color) {
        canvas.fill(bg);
    }

    let content = Rect::new(pad as f32, pad as f32, w as f32, h as f32);
    draw_shadow(&mut canvas, &content, style)?;

    let source = to_pixmap(image)?;
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.shader = Pattern::new(
        source.as_ref(),
        SpreadMode::Pad,
        FilterQuality::Nearest,
        1.0,
        Transform::from_translate(content.x, content.y),
    );
    let clip = rounded_rect_path(&content, style.corner_radius)?;
    canvas.fill_path(&clip, &paint, FillRule::Winding, Transform::identity(), None);

    Ok(from_pixmap(&canvas))
}

/// Layered translucent rounded rectangles, widest first.
fn draw_shadow(canvas: &mut Pixmap, content: &Rect, style: &FrameStyle) -> Result<()> {
    let opacity = style.shadow_opacity.clamp(0.0, 1.0);
    if opacity == 0.0 {
        return Ok(());
    }
    let layers = (style.shadow_blur.round() as u32).clamp(1, 12);
    let alpha = opacity / layers as f32;
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba(0.0, 0.0, 0.0, alpha).unwrap_or(Color::TRANSPARENT));
    paint.anti_alias = true;

    for i in (1..=layers).rev() {
        let spread = style.shadow_blur * i as f32 / layers as f32;
        let rect = Rect::new(
            content.x - spread / 2.0,
            content.y - spread / 2.0 + style.shadow_offset,
            content.width + spread,
            content.height + spread,
        );
        let path = rounded_rect_path(&rect, style.corner_radius + spread / 2.0)?;
        canvas.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
    Ok(())
}
