//! Callout compositor.
//!
//! Burns a callout list into a raster. The same routine feeds PDF pages,
//! HTML images and bundle thumbnails, so what a reader sees in every export
//! matches the editor overlay.
//!
//! Callouts are drawn in list order. A callout that fails to draw is logged
//! and skipped; the rest of the list and the image are unaffected.

use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, FilterQuality, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Rect as SkRect, Stroke, Transform,
};

use super::color::{parse_color, parse_color_or, with_opacity};
use super::effects::{box_blur, magnify, pixelate, PixelRegion};
use super::glyphs;
use super::{from_pixmap, to_pixmap};
use crate::error::{Error, Result};
use crate::geometry::{resolve_padded, Point, Rect};
use crate::model::{
    BlurStyle, BlurType, Callout, CalloutKind, DEFAULT_COLOR, MAX_POLYGON_SIDES, MIN_POLYGON_SIDES,
};

/// Fill opacity for outline shapes (circle, oval, polygon).
const OUTLINE_FILL_OPACITY: f32 = 0.2;
/// Fill opacity for rectangles.
const RECT_FILL_OPACITY: f32 = 0.15;
fn default_color() -> Color {
    parse_color(DEFAULT_COLOR).unwrap_or(Color::BLACK)
}

/// Amber, for the reveal indicator badge.
fn badge_color() -> Color {
    Color::from_rgba8(245, 158, 11, 255)
}

/// Composite callouts onto an image at its own size.
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use snapguide::model::{Callout, CalloutKind};
/// use snapguide::raster::composite_image;
///
/// let image = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
/// let callouts = vec![Callout::new("c", CalloutKind::Number { number: 1, reveal_text: None },
///                                  40.0, 40.0, 20.0, 20.0)];
/// let out = composite_image(&image, &callouts).unwrap();
/// assert_eq!(out.dimensions(), (100, 100));
/// assert_ne!(out.get_pixel(50, 44), image.get_pixel(50, 44));
/// ```
pub fn composite_image(image: &RgbaImage, callouts: &[Callout]) -> Result<RgbaImage> {
    composite(image, callouts, image.width(), image.height(), 0.0)
}

/// Composite callouts onto a canvas of `canvas_width` x `canvas_height`.
///
/// The image is scaled into the canvas inset by `padding` on every side and
/// callouts resolve against that inset rectangle. The padding band is left
/// transparent for a later framing pass.
pub fn composite(
    image: &RgbaImage,
    callouts: &[Callout],
    canvas_width: u32,
    canvas_height: u32,
    padding: f32,
) -> Result<RgbaImage> {
    let mut canvas = Pixmap::new(canvas_width, canvas_height).ok_or_else(|| {
        Error::Render(format!(
            "cannot allocate {}x{} canvas",
            canvas_width, canvas_height
        ))
    })?;

    let padding = padding.max(0.0);
    let inner_w = canvas_width as f32 - 2.0 * padding;
    let inner_h = canvas_height as f32 - 2.0 * padding;
    if inner_w <= 0.0 || inner_h <= 0.0 {
        return Err(Error::Render(format!(
            "padding {} leaves no room on a {}x{} canvas",
            padding, canvas_width, canvas_height
        )));
    }

    let source = to_pixmap(image)?;
    let sx = inner_w / image.width().max(1) as f32;
    let sy = inner_h / image.height().max(1) as f32;
    let transform = Transform::from_translate(padding, padding).pre_scale(sx, sy);
    let quality = if sx == 1.0 && sy == 1.0 {
        FilterQuality::Nearest
    } else {
        FilterQuality::Bicubic
    };
    let paint = PixmapPaint {
        quality,
        ..PixmapPaint::default()
    };
    canvas.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);

    let target = Target {
        width: inner_w,
        height: inner_h,
        padding,
    };
    for (index, callout) in callouts.iter().enumerate() {
        if let Err(e) = draw_callout(&mut canvas, callout, &target) {
            log::warn!(
                "Skipping callout {} ({}, #{}): {}",
                callout.id,
                callout.kind.shape_name(),
                index,
                e
            );
        }
    }

    Ok(from_pixmap(&canvas))
}

/// Image area inside the canvas.
struct Target {
    width: f32,
    height: f32,
    padding: f32,
}

impl Target {
    fn resolve(&self, callout: &Callout) -> Rect {
        resolve_padded(callout, self.width, self.height, self.padding)
    }

    fn point(&self, p: &Point) -> Point {
        Point::new(
            p.x / 100.0 * self.width + self.padding,
            p.y / 100.0 * self.height + self.padding,
        )
    }

    /// Stroke width scaled with the image.
    fn line_width(&self) -> f32 {
        (self.width.min(self.height) / 200.0).clamp(2.0, 8.0)
    }
}

fn draw_callout(canvas: &mut Pixmap, callout: &Callout, target: &Target) -> Result<()> {
    if let Some(problem) = callout.problem() {
        return Err(Error::Render(problem));
    }
    let rect = target.resolve(callout);
    if !(rect.width > 0.0 && rect.height > 0.0) {
        return Err(Error::Render("callout has no area".to_string()));
    }
    let color = parse_color_or(&callout.color, default_color());
    let line = target.line_width();

    match &callout.kind {
        CalloutKind::Circle { number } => draw_circle(canvas, &rect, color, line, *number),
        CalloutKind::Number {
            number,
            reveal_text,
        } => draw_number(canvas, &rect, color, line, *number, reveal_text.is_some()),
        CalloutKind::Rectangle { text } => {
            draw_rectangle(canvas, &rect, color, line, text.as_deref())
        },
        CalloutKind::Arrow => draw_arrow(canvas, &rect, color),
        CalloutKind::Blur { style } => draw_blur(canvas, &rect, style),
        CalloutKind::Magnifier { zoom } => {
            magnify(canvas, &rect, *zoom)?;
            let r = rect.min_side() / 2.0;
            let c = rect.center();
            let path = circle_path(c, r)?;
            stroke(canvas, &path, color, line);
            Ok(())
        },
        CalloutKind::Oval => {
            let path = oval_path(&rect)?;
            fill_and_stroke(canvas, &path, color, line);
            Ok(())
        },
        CalloutKind::Polygon { sides } => {
            let path = polygon_path(&rect, *sides)?;
            fill_and_stroke(canvas, &path, color, line);
            Ok(())
        },
        CalloutKind::Freehand { points } => {
            let points: Vec<Point> = points.iter().map(|p| target.point(p)).collect();
            let path = freehand_path(&points)?;
            stroke(canvas, &path, color, line);
            Ok(())
        },
        CalloutKind::Unrecognized { number, .. } => {
            draw_circle(canvas, &rect, color, line, *number)
        },
    }
}

fn draw_circle(
    canvas: &mut Pixmap,
    rect: &Rect,
    color: Color,
    line: f32,
    number: Option<u32>,
) -> Result<()> {
    let center = rect.center();
    let radius = rect.min_side() / 2.0;
    let path = circle_path(center, radius)?;
    fill_and_stroke(canvas, &path, color, line);
    if let Some(n) = number {
        draw_label(canvas, &n.to_string(), center, radius, color);
    }
    Ok(())
}

fn draw_number(
    canvas: &mut Pixmap,
    rect: &Rect,
    color: Color,
    line: f32,
    number: u32,
    has_reveal: bool,
) -> Result<()> {
    let center = rect.center();
    let radius = rect.min_side() / 2.0;
    let path = circle_path(center, radius)?;
    fill(canvas, &path, color);
    draw_label(canvas, &number.to_string(), center, radius, Color::WHITE);

    if has_reveal {
        let offset = radius * std::f32::consts::FRAC_1_SQRT_2;
        let badge_center = Point::new(center.x + offset, center.y - offset);
        let badge_radius = (radius * 0.35).max(3.0);
        let badge = circle_path(badge_center, badge_radius)?;
        fill(canvas, &badge, badge_color());
        stroke(canvas, &badge, Color::WHITE, (line / 2.0).max(1.0));
    }
    Ok(())
}

fn draw_rectangle(
    canvas: &mut Pixmap,
    rect: &Rect,
    color: Color,
    line: f32,
    text: Option<&str>,
) -> Result<()> {
    let sk = sk_rect(rect)?;
    let path = PathBuilder::from_rect(sk);
    fill(canvas, &path, with_opacity(color, RECT_FILL_OPACITY));
    stroke(canvas, &path, color, line);
    if let Some(text) = text {
        let size = glyphs::fit_size(text, rect.width * 0.9, rect.height * 0.5);
        glyphs::draw_text_centered(canvas, text, rect.center(), size, color);
    }
    Ok(())
}

/// Rightward arrow: a shaft over the left 60% and a head over the rest.
fn draw_arrow(canvas: &mut Pixmap, rect: &Rect, color: Color) -> Result<()> {
    let mid_y = rect.center().y;
    let shaft_half = rect.height * 0.15;
    let head_x = rect.x + rect.width * 0.6;

    let mut pb = PathBuilder::new();
    pb.move_to(rect.left(), mid_y - shaft_half);
    pb.line_to(head_x, mid_y - shaft_half);
    pb.line_to(head_x, rect.top());
    pb.line_to(rect.right(), mid_y);
    pb.line_to(head_x, rect.bottom());
    pb.line_to(head_x, mid_y + shaft_half);
    pb.line_to(rect.left(), mid_y + shaft_half);
    pb.close();
    let path = pb
        .finish()
        .ok_or_else(|| Error::Render("degenerate arrow".to_string()))?;
    fill(canvas, &path, color);
    Ok(())
}

fn draw_blur(canvas: &mut Pixmap, rect: &Rect, style: &BlurStyle) -> Result<()> {
    let region = PixelRegion::clip(rect, canvas.width(), canvas.height())
        .ok_or_else(|| Error::Render("blur region is outside the image".to_string()))?;
    let intensity = style.intensity.clamp(1, 20);
    match style.kind {
        BlurType::Pixelate => pixelate(canvas, region, intensity * 2),
        BlurType::Gaussian => box_blur(canvas, region, intensity),
    }
    Ok(())
}

fn draw_label(canvas: &mut Pixmap, text: &str, center: Point, radius: f32, color: Color) {
    let size = glyphs::fit_size(text, radius * 1.4, radius * 1.1);
    glyphs::draw_text_centered(canvas, text, center, size, color);
}

fn sk_rect(rect: &Rect) -> Result<SkRect> {
    SkRect::from_xywh(rect.x, rect.y, rect.width, rect.height)
        .ok_or_else(|| Error::Render(format!("invalid rectangle {:?}", rect)))
}

fn circle_path(center: Point, radius: f32) -> Result<Path> {
    PathBuilder::from_circle(center.x, center.y, radius)
        .ok_or_else(|| Error::Render(format!("invalid circle radius {}", radius)))
}

fn oval_path(rect: &Rect) -> Result<Path> {
    PathBuilder::from_oval(sk_rect(rect)?)
        .ok_or_else(|| Error::Render("degenerate oval".to_string()))
}

/// Regular polygon inscribed in the rectangle's ellipse, first vertex on top.
pub(crate) fn polygon_vertices(rect: &Rect, sides: u32) -> Vec<Point> {
    let sides = sides.clamp(MIN_POLYGON_SIDES, MAX_POLYGON_SIDES);
    let center = rect.center();
    let (rx, ry) = (rect.width / 2.0, rect.height / 2.0);
    (0..sides)
        .map(|i| {
            let angle = -std::f32::consts::FRAC_PI_2
                + i as f32 * 2.0 * std::f32::consts::PI / sides as f32;
            Point::new(center.x + rx * angle.cos(), center.y + ry * angle.sin())
        })
        .collect()
}

fn polygon_path(rect: &Rect, sides: u32) -> Result<Path> {
    let vertices = polygon_vertices(rect, sides);
    let mut pb = PathBuilder::new();
    for (i, v) in vertices.iter().enumerate() {
        if i == 0 {
            pb.move_to(v.x, v.y);
        } else {
            pb.line_to(v.x, v.y);
        }
    }
    pb.close();
    pb.finish()
        .ok_or_else(|| Error::Render(format!("degenerate {}-gon", sides)))
}

fn freehand_path(points: &[Point]) -> Result<Path> {
    if points.len() < 2 {
        return Err(Error::Render(format!(
            "freehand path needs at least two points, got {}",
            points.len()
        )));
    }
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].x, points[0].y);
    for p in &points[1..] {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
        .ok_or_else(|| Error::Render("degenerate freehand path".to_string()))
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn fill(canvas: &mut Pixmap, path: &Path, color: Color) {
    canvas.fill_path(path, &paint(color), FillRule::Winding, Transform::identity(), None);
}

fn stroke(canvas: &mut Pixmap, path: &Path, color: Color, width: f32) {
    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    canvas.stroke_path(path, &paint(color), &stroke, Transform::identity(), None);
}

fn fill_and_stroke(canvas: &mut Pixmap, path: &Path, color: Color, line: f32) {
    fill(canvas, path, with_opacity(color, OUTLINE_FILL_OPACITY));
    stroke(canvas, path, color, line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn white(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn test_no_callouts_is_identity() {
        let image = white(40, 30);
        let out = composite_image(&image, &[]).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn test_number_disc_is_solid() {
        let image = white(100, 100);
        let c = Callout::new(
            "n",
            CalloutKind::Number {
                number: 7,
                reveal_text: None,
            },
            10.0,
            10.0,
            40.0,
            40.0,
        )
        .with_color("#0000ff");
        let out = composite_image(&image, &[c]).unwrap();
        // near the disc edge, away from the label
        let p = out.get_pixel(30, 14);
        assert_eq!(p.0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_reveal_badge_is_drawn() {
        let image = white(100, 100);
        let plain = Callout::new(
            "n",
            CalloutKind::Number {
                number: 1,
                reveal_text: None,
            },
            25.0,
            25.0,
            50.0,
            50.0,
        );
        let revealing = Callout::new(
            "n",
            CalloutKind::Number {
                number: 1,
                reveal_text: Some("hint".to_string()),
            },
            25.0,
            25.0,
            50.0,
            50.0,
        );
        let a = composite_image(&image, &[plain]).unwrap();
        let b = composite_image(&image, &[revealing]).unwrap();
        // badge centre sits at 45 degrees on the circle's edge
        let (bx, by) = (50 + 18, 50 - 18);
        assert_ne!(a.get_pixel(bx, by), b.get_pixel(bx, by));
    }

    #[test]
    fn test_unknown_shape_uses_circle_rule() {
        let image = white(100, 100);
        let circle = Callout::new("a", CalloutKind::Circle { number: None }, 20.0, 20.0, 60.0, 60.0);
        let unknown = Callout::new(
            "a",
            CalloutKind::Unrecognized {
                shape: "star".to_string(),
                number: None,
            },
            20.0,
            20.0,
            60.0,
            60.0,
        );
        let a = composite_image(&image, &[circle]).unwrap();
        let b = composite_image(&image, &[unknown]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, image);
    }

    #[test]
    fn test_failing_callout_is_skipped() {
        let image = white(50, 50);
        let broken = Callout::new("f", CalloutKind::Freehand { points: vec![] }, 0.0, 0.0, 10.0, 10.0);
        let arrow = Callout::new("a", CalloutKind::Arrow, 10.0, 10.0, 80.0, 80.0);
        let only_arrow = composite_image(&image, &[arrow.clone()]).unwrap();
        let both = composite_image(&image, &[broken, arrow]).unwrap();
        assert_eq!(only_arrow, both);
    }

    #[test]
    fn test_later_callouts_draw_on_top() {
        let image = white(60, 60);
        let red = Callout::new("r", CalloutKind::Arrow, 0.0, 0.0, 100.0, 100.0).with_color("#ff0000");
        let blue = Callout::new("b", CalloutKind::Arrow, 0.0, 0.0, 100.0, 100.0).with_color("#0000ff");
        let out = composite_image(&image, &[red, blue]).unwrap();
        assert_eq!(out.get_pixel(50, 30).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_padding_offsets_image_and_callouts() {
        let image = white(20, 20);
        let c = Callout::new("r", CalloutKind::Arrow, 0.0, 0.0, 100.0, 100.0).with_color("#000000");
        let out = composite(&image, &[c], 40, 40, 10.0).unwrap();
        assert_eq!(out.get_pixel(2, 2).0[3], 0);
        assert_eq!(out.get_pixel(25, 20).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_padding_too_large() {
        let image = white(10, 10);
        assert!(matches!(
            composite(&image, &[], 10, 10, 6.0),
            Err(Error::Render(_))
        ));
    }

    #[test]
    fn test_polygon_vertices() {
        let v = polygon_vertices(&Rect::new(0.0, 0.0, 100.0, 100.0), 4);
        assert_eq!(v.len(), 4);
        assert!((v[0].x - 50.0).abs() < 1e-3 && v[0].y.abs() < 1e-3);
        assert!((v[1].x - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_polygon_vertex_count_is_bounded() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(polygon_vertices(&rect, u32::MAX).len(), MAX_POLYGON_SIDES as usize);
        assert_eq!(polygon_vertices(&rect, 0).len(), MIN_POLYGON_SIDES as usize);
    }

    #[test]
    fn test_broken_callout_is_skipped() {
        let image = white(100, 100);
        let bad = Callout::new("bad", CalloutKind::Oval, 10.0, 10.0, -5.0, 20.0);
        let nan = Callout::new("nan", CalloutKind::Arrow, f32::NAN, 10.0, 20.0, 20.0);
        let good = Callout::new("good", CalloutKind::Rectangle { text: None }, 50.0, 50.0, 30.0, 30.0)
            .with_color("#00ff00");
        let out = composite_image(&image, &[bad, nan, good]).unwrap();
        assert_eq!(out.get_pixel(5, 5).0, [255, 255, 255, 255]);
        // the rectangle's tinted fill still lands
        assert_ne!(out.get_pixel(65, 65).0, [255, 255, 255, 255]);
    }
}
