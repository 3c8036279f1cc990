//! Geometric primitives and the callout coordinate contract.
//!
//! Callouts are stored as percentages of their owning image. Every render
//! target goes through this module to turn those percentages into something
//! drawable:
//!
//! - the raster compositor and the PDF engine call [`resolve`] to get a pixel
//!   (or point) rectangle for a concrete image size;
//! - the DOM overlay and the HTML exporter call [`css_box`] to get the same
//!   rectangle as CSS percentage strings.
//!
//! Both are derived from one [`PercentRect`], so a unit bug can only live here.

use serde::{Deserialize, Serialize};

use crate::model::Callout;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use snapguide::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle with a top-left origin (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use snapguide::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Get the center point of the rectangle.
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Check if this rectangle intersects with another.
    ///
    /// Rectangles that only share an edge do not intersect.
    ///
    /// # Examples
    ///
    /// ```
    /// use snapguide::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 100.0, 100.0);
    /// let r2 = Rect::new(50.0, 50.0, 100.0, 100.0);
    /// let r3 = Rect::new(100.0, 0.0, 100.0, 100.0);
    ///
    /// assert!(r1.intersects(&r2));
    /// assert!(!r1.intersects(&r3));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Check if this rectangle contains a point (edges inclusive).
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Translate the rectangle by an offset.
    pub fn offset(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Shortest side length.
    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// A rectangle expressed in percentages of an image's width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PercentRect {
    /// Left edge, percent of image width
    pub x: f32,
    /// Top edge, percent of image height
    pub y: f32,
    /// Width, percent of image width
    pub width: f32,
    /// Height, percent of image height
    pub height: f32,
}

impl PercentRect {
    /// Create a new percentage rectangle.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Resolve to an absolute rectangle for an image of the given size.
    ///
    /// Units follow the caller: pixels for rasters, points for PDF pages.
    pub fn resolve(&self, image_width: f32, image_height: f32) -> Rect {
        Rect::new(
            self.x / 100.0 * image_width,
            self.y / 100.0 * image_height,
            self.width / 100.0 * image_width,
            self.height / 100.0 * image_height,
        )
    }

    /// The same rectangle as CSS percentage strings.
    pub fn css_box(&self) -> CssBox {
        CssBox {
            left: format_percent(self.x),
            top: format_percent(self.y),
            width: format_percent(self.width),
            height: format_percent(self.height),
        }
    }

    /// Clamp into `[0, 100]` on both axes, shrinking the size so the shape
    /// stays inside the image.
    pub fn clamped(&self) -> PercentRect {
        let x = clamp_percent(self.x);
        let y = clamp_percent(self.y);
        let width = clamp_percent(self.width).min(100.0 - x);
        let height = clamp_percent(self.height).min(100.0 - y);
        PercentRect::new(x, y, width, height)
    }

    /// Build a percentage rectangle from a pixel rectangle on an image.
    pub fn from_pixels(rect: &Rect, image_width: f32, image_height: f32) -> PercentRect {
        if image_width <= 0.0 || image_height <= 0.0 {
            return PercentRect::default();
        }
        PercentRect::new(
            rect.x / image_width * 100.0,
            rect.y / image_height * 100.0,
            rect.width / image_width * 100.0,
            rect.height / image_height * 100.0,
        )
    }
}

/// CSS positioning for a DOM overlay element, as percentage strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssBox {
    /// `style.left`
    pub left: String,
    /// `style.top`
    pub top: String,
    /// `style.width`
    pub width: String,
    /// `style.height`
    pub height: String,
}

impl CssBox {
    /// Inline style declaration (`left:..;top:..;width:..;height:..`).
    pub fn style(&self) -> String {
        format!(
            "left:{};top:{};width:{};height:{}",
            self.left, self.top, self.width, self.height
        )
    }
}

/// Resolve a callout's percentage box against an image size.
///
/// # Examples
///
/// ```
/// use snapguide::geometry::resolve;
/// use snapguide::model::{Callout, CalloutKind};
///
/// let callout = Callout::new("c1", CalloutKind::Arrow, 10.0, 20.0, 30.0, 10.0);
/// let rect = resolve(&callout, 800.0, 600.0);
/// assert_eq!(rect.x, 80.0);
/// assert_eq!(rect.y, 120.0);
/// assert_eq!(rect.width, 240.0);
/// assert_eq!(rect.height, 60.0);
/// ```
pub fn resolve(callout: &Callout, image_width: f32, image_height: f32) -> Rect {
    callout.bounds().resolve(image_width, image_height)
}

/// Resolve a callout against an image drawn at an offset inside a padded canvas.
pub fn resolve_padded(callout: &Callout, image_width: f32, image_height: f32, padding: f32) -> Rect {
    resolve(callout, image_width, image_height).offset(padding, padding)
}

/// CSS percentage box for a callout, as used by the DOM overlay.
pub fn css_box(callout: &Callout) -> CssBox {
    callout.bounds().css_box()
}

/// Parse a CSS percentage string such as `"12.50%"`.
pub fn parse_css_percent(value: &str) -> Option<f32> {
    value.trim().strip_suffix('%')?.trim().parse::<f32>().ok()
}

/// Scale `(width, height)` to fit inside a box while keeping aspect ratio.
///
/// Never scales up.
///
/// # Examples
///
/// ```
/// use snapguide::geometry::fit_within;
///
/// assert_eq!(fit_within(400.0, 200.0, 100.0, 100.0), (100.0, 50.0));
/// assert_eq!(fit_within(50.0, 20.0, 100.0, 100.0), (50.0, 20.0));
/// ```
pub fn fit_within(width: f32, height: f32, max_width: f32, max_height: f32) -> (f32, f32) {
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = (max_width / width).min(max_height / height).min(1.0);
    (width * scale, height * scale)
}

fn clamp_percent(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn format_percent(value: f32) -> String {
    format!("{:.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CalloutKind;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 70.0);
    }

    #[test]
    fn test_rect_center() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        let center = r.center();
        assert_eq!(center.x, 50.0);
        assert_eq!(center.y, 25.0);
    }

    #[test]
    fn test_rect_intersects() {
        let r1 = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r2 = Rect::new(50.0, 50.0, 100.0, 100.0);
        let r3 = Rect::new(200.0, 200.0, 100.0, 100.0);

        assert!(r1.intersects(&r2));
        assert!(r2.intersects(&r1));
        assert!(!r1.intersects(&r3));
        assert!(!r3.intersects(&r1));
    }

    #[test]
    fn test_rect_contains_point() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(r.contains_point(&Point::new(50.0, 50.0)));
        assert!(r.contains_point(&Point::new(100.0, 100.0)));
        assert!(!r.contains_point(&Point::new(150.0, 150.0)));
    }

    #[test]
    fn test_percent_resolve() {
        let p = PercentRect::new(50.0, 25.0, 10.0, 20.0);
        let r = p.resolve(1000.0, 400.0);
        assert_eq!(r, Rect::new(500.0, 100.0, 100.0, 80.0));
    }

    #[test]
    fn test_css_box_two_decimals() {
        let p = PercentRect::new(12.345, 0.0, 33.333, 100.0);
        let css = p.css_box();
        assert_eq!(css.left, "12.35%");
        assert_eq!(css.top, "0.00%");
        assert_eq!(css.width, "33.33%");
        assert_eq!(css.height, "100.00%");
        assert_eq!(
            css.style(),
            "left:12.35%;top:0.00%;width:33.33%;height:100.00%"
        );
    }

    #[test]
    fn test_clamped_keeps_shape_inside() {
        let p = PercentRect::new(95.0, -5.0, 20.0, 30.0).clamped();
        assert_eq!(p.x, 95.0);
        assert_eq!(p.y, 0.0);
        assert_eq!(p.width, 5.0);
        assert_eq!(p.height, 30.0);

        let nan = PercentRect::new(f32::NAN, 10.0, 10.0, 10.0).clamped();
        assert_eq!(nan.x, 0.0);
    }

    #[test]
    fn test_from_pixels_inverts_resolve() {
        let rect = Rect::new(40.0, 30.0, 200.0, 60.0);
        let p = PercentRect::from_pixels(&rect, 800.0, 600.0);
        assert_eq!(p.resolve(800.0, 600.0), rect);
        assert_eq!(
            PercentRect::from_pixels(&rect, 0.0, 600.0),
            PercentRect::default()
        );
    }

    #[test]
    fn test_resolve_padded_offsets() {
        let callout = Callout::new("c", CalloutKind::Oval, 0.0, 0.0, 50.0, 50.0);
        let r = resolve_padded(&callout, 200.0, 100.0, 16.0);
        assert_eq!(r, Rect::new(16.0, 16.0, 100.0, 50.0));
    }

    #[test]
    fn test_parse_css_percent() {
        assert_eq!(parse_css_percent("12.50%"), Some(12.5));
        assert_eq!(parse_css_percent(" 3% "), Some(3.0));
        assert_eq!(parse_css_percent("12px"), None);
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(200.0, 400.0, 100.0, 100.0), (50.0, 100.0));
        assert_eq!(fit_within(0.0, 10.0, 100.0, 100.0), (0.0, 0.0));
    }
}
