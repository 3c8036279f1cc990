//! Callout annotations.
//!
//! On the wire a callout is one flat record: a `shape` string plus whichever
//! optional payload fields that shape uses. Inside the crate it is a
//! [`Callout`] whose [`CalloutKind`] carries exactly the payload its shape
//! needs. Conversion happens once, at deserialisation, through
//! [`CalloutRecord`].

use serde::{Deserialize, Serialize};

use crate::geometry::{PercentRect, Point};

/// Default callout colour (red).
pub const DEFAULT_COLOR: &str = "#ef4444";

/// Fewest sides a polygon callout draws with.
pub const MIN_POLYGON_SIDES: u32 = 3;

/// Most sides a polygon callout draws with.
pub const MAX_POLYGON_SIDES: u32 = 64;

/// A positioned annotation on a screenshot.
///
/// Position and size are percentages of the owning image's width and height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CalloutRecord", into = "CalloutRecord")]
pub struct Callout {
    /// Stable identifier
    pub id: String,
    /// CSS colour string (`#rrggbb`, `#rgb`, `rgb()/rgba()`)
    pub color: String,
    /// Left edge, percent of image width
    pub x: f32,
    /// Top edge, percent of image height
    pub y: f32,
    /// Width, percent of image width
    pub width: f32,
    /// Height, percent of image height
    pub height: f32,
    /// Shape and its payload
    pub kind: CalloutKind,
}

/// Shape of a callout together with its shape-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum CalloutKind {
    /// Translucent circle, optionally numbered
    Circle {
        /// Optional sequence label
        number: Option<u32>,
    },
    /// Solid numbered disc
    Number {
        /// Sequence label
        number: u32,
        /// Click-to-reveal text shown in viewing mode
        reveal_text: Option<String>,
    },
    /// Translucent rectangle with an optional centred label
    Rectangle {
        /// Label text
        text: Option<String>,
    },
    /// Fixed rightward arrow glyph scaled to the box
    Arrow,
    /// Obscures the region
    Blur {
        /// Blur style
        style: BlurStyle,
    },
    /// Zoomed view of the region clipped to a circle
    Magnifier {
        /// Zoom factor (>= 1)
        zoom: f32,
    },
    /// Ellipse inscribed in the box
    Oval,
    /// Regular polygon inscribed in the box
    Polygon {
        /// Number of sides, within `MIN_POLYGON_SIDES..=MAX_POLYGON_SIDES`
        sides: u32,
    },
    /// Free-drawn stroke; points are percentages of the image
    Freehand {
        /// Path vertices
        points: Vec<Point>,
    },
    /// A shape name this crate does not know; drawn with the circle rule
    Unrecognized {
        /// Original shape name
        shape: String,
        /// Optional sequence label
        number: Option<u32>,
    },
}

impl CalloutKind {
    /// Wire name of the shape.
    pub fn shape_name(&self) -> &str {
        match self {
            CalloutKind::Circle { .. } => "circle",
            CalloutKind::Number { .. } => "number",
            CalloutKind::Rectangle { .. } => "rectangle",
            CalloutKind::Arrow => "arrow",
            CalloutKind::Blur { .. } => "blur",
            CalloutKind::Magnifier { .. } => "magnifier",
            CalloutKind::Oval => "oval",
            CalloutKind::Polygon { .. } => "polygon",
            CalloutKind::Freehand { .. } => "freehand",
            CalloutKind::Unrecognized { shape, .. } => shape,
        }
    }
}

/// How a blur callout obscures its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlurType {
    /// Block averaging
    #[default]
    Pixelate,
    /// Box blur
    Gaussian,
}

/// Blur payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlurStyle {
    /// Strength, 1..=20
    #[serde(default = "default_blur_intensity")]
    pub intensity: u32,
    /// Blur algorithm
    #[serde(rename = "type", default)]
    pub kind: BlurType,
}

impl Default for BlurStyle {
    fn default() -> Self {
        Self {
            intensity: default_blur_intensity(),
            kind: BlurType::Pixelate,
        }
    }
}

fn default_blur_intensity() -> u32 {
    8
}

impl Callout {
    /// Create a callout with the default colour.
    pub fn new(
        id: impl Into<String>,
        kind: CalloutKind,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Self {
        Self {
            id: id.into(),
            color: DEFAULT_COLOR.to_string(),
            x,
            y,
            width,
            height,
            kind,
        }
    }

    /// Set the colour.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Percentage bounding box.
    pub fn bounds(&self) -> PercentRect {
        PercentRect::new(self.x, self.y, self.width, self.height)
    }

    /// Copy of this callout with its box clamped into the image.
    pub fn clamped(&self) -> Callout {
        let b = self.bounds().clamped();
        Callout {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
            ..self.clone()
        }
    }

    /// Why this callout cannot be drawn, if it cannot.
    ///
    /// Renderers skip such callouts one at a time; the rest of the image
    /// still renders.
    pub fn problem(&self) -> Option<String> {
        let fields = [self.x, self.y, self.width, self.height];
        if fields.iter().any(|v| !v.is_finite()) {
            return Some("non-finite position or size".to_string());
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Some("negative size".to_string());
        }
        if let CalloutKind::Freehand { points } = &self.kind {
            if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                return Some("non-finite freehand point".to_string());
            }
        }
        None
    }

    /// Reveal text, present only on number callouts.
    pub fn reveal_text(&self) -> Option<&str> {
        match &self.kind {
            CalloutKind::Number { reveal_text, .. } => reveal_text.as_deref(),
            _ => None,
        }
    }

    /// Sequence label, if the shape carries one.
    pub fn number(&self) -> Option<u32> {
        match &self.kind {
            CalloutKind::Number { number, .. } => Some(*number),
            CalloutKind::Circle { number } | CalloutKind::Unrecognized { number, .. } => *number,
            _ => None,
        }
    }
}

/// Flat wire representation of a callout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalloutRecord {
    /// Identifier
    pub id: String,
    /// Shape name
    pub shape: String,
    /// Colour
    #[serde(default = "default_color")]
    pub color: String,
    /// Left, percent
    #[serde(default)]
    pub x: f32,
    /// Top, percent
    #[serde(default)]
    pub y: f32,
    /// Width, percent
    #[serde(default = "default_extent")]
    pub width: f32,
    /// Height, percent
    #[serde(default = "default_extent")]
    pub height: f32,
    /// Sequence label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    /// Click-to-reveal text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reveal_text: Option<String>,
    /// Rectangle label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Blur payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur_style: Option<BlurStyle>,
    /// Magnifier payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnifier_style: Option<MagnifierStyleRecord>,
    /// Polygon payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon_style: Option<PolygonStyleRecord>,
    /// Freehand payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freehand_path: Option<Vec<Point>>,
}

/// Magnifier payload on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagnifierStyleRecord {
    /// Zoom factor
    pub zoom_level: f32,
}

/// Polygon payload on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolygonStyleRecord {
    /// Number of sides
    pub sides: u32,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_extent() -> f32 {
    5.0
}

impl From<CalloutRecord> for Callout {
    fn from(record: CalloutRecord) -> Self {
        let shape = record.shape.trim().to_ascii_lowercase();
        if record.reveal_text.is_some() && shape != "number" {
            log::debug!(
                "Dropping revealText on {} callout {}: only number callouts reveal text",
                shape,
                record.id
            );
        }

        let kind = match shape.as_str() {
            "circle" => CalloutKind::Circle {
                number: record.number,
            },
            "number" => CalloutKind::Number {
                number: record.number.unwrap_or(1),
                reveal_text: record.reveal_text.filter(|t| !t.trim().is_empty()),
            },
            "rectangle" => CalloutKind::Rectangle {
                text: record.text.filter(|t| !t.is_empty()),
            },
            "arrow" => CalloutKind::Arrow,
            "blur" => CalloutKind::Blur {
                style: record.blur_style.unwrap_or_default(),
            },
            "magnifier" => CalloutKind::Magnifier {
                zoom: record
                    .magnifier_style
                    .map(|m| m.zoom_level)
                    .filter(|z| z.is_finite())
                    .unwrap_or(2.0)
                    .max(1.0),
            },
            "oval" => CalloutKind::Oval,
            "polygon" => CalloutKind::Polygon {
                sides: record
                    .polygon_style
                    .map(|p| p.sides)
                    .unwrap_or(6)
                    .clamp(MIN_POLYGON_SIDES, MAX_POLYGON_SIDES),
            },
            "freehand" => CalloutKind::Freehand {
                points: record.freehand_path.unwrap_or_default(),
            },
            _ => CalloutKind::Unrecognized {
                shape: record.shape.clone(),
                number: record.number,
            },
        };

        Callout {
            id: record.id,
            color: record.color,
            x: record.x,
            y: record.y,
            width: record.width,
            height: record.height,
            kind,
        }
    }
}

impl From<Callout> for CalloutRecord {
    fn from(callout: Callout) -> Self {
        let mut record = CalloutRecord {
            id: callout.id,
            shape: callout.kind.shape_name().to_string(),
            color: callout.color,
            x: callout.x,
            y: callout.y,
            width: callout.width,
            height: callout.height,
            ..Default::default()
        };
        match callout.kind {
            CalloutKind::Circle { number } | CalloutKind::Unrecognized { number, .. } => {
                record.number = number;
            },
            CalloutKind::Number {
                number,
                reveal_text,
            } => {
                record.number = Some(number);
                record.reveal_text = reveal_text;
            },
            CalloutKind::Rectangle { text } => record.text = text,
            CalloutKind::Blur { style } => record.blur_style = Some(style),
            CalloutKind::Magnifier { zoom } => {
                record.magnifier_style = Some(MagnifierStyleRecord { zoom_level: zoom });
            },
            CalloutKind::Polygon { sides } => {
                record.polygon_style = Some(PolygonStyleRecord { sides });
            },
            CalloutKind::Freehand { points } => record.freehand_path = Some(points),
            CalloutKind::Arrow | CalloutKind::Oval => {},
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Callout {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_number_with_reveal_text() {
        let c = parse(
            r##"{"id":"c1","shape":"number","color":"#2563eb","x":10,"y":20,
                "width":4,"height":4,"number":3,"revealText":"Click Save"}"##,
        );
        assert_eq!(c.number(), Some(3));
        assert_eq!(c.reveal_text(), Some("Click Save"));
        assert_eq!(c.color, "#2563eb");
    }

    #[test]
    fn test_reveal_text_dropped_on_other_shapes() {
        let c = parse(r#"{"id":"c1","shape":"circle","revealText":"nope"}"#);
        assert_eq!(c.reveal_text(), None);
        let record = CalloutRecord::from(c);
        assert!(record.reveal_text.is_none());
    }

    #[test]
    fn test_unknown_shape_is_kept() {
        let c = parse(r#"{"id":"c1","shape":"star","number":2}"#);
        assert_eq!(
            c.kind,
            CalloutKind::Unrecognized {
                shape: "star".to_string(),
                number: Some(2)
            }
        );
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["shape"], "star");
    }

    #[test]
    fn test_defaults() {
        let c = parse(r#"{"id":"c1","shape":"polygon"}"#);
        assert_eq!(c.color, DEFAULT_COLOR);
        assert_eq!(c.width, 5.0);
        assert_eq!(c.kind, CalloutKind::Polygon { sides: 6 });

        let big = parse(r#"{"id":"p","shape":"polygon","polygonStyle":{"sides":4294967295}}"#);
        assert_eq!(big.kind, CalloutKind::Polygon { sides: MAX_POLYGON_SIDES });
        let small = parse(r#"{"id":"p","shape":"polygon","polygonStyle":{"sides":1}}"#);
        assert_eq!(small.kind, CalloutKind::Polygon { sides: MIN_POLYGON_SIDES });

        let m = parse(r#"{"id":"m","shape":"magnifier","magnifierStyle":{"zoomLevel":0.5}}"#);
        assert_eq!(m.kind, CalloutKind::Magnifier { zoom: 1.0 });
    }

    #[test]
    fn test_blur_style_wire_format() {
        let c = parse(
            r#"{"id":"b","shape":"blur","blurStyle":{"intensity":12,"type":"gaussian"}}"#,
        );
        assert_eq!(
            c.kind,
            CalloutKind::Blur {
                style: BlurStyle {
                    intensity: 12,
                    kind: BlurType::Gaussian
                }
            }
        );
    }

    #[test]
    fn test_serialize_writes_flat_record() {
        let c = Callout::new(
            "r1",
            CalloutKind::Rectangle {
                text: Some("Menu".to_string()),
            },
            1.0,
            2.0,
            3.0,
            4.0,
        );
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["shape"], "rectangle");
        assert_eq!(json["text"], "Menu");
        assert!(json.get("revealText").is_none());
        let back: Callout = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_clamped() {
        let c = Callout::new("c", CalloutKind::Arrow, 90.0, 50.0, 30.0, 10.0).clamped();
        assert_eq!(c.x, 90.0);
        assert_eq!(c.width, 10.0);
    }
}
