//! Text annotations (sticky notes) for PDF generation.
//!
//! Text annotations per PDF spec Section 12.5.6.4 display an icon that, when
//! opened, shows a pop-up window with the note text. Reveal text attached to
//! numbered callouts is carried into the manual this way.

use crate::geometry::Rect;
use crate::object::Object;
use std::collections::HashMap;

/// Icon shown for a closed note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnnotationIcon {
    /// Speech bubble
    Comment,
    /// Question mark
    Help,
    /// Sticky note
    #[default]
    Note,
}

impl TextAnnotationIcon {
    /// PDF name for the icon.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            TextAnnotationIcon::Comment => "Comment",
            TextAnnotationIcon::Help => "Help",
            TextAnnotationIcon::Note => "Note",
        }
    }
}

/// A text annotation (sticky note).
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    /// Icon rectangle in PDF user space (lower-left origin)
    pub rect: Rect,
    /// Text contents of the note
    pub contents: String,
    /// Icon to display when closed
    pub icon: TextAnnotationIcon,
    /// Whether the annotation should be initially open
    pub open: bool,
    /// Icon color, components in 0..=1
    pub color: Option<[f32; 3]>,
    /// Title bar text of the pop-up
    pub title: Option<String>,
}

impl TextAnnotation {
    /// Create a new text annotation.
    pub fn new(rect: Rect, contents: impl Into<String>) -> Self {
        Self {
            rect,
            contents: contents.into(),
            icon: TextAnnotationIcon::Note,
            open: false,
            color: Some([1.0, 0.82, 0.2]),
            title: None,
        }
    }

    /// Set the icon.
    pub fn with_icon(mut self, icon: TextAnnotationIcon) -> Self {
        self.icon = icon;
        self
    }

    /// Set the icon color.
    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = Some([r, g, b]);
        self
    }

    /// Set the pop-up title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Build the annotation dictionary.
    pub fn build(&self) -> HashMap<String, Object> {
        let mut dict = HashMap::new();

        dict.insert("Type".to_string(), Object::Name("Annot".to_string()));
        dict.insert("Subtype".to_string(), Object::Name("Text".to_string()));
        dict.insert(
            "Rect".to_string(),
            Object::Array(vec![
                Object::Real(self.rect.x as f64),
                Object::Real(self.rect.y as f64),
                Object::Real((self.rect.x + self.rect.width) as f64),
                Object::Real((self.rect.y + self.rect.height) as f64),
            ]),
        );
        dict.insert("Contents".to_string(), Object::text_string(&self.contents));
        dict.insert("Name".to_string(), Object::Name(self.icon.pdf_name().to_string()));
        dict.insert("Open".to_string(), Object::Boolean(self.open));
        // Print flag
        dict.insert("F".to_string(), Object::Integer(4));

        if let Some(color) = self.color {
            dict.insert(
                "C".to_string(),
                Object::Array(color.iter().map(|v| Object::Real(*v as f64)).collect()),
            );
        }
        if let Some(title) = &self.title {
            dict.insert("T".to_string(), Object::text_string(title));
        }

        dict
    }
}
