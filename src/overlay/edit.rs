//! Callout edit requests.
//!
//! The overlay never mutates a document. It emits [`CalloutEdit`] values and
//! the owner of the document applies them to the screenshot's callout list.

use crate::geometry::{PercentRect, Point, Rect};
use crate::model::{Callout, CalloutKind, DEFAULT_COLOR};

use super::ids::IdGenerator;

/// A mutation request for one screenshot's callout list.
#[derive(Debug, Clone, PartialEq)]
pub enum CalloutEdit {
    /// Append a new callout (drawn on top)
    Add(Callout),
    /// Replace the callout with the same id, keeping its list position
    Update(Callout),
    /// Remove the callout with this id
    Delete {
        /// Callout id
        id: String,
    },
}

impl CalloutEdit {
    /// Request that a callout be moved by a percentage offset.
    ///
    /// The result is clamped so the shape stays inside the image.
    pub fn moved(callout: &Callout, dx: f32, dy: f32) -> CalloutEdit {
        let mut next = callout.clone();
        next.x += dx;
        next.y += dy;
        let width = next.width.min(100.0);
        let height = next.height.min(100.0);
        next.x = next.x.clamp(0.0, 100.0 - width);
        next.y = next.y.clamp(0.0, 100.0 - height);
        CalloutEdit::Update(next.clamped())
    }

    /// Request that a callout be resized to a new percentage box.
    pub fn resized(callout: &Callout, bounds: PercentRect) -> CalloutEdit {
        let b = bounds.clamped();
        CalloutEdit::Update(Callout {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
            ..callout.clone()
        })
    }

    /// Id of the callout this edit targets.
    pub fn target_id(&self) -> &str {
        match self {
            CalloutEdit::Add(c) | CalloutEdit::Update(c) => &c.id,
            CalloutEdit::Delete { id } => id,
        }
    }

    /// Apply the edit to a callout list.
    ///
    /// Returns `false` when an update or delete names an unknown id, or an
    /// add reuses an existing one; the list is left untouched in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use snapguide::model::{Callout, CalloutKind};
    /// use snapguide::overlay::CalloutEdit;
    ///
    /// let mut callouts = vec![Callout::new("a", CalloutKind::Arrow, 0.0, 0.0, 10.0, 5.0)];
    /// assert!(CalloutEdit::Delete { id: "a".into() }.apply_to(&mut callouts));
    /// assert!(callouts.is_empty());
    /// ```
    pub fn apply_to(&self, callouts: &mut Vec<Callout>) -> bool {
        match self {
            CalloutEdit::Add(callout) => {
                if callouts.iter().any(|c| c.id == callout.id) {
                    log::warn!("Ignoring add of duplicate callout id {}", callout.id);
                    return false;
                }
                callouts.push(callout.clone());
                true
            },
            CalloutEdit::Update(callout) => {
                match callouts.iter_mut().find(|c| c.id == callout.id) {
                    Some(slot) => {
                        *slot = callout.clone();
                        true
                    },
                    None => {
                        log::warn!("Ignoring update of unknown callout id {}", callout.id);
                        false
                    },
                }
            },
            CalloutEdit::Delete { id } => {
                let before = callouts.len();
                callouts.retain(|c| &c.id != id);
                callouts.len() != before
            },
        }
    }
}

/// Next free sequence label for a callout list.
pub fn next_number(callouts: &[Callout]) -> u32 {
    callouts
        .iter()
        .filter_map(Callout::number)
        .max()
        .map_or(1, |n| n + 1)
}

/// A callout drawn on the overlay that is waiting for confirmation.
///
/// Number callouts prompt for reveal text and rectangles for a label before
/// they are added. The pending record is handed straight to the confirmation
/// step and consumed by [`PendingCallout::confirm`] or dropped on cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCallout {
    /// Shape and payload so far
    pub kind: CalloutKind,
    /// Percentage box
    pub bounds: PercentRect,
    /// Colour
    pub color: String,
}

impl PendingCallout {
    /// Create a pending callout from a drag on the displayed image.
    ///
    /// `start` and `end` are in display pixels; the box is normalised so
    /// dragging in any direction works, then converted to percentages.
    pub fn from_drag(
        kind: CalloutKind,
        start: Point,
        end: Point,
        display_width: f32,
        display_height: f32,
    ) -> Self {
        let rect = Rect::new(
            start.x.min(end.x),
            start.y.min(end.y),
            (end.x - start.x).abs(),
            (end.y - start.y).abs(),
        );
        let bounds = PercentRect::from_pixels(&rect, display_width, display_height).clamped();
        Self {
            kind,
            bounds,
            color: DEFAULT_COLOR.to_string(),
        }
    }

    /// Set the colour.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Whether the editor should show a confirmation dialog.
    pub fn needs_confirmation(&self) -> bool {
        matches!(
            self.kind,
            CalloutKind::Number { .. } | CalloutKind::Rectangle { .. }
        )
    }

    /// Turn the pending record into an add request.
    ///
    /// `text` becomes the reveal text of a number callout or the label of a
    /// rectangle; it is ignored for other shapes. Blank text counts as none.
    pub fn confirm(self, ids: &mut dyn IdGenerator, text: Option<String>) -> CalloutEdit {
        let text = text.filter(|t| !t.trim().is_empty());
        let kind = match self.kind {
            CalloutKind::Number { number, .. } => CalloutKind::Number {
                number,
                reveal_text: text,
            },
            CalloutKind::Rectangle { .. } => CalloutKind::Rectangle { text },
            other => other,
        };
        CalloutEdit::Add(Callout {
            id: ids.next_id(),
            color: self.color,
            x: self.bounds.x,
            y: self.bounds.y,
            width: self.bounds.width,
            height: self.bounds.height,
            kind,
        })
    }
}
