//! Live annotation overlay model.
//!
//! The editor shows callouts as absolutely positioned DOM elements rather than
//! re-running the compositor. This module produces those elements from the
//! same percentage boxes the compositor resolves, and models the two things
//! the overlay sends upward: edit requests ([`CalloutEdit`]) and the
//! short-lived [`PendingCallout`] that sits between a drag and its
//! confirmation dialog.

pub mod edit;
pub mod ids;

pub use edit::{next_number, CalloutEdit, PendingCallout};
pub use ids::{IdGenerator, SequentialIds, UuidIds};

use crate::geometry::{css_box, CssBox};
use crate::html::escape_html;
use crate::model::{Callout, CalloutKind};

/// Whether the overlay is being edited or viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayMode {
    /// Every callout is drawn and selectable
    Editing,
    /// Only interactive callouts (reveal hotspots) are emitted
    Viewing,
}

/// One positioned overlay element.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayElement {
    /// Callout id
    pub callout_id: String,
    /// Shape name, used as a CSS class suffix
    pub shape: String,
    /// Percentage position
    pub css: CssBox,
    /// Callout colour
    pub color: String,
    /// Centred label (number or rectangle text)
    pub label: Option<String>,
    /// Click-to-reveal text
    pub reveal_text: Option<String>,
}

impl OverlayElement {
    /// Build the element for a callout.
    pub fn from_callout(callout: &Callout) -> Self {
        let label = match &callout.kind {
            CalloutKind::Rectangle { text } => text.clone(),
            _ => callout.number().map(|n| n.to_string()),
        };
        Self {
            callout_id: callout.id.clone(),
            shape: callout.kind.shape_name().to_string(),
            css: css_box(callout),
            color: callout.color.clone(),
            label,
            reveal_text: callout.reveal_text().map(str::to_string),
        }
    }

    /// Whether clicking the element reveals text.
    pub fn is_interactive(&self) -> bool {
        self.reveal_text.is_some()
    }

    /// Render as an HTML fragment.
    ///
    /// `scope` prefixes element ids so several screenshots can share a page.
    pub fn to_html(&self, scope: &str) -> String {
        let id = format!("{}-{}", scope, escape_html(&self.callout_id));
        let label = self
            .label
            .as_deref()
            .map(|l| format!("<span class=\"callout-label\">{}</span>", escape_html(l)))
            .unwrap_or_default();
        match &self.reveal_text {
            Some(text) => format!(
                "<button type=\"button\" class=\"callout callout-{shape} reveal-hotspot\" id=\"{id}\" \
                 style=\"{style};--callout-color:{color}\" data-reveal=\"{id}-text\" \
                 aria-expanded=\"false\">{label}</button>\
                 <div class=\"reveal-popover\" id=\"{id}-text\" role=\"tooltip\" hidden>{text}</div>",
                shape = escape_html(&self.shape),
                id = id,
                style = self.css.style(),
                color = escape_html(&self.color),
                label = label,
                text = escape_html(text),
            ),
            None => format!(
                "<div class=\"callout callout-{shape}\" id=\"{id}\" \
                 style=\"{style};--callout-color:{color}\">{label}</div>",
                shape = escape_html(&self.shape),
                id = id,
                style = self.css.style(),
                color = escape_html(&self.color),
                label = label,
            ),
        }
    }
}

/// Overlay elements for a callout list, in z-order.
///
/// Callouts that cannot be positioned are logged and left out.
///
/// # Examples
///
/// ```
/// use snapguide::model::{Callout, CalloutKind};
/// use snapguide::overlay::{overlay_elements, OverlayMode};
///
/// let callouts = vec![
///     Callout::new("a", CalloutKind::Oval, 10.0, 10.0, 5.0, 5.0),
///     Callout::new("b", CalloutKind::Number { number: 1, reveal_text: Some("Hi".into()) },
///                  50.0, 50.0, 4.0, 4.0),
/// ];
/// assert_eq!(overlay_elements(&callouts, OverlayMode::Editing).len(), 2);
/// let viewing = overlay_elements(&callouts, OverlayMode::Viewing);
/// assert_eq!(viewing.len(), 1);
/// assert_eq!(viewing[0].css.left, "50.00%");
/// ```
pub fn overlay_elements(callouts: &[Callout], mode: OverlayMode) -> Vec<OverlayElement> {
    callouts
        .iter()
        .filter(|callout| match callout.problem() {
            Some(problem) => {
                log::warn!("Skipping overlay for callout {}: {}", callout.id, problem);
                false
            }
            None => true,
        })
        .map(OverlayElement::from_callout)
        .filter(|e| mode == OverlayMode::Editing || e.is_interactive())
        .collect()
}
