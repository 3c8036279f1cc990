//! Documents, steps and screenshots.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::callout::Callout;
use crate::error::{Error, Result};

/// A multi-step guide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Stable identifier
    #[serde(default)]
    pub id: String,
    /// Cover and header metadata
    #[serde(flatten)]
    pub metadata: DocumentMetadata,
    /// Ordered steps
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Document metadata shown on the cover, in footers and in manifests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Title
    #[serde(default)]
    pub title: String,
    /// Subtitle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Free-form date string (ISO dates are recognised for the copyright year)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Company name for the cover and copyright line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Logo as a `data:` URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Start the HTML module in dark mode
    #[serde(default)]
    pub dark_mode: bool,
    /// Accent colour override (`#rrggbb`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
}

/// One step of a guide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Stable identifier
    pub id: String,
    /// Headline shown in the step pill
    #[serde(default)]
    pub description: String,
    /// Detailed instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Additional notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Legacy single-screenshot slot, logical index 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<Screenshot>,
    /// Screenshots after the legacy slot
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<Screenshot>,
    /// Tags used for cross-step highlighting
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Related links
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    /// Optional single-question quiz
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
    /// Training metadata, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training: Option<serde_json::Value>,
}

impl Step {
    /// Create a step with an id and a description.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Logical screenshot list: the legacy slot first, then the array.
    pub fn screenshots(&self) -> impl Iterator<Item = &Screenshot> {
        self.screenshot.iter().chain(self.screenshots.iter())
    }

    /// Number of screenshots in the logical list.
    pub fn screenshot_count(&self) -> usize {
        self.screenshot.is_some() as usize + self.screenshots.len()
    }

    /// Add a screenshot to the end of the logical list.
    pub fn with_screenshot(mut self, screenshot: Screenshot) -> Self {
        self.screenshots.push(screenshot);
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// A link attached to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Display title
    pub title: String,
    /// Target URL
    pub url: String,
}

/// A single-question quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Question text
    pub question: String,
    /// Answer options
    pub options: Vec<String>,
    /// Index of the correct option
    #[serde(alias = "correctAnswer")]
    pub answer_index: usize,
    /// Shown after answering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A screenshot and its callouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScreenshotRecord", into = "ScreenshotRecord")]
pub struct Screenshot {
    /// Stable identifier
    pub id: String,
    /// Primary raster as a `data:` URL
    pub data_url: String,
    /// Pre-crop raster, set on the first crop
    pub original_data_url: Option<String>,
    /// Callouts in z-order
    pub callouts: Vec<Callout>,
    /// Optional "after" raster with its own callouts
    pub secondary: Option<SecondaryImage>,
    /// Whether `data_url` is a crop of `original_data_url`
    pub is_cropped: bool,
}

/// Secondary raster of a before/after pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecondaryImage {
    /// Raster as a `data:` URL
    pub data_url: String,
    /// Callouts in z-order
    pub callouts: Vec<Callout>,
}

impl Screenshot {
    /// Create a screenshot with no callouts.
    pub fn new(id: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data_url: data_url.into(),
            ..Default::default()
        }
    }

    /// Append a callout.
    pub fn with_callout(mut self, callout: Callout) -> Self {
        self.callouts.push(callout);
        self
    }

    /// Attach a secondary raster.
    pub fn with_secondary(mut self, data_url: impl Into<String>, callouts: Vec<Callout>) -> Self {
        self.secondary = Some(SecondaryImage {
            data_url: data_url.into(),
            callouts,
        });
        self
    }

    /// Number callouts that carry reveal text, in list order.
    pub fn reveal_callouts(&self) -> impl Iterator<Item = &Callout> {
        self.callouts.iter().filter(|c| c.reveal_text().is_some())
    }
}

/// Flat wire representation of a screenshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    data_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_data_url: Option<String>,
    #[serde(default)]
    callouts: Vec<Callout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secondary_data_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secondary_callouts: Option<Vec<Callout>>,
    #[serde(default)]
    is_cropped: bool,
}

impl From<ScreenshotRecord> for Screenshot {
    fn from(record: ScreenshotRecord) -> Self {
        let secondary = match (record.secondary_data_url, record.secondary_callouts) {
            (Some(data_url), callouts) if !data_url.is_empty() => Some(SecondaryImage {
                data_url,
                callouts: callouts.unwrap_or_default(),
            }),
            (_, Some(callouts)) if !callouts.is_empty() => {
                log::debug!(
                    "Screenshot {} has secondary callouts without a secondary image; dropping {}",
                    record.id,
                    callouts.len()
                );
                None
            },
            _ => None,
        };
        Screenshot {
            id: record.id,
            data_url: record.data_url,
            original_data_url: record.original_data_url,
            callouts: record.callouts,
            secondary,
            is_cropped: record.is_cropped,
        }
    }
}

impl From<Screenshot> for ScreenshotRecord {
    fn from(s: Screenshot) -> Self {
        let (secondary_data_url, secondary_callouts) = match s.secondary {
            Some(sec) => (Some(sec.data_url), Some(sec.callouts)),
            None => (None, None),
        };
        ScreenshotRecord {
            id: s.id,
            data_url: s.data_url,
            original_data_url: s.original_data_url,
            callouts: s.callouts,
            secondary_data_url,
            secondary_callouts,
            is_cropped: s.is_cropped,
        }
    }
}

impl Document {
    /// Create an empty document with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            metadata: DocumentMetadata {
                title: title.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Append a step.
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Parse and validate a document from JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use snapguide::model::Document;
    ///
    /// let doc = Document::from_json(r#"{"title":"Setup","steps":[{"id":"s1","description":"Open"}]}"#).unwrap();
    /// assert_eq!(doc.metadata.title, "Setup");
    /// assert_eq!(doc.steps.len(), 1);
    /// ```
    pub fn from_json(json: &str) -> Result<Document> {
        let doc: Document = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Serialise to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject documents the renderers cannot lay out deterministically.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (index, step) in self.steps.iter().enumerate() {
            if step.id.is_empty() {
                return Err(Error::InvalidDocument(format!("step {} has no id", index + 1)));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(Error::InvalidDocument(format!(
                    "duplicate step id '{}' at step {}",
                    step.id,
                    index + 1
                )));
            }
        }
        Ok(())
    }

    /// Total screenshots across all steps.
    pub fn screenshot_count(&self) -> usize {
        self.steps.iter().map(Step::screenshot_count).sum()
    }

    /// Distinct tags in first-seen order.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for tag in self.steps.iter().flat_map(|s| s.tags.iter()) {
            if !tags.contains(&tag.as_str()) {
                tags.push(tag);
            }
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CalloutKind;

    const DOC: &str = r##"{
        "id": "doc-1",
        "title": "Expense report",
        "topic": "Finance",
        "company": "Acme",
        "darkMode": true,
        "steps": [
            {
                "id": "s1",
                "description": "Open the form",
                "screenshot": {"id": "legacy", "dataUrl": "data:image/png;base64,AAAA"},
                "screenshots": [
                    {"id": "a", "dataUrl": "data:image/png;base64,BBBB",
                     "secondaryDataUrl": "data:image/png;base64,CCCC",
                     "secondaryCallouts": [{"id": "x", "shape": "arrow"}]}
                ],
                "tags": ["forms"],
                "quiz": {"question": "Where?", "options": ["A", "B"], "answerIndex": 1}
            },
            {"id": "s2", "description": "Submit", "tags": ["forms", "submit"]}
        ]
    }"##;

    #[test]
    fn test_parse_document() {
        let doc = Document::from_json(DOC).unwrap();
        assert_eq!(doc.metadata.title, "Expense report");
        assert_eq!(doc.metadata.company.as_deref(), Some("Acme"));
        assert!(doc.metadata.dark_mode);
        assert_eq!(doc.steps.len(), 2);
        assert_eq!(doc.screenshot_count(), 2);
        assert_eq!(doc.tags(), vec!["forms", "submit"]);
    }

    #[test]
    fn test_legacy_slot_is_index_zero() {
        let doc = Document::from_json(DOC).unwrap();
        let ids: Vec<&str> = doc.steps[0].screenshots().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["legacy", "a"]);
    }

    #[test]
    fn test_secondary_pair() {
        let doc = Document::from_json(DOC).unwrap();
        let shot = doc.steps[0].screenshots().nth(1).unwrap();
        let secondary = shot.secondary.as_ref().unwrap();
        assert_eq!(secondary.data_url, "data:image/png;base64,CCCC");
        assert_eq!(secondary.callouts.len(), 1);
    }

    #[test]
    fn test_secondary_callouts_without_image_dropped() {
        let shot: Screenshot = serde_json::from_str(
            r#"{"id":"a","dataUrl":"x","secondaryCallouts":[{"id":"c","shape":"oval"}]}"#,
        )
        .unwrap();
        assert!(shot.secondary.is_none());
    }

    #[test]
    fn test_duplicate_step_ids_rejected() {
        let doc = Document::new("t")
            .with_step(Step::new("s", "one"))
            .with_step(Step::new("s", "two"));
        let err = doc.validate().unwrap_err();
        assert!(format!("{}", err).contains("duplicate step id"));
    }

    #[test]
    fn test_bad_callout_does_not_reject_document() {
        let shot = Screenshot::new("a", "data:").with_callout(Callout::new(
            "c",
            CalloutKind::Oval,
            f32::INFINITY,
            0.0,
            1.0,
            1.0,
        ));
        let doc = Document::new("t").with_step(Step::new("s", "one").with_screenshot(shot));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_keeps_wire_names() {
        let doc = Document::from_json(DOC).unwrap();
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"secondaryDataUrl\""));
        assert!(json.contains("\"dataUrl\""));
        assert!(json.contains("\"answerIndex\""));
        let back = Document::from_json(&json).unwrap();
        assert_eq!(back, doc);
    }
}
