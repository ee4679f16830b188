//! The annotation data model.
//!
//! An annotation is either a highlighted text span or a rectangular
//! screenshot capture, each optionally carrying a free-form comment. The
//! persisted JSON shape is heterogeneous: position data may be missing
//! entirely, page numbers can live at several nesting levels, and vertical
//! coordinates arrive either pre-normalized (`y1`, `pageRelativeY`) or as raw
//! pixel pairs (`top` + `height`). The types here mirror that shape directly
//! via serde so a stored snapshot deserializes without a hand-written parser,
//! while the `text` / `screenshot` split is a proper tagged enum rather than
//! a bag of optional fields.
//!
//! Resolution of a usable page number and vertical offset out of this
//! looseness lives in [`crate::pipeline::position`]; nothing in this module
//! interprets coordinates.

use serde::{Deserialize, Serialize};

/// A single user-created annotation on a source document.
///
/// The collection order of annotations is meaningful: it records creation
/// order and serves as the final tie-break when sorting (see
/// [`crate::pipeline::order`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Stable unique identifier, generated at creation, never reused.
    pub id: String,

    /// Optional free-form comment attached to the annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,

    /// Shortcut normalized vertical position in [0,1]. When present it takes
    /// precedence over any position-derived value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_relative_y: Option<f64>,

    /// The variant payload, discriminated by the persisted `kind` field.
    #[serde(flatten)]
    pub body: AnnotationBody,
}

/// Variant payload of an [`Annotation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnnotationBody {
    /// A highlighted text span extracted from the source document.
    #[serde(rename_all = "camelCase")]
    Text {
        /// The highlighted string. May be empty for degenerate selections;
        /// exporters still emit one entry per stored annotation.
        #[serde(default)]
        content: TextContent,
        /// Raw geometry captured at selection time, if any survived.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
    },

    /// A rectangular raster capture of a region of the page.
    #[serde(rename_all = "camelCase")]
    Screenshot { screenshot: Screenshot },
}

/// Wrapper matching the persisted `content: { text: ... }` nesting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub text: String,
}

/// Wrapper matching the persisted `comment: { text: ... }` nesting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub text: String,
}

/// Selection geometry as captured by the rendering/selection engine.
///
/// Every field is optional; legacy records may carry any subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_rect: Option<Rect>,

    /// One rectangle per rendered line of a multi-line highlight. A highlight
    /// spanning a page break carries rects from more than one page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rects: Vec<Rect>,
}

/// A single selection rectangle.
///
/// The vertical coordinate is expressed either as an already-normalized `y1`
/// in [0,1], or as a raw pixel `top` paired with the page pixel `height`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y1: Option<f64>,
}

/// Payload of a screenshot annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    /// Self-contained raster image as a base64 data URL
    /// (`data:image/png;base64,...`).
    pub data_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,

    /// Normalized vertical offset of the capture, authoritative when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_relative_y: Option<f64>,

    /// Logical on-screen width at capture time, in CSS pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_width: Option<f64>,

    /// Logical on-screen height at capture time, in CSS pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_height: Option<f64>,

    /// Capture-time scale factor between device pixels and CSS pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_pixel_ratio: Option<f64>,
}

impl Annotation {
    /// Create a text annotation with no position data.
    pub fn text(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            comment: None,
            page_relative_y: None,
            body: AnnotationBody::Text {
                content: TextContent {
                    text: content.into(),
                },
                position: None,
            },
        }
    }

    /// Create a text annotation pinned to a page number.
    pub fn text_on_page(
        id: impl Into<String>,
        content: impl Into<String>,
        page_number: u32,
    ) -> Self {
        let mut a = Self::text(id, content);
        if let AnnotationBody::Text { position, .. } = &mut a.body {
            *position = Some(Position {
                page_number: Some(page_number),
                ..Position::default()
            });
        }
        a
    }

    /// Create a screenshot annotation from a data URL.
    pub fn screenshot(id: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            comment: None,
            page_relative_y: None,
            body: AnnotationBody::Screenshot {
                screenshot: Screenshot {
                    data_url: data_url.into(),
                    page_number: None,
                    page_relative_y: None,
                    css_width: None,
                    css_height: None,
                    device_pixel_ratio: None,
                },
            },
        }
    }

    /// Attach a comment, replacing any existing one.
    pub fn with_comment(mut self, text: impl Into<String>) -> Self {
        self.comment = Some(Comment { text: text.into() });
        self
    }

    /// Set the top-level normalized vertical shortcut.
    pub fn with_page_relative_y(mut self, y: f64) -> Self {
        self.page_relative_y = Some(y);
        self
    }

    /// Comment text, if a non-empty comment is attached.
    pub fn comment_text(&self) -> Option<&str> {
        self.comment
            .as_ref()
            .map(|c| c.text.as_str())
            .filter(|t| !t.trim().is_empty())
    }

    /// The screenshot payload, when this is a screenshot annotation.
    pub fn screenshot_data(&self) -> Option<&Screenshot> {
        match &self.body {
            AnnotationBody::Screenshot { screenshot } => Some(screenshot),
            AnnotationBody::Text { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_text_annotation_full_shape() {
        let json = r#"{
            "id": "a1",
            "kind": "text",
            "content": { "text": "highlighted words" },
            "comment": { "text": "interesting" },
            "position": {
                "pageNumber": 3,
                "boundingRect": { "top": 120.0, "height": 800.0, "pageNumber": 3 },
                "rects": [
                    { "top": 120.0, "height": 800.0 },
                    { "top": 140.0, "height": 800.0 }
                ]
            }
        }"#;
        let a: Annotation = serde_json::from_str(json).expect("valid snapshot record");
        assert_eq!(a.id, "a1");
        assert_eq!(a.comment_text(), Some("interesting"));
        match &a.body {
            AnnotationBody::Text { content, position } => {
                assert_eq!(content.text, "highlighted words");
                let pos = position.as_ref().unwrap();
                assert_eq!(pos.page_number, Some(3));
                assert_eq!(pos.rects.len(), 2);
            }
            _ => panic!("expected text variant"),
        }
    }

    #[test]
    fn deserialize_screenshot_annotation() {
        let json = r#"{
            "id": "s1",
            "kind": "screenshot",
            "pageRelativeY": 0.25,
            "screenshot": {
                "dataUrl": "data:image/png;base64,AAAA",
                "pageNumber": 2,
                "cssWidth": 600.0,
                "cssHeight": 300.0,
                "devicePixelRatio": 2.0
            }
        }"#;
        let a: Annotation = serde_json::from_str(json).expect("valid snapshot record");
        assert_eq!(a.page_relative_y, Some(0.25));
        let shot = a.screenshot_data().expect("screenshot variant");
        assert_eq!(shot.page_number, Some(2));
        assert_eq!(shot.css_width, Some(600.0));
        assert_eq!(shot.device_pixel_ratio, Some(2.0));
    }

    #[test]
    fn deserialize_minimal_legacy_record() {
        // A legacy record with no position at all must still parse.
        let json = r#"{ "id": "old", "kind": "text", "content": { "text": "x" } }"#;
        let a: Annotation = serde_json::from_str(json).expect("legacy record parses");
        match &a.body {
            AnnotationBody::Text { position, .. } => assert!(position.is_none()),
            _ => panic!("expected text variant"),
        }
    }

    #[test]
    fn empty_comment_is_not_reported() {
        let a = Annotation::text("t", "body").with_comment("   ");
        assert_eq!(a.comment_text(), None);
    }

    #[test]
    fn roundtrip_preserves_kind_tag() {
        let a = Annotation::text_on_page("t1", "hello", 4);
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains(r#""kind":"text""#), "got: {json}");
        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
