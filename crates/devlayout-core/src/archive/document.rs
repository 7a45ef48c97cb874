//! Serde schema of the persisted layout document.
//!
//! These types mirror the JSON archive one-to-one.  Enum-valued fields are kept
//! as plain strings here and converted in [`codec`](super::codec), so that an
//! unknown tag can be reported precisely instead of as a generic serde error.
//!
//! ```json
//! {
//!   "name": "Blade 15",
//!   "matrixHeight": 6,
//!   "matrixWidth": 16,
//!   "deviceType": "KEYBOARD",
//!   "views": [
//!     {
//!       "position": "TOP",
//!       "imageUri": "blade-top.png",
//!       "elements": [
//!         { "type": "KEY", "matrixX": 1, "matrixY": 0, "label": "Esc", "x": 12.0, "y": 8.0 },
//!         { "type": "AREA", "region": "LOGO", "x": 200.0, "y": 40.0 }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Optional fields that are absent take their documented defaults; unknown
//! fields are ignored.

use serde::{Deserialize, Serialize};

/// Top-level archive document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub matrix_height: u32,
    pub matrix_width: u32,
    /// [`DeviceType`](crate::DeviceType) tag.
    pub device_type: String,
    pub views: Vec<ViewDocument>,
}

/// One view within the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDocument {
    /// [`ViewPosition`](crate::ViewPosition) tag.
    pub position: String,
    #[serde(default)]
    pub desaturate_image: bool,
    #[serde(default = "default_unit")]
    pub image_opacity: f32,
    #[serde(default = "default_unit")]
    pub image_scale: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    pub elements: Vec<ElementDocument>,
}

/// One element within a view.
///
/// `matrix_x` / `matrix_y` are read for LED, KEY and MATRIX_CELL only;
/// `region` for MATRIX_CELL and AREA only.  They are ignored on other types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDocument {
    /// [`ComponentType`](crate::ComponentType) tag.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_x: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_y: Option<u32>,
    /// [`RegionName`](crate::RegionName) tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

fn default_unit() -> f32 {
    1.0
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_document_fills_presentation_defaults() {
        let view: ViewDocument =
            serde_json::from_str(r#"{"position":"TOP","elements":[]}"#).expect("valid view");

        assert!(!view.desaturate_image);
        assert_eq!(view.image_opacity, 1.0);
        assert_eq!(view.image_scale, 1.0);
        assert_eq!(view.image_uri, None);
    }

    #[test]
    fn test_element_document_defaults_position_to_origin() {
        let element: ElementDocument =
            serde_json::from_str(r#"{"type":"LED"}"#).expect("valid element");

        assert_eq!(element.kind, "LED");
        assert_eq!((element.x, element.y), (0.0, 0.0));
        assert_eq!(element.matrix_x, None);
        assert_eq!(element.label, None);
    }

    #[test]
    fn test_layout_document_requires_matrix_dimensions() {
        let result = serde_json::from_str::<LayoutDocument>(
            r#"{"matrixWidth":4,"deviceType":"MOUSE","views":[]}"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("matrixHeight"), "unexpected error: {err}");
    }

    #[test]
    fn test_layout_document_ignores_unknown_fields() {
        let doc: LayoutDocument = serde_json::from_str(
            r#"{"matrixWidth":0,"matrixHeight":0,"deviceType":"MOUSE","views":[],"vendor":"x"}"#,
        )
        .expect("unknown fields are ignored");
        assert_eq!(doc.name, None);
    }

    #[test]
    fn test_element_document_omits_absent_optionals_when_serialized() {
        let element = ElementDocument {
            kind: "AREA".to_string(),
            matrix_x: None,
            matrix_y: None,
            region: None,
            label: None,
            x: 1.0,
            y: 2.0,
        };

        let json = serde_json::to_value(&element).expect("serialize");

        assert_eq!(json, serde_json::json!({"type": "AREA", "x": 1.0, "y": 2.0}));
    }
}
