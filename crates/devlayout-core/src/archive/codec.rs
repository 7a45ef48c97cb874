//! Conversion between [`LayoutDocument`] and the live object graph.
//!
//! Decoding is all-or-nothing: every view and element is converted into a
//! detached [`DeviceView`] first, and the [`DeviceLayout`] is only created once
//! the whole document has been accepted.  No events are observable during
//! decoding because nobody can have subscribed yet.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::archive::document::{ElementDocument, LayoutDocument, ViewDocument};
use crate::domain::element::{Area, Key, Led, MatrixCell, IO};
use crate::domain::kinds::{ComponentType, DeviceType, RegionName, TagError, ViewPosition};
use crate::domain::layout::{DeviceLayout, LayoutMetadata};
use crate::domain::view::{DeviceView, ViewAttributes};

/// Errors raised while reading or writing a layout archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The document is not valid JSON, a required field is missing, or a field
    /// has the wrong JSON type.
    #[error("malformed layout document: {0}")]
    Malformed(#[source] serde_json::Error),

    /// An element `"type"` is not one of LED, KEY, MATRIX_CELL or AREA.
    #[error("unsupported element type: {0:?}")]
    UnsupportedElementType(String),

    /// A device type, view position or region tag is not recognised.
    #[error(transparent)]
    UnknownTag(#[from] TagError),

    /// The layout could not be serialised.
    #[error("failed to serialize layout: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A float field holds NaN or an infinity, which JSON cannot represent.
    #[error("{position} view has a non-finite {field}")]
    NonFinite {
        position: String,
        field: &'static str,
    },

    /// The layout has no base path to save to.
    #[error("layout has no archive path to save to")]
    NoBase,

    /// A file system I/O error occurred.
    #[error("I/O error accessing layout archive at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Builds a layout from a parsed archive document.
///
/// `base` is recorded as the layout's archive path.
///
/// # Errors
///
/// Returns [`ArchiveError::UnsupportedElementType`] for an unknown element
/// type and [`ArchiveError::UnknownTag`] for any other unknown enum tag.
pub fn decode_layout(
    base: Option<PathBuf>,
    document: &LayoutDocument,
) -> Result<Arc<DeviceLayout>, ArchiveError> {
    let device_type: DeviceType = document.device_type.parse()?;
    let views = document
        .views
        .iter()
        .map(decode_view)
        .collect::<Result<Vec<_>, _>>()?;

    let layout = DeviceLayout::with_metadata(LayoutMetadata {
        name: document.name.clone(),
        matrix_width: document.matrix_width,
        matrix_height: document.matrix_height,
        device_type,
        read_only: false,
        base,
    });
    for view in views {
        layout.add_view(view);
    }
    debug!(views = layout.view_count(), "layout decoded");
    Ok(layout)
}

/// Parses JSON text and builds a layout from it.
///
/// # Errors
///
/// Returns [`ArchiveError::Malformed`] if the text is not a valid document,
/// plus every error of [`decode_layout`].
///
/// # Examples
///
/// ```rust
/// use devlayout_core::{decode_json, ComponentType, ViewPosition};
///
/// let json = r#"{
///     "matrixWidth": 4, "matrixHeight": 1, "deviceType": "MOUSE",
///     "views": [{ "position": "TOP", "elements": [{ "type": "LED", "matrixX": 2 }] }]
/// }"#;
/// let layout = decode_json(None, json).unwrap();
/// let top = layout.view_that_has(ComponentType::Led).unwrap();
/// assert_eq!(top.position(), ViewPosition::Top);
/// ```
pub fn decode_json(base: Option<PathBuf>, json: &str) -> Result<Arc<DeviceLayout>, ArchiveError> {
    let document: LayoutDocument = serde_json::from_str(json).map_err(ArchiveError::Malformed)?;
    decode_layout(base, &document)
}

/// Captures the current state of `layout` as an archive document.
pub fn encode_layout(layout: &DeviceLayout) -> LayoutDocument {
    let metadata = layout.metadata();
    LayoutDocument {
        name: metadata.name,
        matrix_height: metadata.matrix_height,
        matrix_width: metadata.matrix_width,
        device_type: metadata.device_type.tag().to_string(),
        views: layout.views().iter().map(|v| encode_view(v)).collect(),
    }
}

/// Serialises `layout` to JSON text.
///
/// # Errors
///
/// Returns [`ArchiveError::NonFinite`] if any float is NaN or infinite, and
/// [`ArchiveError::Serialize`] if serialisation fails.
pub fn encode_json(layout: &DeviceLayout, pretty: bool) -> Result<String, ArchiveError> {
    let document = encode_layout(layout);
    ensure_finite(&document)?;
    let text = if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    };
    text.map_err(ArchiveError::Serialize)
}

impl DeviceLayout {
    /// Loads a layout from archive JSON text, recording `base` as its path.
    ///
    /// # Errors
    ///
    /// See [`decode_json`].
    pub fn from_archive(base: Option<PathBuf>, json: &str) -> Result<Arc<Self>, ArchiveError> {
        decode_json(base, json)
    }

    /// Captures this layout as an archive document.
    pub fn to_document(&self) -> LayoutDocument {
        encode_layout(self)
    }

    /// Serialises this layout to archive JSON text.
    ///
    /// # Errors
    ///
    /// See [`encode_json`].
    pub fn to_json(&self, pretty: bool) -> Result<String, ArchiveError> {
        encode_json(self, pretty)
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

fn decode_view(document: &ViewDocument) -> Result<Arc<DeviceView>, ArchiveError> {
    let attributes = ViewAttributes {
        position: document.position.parse::<ViewPosition>()?,
        image_uri: document.image_uri.clone(),
        image_opacity: document.image_opacity,
        image_scale: document.image_scale,
        desaturate_image: document.desaturate_image,
    };
    let elements = document
        .elements
        .iter()
        .map(decode_element)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DeviceView::with_elements(attributes, elements))
}

fn decode_element(document: &ElementDocument) -> Result<IO, ArchiveError> {
    let kind: ComponentType = document
        .kind
        .parse()
        .map_err(|_| ArchiveError::UnsupportedElementType(document.kind.clone()))?;

    let label = document.label.clone();
    let (x, y) = (document.x, document.y);
    let matrix_x = document.matrix_x.unwrap_or(0);
    let matrix_y = document.matrix_y.unwrap_or(0);

    let element = match kind {
        ComponentType::Led => IO::Led(Led {
            label,
            x,
            y,
            matrix_x,
            matrix_y,
        }),
        ComponentType::Key => IO::Key(Key {
            label,
            x,
            y,
            matrix_x,
            matrix_y,
        }),
        ComponentType::MatrixCell => IO::MatrixCell(MatrixCell {
            label,
            x,
            y,
            matrix_x,
            matrix_y,
            region: decode_region(document)?,
        }),
        ComponentType::Area => IO::Area(Area {
            label,
            x,
            y,
            region: decode_region(document)?,
        }),
    };
    Ok(element)
}

fn decode_region(document: &ElementDocument) -> Result<Option<RegionName>, TagError> {
    document.region.as_deref().map(str::parse).transpose()
}

// ── Encoding ──────────────────────────────────────────────────────────────────

fn encode_view(view: &DeviceView) -> ViewDocument {
    let attributes = view.attributes();
    ViewDocument {
        position: attributes.position.tag().to_string(),
        desaturate_image: attributes.desaturate_image,
        image_opacity: attributes.image_opacity,
        image_scale: attributes.image_scale,
        image_uri: attributes.image_uri,
        elements: view.elements().iter().map(|e| encode_element(e)).collect(),
    }
}

fn encode_element(element: &IO) -> ElementDocument {
    let (x, y) = element.position();
    let matrix = element.matrix();
    ElementDocument {
        kind: element.component_type().tag().to_string(),
        matrix_x: matrix.map(|(mx, _)| mx),
        matrix_y: matrix.map(|(_, my)| my),
        region: element.region().map(|r| r.tag().to_string()),
        label: element.label().map(str::to_string),
        x,
        y,
    }
}

/// serde_json writes non-finite floats as `null`, which would not load back.
fn ensure_finite(document: &LayoutDocument) -> Result<(), ArchiveError> {
    for view in &document.views {
        let element_floats = view.elements.iter().flat_map(|e| [("x", e.x), ("y", e.y)]);
        let bad = [
            ("imageOpacity", view.image_opacity),
            ("imageScale", view.image_scale),
        ]
        .into_iter()
        .chain(element_floats)
        .find(|(_, value)| !value.is_finite());

        if let Some((field, _)) = bad {
            return Err(ArchiveError::NonFinite {
                position: view.position.clone(),
                field,
            });
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
