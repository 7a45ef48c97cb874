//! Reading and writing layout archives on disk.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::archive::codec::{decode_json, encode_json, ArchiveError};
use crate::domain::layout::DeviceLayout;

/// Loads a layout archive from `path`.
///
/// The returned layout records `path` as its base, so a later
/// [`save_layout`] writes back to the same file.
///
/// # Errors
///
/// Returns [`ArchiveError::Io`] if the file cannot be read, plus every
/// decoding error of [`decode_json`].
pub fn load_layout(path: &Path) -> Result<Arc<DeviceLayout>, ArchiveError> {
    debug!(path = %path.display(), "loading layout archive");
    let text = std::fs::read_to_string(path).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_json(Some(path.to_path_buf()), &text)
}

/// Writes `layout` back to its base path.
///
/// # Errors
///
/// Returns [`ArchiveError::NoBase`] if the layout was not loaded from (or
/// assigned) a file.
pub fn save_layout(layout: &DeviceLayout) -> Result<(), ArchiveError> {
    let base = layout.base().ok_or(ArchiveError::NoBase)?;
    save_layout_to(layout, &base)
}

/// Writes `layout` as pretty-printed JSON to `path`, creating parent
/// directories if needed.  The layout's base path is left untouched.
///
/// # Errors
///
/// See [`save_layout_with`].
pub fn save_layout_to(layout: &DeviceLayout, path: &Path) -> Result<(), ArchiveError> {
    save_layout_with(layout, path, true)
}

/// Writes `layout` to `path` as compact or pretty JSON, creating parent
/// directories if needed.  Nothing is written if encoding fails.
///
/// # Errors
///
/// Returns [`ArchiveError::Io`] for any file system failure, plus every
/// encoding error of [`encode_json`].
pub fn save_layout_with(
    layout: &DeviceLayout,
    path: &Path,
    pretty: bool,
) -> Result<(), ArchiveError> {
    let io_err = |source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    };

    let text = encode_json(layout, pretty)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, text).map_err(io_err)?;

    info!(path = %path.display(), pretty, "layout archive saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeviceType, DeviceView, Key, ViewPosition};
    use tempfile::TempDir;

    fn sample_layout() -> Arc<DeviceLayout> {
        let layout = DeviceLayout::new();
        layout.set_name(Some("Sample".to_string()));
        layout.set_device_type(DeviceType::Keypad);
        let view = DeviceView::new(ViewPosition::Top);
        view.add_element(Key {
            label: Some("1".into()),
            matrix_x: 1,
            ..Default::default()
        });
        layout.add_view(view);
        layout
    }

    #[test]
    fn test_save_then_load_restores_layout_and_records_base() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layouts").join("sample.json");

        save_layout_to(&sample_layout(), &path).expect("save should succeed");
        let loaded = load_layout(&path).expect("load should succeed");

        assert_eq!(loaded.name().as_deref(), Some("Sample"));
        assert_eq!(loaded.device_type(), DeviceType::Keypad);
        assert_eq!(loaded.base().as_deref(), Some(path.as_path()));
        let top = loaded.view(ViewPosition::Top).expect("top view");
        assert_eq!(top.element(0).unwrap().label(), Some("1"));
    }

    #[test]
    fn test_save_layout_writes_back_to_base() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.json");
        save_layout_to(&sample_layout(), &path).unwrap();

        let loaded = load_layout(&path).unwrap();
        loaded.set_matrix_width(9);
        save_layout(&loaded).expect("save to base");

        assert_eq!(load_layout(&path).unwrap().matrix_width(), 9);
    }

    #[test]
    fn test_save_layout_without_base_fails() {
        let err = save_layout(&sample_layout()).unwrap_err();
        assert!(matches!(err, ArchiveError::NoBase));
    }

    #[test]
    fn test_compact_save_writes_single_line_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("compact.json");

        save_layout_with(&sample_layout(), &path, false).expect("save should succeed");

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains('\n'));
        assert_eq!(load_layout(&path).unwrap().name().as_deref(), Some("Sample"));
    }

    #[test]
    fn test_save_with_non_finite_float_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("bad.json");
        let layout = sample_layout();
        layout
            .view(ViewPosition::Top)
            .expect("top view")
            .set_image_opacity(f32::NAN);

        let err = save_layout_to(&layout, &path).unwrap_err();

        assert!(matches!(err, ArchiveError::NonFinite { field: "imageOpacity", .. }));
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");

        match load_layout(&path).unwrap_err() {
            ArchiveError::Io { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_malformed_file_fails_without_partial_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            load_layout(&path).unwrap_err(),
            ArchiveError::Malformed(_)
        ));
    }
}
