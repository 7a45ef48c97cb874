//! Implementations of the `devlayout` subcommands.
//!
//! Each command writes its report to a caller-supplied writer so the output
//! can be checked in tests without capturing stdout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use devlayout_core::{
    save_layout_with, ComponentType, DeviceDescriptor, DeviceLayout, DeviceType, DeviceView,
    TagError,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ToolConfig;

// ── Argument types ────────────────────────────────────────────────────────────

/// LED matrix size given on the command line as `ROWSxCOLS`, e.g. `6x22`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixSize {
    pub rows: u32,
    pub columns: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid matrix size {0:?}: expected ROWSxCOLS, e.g. 6x22")]
pub struct MatrixSizeError(String);

impl FromStr for MatrixSize {
    type Err = MatrixSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MatrixSizeError(s.to_string());
        let (rows, columns) = s
            .split_once(|c| c == 'x' || c == 'X')
            .ok_or_else(invalid)?;
        Ok(Self {
            rows: rows.trim().parse().map_err(|_| invalid())?,
            columns: columns.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// Parses a component type tag case-insensitively (`led`, `MATRIX_CELL`, ...).
pub fn parse_component(s: &str) -> Result<ComponentType, TagError> {
    s.to_ascii_uppercase().parse()
}

/// Parses a device type tag case-insensitively.
pub fn parse_device_type(s: &str) -> Result<DeviceType, TagError> {
    s.to_ascii_uppercase().parse()
}

// ── Archive resolution ────────────────────────────────────────────────────────

/// Resolves an archive argument.
///
/// An existing path is used as is.  Anything else is looked up inside the
/// configured `layouts_dir`, trying the name with a `.json` extension when it
/// has none.  If nothing matches, the argument is returned unchanged so the
/// load error names what the user typed.
pub fn resolve_archive(arg: &Path, config: &ToolConfig) -> PathBuf {
    if arg.exists() {
        return arg.to_path_buf();
    }
    let Some(dir) = &config.layouts_dir else {
        return arg.to_path_buf();
    };

    let candidate = dir.join(arg);
    if candidate.exists() {
        return candidate;
    }
    if candidate.extension().is_none() {
        let with_ext = candidate.with_extension("json");
        if with_ext.exists() {
            return with_ext;
        }
    }
    arg.to_path_buf()
}

/// Loads the archive named by `arg`, resolving it against the config first.
pub fn open(arg: &Path, config: &ToolConfig) -> anyhow::Result<Arc<DeviceLayout>> {
    let path = resolve_archive(arg, config);
    debug!(path = %path.display(), "opening archive");
    devlayout_core::load_layout(&path)
        .with_context(|| format!("failed to load layout archive {}", path.display()))
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Prints layout metadata and a per-view summary.
pub fn show(layout: &DeviceLayout, out: &mut impl Write) -> std::io::Result<()> {
    let metadata = layout.metadata();
    writeln!(
        out,
        "{} ({})",
        metadata.name.as_deref().unwrap_or("<unnamed>"),
        metadata.device_type
    )?;
    if metadata.matrix_width == 0 && metadata.matrix_height == 0 {
        writeln!(out, "matrix: none")?;
    } else {
        writeln!(
            out,
            "matrix: {} rows x {} columns",
            metadata.matrix_height, metadata.matrix_width
        )?;
    }
    writeln!(out, "views: {}", layout.view_count())?;

    for view in layout.views() {
        write_view(&view, out)?;
    }
    Ok(())
}

fn write_view(view: &DeviceView, out: &mut impl Write) -> std::io::Result<()> {
    let attributes = view.attributes();
    writeln!(
        out,
        "  {:<10} image={} opacity={} scale={} desaturate={}",
        attributes.position.tag(),
        attributes.image_uri.as_deref().unwrap_or("-"),
        attributes.image_opacity,
        attributes.image_scale,
        attributes.desaturate_image
    )?;

    let elements = view.elements();
    let counts: Vec<String> = ComponentType::ALL
        .into_iter()
        .filter_map(|kind| {
            let n = elements.iter().filter(|e| e.component_type() == kind).count();
            (n > 0).then(|| format!("{kind} x{n}"))
        })
        .collect();
    if counts.is_empty() {
        writeln!(out, "    (no elements)")
    } else {
        writeln!(out, "    {}", counts.join(", "))
    }
}

/// Prints the position of the first (or every) view containing `kind`.
///
/// Returns the number of positions printed.
pub fn query(
    layout: &DeviceLayout,
    kind: ComponentType,
    all: bool,
    out: &mut impl Write,
) -> std::io::Result<usize> {
    let views = if all {
        layout.views_that_have(kind)
    } else {
        layout.view_that_has(kind).into_iter().collect()
    };
    for view in &views {
        writeln!(out, "{}", view.position())?;
    }
    Ok(views.len())
}

/// Lists elements outside the declared matrix.
///
/// Returns `true` when every element is in bounds.
pub fn check(layout: &DeviceLayout, out: &mut impl Write) -> std::io::Result<bool> {
    let outside = layout.out_of_matrix_elements();
    for (position, element) in &outside {
        // Only matrix-bearing elements are reported.
        let Some((x, y)) = element.matrix() else {
            continue;
        };
        writeln!(
            out,
            "{position}: {} {}at ({x}, {y}) is outside {}x{}",
            element.component_type(),
            element
                .label()
                .map(|l| format!("{l:?} "))
                .unwrap_or_default(),
            layout.matrix_height(),
            layout.matrix_width()
        )?;
    }
    if outside.is_empty() {
        writeln!(out, "ok")?;
    }
    Ok(outside.is_empty())
}

/// Builds an empty layout for the described device and writes it to `path`.
pub fn create(
    name: &str,
    device_type: DeviceType,
    matrix: Option<MatrixSize>,
    path: &Path,
    pretty: bool,
) -> anyhow::Result<Arc<DeviceLayout>> {
    let mut device = DeviceDescriptor::new(name, device_type);
    if let Some(size) = matrix {
        device = device.with_matrix(size.rows, size.columns);
    }

    let layout = DeviceLayout::from_device(&device);
    save_layout_with(&layout, path, pretty)
        .with_context(|| format!("failed to write layout archive {}", path.display()))?;
    layout.set_base(Some(path.to_path_buf()));

    info!(path = %path.display(), "new layout archive written");
    Ok(layout)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
