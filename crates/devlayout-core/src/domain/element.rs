//! Addressable elements ("IO") placed within a device view.
//!
//! An element is one of four closed variants.  All of them carry an optional
//! text label and a free-form screen position (`x`, `y`).  LEDs, keys and
//! matrix cells additionally address one cell of the device's LED matrix;
//! matrix cells and areas may name a functional [`RegionName`].
//!
//! Nothing is validated at construction time.  Whether matrix coordinates fit
//! inside the owning layout's declared matrix is checked on demand by
//! [`DeviceLayout::out_of_matrix_elements`](crate::DeviceLayout::out_of_matrix_elements).

use std::sync::Arc;

use crate::domain::kinds::{ComponentType, RegionName};

/// Shared handle to an element as stored in a [`DeviceView`](crate::DeviceView).
///
/// Views never mutate an element in place: an update replaces the handle, so a
/// handle received in an event is a stable snapshot.  Identity is compared with
/// [`Arc::ptr_eq`].
pub type Element = Arc<IO>;

/// A single LED in the device's physical grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Led {
    pub label: Option<String>,
    pub x: f32,
    pub y: f32,
    pub matrix_x: u32,
    pub matrix_y: u32,
}

/// A physical key, addressed by its matrix position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Key {
    pub label: Option<String>,
    pub x: f32,
    pub y: f32,
    pub matrix_x: u32,
    pub matrix_y: u32,
}

/// A matrix cell that may also belong to a named region.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatrixCell {
    pub label: Option<String>,
    pub x: f32,
    pub y: f32,
    pub matrix_x: u32,
    pub matrix_y: u32,
    pub region: Option<RegionName>,
}

/// A free-form effect zone that is not tied to the LED grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Area {
    pub label: Option<String>,
    pub x: f32,
    pub y: f32,
    pub region: Option<RegionName>,
}

/// An addressable element within a view.
#[derive(Debug, Clone, PartialEq)]
pub enum IO {
    Led(Led),
    Key(Key),
    MatrixCell(MatrixCell),
    Area(Area),
}

impl IO {
    /// Returns the component type of this element.
    pub fn component_type(&self) -> ComponentType {
        ComponentType::of(self)
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            IO::Led(e) => e.label.as_deref(),
            IO::Key(e) => e.label.as_deref(),
            IO::MatrixCell(e) => e.label.as_deref(),
            IO::Area(e) => e.label.as_deref(),
        }
    }

    pub fn set_label(&mut self, label: Option<String>) {
        match self {
            IO::Led(e) => e.label = label,
            IO::Key(e) => e.label = label,
            IO::MatrixCell(e) => e.label = label,
            IO::Area(e) => e.label = label,
        }
    }

    pub fn x(&self) -> f32 {
        self.position().0
    }

    pub fn y(&self) -> f32 {
        self.position().1
    }

    /// Returns the free-form screen position as `(x, y)`.
    pub fn position(&self) -> (f32, f32) {
        match self {
            IO::Led(e) => (e.x, e.y),
            IO::Key(e) => (e.x, e.y),
            IO::MatrixCell(e) => (e.x, e.y),
            IO::Area(e) => (e.x, e.y),
        }
    }

    /// Moves the element to a new free-form screen position.
    pub fn move_to(&mut self, x: f32, y: f32) {
        let (ex, ey) = match self {
            IO::Led(e) => (&mut e.x, &mut e.y),
            IO::Key(e) => (&mut e.x, &mut e.y),
            IO::MatrixCell(e) => (&mut e.x, &mut e.y),
            IO::Area(e) => (&mut e.x, &mut e.y),
        };
        *ex = x;
        *ey = y;
    }

    /// Returns `(matrix_x, matrix_y)`, or `None` for an [`IO::Area`].
    pub fn matrix(&self) -> Option<(u32, u32)> {
        match self {
            IO::Led(e) => Some((e.matrix_x, e.matrix_y)),
            IO::Key(e) => Some((e.matrix_x, e.matrix_y)),
            IO::MatrixCell(e) => Some((e.matrix_x, e.matrix_y)),
            IO::Area(_) => None,
        }
    }

    /// Sets the matrix coordinates.
    ///
    /// Returns `false` (and changes nothing) for an [`IO::Area`], which has no
    /// matrix address.
    pub fn set_matrix(&mut self, matrix_x: u32, matrix_y: u32) -> bool {
        let (mx, my) = match self {
            IO::Led(e) => (&mut e.matrix_x, &mut e.matrix_y),
            IO::Key(e) => (&mut e.matrix_x, &mut e.matrix_y),
            IO::MatrixCell(e) => (&mut e.matrix_x, &mut e.matrix_y),
            IO::Area(_) => return false,
        };
        *mx = matrix_x;
        *my = matrix_y;
        true
    }

    /// Returns the region of a matrix cell or area.
    pub fn region(&self) -> Option<RegionName> {
        match self {
            IO::MatrixCell(e) => e.region,
            IO::Area(e) => e.region,
            IO::Led(_) | IO::Key(_) => None,
        }
    }

    /// Sets the region.  Returns `false` for LEDs and keys, which have none.
    pub fn set_region(&mut self, region: Option<RegionName>) -> bool {
        match self {
            IO::MatrixCell(e) => e.region = region,
            IO::Area(e) => e.region = region,
            IO::Led(_) | IO::Key(_) => return false,
        }
        true
    }
}

impl From<Led> for IO {
    fn from(value: Led) -> Self {
        IO::Led(value)
    }
}

impl From<Key> for IO {
    fn from(value: Key) -> Self {
        IO::Key(value)
    }
}

impl From<MatrixCell> for IO {
    fn from(value: MatrixCell) -> Self {
        IO::MatrixCell(value)
    }
}

impl From<Area> for IO {
    fn from(value: Area) -> Self {
        IO::Area(value)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
