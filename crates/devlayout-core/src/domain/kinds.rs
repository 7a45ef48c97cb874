//! Closed enumerations used throughout the layout model.
//!
//! Every enum here has a stable textual tag (the SCREAMING_SNAKE_CASE variant
//! name) that is used verbatim in the archive format.  Tags are parsed with
//! [`FromStr`] and rendered with [`Display`] / `tag()`.
//!
//! An unknown tag is always a [`TagError`]; there is no "other" fallback
//! variant except [`DeviceType::Unrecognised`], which is a real device class
//! and not a parse fallback.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::element::IO;

/// A textual tag did not name any variant of the target enumeration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} tag: {tag:?}")]
pub struct TagError {
    /// Name of the enumeration the tag was parsed against (e.g. `"ViewPosition"`).
    pub kind: &'static str,
    /// The offending tag.
    pub tag: String,
}

impl TagError {
    fn new(kind: &'static str, tag: &str) -> Self {
        Self {
            kind,
            tag: tag.to_string(),
        }
    }
}

// ── ViewPosition ──────────────────────────────────────────────────────────────

/// Named slot a [`DeviceView`](crate::DeviceView) may occupy within a layout.
///
/// A layout holds at most one view per position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewPosition {
    Top,
    Bottom,
    Front,
    Back,
    Left,
    Right,
    SideLeft,
    SideRight,
}

impl ViewPosition {
    /// Every position, in declaration order.
    pub const ALL: [ViewPosition; 8] = [
        ViewPosition::Top,
        ViewPosition::Bottom,
        ViewPosition::Front,
        ViewPosition::Back,
        ViewPosition::Left,
        ViewPosition::Right,
        ViewPosition::SideLeft,
        ViewPosition::SideRight,
    ];

    /// Returns the archive tag for this position.
    pub fn tag(self) -> &'static str {
        match self {
            ViewPosition::Top => "TOP",
            ViewPosition::Bottom => "BOTTOM",
            ViewPosition::Front => "FRONT",
            ViewPosition::Back => "BACK",
            ViewPosition::Left => "LEFT",
            ViewPosition::Right => "RIGHT",
            ViewPosition::SideLeft => "SIDE_LEFT",
            ViewPosition::SideRight => "SIDE_RIGHT",
        }
    }
}

impl FromStr for ViewPosition {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TOP" => Ok(ViewPosition::Top),
            "BOTTOM" => Ok(ViewPosition::Bottom),
            "FRONT" => Ok(ViewPosition::Front),
            "BACK" => Ok(ViewPosition::Back),
            "LEFT" => Ok(ViewPosition::Left),
            "RIGHT" => Ok(ViewPosition::Right),
            "SIDE_LEFT" => Ok(ViewPosition::SideLeft),
            "SIDE_RIGHT" => Ok(ViewPosition::SideRight),
            other => Err(TagError::new("ViewPosition", other)),
        }
    }
}

impl fmt::Display for ViewPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ── ComponentType ─────────────────────────────────────────────────────────────

/// The kind of an addressable element.
///
/// There is exactly one component type per [`IO`] variant, and
/// [`ComponentType::of`] / [`ComponentType::create`] map between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Led,
    Key,
    MatrixCell,
    Area,
}

impl ComponentType {
    /// Every component type, in declaration order.
    pub const ALL: [ComponentType; 4] = [
        ComponentType::Led,
        ComponentType::Key,
        ComponentType::MatrixCell,
        ComponentType::Area,
    ];

    /// Returns the component type of an element.
    pub fn of(element: &IO) -> ComponentType {
        match element {
            IO::Led(_) => ComponentType::Led,
            IO::Key(_) => ComponentType::Key,
            IO::MatrixCell(_) => ComponentType::MatrixCell,
            IO::Area(_) => ComponentType::Area,
        }
    }

    /// Creates a blank element of this type (no label, origin position,
    /// matrix cell 0,0, no region).
    pub fn create(self) -> IO {
        match self {
            ComponentType::Led => IO::Led(Default::default()),
            ComponentType::Key => IO::Key(Default::default()),
            ComponentType::MatrixCell => IO::MatrixCell(Default::default()),
            ComponentType::Area => IO::Area(Default::default()),
        }
    }

    /// Returns `true` if elements of this type carry matrix coordinates.
    pub fn has_matrix(self) -> bool {
        !matches!(self, ComponentType::Area)
    }

    /// Returns `true` if elements of this type carry an optional region.
    pub fn has_region(self) -> bool {
        matches!(self, ComponentType::MatrixCell | ComponentType::Area)
    }

    /// Returns the archive tag for this component type.
    pub fn tag(self) -> &'static str {
        match self {
            ComponentType::Led => "LED",
            ComponentType::Key => "KEY",
            ComponentType::MatrixCell => "MATRIX_CELL",
            ComponentType::Area => "AREA",
        }
    }
}

impl FromStr for ComponentType {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LED" => Ok(ComponentType::Led),
            "KEY" => Ok(ComponentType::Key),
            "MATRIX_CELL" => Ok(ComponentType::MatrixCell),
            "AREA" => Ok(ComponentType::Area),
            other => Err(TagError::new("ComponentType", other)),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ── DeviceType ────────────────────────────────────────────────────────────────

/// Broad class of peripheral a layout describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceType {
    Accessory,
    Core,
    Headset,
    Keyboard,
    Keypad,
    Mouse,
    Mousemat,
    #[default]
    Unrecognised,
}

impl DeviceType {
    /// Returns the archive tag for this device type.
    pub fn tag(self) -> &'static str {
        match self {
            DeviceType::Accessory => "ACCESSORY",
            DeviceType::Core => "CORE",
            DeviceType::Headset => "HEADSET",
            DeviceType::Keyboard => "KEYBOARD",
            DeviceType::Keypad => "KEYPAD",
            DeviceType::Mouse => "MOUSE",
            DeviceType::Mousemat => "MOUSEMAT",
            DeviceType::Unrecognised => "UNRECOGNISED",
        }
    }
}

impl FromStr for DeviceType {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCESSORY" => Ok(DeviceType::Accessory),
            "CORE" => Ok(DeviceType::Core),
            "HEADSET" => Ok(DeviceType::Headset),
            "KEYBOARD" => Ok(DeviceType::Keyboard),
            "KEYPAD" => Ok(DeviceType::Keypad),
            "MOUSE" => Ok(DeviceType::Mouse),
            "MOUSEMAT" => Ok(DeviceType::Mousemat),
            "UNRECOGNISED" => Ok(DeviceType::Unrecognised),
            other => Err(TagError::new("DeviceType", other)),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ── RegionName ────────────────────────────────────────────────────────────────

/// Named functional lighting zone on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionName {
    Backlight,
    Chroma,
    Logo,
    Scroll,
    Left,
    Right,
}

impl RegionName {
    /// Returns the archive tag for this region.
    pub fn tag(self) -> &'static str {
        match self {
            RegionName::Backlight => "BACKLIGHT",
            RegionName::Chroma => "CHROMA",
            RegionName::Logo => "LOGO",
            RegionName::Scroll => "SCROLL",
            RegionName::Left => "LEFT",
            RegionName::Right => "RIGHT",
        }
    }
}

impl FromStr for RegionName {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BACKLIGHT" => Ok(RegionName::Backlight),
            "CHROMA" => Ok(RegionName::Chroma),
            "LOGO" => Ok(RegionName::Logo),
            "SCROLL" => Ok(RegionName::Scroll),
            "LEFT" => Ok(RegionName::Left),
            "RIGHT" => Ok(RegionName::Right),
            other => Err(TagError::new("RegionName", other)),
        }
    }
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ── Capability ────────────────────────────────────────────────────────────────

/// A declared feature of a physical device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Battery,
    Brightness,
    Dpi,
    Effects,
    Macros,
    /// The device exposes an addressable LED matrix.
    Matrix,
    PollRate,
}

impl Capability {
    /// Returns the textual tag for this capability.
    pub fn tag(self) -> &'static str {
        match self {
            Capability::Battery => "BATTERY",
            Capability::Brightness => "BRIGHTNESS",
            Capability::Dpi => "DPI",
            Capability::Effects => "EFFECTS",
            Capability::Macros => "MACROS",
            Capability::Matrix => "MATRIX",
            Capability::PollRate => "POLL_RATE",
        }
    }
}

impl FromStr for Capability {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BATTERY" => Ok(Capability::Battery),
            "BRIGHTNESS" => Ok(Capability::Brightness),
            "DPI" => Ok(Capability::Dpi),
            "EFFECTS" => Ok(Capability::Effects),
            "MACROS" => Ok(Capability::Macros),
            "MATRIX" => Ok(Capability::Matrix),
            "POLL_RATE" => Ok(Capability::PollRate),
            other => Err(TagError::new("Capability", other)),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
