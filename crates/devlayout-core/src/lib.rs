//! # devlayout-core
//!
//! Device layout model for illuminated peripherals: keyboards, mice, mousemats,
//! headsets and other devices with addressable lighting.
//!
//! A layout describes what a device looks like from several sides and where
//! each lighting element sits, both on screen and in the device's LED matrix.
//!
//! # Architecture overview (for beginners)
//!
//! - **`domain`** – The live, observable object graph.  A [`DeviceLayout`]
//!   owns at most one [`DeviceView`] per [`ViewPosition`]; each view owns an
//!   ordered list of IO elements ([`IO`]: LED, key, matrix cell or area).
//!   Listeners registered on a view hear about that view; listeners on the
//!   layout hear about the layout *and* every view it contains.
//!
//! - **`archive`** – The JSON file format.  A document is parsed into plain
//!   serde structs and then converted into the object graph in one step, so a
//!   bad document never produces a half-built layout.
//!
//! All types are thread safe.  Events are always delivered outside internal
//! locks, newest listener first.

pub mod archive;
pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `devlayout_core::DeviceLayout` instead of `devlayout_core::domain::layout::DeviceLayout`.
pub use archive::codec::{decode_json, decode_layout, encode_json, encode_layout, ArchiveError};
pub use archive::document::{ElementDocument, LayoutDocument, ViewDocument};
pub use archive::store::{load_layout, save_layout, save_layout_to, save_layout_with};
pub use domain::device::{Device, DeviceDescriptor};
pub use domain::element::{Area, Element, Key, Led, MatrixCell, IO};
pub use domain::kinds::{Capability, ComponentType, DeviceType, RegionName, TagError, ViewPosition};
pub use domain::layout::{DeviceLayout, LayoutListener, LayoutMetadata};
pub use domain::view::{DeviceView, ViewAttributes, ViewListener};
