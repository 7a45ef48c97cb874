//! Domain layer: the in-memory layout model.
//!
//! # Object graph (for beginners)
//!
//! ```text
//! DeviceLayout ──owns──► DeviceView (one per ViewPosition) ──owns──► Element (Arc<IO>)
//!      ▲                        │
//!      └──── weak back-ref ─────┘
//! ```
//!
//! Views and layouts are shared as `Arc`s and guard their state with a mutex,
//! so they can be used from any thread.  Every mutation fires events to the
//! registered listeners *after* the internal lock is released.  A view that
//! belongs to a layout forwards its own events to the layout's listeners.

pub mod device;
pub mod element;
pub mod kinds;
pub mod layout;
pub(crate) mod listeners;
pub mod view;
