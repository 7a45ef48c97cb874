//! JSON layout archive.
//!
//! - `document` – serde schema of the archive file
//! - `codec`    – conversion between documents and live layouts
//! - `store`    – file helpers built on the codec

pub mod codec;
pub mod document;
pub mod store;
