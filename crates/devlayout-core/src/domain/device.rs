//! Read-only description of a physical device.
//!
//! A layout can be seeded from a device (see
//! [`DeviceLayout::from_device`](crate::DeviceLayout::from_device)).  The core
//! only reads from the descriptor and never writes back.

use crate::domain::kinds::{Capability, DeviceType};

/// A device as seen by the layout model.
pub trait Device {
    fn name(&self) -> String;

    fn device_type(&self) -> DeviceType;

    fn capabilities(&self) -> Vec<Capability>;

    /// Matrix size as `[rows, columns]`.
    ///
    /// Only consulted when [`capabilities`](Device::capabilities) contains
    /// [`Capability::Matrix`].
    fn matrix_size(&self) -> [u32; 2];

    fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// Plain-data [`Device`] for callers that have no live device handle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceDescriptor {
    pub name: String,
    pub device_type: DeviceType,
    pub capabilities: Vec<Capability>,
    /// `[rows, columns]`; meaningful only with [`Capability::Matrix`].
    pub matrix_size: [u32; 2],
}

impl DeviceDescriptor {
    pub fn new(name: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            name: name.into(),
            device_type,
            ..Default::default()
        }
    }

    /// Declares an LED matrix of `rows` × `columns` and adds the matrix capability.
    pub fn with_matrix(mut self, rows: u32, columns: u32) -> Self {
        if !self.capabilities.contains(&Capability::Matrix) {
            self.capabilities.push(Capability::Matrix);
        }
        self.matrix_size = [rows, columns];
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }
}

impl Device for DeviceDescriptor {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn device_type(&self) -> DeviceType {
        self.device_type
    }

    fn capabilities(&self) -> Vec<Capability> {
        self.capabilities.clone()
    }

    fn matrix_size(&self) -> [u32; 2] {
        self.matrix_size
    }
}
