//! Device info packet (type 9)
//!
//! Layout: u32 device id, then length-prefixed `type_name`, `name` and an
//! optional `port`.

use crate::formats::codec;
use crate::model::DecodeModel;
use crate::types::Device;

/// A parsed device info packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: u32,
    pub device: Device,
}

impl DeviceInfo {
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let id = codec::u32_at(payload, 0)?;
        let mut pos = 4;
        if pos >= payload.len() {
            return None;
        }
        let (type_name, n) = codec::str_at(payload, pos);
        pos += n;
        if pos >= payload.len() {
            return None;
        }
        let (name, n) = codec::str_at(payload, pos);
        pos += n;
        let port = if pos < payload.len() {
            codec::str_at(payload, pos).0
        } else {
            String::new()
        };

        Some(Self {
            id,
            device: Device { name, type_name, port },
        })
    }

    /// Register the device under its name and id
    pub fn apply(self, model: &mut DecodeModel) {
        log::debug!("Device {} ({}) registered as id {}", self.device.name, self.device.type_name, self.id);
        model.insert_device(self.id, self.device);
    }
}
