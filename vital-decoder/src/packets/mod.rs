//! Packet decoders
//!
//! Each recognised packet type has a decoder that parses its payload and, on
//! success, applies it to the [`DecodeModel`]. A payload that is too short or
//! inconsistent is dropped without touching the model. Unknown packet types
//! are passed over so newer files still decode.

use crate::model::DecodeModel;

pub mod cmd;
pub mod devinfo;
pub mod rec;
pub mod trkinfo;

pub use cmd::TrackOrder;
pub use devinfo::DeviceInfo;
pub use trkinfo::TrackInfo;

/// Packet types the decoder understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    TrackInfo,
    Record,
    Command,
    DeviceInfo,
}

impl PacketType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(PacketType::TrackInfo),
            1 => Some(PacketType::Record),
            6 => Some(PacketType::Command),
            9 => Some(PacketType::DeviceInfo),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            PacketType::TrackInfo => 0,
            PacketType::Record => 1,
            PacketType::Command => 6,
            PacketType::DeviceInfo => 9,
        }
    }
}

/// What happened to one packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketOutcome {
    /// The model was updated
    Applied,
    /// Recognised but malformed or unresolvable; the model is unchanged
    Dropped(&'static str),
    /// Unknown packet type or command code
    Ignored,
}

/// Route one frame to its decoder
pub fn dispatch(packet_type: u8, payload: &[u8], model: &mut DecodeModel) -> PacketOutcome {
    let Some(kind) = PacketType::from_byte(packet_type) else {
        return PacketOutcome::Ignored;
    };
    let outcome = match kind {
        PacketType::DeviceInfo => match DeviceInfo::parse(payload) {
            Some(info) => {
                info.apply(model);
                PacketOutcome::Applied
            }
            None => PacketOutcome::Dropped("malformed device info"),
        },
        PacketType::TrackInfo => match TrackInfo::parse(payload) {
            Some(info) => {
                info.apply(model);
                PacketOutcome::Applied
            }
            None => PacketOutcome::Dropped("malformed track info"),
        },
        PacketType::Record => rec::decode(payload, model),
        PacketType::Command => cmd::decode(payload, model),
    };
    if let PacketOutcome::Dropped(reason) = outcome {
        log::trace!("Dropped {:?} packet ({} bytes): {}", kind, payload.len(), reason);
    }
    outcome
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_packet_type_bytes() {
        for byte in [0u8, 1, 6, 9] {
            assert_eq!(PacketType::from_byte(byte).unwrap().as_byte(), byte);
        }
        assert_eq!(PacketType::from_byte(2), None);
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        let mut model = DecodeModel::default();
        assert_eq!(dispatch(42, b"anything", &mut model), PacketOutcome::Ignored);
        assert_eq!(model, DecodeModel::default());
    }

    #[test]
    fn test_dispatch_routes_by_type() {
        let mut model = DecodeModel::default();
        let outcome = dispatch(9, &devinfo(1, "MONITOR", "BedA", Some("COM1")), &mut model);
        assert_eq!(outcome, PacketOutcome::Applied);
        assert!(model.device("BedA").is_some());

        let outcome = dispatch(0, &[0u8; 10], &mut model);
        assert!(matches!(outcome, PacketOutcome::Dropped(_)));
        assert_eq!(model.track_count(), 0);
    }
}
