//! Track info packet (type 0)
//!
//! Layout, at least 51 bytes:
//!
//! | Field          | Width |
//! |----------------|-------|
//! | track id       | u16   |
//! | kind           | u8    |
//! | sample format  | u8    |
//! | name           | str   |
//! | unit           | str   |
//! | display min    | f32   |
//! | display max    | f32   |
//! | colour         | u32   |
//! | sample rate    | f32   |
//! | gain           | f64   |
//! | offset         | f64   |
//! | monitor type   | u8    |
//! | device id      | u32   |

use crate::formats::codec;
use crate::model::DecodeModel;
use crate::types::{SampleFormat, Track, TrackKind};

/// Payloads shorter than this are dropped outright
pub const MIN_TRACK_INFO_LEN: usize = 51;

/// A parsed track info packet, before its device id is resolved
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub id: u16,
    pub device_id: u32,
    pub name: String,
    pub kind: TrackKind,
    pub sample_format: SampleFormat,
    pub unit: String,
    pub display_min: f32,
    pub display_max: f32,
    pub color: u32,
    pub sample_rate: f32,
    pub gain: f64,
    pub offset: f64,
    pub monitor_type: u8,
}

impl TrackInfo {
    pub fn parse(payload: &[u8]) -> Option<Self> {
        if payload.len() < MIN_TRACK_INFO_LEN {
            return None;
        }
        let id = codec::u16_at(payload, 0)?;
        let kind = TrackKind::from_code(codec::u8_at(payload, 2)?);
        let sample_format = SampleFormat::from_code(codec::u8_at(payload, 3)?);

        let mut pos = 4;
        let (name, n) = codec::str_at(payload, pos);
        pos += n;
        if pos >= payload.len() {
            return None;
        }
        let (unit, n) = codec::str_at(payload, pos);
        pos += n;

        let display_min = codec::f32_at(payload, pos)?;
        let display_max = codec::f32_at(payload, pos + 4)?;
        let color = codec::u32_at(payload, pos + 8)?;
        let sample_rate = codec::f32_at(payload, pos + 12)?;
        let gain = codec::f64_at(payload, pos + 16)?;
        let offset = codec::f64_at(payload, pos + 24)?;
        let monitor_type = codec::u8_at(payload, pos + 32)?;
        let device_id = codec::u32_at(payload, pos + 33)?;

        Some(Self {
            id,
            device_id,
            name,
            kind,
            sample_format,
            unit,
            display_min,
            display_max,
            color,
            sample_rate,
            gain,
            offset,
            monitor_type,
        })
    }

    /// Resolve the device and register the track
    pub fn apply(self, model: &mut DecodeModel) {
        let device_name = model
            .device_name_for_id(self.device_id)
            .map(str::to_owned)
            .unwrap_or_default();
        let full_name = if device_name.is_empty() {
            self.name
        } else {
            format!("{}/{}", device_name, self.name)
        };
        log::debug!("Track {} registered as id {} ({})", full_name, self.id, self.kind);

        model.insert_track(
            self.id,
            Track {
                full_name,
                kind: self.kind,
                sample_format: self.sample_format,
                unit: self.unit,
                sample_rate: self.sample_rate,
                gain: self.gain,
                offset: self.offset,
                display_min: self.display_min,
                display_max: self.display_max,
                color: self.color,
                monitor_type: self.monitor_type,
                device_name,
                records: Vec::new(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::test_support::{devinfo, trkinfo, TrackDef};
    use crate::packets::DeviceInfo;

    fn hr(did: u32) -> TrackDef<'static> {
        TrackDef {
            tid: 3,
            kind: 2,
            fmt: 2,
            name: "HR",
            unit: "bpm",
            srate: 0.0,
            gain: 1.0,
            offset: 0.0,
            did,
        }
    }

    #[test]
    fn test_parse_fields() {
        let info = TrackInfo::parse(&trkinfo(&hr(4))).unwrap();
        assert_eq!(info.id, 3);
        assert_eq!(info.device_id, 4);
        assert_eq!(info.kind, TrackKind::Numeric);
        assert_eq!(info.sample_format, SampleFormat::F64);
        assert_eq!(info.name, "HR");
        assert_eq!(info.unit, "bpm");
        assert_eq!(info.display_max, 100.0);
        assert_eq!(info.color, 0xff00ff00);
        assert_eq!(info.gain, 1.0);
    }

    #[test]
    fn test_resolves_device_name() {
        let mut model = DecodeModel::default();
        DeviceInfo::parse(&devinfo(4, "MONITOR", "BedA", None)).unwrap().apply(&mut model);
        TrackInfo::parse(&trkinfo(&hr(4))).unwrap().apply(&mut model);

        let track = model.track("BedA/HR").unwrap();
        assert_eq!(track.device_name, "BedA");
        assert_eq!(model.track_name_for_id(3), Some("BedA/HR"));
        assert_eq!(model.order(), ["BedA/HR".to_string()]);
    }

    #[test]
    fn test_unresolved_device_uses_bare_name() {
        let mut model = DecodeModel::default();
        TrackInfo::parse(&trkinfo(&hr(99))).unwrap().apply(&mut model);
        let track = model.track("HR").unwrap();
        assert_eq!(track.device_name, "");
    }

    #[test]
    fn test_short_payload_is_dropped() {
        let bytes = trkinfo(&hr(1));
        assert!(TrackInfo::parse(&bytes[..50]).is_none());
    }

    #[test]
    fn test_fields_past_end_are_dropped() {
        // Long name pushes the fixed block past the payload end
        let long = "X".repeat(40);
        let def = TrackDef { name: &long, ..hr(1) };
        let bytes = trkinfo(&def);
        assert!(TrackInfo::parse(&bytes[..bytes.len() - 2]).is_none());
    }
}
