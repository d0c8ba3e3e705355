//! Record packet (type 1)
//!
//! A 12 byte prefix (u16 info length, f64 timestamp, u16 track id) followed by
//! a body whose layout depends on the owning track's kind:
//!
//! - wave: u32 sample count, then that many samples in the track's format
//! - numeric: one value in the track's format (f64 for unknown formats)
//! - string: 4 reserved bytes, u32 length, raw text
//!
//! Integer wave samples are calibrated with the track's gain and offset and
//! stored as f32. Float waves and all numeric values keep their native width.

use crate::formats::codec;
use crate::model::DecodeModel;
use crate::packets::PacketOutcome;
use crate::types::{Record, RecordValue, SampleFormat, Samples, Scalar, Track, TrackKind};
use byteorder::{ByteOrder, LittleEndian};

/// Length of the fixed record prefix
pub const RECORD_PREFIX_LEN: usize = 12;

/// Decode a record packet into its owning track
pub fn decode(payload: &[u8], model: &mut DecodeModel) -> PacketOutcome {
    if payload.len() < RECORD_PREFIX_LEN {
        return PacketOutcome::Dropped("record shorter than its prefix");
    }
    let (Some(info_len), Some(dt), Some(track_id)) = (
        codec::u16_at(payload, 0),
        codec::f64_at(payload, 2),
        codec::u16_at(payload, 10),
    ) else {
        return PacketOutcome::Dropped("record shorter than its prefix");
    };
    if info_len as usize > payload.len() {
        return PacketOutcome::Dropped("info length exceeds payload");
    }

    model.observe_time(dt);

    let Some(track) = model.track_by_id_mut(track_id) else {
        return PacketOutcome::Dropped("unknown track id");
    };
    let Some((value, wave_end)) = decode_body(payload, RECORD_PREFIX_LEN, dt, track) else {
        return PacketOutcome::Dropped("record body does not fit track format");
    };
    track.records.push(Record { timestamp: dt, value });

    if let Some(end) = wave_end {
        model.extend_end(end);
    }
    PacketOutcome::Applied
}

/// Decode the body for `track`; also returns where a wave record ends in time
fn decode_body(payload: &[u8], pos: usize, dt: f64, track: &Track) -> Option<(RecordValue, Option<f64>)> {
    match track.kind {
        TrackKind::Wave => {
            let (samples, count) = decode_wave(payload, pos, track.sample_format, track.gain, track.offset)?;
            let end = (track.sample_rate > 0.0).then(|| dt + f64::from(count) / f64::from(track.sample_rate));
            Some((RecordValue::Samples(samples), end))
        }
        TrackKind::Numeric => {
            let value = decode_numeric(payload, pos, track.sample_format)?;
            Some((RecordValue::Scalar(value), None))
        }
        TrackKind::String => {
            let text = decode_text(payload, pos)?;
            Some((RecordValue::Text(text), None))
        }
        TrackKind::Unknown(_) => None,
    }
}

fn calibrate(raw: f32, gain: f64, offset: f64) -> f32 {
    (f64::from(raw) * gain + offset) as f32
}

/// Wave samples plus the declared sample count
pub fn decode_wave(
    payload: &[u8],
    pos: usize,
    format: SampleFormat,
    gain: f64,
    offset: f64,
) -> Option<(Samples, u32)> {
    let count = codec::u32_at(payload, pos)?;
    let width = format.width()?;
    let total = (count as usize).checked_mul(width)?;
    let raw = codec::bytes_at(payload, pos + 4, total)?;
    let chunks = raw.chunks_exact(width);

    let samples = match format {
        SampleFormat::F32 => Samples::F32(chunks.map(LittleEndian::read_f32).collect()),
        SampleFormat::F64 => Samples::F64(chunks.map(LittleEndian::read_f64).collect()),
        SampleFormat::I8 => Samples::F32(chunks.map(|c| calibrate(f32::from(c[0] as i8), gain, offset)).collect()),
        SampleFormat::U8 => Samples::F32(chunks.map(|c| calibrate(f32::from(c[0]), gain, offset)).collect()),
        SampleFormat::I16 => Samples::F32(
            chunks
                .map(|c| calibrate(f32::from(LittleEndian::read_i16(c)), gain, offset))
                .collect(),
        ),
        SampleFormat::U16 => Samples::F32(
            chunks
                .map(|c| calibrate(f32::from(LittleEndian::read_u16(c)), gain, offset))
                .collect(),
        ),
        SampleFormat::I32 => Samples::F32(
            chunks
                .map(|c| calibrate(LittleEndian::read_i32(c) as f32, gain, offset))
                .collect(),
        ),
        SampleFormat::U32 => Samples::F32(
            chunks
                .map(|c| calibrate(LittleEndian::read_u32(c) as f32, gain, offset))
                .collect(),
        ),
        SampleFormat::Unknown(_) => return None,
    };
    Some((samples, count))
}

/// One numeric value in its native width
pub fn decode_numeric(payload: &[u8], pos: usize, format: SampleFormat) -> Option<Scalar> {
    Some(match format {
        SampleFormat::F32 => Scalar::F32(codec::f32_at(payload, pos)?),
        SampleFormat::F64 => Scalar::F64(codec::f64_at(payload, pos)?),
        SampleFormat::I8 => Scalar::I8(codec::i8_at(payload, pos)?),
        SampleFormat::U8 => Scalar::U8(codec::u8_at(payload, pos)?),
        SampleFormat::I16 => Scalar::I16(codec::i16_at(payload, pos)?),
        SampleFormat::U16 => Scalar::U16(codec::u16_at(payload, pos)?),
        SampleFormat::I32 => Scalar::I32(codec::i32_at(payload, pos)?),
        SampleFormat::U32 => Scalar::U32(codec::u32_at(payload, pos)?),
        SampleFormat::Unknown(_) => Scalar::F64(codec::f64_at(payload, pos)?),
    })
}

/// Text after the reserved word and length prefix
pub fn decode_text(payload: &[u8], pos: usize) -> Option<String> {
    let len = codec::u32_at(payload, pos + 4)? as usize;
    let raw = codec::bytes_at(payload, pos + 8, len)?;
    Some(String::from_utf8_lossy(raw).into_owned())
}
