//! Core types for the vital file decoder library
//!
//! This module defines the values the decoder builds while consuming a packet
//! stream: devices, tracks, their timestamped records and the tagged record
//! value. The aggregate [`DecodeModel`](crate::model::DecodeModel) owns them.

use serde::Serialize;
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that abort a decode
///
/// Malformed individual packets are never reported here: they are dropped and
/// decoding continues with the next frame.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Invalid vital file: {0}")]
    FormatError(String),

    #[error("Packet {index} (type {packet_type}) declares {length} bytes, over the {limit} byte limit")]
    OversizedPacketError {
        /// Zero-based index of the frame in the stream
        index: u64,
        /// Packet type byte from the frame header
        packet_type: u8,
        /// Declared payload length
        length: u32,
        /// Configured ceiling
        limit: u32,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A monitoring device that contributes tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// Device name, the key in the model's device map
    pub name: String,
    /// Device type name (e.g. "Intellivue")
    pub type_name: String,
    /// Connection port, empty when the packet omits it
    pub port: String,
}

/// Kind of data carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TrackKind {
    /// Sampled waveform, one array of samples per record
    Wave,
    /// One scalar per record
    Numeric,
    /// One text value per record
    String,
    /// Unrecognised kind code; records for it are never decoded
    Unknown(u8),
}

impl TrackKind {
    /// Map the on-disk kind code
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => TrackKind::Wave,
            2 => TrackKind::Numeric,
            5 => TrackKind::String,
            other => TrackKind::Unknown(other),
        }
    }

    /// On-disk kind code
    pub fn code(&self) -> u8 {
        match self {
            TrackKind::Wave => 1,
            TrackKind::Numeric => 2,
            TrackKind::String => 5,
            TrackKind::Unknown(code) => *code,
        }
    }

    /// Upper-case name used by tooling ("WAVE", "NUMERIC", ...)
    pub fn name(&self) -> &'static str {
        match self {
            TrackKind::Wave => "WAVE",
            TrackKind::Numeric => "NUMERIC",
            TrackKind::String => "STRING",
            TrackKind::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric encoding of a track's samples or values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SampleFormat {
    F32,
    F64,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    /// Code outside 1..=8
    Unknown(u8),
}

impl SampleFormat {
    /// Map the on-disk format code (1..=8)
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => SampleFormat::F32,
            2 => SampleFormat::F64,
            3 => SampleFormat::I8,
            4 => SampleFormat::U8,
            5 => SampleFormat::I16,
            6 => SampleFormat::U16,
            7 => SampleFormat::I32,
            8 => SampleFormat::U32,
            other => SampleFormat::Unknown(other),
        }
    }

    /// On-disk format code
    pub fn code(&self) -> u8 {
        match self {
            SampleFormat::F32 => 1,
            SampleFormat::F64 => 2,
            SampleFormat::I8 => 3,
            SampleFormat::U8 => 4,
            SampleFormat::I16 => 5,
            SampleFormat::U16 => 6,
            SampleFormat::I32 => 7,
            SampleFormat::U32 => 8,
            SampleFormat::Unknown(code) => *code,
        }
    }

    /// Width in bytes of one value, `None` for unknown codes
    pub fn width(&self) -> Option<usize> {
        match self {
            SampleFormat::I8 | SampleFormat::U8 => Some(1),
            SampleFormat::I16 | SampleFormat::U16 => Some(2),
            SampleFormat::F32 | SampleFormat::I32 | SampleFormat::U32 => Some(4),
            SampleFormat::F64 => Some(8),
            SampleFormat::Unknown(_) => None,
        }
    }
}

/// A device's data channel and its records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    /// "{device}/{name}" when the device resolved, else the bare name
    pub full_name: String,
    pub kind: TrackKind,
    pub sample_format: SampleFormat,
    /// Engineering unit (e.g. "mmHg", "bpm")
    pub unit: String,
    /// Samples per second for wave tracks, 0 when not applicable
    pub sample_rate: f32,
    pub gain: f64,
    pub offset: f64,
    pub display_min: f32,
    pub display_max: f32,
    /// Display colour as packed ARGB
    pub color: u32,
    pub monitor_type: u8,
    /// Owning device name, empty when unresolved
    pub device_name: String,
    /// Records in stream order
    pub records: Vec<Record>,
}

impl Track {
    /// Upper-case kind name
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Total number of values across all records
    pub fn sample_count(&self) -> usize {
        self.records.iter().map(|r| r.value.len()).sum()
    }

    /// Apply this track's calibration to a numeric value
    ///
    /// Numeric records are stored raw; wave records are already calibrated.
    pub fn physical(&self, value: &Scalar) -> f64 {
        value.as_f64() * self.gain + self.offset
    }
}

/// One timestamped value of a track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    pub value: RecordValue,
}

/// Value held by a record; which variant appears follows the track's kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordValue {
    /// Numeric track, in the track's native width
    Scalar(Scalar),
    /// Wave track
    Samples(Samples),
    /// String track
    Text(String),
}

impl RecordValue {
    /// Number of values held (samples for waves, 1 otherwise)
    pub fn len(&self) -> usize {
        match self {
            RecordValue::Samples(samples) => samples.len(),
            RecordValue::Scalar(_) | RecordValue::Text(_) => 1,
        }
    }

    /// True only for an empty sample array
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            RecordValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_samples(&self) -> Option<&Samples> {
        match self {
            RecordValue::Samples(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RecordValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Scalar(v) => write!(f, "{}", v),
            RecordValue::Samples(v) => write!(f, "{}", v),
            RecordValue::Text(v) => f.write_str(v),
        }
    }
}

/// A single numeric value in its native width
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    F32(f32),
    F64(f64),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
}

impl Scalar {
    /// Widen to f64
    pub fn as_f64(&self) -> f64 {
        match *self {
            Scalar::F32(v) => f64::from(v),
            Scalar::F64(v) => v,
            Scalar::I8(v) => f64::from(v),
            Scalar::U8(v) => f64::from(v),
            Scalar::I16(v) => f64::from(v),
            Scalar::U16(v) => f64::from(v),
            Scalar::I32(v) => f64::from(v),
            Scalar::U32(v) => f64::from(v),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::F32(v) => write!(f, "{}", v),
            Scalar::F64(v) => write!(f, "{}", v),
            Scalar::I8(v) => write!(f, "{}", v),
            Scalar::U8(v) => write!(f, "{}", v),
            Scalar::I16(v) => write!(f, "{}", v),
            Scalar::U16(v) => write!(f, "{}", v),
            Scalar::I32(v) => write!(f, "{}", v),
            Scalar::U32(v) => write!(f, "{}", v),
        }
    }
}

/// Wave samples; integer formats are calibrated to f32 at decode time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Samples {
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::F32(v) => v.len(),
            Samples::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample at `index` widened to f64
    pub fn get(&self, index: usize) -> Option<f64> {
        match self {
            Samples::F32(v) => v.get(index).map(|s| f64::from(*s)),
            Samples::F64(v) => v.get(index).copied(),
        }
    }
}

impl fmt::Display for Samples {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for i in 0..self.len() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if let Some(v) = self.get(i) {
                write!(f, "{}", v)?;
            }
        }
        f.write_str("]")
    }
}
