//! Vital File Decoder Library
//!
//! A reusable library for decoding gzip-compressed vital recordings: multi-channel
//! physiological monitor data stored as a stream of typed packets.
//!
//! # Architecture
//!
//! Decoding is a single forward pass:
//! - The container header supplies the GMT offset and initial time bounds
//! - A frame reader splits the decompressed stream into `(type, payload)` frames
//! - Packet decoders register devices and tracks and append records
//! - Two id tables link records and tracks to packets seen earlier
//!
//! Malformed packets are dropped one at a time and a truncated final packet
//! ends the decode cleanly. Only a bad magic, an I/O failure or a packet
//! length over the configured ceiling abort a decode.
//!
//! The library does NOT:
//! - Write or re-encode vital files
//! - Serialise to tabular or columnar formats
//! - Filter tracks by pattern
//!
//! # Example Usage
//!
//! ```no_run
//! use vital_decoder::{Decoder, DecoderConfig, ReaderKind, RecordValue};
//! use std::path::Path;
//!
//! let decoder = Decoder::with_config(DecoderConfig::new().with_reader(ReaderKind::Buffered));
//! let model = decoder.decode_file(Path::new("case1.vital")).unwrap();
//!
//! for track in model.tracks() {
//!     for record in &track.records {
//!         match &record.value {
//!             RecordValue::Scalar(v) => println!("{} @ {}: {}", track.full_name, record.timestamp, v),
//!             RecordValue::Samples(s) => println!("{} @ {}: {} samples", track.full_name, record.timestamp, s.len()),
//!             RecordValue::Text(t) => println!("{} @ {}: {}", track.full_name, record.timestamp, t),
//!         }
//!     }
//! }
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod formats;
pub mod model;
pub mod packets;
pub mod parity;
pub mod types;

// Re-export main types for convenience
pub use config::{DecoderConfig, ReaderKind};
pub use decoder::{decode_file, DecodeStats, Decoder};
pub use model::DecodeModel;
pub use parity::ParityReport;
pub use types::{
    DecoderError, Device, Record, RecordValue, Result, SampleFormat, Samples, Scalar, Track,
    TrackKind,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty decoder carries the default configuration
        let decoder = Decoder::new();
        assert_eq!(decoder.config(), &DecoderConfig::default());
        assert!(!VERSION.is_empty());
    }
}
