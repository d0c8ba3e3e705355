//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! [`Decoder`] opens a gzip-compressed vital file, reads the container header
//! and feeds every frame to the packet decoders until the stream ends.

use crate::config::{DecoderConfig, ReaderKind, DEFAULT_BUFFER_CAPACITY};
use crate::formats::{BufferedFramer, ContainerHeader, FrameSource, SimpleFramer};
use crate::model::DecodeModel;
use crate::packets::{self, PacketOutcome};
use crate::types::Result;
use flate2::read::MultiGzDecoder;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Counters collected during one decode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    /// Complete frames read
    pub packets: u64,
    /// Frames of an unknown type, plus unhandled command codes
    pub skipped_unknown: u64,
    /// Recognised packets discarded as malformed or unresolvable
    pub dropped: u64,
    /// The stream ended inside a frame
    pub truncated: bool,
}

/// The main decoder struct - entry point for all decoding operations
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a decoder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with the given configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a gzip-compressed vital file
    ///
    /// # Example
    /// ```no_run
    /// use vital_decoder::Decoder;
    /// use std::path::Path;
    ///
    /// let model = Decoder::new().decode_file(Path::new("case1.vital")).unwrap();
    /// for track in model.tracks() {
    ///     println!("{}: {} records", track.full_name, track.records.len());
    /// }
    /// ```
    pub fn decode_file(&self, path: &Path) -> Result<DecodeModel> {
        self.decode_file_with_stats(path).map(|(model, _)| model)
    }

    /// Decode a file and report decode counters
    pub fn decode_file_with_stats(&self, path: &Path) -> Result<(DecodeModel, DecodeStats)> {
        log::info!("Decoding vital file: {:?}", path);

        let file = File::open(path)?;
        let file_size = file.metadata().ok().map(|m| m.len());
        let capacity = self.config.capacity_for_file_size(file_size);

        let reader = MultiGzDecoder::new(BufReader::new(file));
        self.decode_stream_inner(reader, capacity)
    }

    /// Decode gzip-compressed bytes from any reader
    pub fn decode_gzip<R: Read>(&self, reader: R) -> Result<DecodeModel> {
        let capacity = self.config.buffer_capacity.unwrap_or(DEFAULT_BUFFER_CAPACITY);
        self.decode_stream_inner(MultiGzDecoder::new(reader), capacity)
            .map(|(model, _)| model)
    }

    /// Decode an already decompressed vital stream
    pub fn decode_stream<R: Read>(&self, reader: R) -> Result<DecodeModel> {
        self.decode_stream_with_stats(reader).map(|(model, _)| model)
    }

    /// Decode an already decompressed stream and report decode counters
    pub fn decode_stream_with_stats<R: Read>(&self, reader: R) -> Result<(DecodeModel, DecodeStats)> {
        let capacity = self.config.buffer_capacity.unwrap_or(DEFAULT_BUFFER_CAPACITY);
        self.decode_stream_inner(reader, capacity)
    }

    fn decode_stream_inner<R: Read>(&self, mut reader: R, capacity: usize) -> Result<(DecodeModel, DecodeStats)> {
        let header = ContainerHeader::read(&mut reader)?;
        let model = DecodeModel::from_header(&header);
        let limit = self.config.max_packet_len;

        match self.config.reader {
            ReaderKind::Simple => {
                log::debug!("Using read-exact frame reader");
                run(SimpleFramer::new(reader, limit), model)
            }
            ReaderKind::Buffered => {
                log::debug!("Using buffered frame reader ({} byte buffer)", capacity);
                run(BufferedFramer::new(reader, capacity, self.config.read_chunk, limit), model)
            }
        }
    }
}

/// Decode a file with the default configuration
pub fn decode_file(path: &Path) -> Result<DecodeModel> {
    Decoder::new().decode_file(path)
}

/// Drain a frame source into the model
pub(crate) fn run<F: FrameSource>(mut frames: F, mut model: DecodeModel) -> Result<(DecodeModel, DecodeStats)> {
    let mut stats = DecodeStats::default();
    let mut unknown_types = HashSet::new();

    while let Some(frame) = frames.next_frame()? {
        match packets::dispatch(frame.packet_type, frame.payload, &mut model) {
            PacketOutcome::Applied => {}
            PacketOutcome::Dropped(_) => stats.dropped += 1,
            PacketOutcome::Ignored => {
                stats.skipped_unknown += 1;
                if packets::PacketType::from_byte(frame.packet_type).is_none()
                    && unknown_types.insert(frame.packet_type)
                {
                    log::warn!("Skipping unknown packet type {} ({} bytes)", frame.packet_type, frame.payload.len());
                }
            }
        }
    }

    stats.packets = frames.frames_read();
    stats.truncated = frames.truncated();
    if stats.truncated {
        log::warn!("Stream ended inside a packet after {} complete packets", stats.packets);
    }

    log::info!(
        "Decoded {} packets: {} devices, {} tracks ({} dropped, {} skipped)",
        stats.packets,
        model.device_count(),
        model.track_count(),
        stats.dropped,
        stats.skipped_unknown
    );
    Ok((model, stats))
}
