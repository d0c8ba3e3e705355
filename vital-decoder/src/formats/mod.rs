//! Vital container format readers
//!
//! This module contains the container header parser and the two frame readers
//! that split the decompressed packet stream into `(type, payload)` frames.
//! Both readers implement [`FrameSource`] and yield identical frames for the
//! same input; they differ only in how they pull bytes from the source.

use crate::types::{DecoderError, Result};
use std::io::{self, ErrorKind, Read};

pub mod buffered;
pub mod codec;
pub mod header;
pub mod simple;

// Re-export reader types
pub use buffered::BufferedFramer;
pub use header::ContainerHeader;
pub use simple::SimpleFramer;

/// Type byte plus u32 LE payload length
pub const FRAME_HEADER_LEN: usize = 5;

/// One packet sliced out of the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub packet_type: u8,
    pub payload: &'a [u8],
}

/// Common interface of the frame readers
pub trait FrameSource {
    /// Next complete frame, or `None` once the stream is exhausted
    ///
    /// A frame cut short by the end of the stream is discarded and ends the
    /// sequence without error.
    fn next_frame(&mut self) -> Result<Option<Frame<'_>>>;

    /// Number of complete frames returned so far
    fn frames_read(&self) -> u64;

    /// True once the stream ended inside a frame header or payload
    fn truncated(&self) -> bool;
}

/// Split a frame header into type and declared payload length
pub(crate) fn parse_frame_header(header: &[u8; FRAME_HEADER_LEN]) -> (u8, u32) {
    let length = u32::from_le_bytes([header[1], header[2], header[3], header[4]]);
    (header[0], length)
}

/// Reject payload lengths over the configured ceiling
pub(crate) fn check_length(index: u64, packet_type: u8, length: u32, limit: u32) -> Result<()> {
    if length > limit {
        return Err(DecoderError::OversizedPacketError {
            index,
            packet_type,
            length,
            limit,
        });
    }
    Ok(())
}

/// One read call; end of data (including an unexpected EOF from the
/// decompressor) reads as zero bytes and interrupted reads are retried
pub(crate) fn read_some<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(0),
            Err(e) => return Err(e),
        }
    }
}
