//! Container header parsing
//!
//! The decompressed stream opens with a fixed preamble:
//!
//! | Offset | Field         | Width      |
//! |--------|---------------|------------|
//! | 0      | magic `VITA`  | 4 bytes    |
//! | 4      | version       | u32 LE     |
//! | 8      | header length | u16 LE     |
//! | 10     | header bytes  | `L` bytes  |
//!
//! Inside the header block only three fields are read; a short block leaves
//! the missing ones at zero.

use crate::formats::codec;
use crate::types::{DecoderError, Result};
use std::io::{ErrorKind, Read};

/// Magic bytes at the start of every decompressed vital stream
pub const MAGIC: &[u8; 4] = b"VITA";

/// Values taken from the container header
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContainerHeader {
    /// Format version, carried but not interpreted
    pub version: u32,
    /// Offset from GMT in minutes
    pub gmt_offset: i16,
    /// Recording start, seconds since the Unix epoch
    pub time_start: f64,
    /// Recording end, seconds since the Unix epoch
    pub time_end: f64,
}

impl ContainerHeader {
    /// Read the preamble and header block, leaving `reader` at the first frame
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        read_field(reader, &mut magic, "magic")?;
        if &magic != MAGIC {
            return Err(DecoderError::FormatError(format!(
                "bad magic {:?}, expected {:?}",
                magic, MAGIC
            )));
        }

        let mut version = [0u8; 4];
        read_field(reader, &mut version, "version")?;
        let mut header_len = [0u8; 2];
        read_field(reader, &mut header_len, "header length")?;

        let mut block = vec![0u8; u16::from_le_bytes(header_len) as usize];
        read_field(reader, &mut block, "header block")?;

        let header = Self::from_block(u32::from_le_bytes(version), &block);
        log::debug!(
            "Container header: version {}, {} header bytes, gmt offset {} min, start {}, end {}",
            header.version,
            block.len(),
            header.gmt_offset,
            header.time_start,
            header.time_end
        );
        Ok(header)
    }

    /// Extract the known fields from a header block of any length
    pub fn from_block(version: u32, block: &[u8]) -> Self {
        Self {
            version,
            gmt_offset: codec::i16_at(block, 0).unwrap_or(0),
            time_start: codec::f64_at(block, 10).unwrap_or(0.0),
            time_end: codec::f64_at(block, 18).unwrap_or(0.0),
        }
    }
}

fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            DecoderError::FormatError(format!("stream ended while reading {}", what))
        } else {
            DecoderError::IoError(e)
        }
    })
}
