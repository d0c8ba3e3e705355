//! Decoder configuration types
//!
//! Only the I/O side of decoding is configurable. Packet semantics are fixed by
//! the file format and do not change with configuration.

use serde::{Deserialize, Serialize};

/// Default ceiling for a single packet payload (100 MiB)
pub const DEFAULT_MAX_PACKET_LEN: u32 = 100 * 1024 * 1024;

/// Default minimum refill size for the buffered reader
pub const DEFAULT_READ_CHUNK: usize = 64 * 1024;

/// Buffer capacity used when no file size is known
pub const DEFAULT_BUFFER_CAPACITY: usize = 512 * 1024;

/// Which frame reader to run over the decompressed stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderKind {
    /// Reads every field with an exact-size read
    Simple,
    /// Slices frames out of a growable read-ahead buffer
    #[default]
    Buffered,
}

/// Configuration for the decoder library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Frame reader implementation
    #[serde(default)]
    pub reader: ReaderKind,

    /// Packets declaring a longer payload abort the decode
    #[serde(default = "default_max_packet_len")]
    pub max_packet_len: u32,

    /// Initial buffered reader capacity; sized from the file when unset
    #[serde(default)]
    pub buffer_capacity: Option<usize>,

    /// Minimum bytes requested from the source per refill
    #[serde(default = "default_read_chunk")]
    pub read_chunk: usize,
}

fn default_max_packet_len() -> u32 {
    DEFAULT_MAX_PACKET_LEN
}

fn default_read_chunk() -> usize {
    DEFAULT_READ_CHUNK
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            reader: ReaderKind::default(),
            max_packet_len: DEFAULT_MAX_PACKET_LEN,
            buffer_capacity: None,
            read_chunk: DEFAULT_READ_CHUNK,
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: choose the frame reader
    pub fn with_reader(mut self, reader: ReaderKind) -> Self {
        self.reader = reader;
        self
    }

    /// Builder method: set the packet length ceiling
    pub fn with_max_packet_len(mut self, limit: u32) -> Self {
        self.max_packet_len = limit;
        self
    }

    /// Builder method: fix the buffered reader's initial capacity
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = Some(capacity);
        self
    }

    /// Builder method: set the minimum refill size
    pub fn with_read_chunk(mut self, chunk: usize) -> Self {
        self.read_chunk = chunk;
        self
    }

    /// Initial buffer capacity for a compressed input of `file_size` bytes
    ///
    /// An explicit `buffer_capacity` always wins.
    pub fn capacity_for_file_size(&self, file_size: Option<u64>) -> usize {
        if let Some(capacity) = self.buffer_capacity {
            return capacity;
        }
        match file_size {
            Some(size) if size < 1024 * 1024 => 256 * 1024,
            Some(size) if size > 10 * 1024 * 1024 => 1024 * 1024,
            _ => DEFAULT_BUFFER_CAPACITY,
        }
    }
}
