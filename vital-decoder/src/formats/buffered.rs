//! Read-ahead frame reader
//!
//! Keeps a growable buffer of decompressed bytes and slices frames out of it,
//! so a stream of many small packets costs a handful of large reads instead
//! of two reads per packet. Frame boundaries never depend on how the source
//! splits its reads.

use crate::formats::{check_length, parse_frame_header, read_some, Frame, FrameSource, FRAME_HEADER_LEN};
use crate::types::Result;
use std::io::Read;

/// Frame reader backed by a growable read-ahead buffer
pub struct BufferedFramer<R> {
    reader: R,
    buffer: Vec<u8>,
    /// Start of unconsumed bytes
    pos: usize,
    /// End of valid bytes
    size: usize,
    eof: bool,
    read_chunk: usize,
    max_packet_len: u32,
    frames: u64,
    truncated: bool,
}

impl<R: Read> BufferedFramer<R> {
    pub fn new(reader: R, capacity: usize, read_chunk: usize, max_packet_len: u32) -> Self {
        Self {
            reader,
            buffer: vec![0u8; capacity],
            pos: 0,
            size: 0,
            eof: false,
            read_chunk: read_chunk.max(1),
            max_packet_len,
            frames: 0,
            truncated: false,
        }
    }

    /// Current buffer capacity in bytes
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Make `n` bytes available at `pos`; false if the source ran out first
    fn ensure(&mut self, n: usize) -> Result<bool> {
        while self.pos + n > self.size && !self.eof {
            if self.pos > 0 {
                self.buffer.copy_within(self.pos..self.size, 0);
                self.size -= self.pos;
                self.pos = 0;
            }

            if self.size + n > self.buffer.len() {
                let grown = (self.buffer.len() * 3 / 2).max(self.size + n);
                log::trace!("Growing frame buffer {} -> {} bytes", self.buffer.len(), grown);
                self.buffer.resize(grown, 0);
            }

            let want = n.max(self.read_chunk).min(self.buffer.len() - self.size);
            let got = read_some(&mut self.reader, &mut self.buffer[self.size..self.size + want])?;
            if got == 0 {
                self.eof = true;
            }
            self.size += got;
        }
        Ok(self.pos + n <= self.size)
    }

    fn take(&mut self, n: usize) -> std::ops::Range<usize> {
        let range = self.pos..self.pos + n;
        self.pos += n;
        range
    }

    fn stop(&mut self) {
        self.truncated |= self.size > self.pos;
        self.pos = self.size;
    }
}

impl<R: Read> FrameSource for BufferedFramer<R> {
    fn next_frame(&mut self) -> Result<Option<Frame<'_>>> {
        if !self.ensure(FRAME_HEADER_LEN)? {
            self.stop();
            return Ok(None);
        }
        let range = self.take(FRAME_HEADER_LEN);
        let mut header = [0u8; FRAME_HEADER_LEN];
        header.copy_from_slice(&self.buffer[range]);

        let (packet_type, length) = parse_frame_header(&header);
        check_length(self.frames, packet_type, length, self.max_packet_len)?;

        let length = length as usize;
        if !self.ensure(length)? {
            self.truncated = true;
            self.pos = self.size;
            return Ok(None);
        }
        let range = self.take(length);

        self.frames += 1;
        Ok(Some(Frame {
            packet_type,
            payload: &self.buffer[range],
        }))
    }

    fn frames_read(&self) -> u64 {
        self.frames
    }

    fn truncated(&self) -> bool {
        self.truncated
    }
}
