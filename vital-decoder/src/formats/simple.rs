//! Read-exact frame reader
//!
//! Pulls each frame header and payload from the source with reads sized to
//! exactly the field being decoded. This is the reference behaviour the
//! buffered reader is checked against.

use crate::formats::{check_length, parse_frame_header, read_some, Frame, FrameSource, FRAME_HEADER_LEN};
use crate::types::Result;
use std::io::{self, Read};

/// Frame reader issuing one exact-size read per field
pub struct SimpleFramer<R> {
    reader: R,
    payload: Vec<u8>,
    max_packet_len: u32,
    frames: u64,
    truncated: bool,
    finished: bool,
}

impl<R: Read> SimpleFramer<R> {
    pub fn new(reader: R, max_packet_len: u32) -> Self {
        Self {
            reader,
            payload: Vec::new(),
            max_packet_len,
            frames: 0,
            truncated: false,
            finished: false,
        }
    }

    /// Fill `buf` completely unless the source runs dry; returns bytes read
    fn fill(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = read_some(reader, &mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    fn stop(&mut self, truncated: bool) {
        self.finished = true;
        self.truncated = truncated;
    }
}

impl<R: Read> FrameSource for SimpleFramer<R> {
    fn next_frame(&mut self) -> Result<Option<Frame<'_>>> {
        if self.finished {
            return Ok(None);
        }

        let mut header = [0u8; FRAME_HEADER_LEN];
        let got = Self::fill(&mut self.reader, &mut header)?;
        if got < FRAME_HEADER_LEN {
            self.stop(got > 0);
            return Ok(None);
        }

        let (packet_type, length) = parse_frame_header(&header);
        check_length(self.frames, packet_type, length, self.max_packet_len)?;

        let length = length as usize;
        self.payload.resize(length, 0);
        let got = Self::fill(&mut self.reader, &mut self.payload)?;
        if got < length {
            self.stop(true);
            return Ok(None);
        }

        self.frames += 1;
        Ok(Some(Frame {
            packet_type,
            payload: &self.payload,
        }))
    }

    fn frames_read(&self) -> u64 {
        self.frames
    }

    fn truncated(&self) -> bool {
        self.truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_support::{frame, Trickle};
    use crate::types::DecoderError;

    #[test]
    fn test_reads_frames_in_order() {
        let mut bytes = frame(9, b"abc");
        bytes.extend(frame(0, b""));
        bytes.extend(frame(200, b"xy"));

        let mut framer = SimpleFramer::new(bytes.as_slice(), 1024);
        let first = framer.next_frame().unwrap().unwrap();
        assert_eq!((first.packet_type, first.payload), (9, &b"abc"[..]));
        let second = framer.next_frame().unwrap().unwrap();
        assert_eq!((second.packet_type, second.payload.len()), (0, 0));
        let third = framer.next_frame().unwrap().unwrap();
        assert_eq!((third.packet_type, third.payload), (200, &b"xy"[..]));
        assert!(framer.next_frame().unwrap().is_none());
        assert!(framer.next_frame().unwrap().is_none());
        assert_eq!(framer.frames_read(), 3);
        assert!(!framer.truncated());
    }

    #[test]
    fn test_truncated_header_ends_cleanly() {
        let mut bytes = frame(1, b"1234");
        bytes.extend_from_slice(&[1, 0]);
        let mut framer = SimpleFramer::new(bytes.as_slice(), 1024);
        assert!(framer.next_frame().unwrap().is_some());
        assert!(framer.next_frame().unwrap().is_none());
        assert!(framer.truncated());
    }

    #[test]
    fn test_truncated_payload_ends_cleanly() {
        let mut bytes = frame(1, b"12345678");
        bytes.truncate(9);
        let mut framer = SimpleFramer::new(Trickle { data: &bytes, step: 2 }, 1024);
        assert!(framer.next_frame().unwrap().is_none());
        assert!(framer.truncated());
        assert_eq!(framer.frames_read(), 0);
    }

    #[test]
    fn test_oversized_packet_is_fatal() {
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(&2000u32.to_le_bytes());
        let mut framer = SimpleFramer::new(bytes.as_slice(), 1000);
        let err = framer.next_frame().unwrap_err();
        assert!(matches!(err, DecoderError::OversizedPacketError { length: 2000, .. }));
    }
}
