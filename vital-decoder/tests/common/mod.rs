//! Builders for synthetic vital containers used by the integration tests

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::PathBuf;

/// Builds a decompressed vital stream frame by frame
pub struct VitalBuilder {
    bytes: Vec<u8>,
}

impl VitalBuilder {
    /// Container preamble with a full 26 byte header block
    pub fn new(gmt_offset: i16, time_start: f64, time_end: f64) -> Self {
        let mut block = vec![0u8; 26];
        block[0..2].copy_from_slice(&gmt_offset.to_le_bytes());
        block[10..18].copy_from_slice(&time_start.to_le_bytes());
        block[18..26].copy_from_slice(&time_end.to_le_bytes());

        let mut bytes = b"VITA".to_vec();
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&(block.len() as u16).to_le_bytes());
        bytes.extend(block);
        Self { bytes }
    }

    pub fn frame(mut self, packet_type: u8, payload: &[u8]) -> Self {
        self.bytes.push(packet_type);
        self.bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn device(self, id: u32, type_name: &str, name: &str, port: &str) -> Self {
        let mut p = id.to_le_bytes().to_vec();
        p.extend(lp(type_name));
        p.extend(lp(name));
        p.extend(lp(port));
        self.frame(9, &p)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn track(
        self,
        tid: u16,
        kind: u8,
        fmt: u8,
        name: &str,
        unit: &str,
        srate: f32,
        gain: f64,
        offset: f64,
        did: u32,
    ) -> Self {
        let mut p = tid.to_le_bytes().to_vec();
        p.push(kind);
        p.push(fmt);
        p.extend(lp(name));
        p.extend(lp(unit));
        p.extend_from_slice(&(-10.0f32).to_le_bytes());
        p.extend_from_slice(&200.0f32.to_le_bytes());
        p.extend_from_slice(&0x00ff_00ffu32.to_le_bytes());
        p.extend_from_slice(&srate.to_le_bytes());
        p.extend_from_slice(&gain.to_le_bytes());
        p.extend_from_slice(&offset.to_le_bytes());
        p.push(1);
        p.extend_from_slice(&did.to_le_bytes());
        while p.len() < 51 {
            p.push(0);
        }
        self.frame(0, &p)
    }

    pub fn record(self, dt: f64, tid: u16, body: &[u8]) -> Self {
        let mut p = 12u16.to_le_bytes().to_vec();
        p.extend_from_slice(&dt.to_le_bytes());
        p.extend_from_slice(&tid.to_le_bytes());
        p.extend_from_slice(body);
        self.frame(1, &p)
    }

    pub fn track_order(self, positions: &[u16]) -> Self {
        let mut p = 1u32.to_le_bytes().to_vec();
        p.extend_from_slice(&(positions.len() as u16).to_le_bytes());
        for v in positions {
            p.extend_from_slice(&v.to_le_bytes());
        }
        self.frame(6, &p)
    }

    /// Append raw bytes, e.g. a partial frame
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn gzip(&self) -> Vec<u8> {
        gzip(&self.bytes)
    }
}

/// u32 length-prefixed string
pub fn lp(text: &str) -> Vec<u8> {
    let mut bytes = (text.len() as u32).to_le_bytes().to_vec();
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

pub fn wave_body<T: Copy>(samples: &[T], to_le: impl Fn(T) -> Vec<u8>) -> Vec<u8> {
    let mut body = (samples.len() as u32).to_le_bytes().to_vec();
    for s in samples {
        body.extend(to_le(*s));
    }
    body
}

pub fn string_body(text: &str) -> Vec<u8> {
    let mut body = vec![0u8; 4];
    body.extend(lp(text));
    body
}

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// Write gzip data to a file in a fresh temp dir; keep the dir alive
pub fn write_vital(dir: &tempfile::TempDir, name: &str, gz: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, gz).unwrap();
    path
}
