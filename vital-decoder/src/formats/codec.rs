//! Little-endian field readers over packet payloads
//!
//! Every reader takes the payload and an absolute offset and returns `None`
//! when the field would run past the end of the slice.

use byteorder::{ByteOrder, LittleEndian};

fn field(buf: &[u8], pos: usize, width: usize) -> Option<&[u8]> {
    buf.get(pos..pos.checked_add(width)?)
}

pub fn u8_at(buf: &[u8], pos: usize) -> Option<u8> {
    buf.get(pos).copied()
}

pub fn i8_at(buf: &[u8], pos: usize) -> Option<i8> {
    u8_at(buf, pos).map(|b| b as i8)
}

pub fn u16_at(buf: &[u8], pos: usize) -> Option<u16> {
    field(buf, pos, 2).map(LittleEndian::read_u16)
}

pub fn i16_at(buf: &[u8], pos: usize) -> Option<i16> {
    field(buf, pos, 2).map(LittleEndian::read_i16)
}

pub fn u32_at(buf: &[u8], pos: usize) -> Option<u32> {
    field(buf, pos, 4).map(LittleEndian::read_u32)
}

pub fn i32_at(buf: &[u8], pos: usize) -> Option<i32> {
    field(buf, pos, 4).map(LittleEndian::read_i32)
}

pub fn f32_at(buf: &[u8], pos: usize) -> Option<f32> {
    field(buf, pos, 4).map(LittleEndian::read_f32)
}

pub fn f64_at(buf: &[u8], pos: usize) -> Option<f64> {
    field(buf, pos, 8).map(LittleEndian::read_f64)
}

/// Raw bytes of length `len` at `pos`
pub fn bytes_at(buf: &[u8], pos: usize, len: usize) -> Option<&[u8]> {
    field(buf, pos, len)
}

/// Decode a u32-length-prefixed string at `pos`
///
/// Returns the string and how far the cursor advances. Fewer than four bytes
/// left yields `("", 0)`; a length running past the payload yields `("", 4)`
/// so the caller still steps over the prefix. Text is decoded as lossy UTF-8.
pub fn str_at(buf: &[u8], pos: usize) -> (String, usize) {
    let Some(len) = u32_at(buf, pos) else {
        return (String::new(), 0);
    };
    let len = len as usize;
    match bytes_at(buf, pos + 4, len) {
        Some(raw) => (String::from_utf8_lossy(raw).into_owned(), 4 + len),
        None => (String::new(), 4),
    }
}
