use prost::bytes::BufMut;
use prost::encoding::{encode_key, encode_varint, encoded_len_varint, WireType};

use crate::encode_zigzag64;

/// Position of a length-delimited field opened with
/// [`MessageWriter::open_message`]. Markers must be closed in the reverse
/// order they were opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    start: usize,
    body: usize,
}

impl Marker {
    /// Offset of the field key inside the writer's buffer.
    pub fn start(&self) -> usize {
        self.start
    }
}

/// Appends protobuf fields to a growable byte buffer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MessageWriter {
    buf: Vec<u8>,
}

impl From<Vec<u8>> for MessageWriter {
    /// Continues writing after the bytes already in `buf`.
    fn from(buf: Vec<u8>) -> Self {
        Self { buf }
    }
}

impl MessageWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.buf.reserve(additional);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// Size of the key plus length prefix of a length-delimited field
    /// carrying `len` bytes.
    pub fn length_delimited_header_len(tag: u32, len: usize) -> usize {
        prost::encoding::key_len(tag) + encoded_len_varint(len as u64)
    }

    fn add_varint(&mut self, tag: u32, value: u64) {
        encode_key(tag, WireType::Varint, &mut self.buf);
        encode_varint(value, &mut self.buf);
    }

    pub fn add_uint32(&mut self, tag: u32, value: u32) {
        self.add_varint(tag, value as u64);
    }

    pub fn add_uint64(&mut self, tag: u32, value: u64) {
        self.add_varint(tag, value);
    }

    pub fn add_int64(&mut self, tag: u32, value: i64) {
        self.add_varint(tag, value as u64);
    }

    /// Enums are int32 on the wire; negative values take ten bytes.
    pub fn add_enum(&mut self, tag: u32, value: i32) {
        self.add_varint(tag, value as i64 as u64);
    }

    pub fn add_sint64(&mut self, tag: u32, value: i64) {
        self.add_varint(tag, encode_zigzag64(value));
    }

    pub fn add_bool(&mut self, tag: u32, value: bool) {
        self.add_varint(tag, value as u64);
    }

    pub fn add_float(&mut self, tag: u32, value: f32) {
        encode_key(tag, WireType::ThirtyTwoBit, &mut self.buf);
        self.buf.put_f32_le(value);
    }

    pub fn add_double(&mut self, tag: u32, value: f64) {
        encode_key(tag, WireType::SixtyFourBit, &mut self.buf);
        self.buf.put_f64_le(value);
    }

    pub fn add_bytes(&mut self, tag: u32, value: &[u8]) {
        encode_key(tag, WireType::LengthDelimited, &mut self.buf);
        encode_varint(value.len() as u64, &mut self.buf);
        self.buf.extend_from_slice(value);
    }

    pub fn add_string(&mut self, tag: u32, value: &str) {
        self.add_bytes(tag, value.as_bytes());
    }

    /// Writes one length-delimited field whose payload is the concatenation
    /// of `parts`. The parts are copied straight from where they live; no
    /// intermediate buffer is built.
    pub fn add_bytes_vectored(&mut self, tag: u32, parts: &[&[u8]]) {
        let len: usize = parts.iter().map(|p| p.len()).sum();
        encode_key(tag, WireType::LengthDelimited, &mut self.buf);
        encode_varint(len as u64, &mut self.buf);
        self.buf.reserve(len);
        for part in parts {
            self.buf.extend_from_slice(part);
        }
    }

    /// Appends a raw varint. Only meaningful inside an open packed field.
    pub fn push_varint(&mut self, value: u64) {
        encode_varint(value, &mut self.buf);
    }

    /// Starts a length-delimited field (sub-message or packed repeated
    /// field). The length is filled in by [`close_message`](Self::close_message).
    pub fn open_message(&mut self, tag: u32) -> Marker {
        let start = self.buf.len();
        encode_key(tag, WireType::LengthDelimited, &mut self.buf);
        Marker {
            start,
            body: self.buf.len(),
        }
    }

    /// Bytes written into the field since it was opened.
    pub fn written_since(&self, marker: Marker) -> usize {
        self.buf.len() - marker.body
    }

    pub fn close_message(&mut self, marker: Marker) {
        let len = self.written_since(marker) as u64;
        let mut header = [0u8; 10];
        let header_len = encoded_len_varint(len);
        {
            let mut slot = &mut header[..];
            encode_varint(len, &mut slot);
        }
        self.buf
            .splice(marker.body..marker.body, header[..header_len].iter().copied());
    }

    /// Like [`close_message`](Self::close_message), but drops the field
    /// entirely when nothing was written into it.
    pub fn close_packed(&mut self, marker: Marker) {
        if self.written_since(marker) == 0 {
            self.rollback(marker);
        } else {
            self.close_message(marker);
        }
    }

    /// Discards the field and everything written after it was opened.
    pub fn rollback(&mut self, marker: Marker) {
        self.buf.truncate(marker.start);
    }
}
