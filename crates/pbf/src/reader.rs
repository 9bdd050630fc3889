use std::str::Utf8Error;

use prost::encoding::{decode_key, decode_varint, WireType};
use prost::DecodeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("invalid protobuf encoding: {0}")]
    Decode(#[from] DecodeError),

    #[error("field `{tag}` is truncated: {needed} bytes needed, {available} available")]
    Truncated {
        tag: u32,
        needed: usize,
        available: usize,
    },

    #[error("field `{tag}` uses unsupported wire type {wire_type:?}")]
    UnsupportedWireType { tag: u32, wire_type: WireType },

    #[error("field `{tag}` has wire type {found:?}, expected {expected:?}")]
    WireTypeMismatch {
        tag: u32,
        expected: WireType,
        found: WireType,
    },

    #[error("field `{tag}` is not valid UTF-8: {source}")]
    Utf8 { tag: u32, source: Utf8Error },

    #[error("malformed message: {0}")]
    Malformed(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Varint(u64),
    Fixed64(u64),
    Bytes(&'a [u8]),
    Fixed32(u32),
}

impl FieldValue<'_> {
    fn wire_type(&self) -> WireType {
        match self {
            FieldValue::Varint(_) => WireType::Varint,
            FieldValue::Fixed64(_) => WireType::SixtyFourBit,
            FieldValue::Bytes(_) => WireType::LengthDelimited,
            FieldValue::Fixed32(_) => WireType::ThirtyTwoBit,
        }
    }
}

/// One field of a message. Length-delimited payloads borrow the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub tag: u32,
    pub value: FieldValue<'a>,
}

impl<'a> Field<'a> {
    pub fn as_varint(&self) -> Result<u64, ReadError> {
        match self.value {
            FieldValue::Varint(v) => Ok(v),
            other => Err(self.mismatch(WireType::Varint, other)),
        }
    }

    pub fn as_uint32(&self) -> Result<u32, ReadError> {
        self.as_varint().map(|v| v as u32)
    }

    pub fn as_bytes(&self) -> Result<&'a [u8], ReadError> {
        match self.value {
            FieldValue::Bytes(b) => Ok(b),
            other => Err(self.mismatch(WireType::LengthDelimited, other)),
        }
    }

    pub fn as_str(&self) -> Result<&'a str, ReadError> {
        let bytes = self.as_bytes()?;
        std::str::from_utf8(bytes).map_err(|source| ReadError::Utf8 {
            tag: self.tag,
            source,
        })
    }

    fn mismatch(&self, expected: WireType, found: FieldValue<'_>) -> ReadError {
        ReadError::WireTypeMismatch {
            tag: self.tag,
            expected,
            found: found.wire_type(),
        }
    }
}

/// Iterates the fields of an encoded message without copying it. Stops
/// after the first error.
#[derive(Debug, Clone)]
pub struct MessageReader<'a> {
    data: &'a [u8],
}

impl<'a> MessageReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }

    fn take(&mut self, tag: u32, needed: usize) -> Result<&'a [u8], ReadError> {
        if needed > self.data.len() {
            return Err(ReadError::Truncated {
                tag,
                needed,
                available: self.data.len(),
            });
        }
        let (head, tail) = self.data.split_at(needed);
        self.data = tail;
        Ok(head)
    }

    fn read_field(&mut self) -> Result<Field<'a>, ReadError> {
        let mut buf = self.data;
        let (tag, wire_type) = decode_key(&mut buf)?;
        self.data = buf;
        let value = match wire_type {
            WireType::Varint => {
                let mut buf = self.data;
                let v = decode_varint(&mut buf)?;
                self.data = buf;
                FieldValue::Varint(v)
            }
            WireType::SixtyFourBit => {
                let raw = self.take(tag, 8)?;
                let mut le = [0u8; 8];
                le.copy_from_slice(raw);
                FieldValue::Fixed64(u64::from_le_bytes(le))
            }
            WireType::LengthDelimited => {
                let mut buf = self.data;
                let len = decode_varint(&mut buf)?;
                self.data = buf;
                let len = usize::try_from(len)
                    .map_err(|_| ReadError::Malformed("length prefix overflows usize"))?;
                FieldValue::Bytes(self.take(tag, len)?)
            }
            WireType::ThirtyTwoBit => {
                let raw = self.take(tag, 4)?;
                let mut le = [0u8; 4];
                le.copy_from_slice(raw);
                FieldValue::Fixed32(u32::from_le_bytes(le))
            }
            WireType::StartGroup | WireType::EndGroup => {
                return Err(ReadError::UnsupportedWireType { tag, wire_type })
            }
        };
        Ok(Field { tag, value })
    }
}

impl<'a> Iterator for MessageReader<'a> {
    type Item = Result<Field<'a>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        let field = self.read_field();
        if field.is_err() {
            self.data = &[];
        }
        Some(field)
    }
}

/// Iterates the varints of a packed repeated field payload.
#[derive(Debug, Clone)]
pub struct PackedVarints<'a> {
    data: &'a [u8],
}

impl<'a> PackedVarints<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl Iterator for PackedVarints<'_> {
    type Item = Result<u64, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        let mut buf = self.data;
        match decode_varint(&mut buf) {
            Ok(v) => {
                self.data = buf;
                Some(Ok(v))
            }
            Err(e) => {
                self.data = &[];
                Some(Err(e.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageWriter;

    #[test]
    fn test_read_fields() {
        let mut w = MessageWriter::new();
        w.add_uint32(15, 2);
        w.add_string(1, "roads");
        w.add_double(3, 0.5);
        w.add_float(2, 1.5);

        let fields: Vec<Field> = MessageReader::new(w.data())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].tag, 15);
        assert_eq!(fields[0].as_uint32().unwrap(), 2);
        assert_eq!(fields[1].as_str().unwrap(), "roads");
        assert_eq!(fields[2].value, FieldValue::Fixed64(0.5f64.to_bits()));
        assert_eq!(fields[3].value, FieldValue::Fixed32(1.5f32.to_bits()));
        assert!(matches!(
            fields[1].as_varint(),
            Err(ReadError::WireTypeMismatch { tag: 1, .. })
        ));
    }

    #[test]
    fn test_truncated() {
        let mut w = MessageWriter::new();
        w.add_string(1, "roads");
        let data = &w.data()[..4];
        let mut reader = MessageReader::new(data);
        assert_eq!(
            reader.next(),
            Some(Err(ReadError::Truncated {
                tag: 1,
                needed: 5,
                available: 2
            }))
        );
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn test_packed() {
        let mut w = MessageWriter::new();
        for v in [9u64, 50, 34, 300] {
            w.push_varint(v);
        }
        let values: Vec<u64> = PackedVarints::new(w.data())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(values, vec![9, 50, 34, 300]);

        let mut bad = PackedVarints::new(&[0x80]);
        assert!(matches!(bad.next(), Some(Err(ReadError::Decode(_)))));
        assert!(bad.next().is_none());
    }
}
