use rustitude_pbf::MessageWriter;

use crate::pb::field;

/// An attribute value, encoded as a `Value` message with exactly one field set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue<'a> {
    String(&'a str),
    Float(f32),
    Double(f64),
    Int(i64),
    UInt(u64),
    SInt(i64),
    Bool(bool),
}

impl PropertyValue<'_> {
    pub fn encode_into(&self, w: &mut MessageWriter) {
        match *self {
            PropertyValue::String(v) => w.add_string(field::value::STRING, v),
            PropertyValue::Float(v) => w.add_float(field::value::FLOAT, v),
            PropertyValue::Double(v) => w.add_double(field::value::DOUBLE, v),
            PropertyValue::Int(v) => w.add_int64(field::value::INT, v),
            PropertyValue::UInt(v) => w.add_uint64(field::value::UINT, v),
            PropertyValue::SInt(v) => w.add_sint64(field::value::SINT, v),
            PropertyValue::Bool(v) => w.add_bool(field::value::BOOL, v),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = MessageWriter::new();
        self.encode_into(&mut w);
        w.into_inner()
    }
}

impl<'a> From<&'a str> for PropertyValue<'a> {
    fn from(v: &'a str) -> Self {
        PropertyValue::String(v)
    }
}

impl<'a> From<&'a String> for PropertyValue<'a> {
    fn from(v: &'a String) -> Self {
        PropertyValue::String(v.as_str())
    }
}

impl From<f32> for PropertyValue<'_> {
    fn from(v: f32) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<f64> for PropertyValue<'_> {
    fn from(v: f64) -> Self {
        PropertyValue::Double(v)
    }
}

impl From<i64> for PropertyValue<'_> {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<u64> for PropertyValue<'_> {
    fn from(v: u64) -> Self {
        PropertyValue::UInt(v)
    }
}

impl From<bool> for PropertyValue<'_> {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}
