pub mod reader;
pub mod writer;

pub use reader::{Field, FieldValue, MessageReader, PackedVarints, ReadError};
pub use writer::{Marker, MessageWriter};

pub use prost::encoding::WireType;

/// Maps a signed 32 bit integer onto an unsigned one so that small magnitudes
/// stay small: 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...
pub fn encode_zigzag32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

pub fn decode_zigzag32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ (-((n & 1) as i32))
}

pub fn encode_zigzag64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

pub fn decode_zigzag64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}

#[test]
fn test_zigzag() {
    assert_eq!(encode_zigzag32(0), 0);
    assert_eq!(encode_zigzag32(-1), 1);
    assert_eq!(encode_zigzag32(1), 2);
    assert_eq!(encode_zigzag32(-2), 3);
    assert_eq!(encode_zigzag32(25), 50);
    assert_eq!(encode_zigzag32(i32::MAX), u32::MAX - 1);
    assert_eq!(encode_zigzag32(i32::MIN), u32::MAX);
    for n in [0, 1, -1, 17, -4096, i32::MAX, i32::MIN] {
        assert_eq!(decode_zigzag32(encode_zigzag32(n)), n);
    }
    assert_eq!(encode_zigzag64(-3), 5);
    assert_eq!(decode_zigzag64(encode_zigzag64(i64::MIN)), i64::MIN);
}
