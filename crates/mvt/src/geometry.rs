use std::fmt::Display;

use rustitude_pbf::{decode_zigzag32, encode_zigzag32, MessageWriter};

use crate::error::{BuildResult, Capacity};

/// A position in tile coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Command {
    MoveTo = 1,
    LineTo = 2,
    ClosePath = 7,
}

/// The count shares a u32 with the 3 bit command id.
pub const MAX_COMMAND_COUNT: u32 = (1 << 29) - 1;

impl Command {
    pub fn id(self) -> u32 {
        self as u32
    }

    /// `(id & 0x7) | (count << 3)`. `count` must not exceed
    /// [`MAX_COMMAND_COUNT`]; use [`integer`](Self::integer) to check it.
    pub const fn encode(self, count: u32) -> u32 {
        (self as u32 & 0x7) | (count << 3)
    }

    pub fn integer(self, count: usize) -> BuildResult<u32> {
        let count = u32::try_from(count)
            .ok()
            .filter(|c| *c <= MAX_COMMAND_COUNT)
            .ok_or(Capacity::CommandCount {
                count,
                max: MAX_COMMAND_COUNT,
            })?;
        Ok(self.encode(count))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInteger(pub u32);

impl CommandInteger {
    pub fn id(&self) -> Option<Command> {
        match self.0 & 0x07 {
            0x01 => Some(Command::MoveTo),
            0x02 => Some(Command::LineTo),
            0x07 => Some(Command::ClosePath),
            _ => None,
        }
    }

    pub fn count(&self) -> u32 {
        self.0 >> 3
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterInteger(pub u32);

impl ParameterInteger {
    pub fn value(&self) -> i32 {
        decode_zigzag32(self.0)
    }
}

/// Writes command integers and delta encoded coordinates into an open packed
/// `geometry` field, tracking the cursor between calls.
#[derive(Debug, Default, Clone)]
pub struct GeometryEncoder {
    cursor: Point,
}

impl GeometryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn command(&mut self, w: &mut MessageWriter, command: Command, count: usize) -> BuildResult<()> {
        w.push_varint(command.integer(count)? as u64);
        Ok(())
    }

    /// Emits `p - cursor` as a zigzag pair and moves the cursor to `p`.
    /// Wrapping arithmetic keeps the delta decodable with a wrapping add.
    pub fn point(&mut self, w: &mut MessageWriter, p: Point) {
        let dx = p.x.wrapping_sub(self.cursor.x);
        let dy = p.y.wrapping_sub(self.cursor.y);
        w.push_varint(encode_zigzag32(dx) as u64);
        w.push_varint(encode_zigzag32(dy) as u64);
        self.cursor = p;
    }
}
