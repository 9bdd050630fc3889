use rustitude_pbf::ReadError;
use thiserror::Error;

use crate::geometry::Point;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("protocol violation: {0}")]
    ProtocolViolation(#[from] Violation),

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(#[from] Capacity),

    #[error("failed to read source tile: {0}")]
    Read(#[from] ReadError),
}

impl BuildError {
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, BuildError::ProtocolViolation(_))
    }
}

/// A builder method was called out of order or with arguments that would
/// produce an invalid geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("attributes must be added before any geometry")]
    AttributeAfterGeometry,

    #[error("a linestring needs at least 2 points, {0} declared")]
    LineStringTooShort(usize),

    #[error("a polygon ring needs at least 4 points, {0} declared")]
    RingTooShort(usize),

    #[error("ring must end on its first point {first}, got {last}")]
    RingNotClosed { first: Point, last: Point },

    #[error("{remaining} declared points were never added")]
    PointCountMismatch { remaining: usize },

    #[error("point {0} repeats the previous point")]
    RepeatedPoint(Point),

    #[error("no linestring or ring is in progress")]
    NoPathStarted,

    #[error("feature has no geometry")]
    MissingGeometry,

    #[error("a multipoint needs at least one point")]
    EmptyMultiPoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Capacity {
    #[error("dictionary is full ({limit} entries)")]
    Dictionary { limit: u32 },

    #[error("command count {count} exceeds the encodable maximum {max}")]
    CommandCount { count: usize, max: u32 },
}

pub type BuildResult<T> = Result<T, BuildError>;
