use log::trace;
use rustc_hash::FxHashMap;
use rustitude_pbf::MessageWriter;

use crate::error::{BuildResult, Capacity};

/// Insertion ordered interning table of one layer's keys or values.
///
/// Each distinct entry is written once into the side buffer as a
/// length-delimited field with number `field`; its index is the number of
/// distinct entries interned before it. Entries are never removed.
#[derive(Debug, Clone)]
pub struct Dictionary {
    field: u32,
    limit: u32,
    index: FxHashMap<Box<[u8]>, u32>,
    writer: MessageWriter,
}

impl Dictionary {
    pub fn new(field: u32) -> Self {
        Self::with_limit(field, u32::MAX)
    }

    /// A dictionary that refuses to hold more than `limit` entries.
    pub fn with_limit(field: u32, limit: u32) -> Self {
        Self {
            field,
            limit,
            index: FxHashMap::default(),
            writer: MessageWriter::new(),
        }
    }

    pub fn intern(&mut self, entry: &[u8]) -> BuildResult<u32> {
        if let Some(&index) = self.index.get(entry) {
            return Ok(index);
        }
        let limit = self.limit;
        let index = u32::try_from(self.index.len())
            .ok()
            .filter(|i| *i < limit)
            .ok_or(Capacity::Dictionary { limit })?;
        self.writer.add_bytes(self.field, entry);
        self.index.insert(entry.into(), index);
        trace!("field {} interned entry #{}", self.field, index);
        Ok(index)
    }

    pub fn get(&self, entry: &[u8]) -> Option<u32> {
        self.index.get(entry).copied()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The encoded entries, in index order.
    pub fn data(&self) -> &[u8] {
        self.writer.data()
    }
}
