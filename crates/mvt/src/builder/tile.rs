use log::debug;
use rustitude_pbf::MessageWriter;

use crate::{pb::field, reader::LayerView};

use super::layer::{LayerBuilder, LayerOptions};

pub enum LayerEntry<'a> {
    Built(LayerBuilder),
    /// Payload of a `layers` field from another tile, re-emitted as is.
    Existing(&'a [u8]),
}

impl LayerEntry<'_> {
    pub fn encoded_len(&self) -> usize {
        match self {
            LayerEntry::Built(layer) => layer.encoded_len(),
            LayerEntry::Existing(data) => {
                MessageWriter::length_delimited_header_len(field::tile::LAYERS, data.len())
                    + data.len()
            }
        }
    }

    pub fn build(&self, tile: &mut MessageWriter) {
        match self {
            LayerEntry::Built(layer) => layer.build(tile),
            LayerEntry::Existing(data) => tile.add_bytes(field::tile::LAYERS, data),
        }
    }
}

/// Layers of a tile in output order.
///
/// Passthrough layers borrow the bytes of the tile they come from for `'a`.
#[derive(Default)]
pub struct TileBuilder<'a> {
    layers: Vec<LayerEntry<'a>>,
}

impl<'a> TileBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty layer with version 2 and extent 4096.
    pub fn add_layer(&mut self, name: impl Into<String>) -> &mut LayerBuilder {
        self.add_layer_with_options(name, LayerOptions::default())
    }

    pub fn add_layer_with_options(
        &mut self,
        name: impl Into<String>,
        options: LayerOptions,
    ) -> &mut LayerBuilder {
        self.push_built(LayerBuilder::new(name, options))
    }

    /// Adds an empty layer with the name, version and extent of `layer`.
    pub fn add_layer_like(&mut self, layer: &LayerView<'_>) -> &mut LayerBuilder {
        self.push_built(LayerBuilder::like(layer))
    }

    /// Copies `layer` into the tile byte for byte.
    pub fn add_layer_with_data(&mut self, layer: &LayerView<'a>) {
        self.layers.push(LayerEntry::Existing(layer.data()));
    }

    fn push_built(&mut self, layer: LayerBuilder) -> &mut LayerBuilder {
        self.layers.push(LayerEntry::Built(layer));
        match self.layers.last_mut() {
            Some(LayerEntry::Built(layer)) => layer,
            _ => unreachable!("a built layer was just pushed"),
        }
    }

    pub fn layers(&self) -> &[LayerEntry<'a>] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn encoded_len(&self) -> usize {
        self.layers.iter().map(LayerEntry::encoded_len).sum()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.serialize_into(&mut out);
        out
    }

    /// Appends the encoded tile to `out`.
    pub fn serialize_into(&self, out: &mut Vec<u8>) {
        let len = self.encoded_len();
        let mut tile = MessageWriter::from(std::mem::take(out));
        tile.reserve(len);
        for layer in &self.layers {
            layer.build(&mut tile);
        }
        debug!("serialized {} layers into {} bytes", self.layers.len(), len);
        *out = tile.into_inner();
    }
}
