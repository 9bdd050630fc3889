use log::trace;
use rustitude_pbf::MessageWriter;

use crate::{
    dictionary::Dictionary,
    error::BuildResult,
    pb::field,
    reader::{FeatureView, LayerView},
    value::PropertyValue,
};

use super::feature::GeometryFeatureBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayerOptions {
    pub version: u32,
    /// Size of the tile coordinate space.
    pub extent: u32,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            version: 2,
            extent: 4096,
        }
    }
}

/// One layer under construction.
///
/// The layer message is kept in three buffers: `body` (version, name,
/// extent and every feature), the interned keys and the interned values.
/// Field order inside a message carries no meaning, so the keys and values
/// go after all features even though features reference them by index.
#[derive(Debug, Clone)]
pub struct LayerBuilder {
    name: String,
    options: LayerOptions,
    body: MessageWriter,
    keys: Dictionary,
    values: Dictionary,
    scratch: MessageWriter,
    num_features: usize,
}

impl LayerBuilder {
    pub fn new(name: impl Into<String>, options: LayerOptions) -> Self {
        let name = name.into();
        let mut body = MessageWriter::new();
        body.add_uint32(field::layer::VERSION, options.version);
        body.add_string(field::layer::NAME, &name);
        body.add_uint32(field::layer::EXTENT, options.extent);
        trace!(
            "new layer `{}` (version {}, extent {})",
            name,
            options.version,
            options.extent
        );
        Self {
            name,
            options,
            body,
            keys: Dictionary::new(field::layer::KEYS),
            values: Dictionary::new(field::layer::VALUES),
            scratch: MessageWriter::new(),
            num_features: 0,
        }
    }

    /// A layer named like `layer`, with its version and extent.
    pub fn like(layer: &LayerView<'_>) -> Self {
        Self::new(
            layer.name(),
            LayerOptions {
                version: layer.version(),
                extent: layer.extent(),
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.options.version
    }

    pub fn extent(&self) -> u32 {
        self.options.extent
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn intern_key(&mut self, key: &str) -> BuildResult<u32> {
        self.keys.intern(key.as_bytes())
    }

    pub fn intern_value<'v>(&mut self, value: impl Into<PropertyValue<'v>>) -> BuildResult<u32> {
        self.scratch.clear();
        value.into().encode_into(&mut self.scratch);
        self.values.intern(self.scratch.data())
    }

    /// Interns a value that is already an encoded `Value` message.
    pub fn intern_encoded_value(&mut self, encoded: &[u8]) -> BuildResult<u32> {
        self.values.intern(encoded)
    }

    pub fn data(&self) -> &[u8] {
        self.body.data()
    }

    pub fn keys_data(&self) -> &[u8] {
        self.keys.data()
    }

    pub fn values_data(&self) -> &[u8] {
        self.values.data()
    }

    /// Copies a decoded feature: id, type and geometry verbatim, attributes
    /// re-interned into this layer's dictionaries.
    pub fn add_feature<'a>(
        &mut self,
        feature: &FeatureView<'a>,
        layer: &LayerView<'a>,
    ) -> BuildResult<()> {
        let mut builder = GeometryFeatureBuilder::new(
            self,
            feature.id(),
            feature.geometry_type(),
            feature.raw_geometry(),
        );
        for tag in feature.tags(layer) {
            let (key, value) = tag?;
            builder.add_encoded_attribute(key, value)?;
        }
        builder.commit()
    }

    pub(crate) fn body_mut(&mut self) -> &mut MessageWriter {
        &mut self.body
    }

    pub(crate) fn feature_committed(&mut self) {
        self.num_features += 1;
    }

    fn content_len(&self) -> usize {
        self.body.len() + self.keys.data().len() + self.values.data().len()
    }

    /// Bytes [`build`](Self::build) appends to the tile.
    pub fn encoded_len(&self) -> usize {
        let len = self.content_len();
        MessageWriter::length_delimited_header_len(field::tile::LAYERS, len) + len
    }

    /// Writes the layer as one `layers` field. The three buffers are
    /// streamed one after another behind a single length prefix.
    pub fn build(&self, tile: &mut MessageWriter) {
        tile.add_bytes_vectored(
            field::tile::LAYERS,
            &[self.body.data(), self.keys.data(), self.values.data()],
        );
    }
}
