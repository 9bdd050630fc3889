//! Zero-copy views over encoded tiles. Only what re-encoding needs is
//! exposed: the raw bytes of layers and geometries, and tag lookups.

use rustitude_pbf::{MessageReader, PackedVarints, ReadError};

use crate::pb::{field, vector_tile::tile::GeomType};

#[derive(Debug, Clone, Copy)]
pub struct VectorTile<'a> {
    data: &'a [u8],
}

impl<'a> VectorTile<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn layers(&self) -> Layers<'a> {
        Layers {
            fields: MessageReader::new(self.data),
        }
    }

    pub fn layer_by_name(&self, name: &str) -> Result<Option<LayerView<'a>>, ReadError> {
        for layer in self.layers() {
            let layer = layer?;
            if layer.name() == name {
                return Ok(Some(layer));
            }
        }
        Ok(None)
    }
}

pub struct Layers<'a> {
    fields: MessageReader<'a>,
}

impl<'a> Iterator for Layers<'a> {
    type Item = Result<LayerView<'a>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let field = match self.fields.next()? {
                Ok(field) => field,
                Err(e) => return Some(Err(e)),
            };
            if field.tag == field::tile::LAYERS {
                return Some(field.as_bytes().and_then(LayerView::parse));
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerView<'a> {
    data: &'a [u8],
    name: &'a str,
    version: u32,
    extent: u32,
    keys: Vec<&'a str>,
    values: Vec<&'a [u8]>,
    features: Vec<&'a [u8]>,
}

impl<'a> LayerView<'a> {
    /// Parses the payload of one `layers` field.
    pub fn parse(data: &'a [u8]) -> Result<Self, ReadError> {
        let mut name = None;
        let mut version = 1;
        let mut extent = 4096;
        let mut keys = Vec::new();
        let mut values = Vec::new();
        let mut features = Vec::new();
        for f in MessageReader::new(data) {
            let f = f?;
            match f.tag {
                field::layer::NAME => name = Some(f.as_str()?),
                field::layer::FEATURES => features.push(f.as_bytes()?),
                field::layer::KEYS => keys.push(f.as_str()?),
                field::layer::VALUES => values.push(f.as_bytes()?),
                field::layer::EXTENT => extent = f.as_uint32()?,
                field::layer::VERSION => version = f.as_uint32()?,
                _ => {}
            }
        }
        Ok(Self {
            data,
            name: name.ok_or(ReadError::Malformed("layer has no name"))?,
            version,
            extent,
            keys,
            values,
            features,
        })
    }

    /// The layer message exactly as it was encoded.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn extent(&self) -> u32 {
        self.extent
    }

    pub fn key(&self, index: u32) -> Option<&'a str> {
        self.keys.get(index as usize).copied()
    }

    /// The encoded `Value` message at `index`.
    pub fn value(&self, index: u32) -> Option<&'a [u8]> {
        self.values.get(index as usize).copied()
    }

    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    pub fn features(&self) -> impl Iterator<Item = Result<FeatureView<'a>, ReadError>> + '_ {
        self.features.iter().map(|data| FeatureView::parse(*data))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FeatureView<'a> {
    id: u64,
    geom_type: GeomType,
    geometry: &'a [u8],
    tags: &'a [u8],
}

impl<'a> FeatureView<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, ReadError> {
        let mut feature = Self {
            id: 0,
            geom_type: GeomType::Unknown,
            geometry: &[],
            tags: &[],
        };
        for f in MessageReader::new(data) {
            let f = f?;
            match f.tag {
                field::feature::ID => feature.id = f.as_varint()?,
                field::feature::TAGS => feature.tags = f.as_bytes()?,
                field::feature::TYPE => {
                    feature.geom_type =
                        GeomType::try_from(f.as_varint()? as i32).unwrap_or(GeomType::Unknown)
                }
                field::feature::GEOMETRY => feature.geometry = f.as_bytes()?,
                _ => {}
            }
        }
        Ok(feature)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn geometry_type(&self) -> GeomType {
        self.geom_type
    }

    /// Payload of the packed `geometry` field.
    pub fn raw_geometry(&self) -> &'a [u8] {
        self.geometry
    }

    /// Resolves the feature's tag indices against `layer`, yielding each
    /// key with its still encoded `Value` message.
    pub fn tags<'l>(&self, layer: &'l LayerView<'a>) -> Tags<'a, 'l> {
        Tags {
            layer,
            indices: PackedVarints::new(self.tags),
        }
    }
}

pub struct Tags<'a, 'l> {
    layer: &'l LayerView<'a>,
    indices: PackedVarints<'a>,
}

impl<'a> Tags<'a, '_> {
    fn next_pair(&mut self, key: u64) -> Result<(&'a str, &'a [u8]), ReadError> {
        let value = self
            .indices
            .next()
            .ok_or(ReadError::Malformed("odd number of tag indices"))??;
        let key = u32::try_from(key)
            .ok()
            .and_then(|k| self.layer.key(k))
            .ok_or(ReadError::Malformed("tag key index out of range"))?;
        let value = u32::try_from(value)
            .ok()
            .and_then(|v| self.layer.value(v))
            .ok_or(ReadError::Malformed("tag value index out of range"))?;
        Ok((key, value))
    }
}

impl<'a> Iterator for Tags<'a, '_> {
    type Item = Result<(&'a str, &'a [u8]), ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = match self.indices.next()? {
            Ok(key) => key,
            Err(e) => return Some(Err(e)),
        };
        let pair = self.next_pair(key);
        if pair.is_err() {
            self.indices = PackedVarints::new(&[]);
        }
        Some(pair)
    }
}
