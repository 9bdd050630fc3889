//! Incremental encoder for Mapbox Vector Tiles.
//!
//! A [`TileBuilder`] owns its layers; each [`LayerBuilder`] interns attribute
//! keys and values and is borrowed by one feature builder at a time while a
//! feature is written straight into the layer's buffer.
//!
//! ```
//! use rustitude_mvt::{PointFeatureBuilder, TileBuilder};
//!
//! let mut tile = TileBuilder::new();
//! let layer = tile.add_layer("pois");
//! let mut feature = PointFeatureBuilder::new(layer, 1, (25, 17));
//! feature.add_attribute("name", "x")?;
//! feature.commit()?;
//! let bytes = tile.serialize();
//! # assert!(!bytes.is_empty());
//! # Ok::<(), rustitude_mvt::BuildError>(())
//! ```

pub mod builder;
pub mod decoded;
pub mod dictionary;
pub mod error;
pub mod geometry;
pub mod pb;
pub mod reader;
pub mod value;

pub use builder::{
    GeometryFeatureBuilder, LayerBuilder, LayerEntry, LayerOptions, LineStringFeatureBuilder,
    PointFeatureBuilder, PolygonFeatureBuilder, TileBuilder,
};
pub use error::{BuildError, BuildResult, Capacity, Violation};
pub use geometry::Point;
pub use pb::vector_tile::tile::GeomType;
pub use reader::{FeatureView, LayerView, VectorTile};
pub use value::PropertyValue;
