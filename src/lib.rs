pub mod merge;

pub use merge::{filter_features, merge_tiles};
pub use rustitude_mvt::{
    decoded, BuildError, BuildResult, Capacity, FeatureView, GeomType, GeometryFeatureBuilder,
    LayerBuilder, LayerOptions, LayerView, LineStringFeatureBuilder, Point, PointFeatureBuilder,
    PolygonFeatureBuilder, PropertyValue, TileBuilder, VectorTile, Violation,
};
pub use rustitude_pbf as pbf;
