mod feature;
mod layer;
mod tile;

pub use feature::{
    GeometryFeatureBuilder, LineStringFeatureBuilder, PointFeatureBuilder, PolygonFeatureBuilder,
};
pub use layer::{LayerBuilder, LayerOptions};
pub use tile::{LayerEntry, TileBuilder};

#[cfg(test)]
mod tests;
