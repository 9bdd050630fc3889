use log::debug;
use rustitude_mvt::{BuildResult, FeatureView, LayerView, TileBuilder, VectorTile};

/// Concatenates the layers of `tiles`, in order, without re-encoding any of
/// them. Layer names are not checked for uniqueness.
pub fn merge_tiles(tiles: &[&[u8]]) -> BuildResult<Vec<u8>> {
    let mut builder = TileBuilder::new();
    for data in tiles {
        for layer in VectorTile::new(*data).layers() {
            builder.add_layer_with_data(&layer?);
        }
    }
    debug!("merging {} tiles into {} layers", tiles.len(), builder.len());
    Ok(builder.serialize())
}

/// Re-encodes the layer called `layer_name`, keeping the features for which
/// `keep` returns true. Every other layer is passed through untouched.
pub fn filter_features<F>(tile: &[u8], layer_name: &str, mut keep: F) -> BuildResult<Vec<u8>>
where
    F: FnMut(&FeatureView<'_>, &LayerView<'_>) -> bool,
{
    let mut builder = TileBuilder::new();
    for layer in VectorTile::new(tile).layers() {
        let layer = layer?;
        if layer.name() != layer_name {
            builder.add_layer_with_data(&layer);
            continue;
        }
        let target = builder.add_layer_like(&layer);
        for feature in layer.features() {
            let feature = feature?;
            if keep(&feature, &layer) {
                target.add_feature(&feature, &layer)?;
            }
        }
        debug!(
            "kept {} of {} features of layer `{}`",
            target.num_features(),
            layer.num_features(),
            layer_name
        );
    }
    Ok(builder.serialize())
}
