use prost::Message;
use rustitude_pbf::MessageWriter;

use super::*;
use crate::{
    decoded::{self, Geometry},
    error::{BuildError, Violation},
    geometry::Point,
    pb::vector_tile::{self, tile::GeomType},
    reader::VectorTile,
};

fn p(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

fn raw_layer(layer: &LayerBuilder) -> vector_tile::tile::Layer {
    let mut w = MessageWriter::new();
    layer.build(&mut w);
    vector_tile::Tile::decode(w.data()).unwrap().layers.remove(0)
}

#[test]
fn test_point_round_trip() {
    let mut tile = TileBuilder::new();
    let layer = tile.add_layer("pois");
    let mut feature = PointFeatureBuilder::new(layer, 1, (25, 17));
    feature.add_attribute("name", "x").unwrap();
    feature.commit().unwrap();

    let decoded = decoded::Tile::decode(&tile.serialize()).unwrap();
    let layer = decoded.layer("pois").unwrap();
    assert_eq!(layer.version, 2);
    assert_eq!(layer.extent, 4096);
    assert_eq!(layer.features.len(), 1);
    let f = &layer.features[0];
    assert_eq!(f.id, 1);
    assert_eq!(f.geom_type, GeomType::Point);
    assert_eq!(f.geometry, Geometry::Point { points: vec![p(25, 17)] });
    assert_eq!(f.props.len(), 1);
    assert_eq!(f.props["name"].string_value(), "x");
}

#[test]
fn test_point_wire_bytes() {
    let mut layer = LayerBuilder::new("pois", LayerOptions::default());
    let mut feature = PointFeatureBuilder::new(&mut layer, 1, (25, 17));
    feature.add_attribute("name", "x").unwrap();
    feature.commit().unwrap();

    let raw = raw_layer(&layer);
    let f = &raw.features[0];
    assert_eq!(f.geometry, vec![9, 50, 34]);
    assert_eq!(f.tags, vec![0, 0]);
}

#[test]
fn test_point_without_attributes_has_no_tags_field() {
    let mut layer = LayerBuilder::new("pois", LayerOptions::default());
    PointFeatureBuilder::new(&mut layer, 9, (0, 0)).commit().unwrap();
    // feature: id, type, geometry; no empty tags field
    let expected_feature = [0x08, 0x09, 0x18, 0x01, 0x22, 0x03, 0x09, 0x00, 0x00];
    assert!(layer.data().ends_with(&expected_feature));
    assert_eq!(layer.num_features(), 1);
}

#[test]
fn test_multipoint() {
    let mut layer = LayerBuilder::new("pois", LayerOptions::default());
    PointFeatureBuilder::multi(&mut layer, 2, &[p(5, 7), p(3, 2)])
        .unwrap()
        .commit()
        .unwrap();
    assert_eq!(raw_layer(&layer).features[0].geometry, vec![17, 10, 14, 3, 9]);

    assert_eq!(
        PointFeatureBuilder::multi(&mut layer, 3, &[]).err(),
        Some(BuildError::ProtocolViolation(Violation::EmptyMultiPoint))
    );
    assert_eq!(layer.num_features(), 1);
}

#[test]
fn test_linestring_point_counts() {
    let mut layer = LayerBuilder::new("roads", LayerOptions::default());
    let mut line = LineStringFeatureBuilder::new(&mut layer, 1);
    line.add_attribute("kind", "primary").unwrap();
    line.start_linestring(3).unwrap();
    line.add_point((2, 2)).unwrap();
    line.add_point((2, 10)).unwrap();
    line.add_point((10, 10)).unwrap();
    assert_eq!(
        line.add_point((11, 11)),
        Err(BuildError::ProtocolViolation(Violation::NoPathStarted))
    );
    // ready for another part
    line.start_linestring(2).unwrap();
    line.add_point((1, 1)).unwrap();
    line.add_point((3, 5)).unwrap();
    line.commit().unwrap();

    let raw = raw_layer(&layer);
    assert_eq!(
        raw.features[0].geometry,
        vec![9, 4, 4, 18, 0, 16, 16, 0, 9, 17, 17, 10, 4, 8]
    );
    assert_eq!(raw.features[0].r#type(), GeomType::Linestring);
    assert_eq!(raw.features[0].tags, vec![0, 0]);
}

#[test]
fn test_linestring_missing_points() {
    let mut layer = LayerBuilder::new("roads", LayerOptions::default());
    let before = layer.data().len();
    let mut line = LineStringFeatureBuilder::new(&mut layer, 1);
    line.start_linestring(3).unwrap();
    line.add_point((0, 0)).unwrap();
    line.add_point((1, 0)).unwrap();
    assert_eq!(
        line.commit(),
        Err(BuildError::ProtocolViolation(
            Violation::PointCountMismatch { remaining: 1 }
        ))
    );
    // the failed feature leaves nothing behind
    assert_eq!(layer.data().len(), before);
    assert_eq!(layer.num_features(), 0);
}

#[test]
fn test_linestring_protocol() {
    let mut layer = LayerBuilder::new("roads", LayerOptions::default());
    let mut line = LineStringFeatureBuilder::new(&mut layer, 1);
    assert_eq!(
        line.add_point((0, 0)),
        Err(BuildError::ProtocolViolation(Violation::NoPathStarted))
    );
    assert_eq!(
        line.start_linestring(1),
        Err(BuildError::ProtocolViolation(Violation::LineStringTooShort(1)))
    );
    line.start_linestring(3).unwrap();
    assert_eq!(
        line.add_attribute("kind", "path"),
        Err(BuildError::ProtocolViolation(Violation::AttributeAfterGeometry))
    );
    assert_eq!(
        line.start_linestring(2),
        Err(BuildError::ProtocolViolation(
            Violation::PointCountMismatch { remaining: 3 }
        ))
    );
    line.add_point((4, 4)).unwrap();
    assert_eq!(
        line.add_point((4, 4)),
        Err(BuildError::ProtocolViolation(Violation::RepeatedPoint(p(4, 4))))
    );
    // rejected calls write nothing, the linestring can still be finished
    line.add_point((5, 4)).unwrap();
    line.add_point((5, 5)).unwrap();
    line.commit().unwrap();

    let raw = raw_layer(&layer);
    assert_eq!(raw.features[0].geometry, vec![9, 8, 8, 18, 2, 0, 0, 2]);
    assert!(raw.keys.is_empty());
}

#[test]
fn test_linestring_without_geometry() {
    let mut layer = LayerBuilder::new("roads", LayerOptions::default());
    let mut line = LineStringFeatureBuilder::new(&mut layer, 1);
    line.add_attribute("kind", "path").unwrap();
    assert_eq!(
        line.commit(),
        Err(BuildError::ProtocolViolation(Violation::MissingGeometry))
    );
    assert_eq!(layer.num_features(), 0);
}

#[test]
fn test_add_linestring() {
    let mut layer = LayerBuilder::new("roads", LayerOptions::default());
    let mut line = LineStringFeatureBuilder::new(&mut layer, 5);
    line.add_linestring(&[p(2, 2), p(2, 10), p(10, 10)]).unwrap();
    line.commit().unwrap();
    assert_eq!(
        raw_layer(&layer).features[0].geometry,
        vec![9, 4, 4, 18, 0, 16, 16, 0]
    );
}

#[test]
fn test_polygon() {
    let mut layer = LayerBuilder::new("water", LayerOptions::default());
    let mut polygon = PolygonFeatureBuilder::new(&mut layer, 1);
    polygon.add_attribute("natural", "water").unwrap();
    polygon
        .add_ring(&[p(3, 6), p(8, 12), p(20, 34), p(3, 6)])
        .unwrap();
    polygon.commit().unwrap();

    let raw = raw_layer(&layer);
    assert_eq!(raw.features[0].r#type(), GeomType::Polygon);
    assert_eq!(raw.features[0].geometry, vec![9, 6, 12, 18, 10, 12, 24, 44, 15]);
}

#[test]
fn test_multipolygon_decodes() {
    let mut tile = TileBuilder::new();
    let layer = tile.add_layer("water");
    let mut polygon = PolygonFeatureBuilder::new(layer, 7);
    let outer = [p(0, 0), p(10, 0), p(10, 10), p(0, 10), p(0, 0)];
    let hole = [p(2, 2), p(2, 4), p(4, 4), p(2, 2)];
    polygon.add_ring(&outer).unwrap();
    polygon.add_ring(&hole).unwrap();
    polygon.commit().unwrap();

    let decoded = decoded::Tile::decode(&tile.serialize()).unwrap();
    let f = &decoded.layer("water").unwrap().features[0];
    assert_eq!(
        f.geometry,
        Geometry::Polygon {
            rings: vec![outer.to_vec(), hole.to_vec()]
        }
    );
}

#[test]
fn test_polygon_protocol() {
    let mut layer = LayerBuilder::new("water", LayerOptions::default());
    let mut polygon = PolygonFeatureBuilder::new(&mut layer, 1);
    assert_eq!(
        polygon.start_ring(3),
        Err(BuildError::ProtocolViolation(Violation::RingTooShort(3)))
    );
    polygon.start_ring(4).unwrap();
    polygon.add_point((0, 0)).unwrap();
    polygon.add_point((5, 0)).unwrap();
    polygon.add_point((5, 5)).unwrap();
    assert_eq!(
        polygon.add_point((1, 1)),
        Err(BuildError::ProtocolViolation(Violation::RingNotClosed {
            first: p(0, 0),
            last: p(1, 1)
        }))
    );
    polygon.add_point((0, 0)).unwrap();
    polygon.commit().unwrap();
    assert_eq!(layer.num_features(), 1);
}

#[test]
fn test_geometry_passthrough() {
    let mut layer = LayerBuilder::new("roads", LayerOptions::default());
    let geometry = [9u8, 4, 4, 18, 0, 16, 16, 0];
    let mut feature = GeometryFeatureBuilder::new(&mut layer, 3, GeomType::Linestring, &geometry);
    feature.add_attribute("kind", "path").unwrap();
    feature.add_attribute("lanes", 2u64).unwrap();
    feature.commit().unwrap();

    let raw = raw_layer(&layer);
    let f = &raw.features[0];
    assert_eq!(f.id(), 3);
    assert_eq!(f.r#type(), GeomType::Linestring);
    assert_eq!(f.geometry, vec![9, 4, 4, 18, 0, 16, 16, 0]);
    assert_eq!(f.tags, vec![0, 0, 1, 1]);
    assert_eq!(raw.values[1].uint_value, Some(2));
}

#[test]
fn test_rollback_and_drop() {
    let mut layer = LayerBuilder::new("pois", LayerOptions::default());
    let before = layer.data().to_vec();

    let mut feature = PointFeatureBuilder::new(&mut layer, 1, (1, 1));
    feature.add_attribute("name", "gone").unwrap();
    feature.rollback();
    assert_eq!(layer.data(), before.as_slice());

    {
        let mut line = LineStringFeatureBuilder::new(&mut layer, 2);
        line.start_linestring(2).unwrap();
        line.add_point((0, 0)).unwrap();
    }
    assert_eq!(layer.data(), before.as_slice());

    {
        let _forgotten = PointFeatureBuilder::new(&mut layer, 3, (1, 1));
    }
    assert_eq!(layer.data(), before.as_slice());
    assert_eq!(layer.num_features(), 0);
    // the dictionaries keep what was interned
    assert_eq!(layer.intern_key("name").unwrap(), 0);
}

#[test]
fn test_shared_dictionaries() {
    let mut tile = TileBuilder::new();
    let layer = tile.add_layer("pois");
    for (id, name) in [(1, "a"), (2, "b"), (3, "a")] {
        let mut f = PointFeatureBuilder::new(&mut *layer, id, (id as i32, 0));
        f.add_attribute("name", name).unwrap();
        f.add_attribute("rank", id as i64).unwrap();
        f.commit().unwrap();
    }
    let raw = vector_tile::Tile::decode(tile.serialize().as_slice()).unwrap();
    let layer = &raw.layers[0];
    assert_eq!(layer.keys, vec!["name".to_string(), "rank".to_string()]);
    assert_eq!(layer.values.len(), 5);
    assert_eq!(layer.features[0].tags, vec![0, 0, 1, 1]);
    assert_eq!(layer.features[1].tags, vec![0, 2, 1, 3]);
    assert_eq!(layer.features[2].tags, vec![0, 0, 1, 4]);
}

#[test]
fn test_serialize_twice() {
    let mut tile = TileBuilder::new();
    let layer = tile.add_layer("pois");
    let mut f = PointFeatureBuilder::new(layer, 1, (25, 17));
    f.add_attribute("name", "x").unwrap();
    f.commit().unwrap();
    tile.add_layer_with_options("empty", LayerOptions { version: 1, extent: 512 });

    let first = tile.serialize();
    let second = tile.serialize();
    assert_eq!(first, second);
    assert_eq!(first.len(), tile.encoded_len());

    let mut appended = vec![0xff];
    tile.serialize_into(&mut appended);
    assert_eq!(appended[0], 0xff);
    assert_eq!(&appended[1..], first.as_slice());
}

#[test]
fn test_layer_order() {
    let mut tile = TileBuilder::new();
    for name in ["c", "a", "b"] {
        tile.add_layer(name);
    }
    assert_eq!(tile.len(), 3);
    let decoded = decoded::Tile::decode(&tile.serialize()).unwrap();
    let names: Vec<&str> = decoded.layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[test]
fn test_layer_with_data_is_verbatim() {
    let mut source = TileBuilder::new();
    let layer = source.add_layer_with_options("roads", LayerOptions { version: 2, extent: 512 });
    let mut line = LineStringFeatureBuilder::new(layer, 1);
    line.add_attribute("kind", "primary").unwrap();
    line.add_linestring(&[p(0, 0), p(3, 4)]).unwrap();
    line.commit().unwrap();
    let source_bytes = source.serialize();

    let view = VectorTile::new(&source_bytes)
        .layer_by_name("roads")
        .unwrap()
        .unwrap();
    let mut target = TileBuilder::new();
    target.add_layer_with_data(&view);
    let out = target.serialize();
    assert_eq!(out, source_bytes);

    let copied = VectorTile::new(&out).layers().next().unwrap().unwrap();
    assert_eq!(copied.data(), view.data());
}

#[test]
fn test_copy_features_between_layers() {
    let mut source = TileBuilder::new();
    let layer = source.add_layer("pois");
    for id in 1..=3u64 {
        let mut f = PointFeatureBuilder::new(&mut *layer, id, (id as i32, id as i32));
        f.add_attribute("id", id).unwrap();
        f.add_attribute("name", "same").unwrap();
        f.commit().unwrap();
    }
    let source_bytes = source.serialize();

    let src = VectorTile::new(&source_bytes);
    let view = src.layer_by_name("pois").unwrap().unwrap();
    let mut target = TileBuilder::new();
    let layer = target.add_layer_like(&view);
    for feature in view.features() {
        let feature = feature.unwrap();
        if feature.id() != 2 {
            layer.add_feature(&feature, &view).unwrap();
        }
    }
    assert_eq!(layer.num_features(), 2);

    let decoded = decoded::Tile::decode(&target.serialize()).unwrap();
    let features = &decoded.layer("pois").unwrap().features;
    assert_eq!(features.len(), 2);
    assert_eq!(features[1].id, 3);
    assert_eq!(features[1].geometry, Geometry::Point { points: vec![p(3, 3)] });
    assert_eq!(features[1].props["id"].uint_value, Some(3));
    assert_eq!(features[1].props["name"].string_value(), "same");
}
