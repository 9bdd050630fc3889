//! Fully decoded tiles, built on the `prost` messages. Geometries are
//! resolved to absolute tile coordinates and tags to a property map.

use prost::{DecodeError, Message};
use rustc_hash::FxHashMap;

use crate::{
    geometry::{Command, CommandInteger, ParameterInteger, Point},
    pb::vector_tile::{self, tile},
};

pub type GeomType = tile::GeomType;
pub type Value = tile::Value;

pub struct Tile {
    pub layers: Vec<Layer>,
}

impl Tile {
    pub fn decode(bin: &[u8]) -> Result<Tile, DecodeError> {
        let tile = vector_tile::Tile::decode(bin)?;
        Ok(Self {
            layers: tile.layers.into_iter().map(Layer::from).collect(),
        })
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }
}

pub struct Layer {
    pub version: u32,
    pub name: String,
    pub extent: u32,
    pub features: Vec<Feature>,
}

impl From<tile::Layer> for Layer {
    fn from(layer: tile::Layer) -> Self {
        let extent = layer.extent();
        let keys = layer.keys;
        let values = layer.values;
        Self {
            version: layer.version,
            name: layer.name,
            extent,
            features: layer
                .features
                .into_iter()
                .map(|f| Feature::from(&keys, &values, f))
                .collect(),
        }
    }
}

pub struct Feature {
    pub id: u64,
    pub geom_type: GeomType,
    pub geometry: Geometry,
    pub props: FxHashMap<String, Value>,
}

impl Feature {
    fn from(keys: &[String], values: &[Value], feature: tile::Feature) -> Self {
        let mut props = FxHashMap::default();
        for pair in feature.tags.chunks_exact(2) {
            let key = keys.get(pair[0] as usize);
            let value = values.get(pair[1] as usize);
            if let (Some(k), Some(v)) = (key, value) {
                props.insert(k.clone(), v.clone());
            }
        }
        let geom_type = feature.r#type();
        let geometry = match geom_type {
            GeomType::Point => {
                decode_points(&feature.geometry).map(|points| Geometry::Point { points })
            }
            GeomType::Linestring => {
                decode_paths(&feature.geometry).map(|lines| Geometry::LineString { lines })
            }
            GeomType::Polygon => {
                decode_paths(&feature.geometry).map(|rings| Geometry::Polygon { rings })
            }
            GeomType::Unknown => None,
        }
        .unwrap_or(Geometry::UnKnown);
        Self {
            id: feature.id(),
            geom_type,
            geometry,
            props,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Geometry {
    UnKnown,
    Point { points: Vec<Point> },
    LineString { lines: Vec<Vec<Point>> },
    /// Rings are closed: the first point is repeated at the end.
    Polygon { rings: Vec<Vec<Point>> },
}

/// Walks a command stream, calling `on_command` for each command with its
/// decoded points. `None` if the stream is malformed.
fn walk(
    geometry: &[u32],
    mut on_command: impl FnMut(Command, Vec<Point>) -> Option<()>,
) -> Option<()> {
    let mut cursor = Point::default();
    let mut i = 0;
    while i < geometry.len() {
        let cmd = CommandInteger(geometry[i]);
        i += 1;
        let command = cmd.id()?;
        let count = cmd.count() as usize;
        let mut points = Vec::new();
        if command != Command::ClosePath {
            let params = geometry.get(i..i + count * 2)?;
            for pair in params.chunks_exact(2) {
                cursor.x = cursor.x.wrapping_add(ParameterInteger(pair[0]).value());
                cursor.y = cursor.y.wrapping_add(ParameterInteger(pair[1]).value());
                points.push(cursor);
            }
            i += count * 2;
        }
        on_command(command, points)?;
    }
    Some(())
}

fn decode_points(geometry: &[u32]) -> Option<Vec<Point>> {
    let mut all = Vec::new();
    walk(geometry, |command, points| {
        if command != Command::MoveTo {
            return None;
        }
        all.extend(points);
        Some(())
    })?;
    Some(all)
}

fn decode_paths(geometry: &[u32]) -> Option<Vec<Vec<Point>>> {
    let mut paths: Vec<Vec<Point>> = Vec::new();
    walk(geometry, |command, points| {
        match command {
            Command::MoveTo => paths.push(points),
            Command::LineTo => paths.last_mut()?.extend(points),
            Command::ClosePath => {
                let path = paths.last_mut()?;
                let first = *path.first()?;
                path.push(first);
            }
        }
        Some(())
    })?;
    Some(paths)
}
