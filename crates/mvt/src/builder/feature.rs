use log::{error, warn};
use rustitude_pbf::{Marker, MessageWriter};

use crate::{
    error::{BuildResult, Violation},
    geometry::{Command, GeometryEncoder, Point},
    pb::{field, vector_tile::tile::GeomType},
    value::PropertyValue,
};

use super::layer::LayerBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathKind {
    LineString,
    Ring,
}

impl PathKind {
    fn check_len(self, n: usize) -> Result<(), Violation> {
        match self {
            PathKind::LineString if n < 2 => Err(Violation::LineStringTooShort(n)),
            PathKind::Ring if n < 4 => Err(Violation::RingTooShort(n)),
            _ => Ok(()),
        }
    }

    /// Points of an `n` point path that follow the LineTo command: all but
    /// the first, and for rings also all but the closing one.
    fn line_to_count(self, n: usize) -> usize {
        match self {
            PathKind::LineString => n - 1,
            PathKind::Ring => n - 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathState {
    NeedPath,
    InPath {
        remaining: usize,
        awaiting_move: bool,
        first: Point,
    },
}

/// Encodes linestrings or polygon rings point by point.
#[derive(Debug, Clone)]
struct PathEncoder {
    kind: PathKind,
    state: PathState,
    encoder: GeometryEncoder,
    parts: usize,
}

impl PathEncoder {
    fn new(kind: PathKind) -> Self {
        Self {
            kind,
            state: PathState::NeedPath,
            encoder: GeometryEncoder::new(),
            parts: 0,
        }
    }

    fn check_start(&self, n: usize) -> BuildResult<()> {
        if let PathState::InPath { remaining, .. } = self.state {
            return Err(Violation::PointCountMismatch { remaining }.into());
        }
        self.kind.check_len(n)?;
        Command::LineTo.integer(self.kind.line_to_count(n))?;
        Ok(())
    }

    fn begin(&mut self, n: usize) {
        self.state = PathState::InPath {
            remaining: n,
            awaiting_move: true,
            first: Point::default(),
        };
    }

    fn add_point(&mut self, w: &mut MessageWriter, p: Point) -> BuildResult<()> {
        let PathState::InPath {
            remaining,
            awaiting_move,
            first,
        } = self.state
        else {
            return Err(Violation::NoPathStarted.into());
        };

        if awaiting_move {
            let line_to = Command::LineTo.integer(self.kind.line_to_count(remaining))?;
            self.encoder.command(w, Command::MoveTo, 1)?;
            self.encoder.point(w, p);
            w.push_varint(line_to as u64);
            self.state = PathState::InPath {
                remaining: remaining - 1,
                awaiting_move: false,
                first: p,
            };
            return Ok(());
        }

        if self.kind == PathKind::Ring && remaining == 1 {
            if p != first {
                return Err(Violation::RingNotClosed { first, last: p }.into());
            }
            // the closing point is implied, the cursor stays where it is
            self.encoder.command(w, Command::ClosePath, 1)?;
        } else {
            if p == self.encoder.cursor() {
                return Err(Violation::RepeatedPoint(p).into());
            }
            self.encoder.point(w, p);
        }

        self.state = if remaining == 1 {
            self.parts += 1;
            PathState::NeedPath
        } else {
            PathState::InPath {
                remaining: remaining - 1,
                awaiting_move: false,
                first,
            }
        };
        Ok(())
    }

    fn finish(&self) -> BuildResult<()> {
        match self.state {
            PathState::InPath { remaining, .. } => {
                Err(Violation::PointCountMismatch { remaining }.into())
            }
            PathState::NeedPath if self.parts == 0 => Err(Violation::MissingGeometry.into()),
            PathState::NeedPath => Ok(()),
        }
    }
}

/// What is left to do for the feature's geometry.
#[derive(Debug, Clone)]
enum GeometryState {
    /// Written in full when the builder was created.
    Written,
    Path(PathEncoder),
}

impl GeometryState {
    fn finish(&self) -> BuildResult<()> {
        match self {
            GeometryState::Written => Ok(()),
            GeometryState::Path(path) => path.finish(),
        }
    }
}

/// The feature message being written into the layer body, shared by all
/// feature builders.
struct FeatureCore<'l> {
    layer: &'l mut LayerBuilder,
    feature: Marker,
    tags: Option<Marker>,
    geometry: Option<Marker>,
    state: GeometryState,
    done: bool,
}

impl<'l> FeatureCore<'l> {
    fn new(layer: &'l mut LayerBuilder, id: u64, geom_type: GeomType, state: GeometryState) -> Self {
        let body = layer.body_mut();
        let feature = body.open_message(field::layer::FEATURES);
        body.add_uint64(field::feature::ID, id);
        body.add_enum(field::feature::TYPE, geom_type as i32);
        Self {
            layer,
            feature,
            tags: None,
            geometry: None,
            state,
            done: false,
        }
    }

    fn body(&mut self) -> &mut MessageWriter {
        self.layer.body_mut()
    }

    fn open_tags(&mut self) {
        let tags = self.body().open_message(field::feature::TAGS);
        self.tags = Some(tags);
    }

    fn write_points(&mut self, move_to: u32, points: &[Point]) {
        let body = self.layer.body_mut();
        let geometry = body.open_message(field::feature::GEOMETRY);
        body.push_varint(move_to as u64);
        let mut encoder = GeometryEncoder::new();
        for p in points {
            encoder.point(body, *p);
        }
        body.close_message(geometry);
    }

    fn add_tag(
        &mut self,
        key: &str,
        intern_value: impl FnOnce(&mut LayerBuilder) -> BuildResult<u32>,
    ) -> BuildResult<()> {
        if self.tags.is_none() {
            return Err(Violation::AttributeAfterGeometry.into());
        }
        let k = self.layer.intern_key(key)?;
        let v = intern_value(&mut *self.layer)?;
        let body = self.layer.body_mut();
        body.push_varint(k as u64);
        body.push_varint(v as u64);
        Ok(())
    }

    fn start_path(&mut self, n: usize) -> BuildResult<()> {
        let GeometryState::Path(path) = &mut self.state else {
            return Err(Violation::NoPathStarted.into());
        };
        path.check_start(n)?;
        let body = self.layer.body_mut();
        if let Some(tags) = self.tags.take() {
            body.close_packed(tags);
        }
        if self.geometry.is_none() {
            self.geometry = Some(body.open_message(field::feature::GEOMETRY));
        }
        path.begin(n);
        Ok(())
    }

    fn add_path_point(&mut self, p: Point) -> BuildResult<()> {
        let GeometryState::Path(path) = &mut self.state else {
            return Err(Violation::NoPathStarted.into());
        };
        path.add_point(self.layer.body_mut(), p)
    }

    fn commit(&mut self) -> BuildResult<()> {
        if let Err(e) = self.state.finish() {
            self.rollback();
            return Err(e);
        }
        let body = self.layer.body_mut();
        if let Some(tags) = self.tags.take() {
            body.close_packed(tags);
        }
        if let Some(geometry) = self.geometry.take() {
            body.close_message(geometry);
        }
        body.close_message(self.feature);
        self.layer.feature_committed();
        self.done = true;
        Ok(())
    }

    fn rollback(&mut self) {
        let feature = self.feature;
        self.body().rollback(feature);
        self.done = true;
    }
}

impl Drop for FeatureCore<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        match self.state.finish() {
            Err(e) => error!(
                "discarding unfinished feature in layer `{}`: {}",
                self.layer.name(),
                e
            ),
            Ok(()) => warn!(
                "feature in layer `{}` dropped without commit, discarding it",
                self.layer.name()
            ),
        }
        self.rollback();
    }
}

macro_rules! feature_methods {
    () => {
        /// Interns `key` and `value` into the layer and tags the feature
        /// with the pair.
        pub fn add_attribute<'v>(
            &mut self,
            key: &str,
            value: impl Into<PropertyValue<'v>>,
        ) -> BuildResult<()> {
            let value = value.into();
            self.core.add_tag(key, |layer| layer.intern_value(value))
        }

        /// Like [`add_attribute`](Self::add_attribute) with a value that is
        /// already an encoded `Value` message.
        pub fn add_encoded_attribute(&mut self, key: &str, value: &[u8]) -> BuildResult<()> {
            self.core.add_tag(key, |layer| layer.intern_encoded_value(value))
        }

        /// Finishes the feature. On error nothing of it stays in the layer.
        pub fn commit(mut self) -> BuildResult<()> {
            self.core.commit()
        }

        /// Removes everything written for this feature from the layer.
        pub fn rollback(mut self) {
            self.core.rollback();
        }
    };
}

/// Feature with an already encoded geometry, as copied from another tile.
pub struct GeometryFeatureBuilder<'l> {
    core: FeatureCore<'l>,
}

impl<'l> GeometryFeatureBuilder<'l> {
    /// `geometry` is the payload of a packed `geometry` field.
    pub fn new(layer: &'l mut LayerBuilder, id: u64, geom_type: GeomType, geometry: &[u8]) -> Self {
        let mut core = FeatureCore::new(layer, id, geom_type, GeometryState::Written);
        core.body().add_bytes(field::feature::GEOMETRY, geometry);
        core.open_tags();
        Self { core }
    }

    feature_methods!();
}

pub struct PointFeatureBuilder<'l> {
    core: FeatureCore<'l>,
}

impl<'l> PointFeatureBuilder<'l> {
    pub fn new(layer: &'l mut LayerBuilder, id: u64, p: impl Into<Point>) -> Self {
        Self::with_points(layer, id, Command::MoveTo.encode(1), &[p.into()])
    }

    /// A multipoint: one MoveTo carrying every point.
    pub fn multi(layer: &'l mut LayerBuilder, id: u64, points: &[Point]) -> BuildResult<Self> {
        if points.is_empty() {
            return Err(Violation::EmptyMultiPoint.into());
        }
        let move_to = Command::MoveTo.integer(points.len())?;
        Ok(Self::with_points(layer, id, move_to, points))
    }

    fn with_points(layer: &'l mut LayerBuilder, id: u64, move_to: u32, points: &[Point]) -> Self {
        let mut core = FeatureCore::new(layer, id, GeomType::Point, GeometryState::Written);
        core.write_points(move_to, points);
        core.open_tags();
        Self { core }
    }

    feature_methods!();
}

/// Linestring and multi-linestring features.
///
/// All attributes must be added before the first [`start_linestring`].
/// Each linestring declares its point count up front and must receive
/// exactly that many points before the next one starts or the feature is
/// committed.
///
/// [`start_linestring`]: Self::start_linestring
pub struct LineStringFeatureBuilder<'l> {
    core: FeatureCore<'l>,
}

impl<'l> LineStringFeatureBuilder<'l> {
    pub fn new(layer: &'l mut LayerBuilder, id: u64) -> Self {
        let state = GeometryState::Path(PathEncoder::new(PathKind::LineString));
        let mut core = FeatureCore::new(layer, id, GeomType::Linestring, state);
        core.open_tags();
        Self { core }
    }

    pub fn start_linestring(&mut self, num_points: usize) -> BuildResult<()> {
        self.core.start_path(num_points)
    }

    pub fn add_point(&mut self, p: impl Into<Point>) -> BuildResult<()> {
        self.core.add_path_point(p.into())
    }

    pub fn add_linestring(&mut self, points: &[Point]) -> BuildResult<()> {
        self.start_linestring(points.len())?;
        points.iter().try_for_each(|p| self.add_point(*p))
    }

    feature_methods!();
}

/// Polygon and multi-polygon features, ring by ring.
///
/// A ring of `n` points ends on its first point; that last point is written
/// as a ClosePath command. Ring orientation is not checked.
pub struct PolygonFeatureBuilder<'l> {
    core: FeatureCore<'l>,
}

impl<'l> PolygonFeatureBuilder<'l> {
    pub fn new(layer: &'l mut LayerBuilder, id: u64) -> Self {
        let state = GeometryState::Path(PathEncoder::new(PathKind::Ring));
        let mut core = FeatureCore::new(layer, id, GeomType::Polygon, state);
        core.open_tags();
        Self { core }
    }

    pub fn start_ring(&mut self, num_points: usize) -> BuildResult<()> {
        self.core.start_path(num_points)
    }

    pub fn add_point(&mut self, p: impl Into<Point>) -> BuildResult<()> {
        self.core.add_path_point(p.into())
    }

    pub fn add_ring(&mut self, points: &[Point]) -> BuildResult<()> {
        self.start_ring(points.len())?;
        points.iter().try_for_each(|p| self.add_point(*p))
    }

    feature_methods!();
}
