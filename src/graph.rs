//! Graph model: vertex positions, edges, label offsets and styling.
//!
//! Two tiers of mutation are offered. The `set_*` methods assign whole
//! tables without checking anything, which is the fast path for building a
//! figure from known-good data. The `add_*` methods check every reference
//! as they go. Whatever the raw tier lets through is caught when the graph
//! is drawn.

use crate::color::Color;
use crate::error::{Error, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};

/// Identifier of a vertex. Integers and strings are both common in figures.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VertexId {
    Int(i64),
    Name(String),
}

impl VertexId {
    /// Reads an id from text: anything that parses as an integer is an
    /// integer id, so `"3"` names vertex 3.
    pub fn parse(text: &str) -> Self {
        match text.trim().parse::<i64>() {
            Ok(value) => VertexId::Int(value),
            Err(_) => VertexId::Name(text.to_string()),
        }
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexId::Int(value) => write!(f, "{value}"),
            VertexId::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for VertexId {
    fn from(value: i64) -> Self {
        VertexId::Int(value)
    }
}

impl From<i32> for VertexId {
    fn from(value: i32) -> Self {
        VertexId::Int(value.into())
    }
}

impl From<u32> for VertexId {
    fn from(value: u32) -> Self {
        VertexId::Int(value.into())
    }
}

impl From<usize> for VertexId {
    fn from(value: usize) -> Self {
        VertexId::Int(value as i64)
    }
}

impl From<&str> for VertexId {
    fn from(value: &str) -> Self {
        VertexId::Name(value.to_string())
    }
}

impl From<String> for VertexId {
    fn from(value: String) -> Self {
        VertexId::Name(value)
    }
}

impl From<&VertexId> for VertexId {
    fn from(value: &VertexId) -> Self {
        value.clone()
    }
}

impl Serialize for VertexId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            VertexId::Int(value) => serializer.serialize_i64(*value),
            VertexId::Name(name) => serializer.serialize_str(name),
        }
    }
}

struct VertexIdVisitor;

impl Visitor<'_> for VertexIdVisitor {
    type Value = VertexId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a string vertex id")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<VertexId, E> {
        Ok(VertexId::Int(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<VertexId, E> {
        i64::try_from(value)
            .map(VertexId::Int)
            .map_err(|_| E::custom(format!("vertex id {value} is out of range")))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<VertexId, E> {
        // json5 reports every number as a float.
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Ok(VertexId::Int(value as i64))
        } else {
            Err(E::custom(format!("vertex id {value} is not an integer")))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<VertexId, E> {
        // Object keys always arrive as strings.
        Ok(VertexId::parse(value))
    }
}

impl<'de> Deserialize<'de> for VertexId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(VertexIdVisitor)
    }
}

/// A 2D coordinate or offset in data units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at distance `r` and angle `theta_degrees` (CCW from +x) from the origin.
    pub fn polar(r: f64, theta_degrees: f64) -> Self {
        let angle = theta_degrees.to_radians();
        Self::new(r * angle.cos(), r * angle.sin())
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Edge structure of a graph.
///
/// `Pairs` is a flat list of undirected edges. `Adjacency` maps a vertex to
/// its neighbor list; each stored `(key, neighbor)` record is drawn once, so
/// an edge added only under one endpoint is still a single segment.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeSet {
    Pairs(Vec<(VertexId, VertexId)>),
    Adjacency(BTreeMap<VertexId, Vec<VertexId>>),
}

impl EdgeSet {
    pub fn pairs() -> Self {
        EdgeSet::Pairs(Vec::new())
    }

    pub fn adjacency() -> Self {
        EdgeSet::Adjacency(BTreeMap::new())
    }

    /// Number of stored edge records.
    pub fn len(&self) -> usize {
        match self {
            EdgeSet::Pairs(pairs) => pairs.len(),
            EdgeSet::Adjacency(map) => map.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EdgeSet {
    fn default() -> Self {
        EdgeSet::pairs()
    }
}

impl<U: Into<VertexId>, V: Into<VertexId>> FromIterator<(U, V)> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = (U, V)>>(iter: I) -> Self {
        EdgeSet::Pairs(iter.into_iter().map(|(u, v)| (u.into(), v.into())).collect())
    }
}

/// How vertex labels are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelStyle {
    /// `v` with the vertex id as a subscript.
    #[default]
    Indexed,
    /// The vertex id as written.
    Raw,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    vertices: BTreeMap<VertexId, Point>,
    edges: EdgeSet,
    label_positions: BTreeMap<VertexId, Point>,
    graph_label: BTreeMap<String, Point>,
    label_style: LabelStyle,
    node_colors: BTreeMap<VertexId, Color>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vertices<I, V, P>(vertices: I) -> Self
    where
        I: IntoIterator<Item = (V, P)>,
        V: Into<VertexId>,
        P: Into<Point>,
    {
        let mut graph = Self::new();
        graph.set_vertices(vertices);
        graph
    }

    pub fn with_edges(mut self, edges: EdgeSet) -> Self {
        self.edges = edges;
        self
    }

    pub fn vertices(&self) -> &BTreeMap<VertexId, Point> {
        &self.vertices
    }

    pub fn vertex(&self, id: &VertexId) -> Option<Point> {
        self.vertices.get(id).copied()
    }

    pub fn contains_vertex(&self, id: &VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn label_positions(&self) -> &BTreeMap<VertexId, Point> {
        &self.label_positions
    }

    pub fn graph_label(&self) -> &BTreeMap<String, Point> {
        &self.graph_label
    }

    pub fn label_style(&self) -> LabelStyle {
        self.label_style
    }

    pub fn node_colors(&self) -> &BTreeMap<VertexId, Color> {
        &self.node_colors
    }

    // Raw tier: nothing below is validated until the graph is drawn.

    pub fn set_vertices<I, V, P>(&mut self, vertices: I)
    where
        I: IntoIterator<Item = (V, P)>,
        V: Into<VertexId>,
        P: Into<Point>,
    {
        self.vertices = vertices
            .into_iter()
            .map(|(id, pos)| (id.into(), pos.into()))
            .collect();
    }

    pub fn set_edges(&mut self, edges: EdgeSet) {
        self.edges = edges;
    }

    pub fn set_label_positions<I, V, P>(&mut self, offsets: I)
    where
        I: IntoIterator<Item = (V, P)>,
        V: Into<VertexId>,
        P: Into<Point>,
    {
        self.label_positions = offsets
            .into_iter()
            .map(|(id, offset)| (id.into(), offset.into()))
            .collect();
    }

    /// Sets (or replaces) the label offset of a single vertex.
    pub fn set_label_position(&mut self, id: impl Into<VertexId>, offset: impl Into<Point>) {
        self.label_positions.insert(id.into(), offset.into());
    }

    pub fn set_graph_label<I, S, P>(&mut self, captions: I)
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: Into<Point>,
    {
        self.graph_label = captions
            .into_iter()
            .map(|(text, pos)| (text.into(), pos.into()))
            .collect();
    }

    pub fn set_label_style(&mut self, style: LabelStyle) {
        self.label_style = style;
    }

    pub fn set_node_colors<I, V>(&mut self, colors: I)
    where
        I: IntoIterator<Item = (V, Color)>,
        V: Into<VertexId>,
    {
        self.node_colors = colors.into_iter().map(|(id, color)| (id.into(), color)).collect();
    }

    // Validated tier.

    /// Adds `v` at the absolute position `pos`.
    pub fn add_vertex(&mut self, v: impl Into<VertexId>, pos: impl Into<Point>) -> Result<()> {
        self.insert_vertex(v.into(), pos.into(), None)
    }

    /// Adds `v` at `pos` measured from the existing vertex `anchor`.
    pub fn add_vertex_relative(
        &mut self,
        v: impl Into<VertexId>,
        pos: impl Into<Point>,
        anchor: impl Into<VertexId>,
    ) -> Result<()> {
        self.insert_vertex(v.into(), pos.into(), Some(anchor.into()))
    }

    /// Adds `v` at distance `r` and angle `theta_degrees` from `anchor`.
    ///
    /// The angle is measured counterclockwise from the horizontal line
    /// through the anchor.
    pub fn add_vertex_polar(
        &mut self,
        v: impl Into<VertexId>,
        r: f64,
        theta_degrees: f64,
        anchor: impl Into<VertexId>,
    ) -> Result<()> {
        self.insert_vertex(v.into(), Point::polar(r, theta_degrees), Some(anchor.into()))
    }

    fn insert_vertex(&mut self, v: VertexId, offset: Point, anchor: Option<VertexId>) -> Result<()> {
        if self.vertices.contains_key(&v) {
            return Err(Error::DuplicateVertex(v));
        }
        let origin = match anchor {
            Some(anchor) => self.vertices.get(&anchor).copied().ok_or(Error::UnknownVertex(anchor))?,
            None => Point::ORIGIN,
        };
        self.vertices.insert(v, origin + offset);
        Ok(())
    }

    /// Adds the edge `{u, v}`. In adjacency form the record is stored under `u` only.
    pub fn add_edge(&mut self, u: impl Into<VertexId>, v: impl Into<VertexId>) -> Result<()> {
        let u = u.into();
        let v = v.into();
        for endpoint in [&u, &v] {
            if !self.vertices.contains_key(endpoint) {
                return Err(Error::UnknownVertex(endpoint.clone()));
            }
        }
        match &mut self.edges {
            EdgeSet::Pairs(pairs) => pairs.push((u, v)),
            EdgeSet::Adjacency(map) => map.entry(u).or_default().push(v),
        }
        Ok(())
    }

    /// Adds every edge in `edges`, in order.
    ///
    /// Each item must hold exactly two vertex ids; a malformed list is
    /// rejected before any edge is added. Otherwise edges are added one at
    /// a time and the first unknown endpoint stops the loop, keeping the
    /// edges added before it.
    pub fn add_edges<I, E, V>(&mut self, edges: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
        E: IntoIterator<Item = V>,
        V: Into<VertexId>,
    {
        let mut pairs = Vec::new();
        for (idx, edge) in edges.into_iter().enumerate() {
            let ends: Vec<VertexId> = edge.into_iter().map(Into::into).collect();
            let [u, v]: [VertexId; 2] = ends.try_into().map_err(|ends: Vec<VertexId>| {
                Error::InvalidArgument(format!(
                    "edge {idx} has {} endpoints, expected a pair",
                    ends.len()
                ))
            })?;
            pairs.push((u, v));
        }
        for (u, v) in pairs {
            self.add_edge(u, v)?;
        }
        Ok(())
    }

    /// Translates every vertex by `(dx, dy)`.
    pub fn shift_vertices(&mut self, dx: f64, dy: f64) {
        let delta = Point::new(dx, dy);
        for pos in self.vertices.values_mut() {
            *pos += delta;
        }
    }

    /// Independent copy of the structure: vertices, edges, label offsets
    /// and captions. Node colors and the label style are not carried over.
    pub fn copy(&self) -> Graph {
        Graph {
            vertices: self.vertices.clone(),
            edges: self.edges.clone(),
            label_positions: self.label_positions.clone(),
            graph_label: self.graph_label.clone(),
            ..Graph::default()
        }
    }
}
