//! Declarative figure descriptions.
//!
//! A scene is a JSON5 document holding an optional style block and a list
//! of graphs:
//!
//! ```json5
//! {
//!   style: { figSize: [7, 7] },
//!   graphs: [
//!     {
//!       circle: { n: 8, radius: 2 },
//!       edges: [[1, 7], [2, 3], [4, 1]],
//!       graphLabel: { "G": [0, -3] },
//!     },
//!     {
//!       vertices: { "6": [3, 0] },
//!       place: [
//!         { id: 7, at: [-1, 1.75], from: 6 },
//!         { id: 8, r: 2, theta: 180, from: 7 },
//!       ],
//!       edges: { "6": [7], "7": [8] },
//!       labelPositions: { "6": [0.4, 0], "7": [0, 0.4] },
//!     },
//!   ],
//! }
//! ```
//!
//! Vertices listed under `vertices` are assigned in bulk. `place` entries
//! go through the checked API in order. `edges` may be a list of pairs or
//! an adjacency map.

use crate::circle::CircularLayout;
use crate::color::Color;
use crate::config::StyleFile;
use crate::error::{Error, Result};
use crate::graph::{EdgeSet, Graph, LabelStyle, Point, VertexId};
use crate::render::GraphDrawer;
use crate::style::DrawStyle;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneFile {
    #[serde(default)]
    style: StyleFile,
    #[serde(default)]
    graphs: Vec<GraphEntry>,
    output: Option<String>,
    dpi: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphEntry {
    circle: Option<CircleEntry>,
    #[serde(default)]
    vertices: BTreeMap<VertexId, Point>,
    #[serde(default)]
    place: Vec<Placement>,
    edges: Option<Value>,
    label_positions: Option<BTreeMap<VertexId, Point>>,
    graph_label: Option<BTreeMap<String, Point>>,
    label_style: Option<LabelStyle>,
    node_colors: Option<BTreeMap<VertexId, Color>>,
    shift: Option<Point>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CircleEntry {
    n: usize,
    radius: f64,
    phi: Option<f64>,
    dr: Option<f64>,
    vertex_labels: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Placement {
    Polar {
        id: VertexId,
        r: f64,
        theta: f64,
        from: VertexId,
    },
    Offset {
        id: VertexId,
        at: Point,
        from: Option<VertexId>,
    },
}

/// Graphs and style read from a scene document.
#[derive(Debug, Clone)]
pub struct Scene {
    pub style: DrawStyle,
    pub graphs: Vec<Graph>,
    /// Output file name, if the document names one.
    pub output: Option<String>,
    pub dpi: Option<f64>,
}

impl Scene {
    /// Draws every graph of the scene onto one canvas.
    pub fn render(&self) -> Result<GraphDrawer<'_>> {
        let mut drawer = GraphDrawer::new(self.style.clone());
        let graphs: Vec<&Graph> = self.graphs.iter().collect();
        drawer.draw(&graphs)?;
        Ok(drawer)
    }

    /// Draws the scene and saves it under `file_name`, or the scene's own
    /// `output` when no name is given.
    pub fn save(&self, file_name: Option<&Path>) -> Result<Vec<PathBuf>> {
        let target = match (file_name, self.output.as_deref()) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(output)) => PathBuf::from(output),
            (None, None) => {
                return Err(Error::Scene("no output file name given".to_string()));
            }
        };
        let dpi = self.dpi.unwrap_or(crate::render::DEFAULT_DPI);
        self.render()?.save(target, dpi)
    }
}

pub fn parse_scene(source: &str) -> Result<Scene> {
    let file: SceneFile = json5::from_str(source).map_err(|err| Error::Scene(err.to_string()))?;
    let style = file.style.apply(DrawStyle::default());
    let graphs = file
        .graphs
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            build_graph(entry).inspect_err(|err| log::debug!("scene graph {idx}: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Scene {
        style,
        graphs,
        output: file.output,
        dpi: file.dpi,
    })
}

pub fn load_scene_file(path: &Path) -> anyhow::Result<Scene> {
    let source = std::fs::read_to_string(path)?;
    Ok(parse_scene(&source)?)
}

fn build_graph(entry: GraphEntry) -> Result<Graph> {
    let mut graph = match &entry.circle {
        Some(circle) => {
            let mut layout = CircularLayout::new(circle.n, circle.radius);
            layout.phi = circle.phi;
            if let Some(dr) = circle.dr {
                layout.dr = dr;
            }
            if let Some(enabled) = circle.vertex_labels {
                layout.vertex_labels = enabled;
            }
            layout.build()?
        }
        None => Graph::new(),
    };

    if !entry.vertices.is_empty() {
        if entry.circle.is_some() {
            for (id, pos) in entry.vertices {
                graph.add_vertex(id, pos)?;
            }
        } else {
            graph.set_vertices(entry.vertices);
        }
    }

    for placement in entry.place {
        match placement {
            Placement::Polar { id, r, theta, from } => graph.add_vertex_polar(id, r, theta, from)?,
            Placement::Offset { id, at, from: Some(anchor) } => {
                graph.add_vertex_relative(id, at, anchor)?
            }
            Placement::Offset { id, at, from: None } => graph.add_vertex(id, at)?,
        }
    }

    if let Some(edges) = &entry.edges {
        graph.set_edges(edge_set_from_value(edges)?);
    }
    if let Some(offsets) = entry.label_positions {
        graph.set_label_positions(offsets);
    }
    if let Some(captions) = entry.graph_label {
        graph.set_graph_label(captions);
    }
    if let Some(style) = entry.label_style {
        graph.set_label_style(style);
    }
    if let Some(colors) = entry.node_colors {
        graph.set_node_colors(colors);
    }
    if let Some(delta) = entry.shift {
        graph.shift_vertices(delta.x, delta.y);
    }
    Ok(graph)
}

/// Reads an edge structure from untyped data: an array of `[u, v]` pairs or
/// an object mapping a vertex to its neighbor array. `null` means no edges.
pub fn edge_set_from_value(value: &Value) -> Result<EdgeSet> {
    match value {
        Value::Null => Ok(EdgeSet::pairs()),
        Value::Array(items) => {
            let mut pairs = Vec::with_capacity(items.len());
            for item in items {
                let ends = match item {
                    Value::Array(ends) if ends.len() == 2 => ends,
                    other => {
                        return Err(Error::InvalidEdgeStructure(format!(
                            "expected a [u, v] pair, found {other}"
                        )));
                    }
                };
                pairs.push((vertex_id(&ends[0])?, vertex_id(&ends[1])?));
            }
            Ok(EdgeSet::Pairs(pairs))
        }
        Value::Object(map) => {
            let mut adjacency = BTreeMap::new();
            for (key, neighbors) in map {
                let Value::Array(neighbors) = neighbors else {
                    return Err(Error::InvalidEdgeStructure(format!(
                        "neighbors of {key} must be an array, found {neighbors}"
                    )));
                };
                let neighbors = neighbors.iter().map(vertex_id).collect::<Result<Vec<_>>>()?;
                adjacency.insert(VertexId::parse(key), neighbors);
            }
            Ok(EdgeSet::Adjacency(adjacency))
        }
        other => Err(Error::InvalidEdgeStructure(format!(
            "expected a list or a map, found {other}"
        ))),
    }
}

fn vertex_id(value: &Value) -> Result<VertexId> {
    VertexId::deserialize(value)
        .map_err(|err| Error::InvalidEdgeStructure(format!("bad vertex id {value}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn edge_values_become_tagged_edge_sets() {
        let pairs = edge_set_from_value(&json!([[1, 2], ["a", 3]])).unwrap();
        assert_eq!(
            pairs,
            EdgeSet::Pairs(vec![
                (1.into(), 2.into()),
                ("a".into(), 3.into()),
            ])
        );

        let adjacency = edge_set_from_value(&json!({"1": [2, 3], "x": []})).unwrap();
        let EdgeSet::Adjacency(map) = adjacency else {
            panic!("expected adjacency form");
        };
        assert_eq!(map[&VertexId::from(1)], vec![VertexId::from(2), VertexId::from(3)]);
        assert!(map[&VertexId::from("x")].is_empty());

        assert_eq!(edge_set_from_value(&Value::Null).unwrap(), EdgeSet::pairs());
    }

    #[test]
    fn malformed_edges_are_invalid_structures() {
        for bad in [json!(5), json!("1-2"), json!([[1, 2, 3]]), json!([1, 2]), json!({"1": 2})] {
            assert!(
                matches!(edge_set_from_value(&bad), Err(Error::InvalidEdgeStructure(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn parses_explicit_and_placed_vertices() {
        let scene = parse_scene(
            r#"{
                graphs: [{
                    vertices: { "6": [3, 0] },
                    place: [
                        { id: 7, at: [-1, 1.75], from: 6 },
                        { id: 8, r: 2, theta: 180, from: 7 },
                        { id: "top", at: [0, 5] },
                    ],
                    edges: { "6": [7], "7": [8] },
                    labelStyle: "raw",
                    nodeColors: { "6": "r" },
                    shift: [1, 0],
                }],
            }"#,
        )
        .unwrap();
        let graph = &scene.graphs[0];
        assert_eq!(graph.vertex(&6.into()), Some(Point::new(4.0, 0.0)));
        assert_eq!(graph.vertex(&7.into()), Some(Point::new(3.0, 1.75)));
        let eight = graph.vertex(&8.into()).unwrap();
        assert!((eight.x - 1.0).abs() < 1e-9 && (eight.y - 1.75).abs() < 1e-9);
        assert_eq!(graph.vertex(&"top".into()), Some(Point::new(1.0, 5.0)));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.label_style(), LabelStyle::Raw);
        assert_eq!(graph.node_colors()[&VertexId::from(6)], Color::RED);
    }

    #[test]
    fn circle_entries_build_circular_graphs() {
        let scene = parse_scene(
            r#"{
                style: { figSize: [4, 4] },
                graphs: [{ circle: { n: 4, radius: 1, phi: 0 }, edges: [[1, 3]] }],
                output: "square",
            }"#,
        )
        .unwrap();
        assert_eq!(scene.style.fig_size, (4.0, 4.0));
        assert_eq!(scene.output.as_deref(), Some("square"));
        let graph = &scene.graphs[0];
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.label_positions().len(), 4);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn scene_errors_are_reported() {
        assert!(matches!(parse_scene("{ graphs: [ }"), Err(Error::Scene(_))));
        assert!(matches!(
            parse_scene(r#"{ graphs: [{ vertices: { "1": [0, 0] }, edges: 3 }] }"#),
            Err(Error::InvalidEdgeStructure(_))
        ));
        assert!(matches!(
            parse_scene(r#"{ graphs: [{ place: [{ id: 2, at: [1, 1], from: 1 }] }] }"#),
            Err(Error::UnknownVertex(VertexId::Int(1)))
        ));
    }

    #[test]
    fn rendering_a_scene_validates_every_graph() {
        let scene = parse_scene(r#"{ graphs: [{ vertices: { "1": [0, 0] }, edges: [[1, 2]] }] }"#)
            .unwrap();
        assert!(matches!(scene.render(), Err(Error::UnknownVertex(VertexId::Int(2)))));
        assert!(matches!(scene.save(None), Err(Error::Scene(_))));
    }
}
