//! Turning graphs into a framed canvas and exporting it.

mod eps;
mod pdf;
mod png;
mod svg;

pub use eps::render_eps;
pub use pdf::render_pdf;
pub use png::write_output_png;
pub use svg::render_svg;

use crate::canvas::{Canvas, Frame, HAlign, LabelText, Primitive, VAlign};
use crate::error::{Error, Result};
use crate::graph::{EdgeSet, Graph, LabelStyle, Point, VertexId};
use crate::style::DrawStyle;
use std::path::{Path, PathBuf};

/// Resolution used when the caller has no preference.
pub const DEFAULT_DPI: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Eps,
    Pdf,
    Png,
}

impl OutputFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "eps" | "ps" => Some(Self::Eps),
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Eps => "eps",
            Self::Pdf => "pdf",
            Self::Png => "png",
        }
    }
}

/// Formats written when a file name has no extension: one vector, one raster.
pub const DEFAULT_FORMATS: [OutputFormat; 2] = [OutputFormat::Eps, OutputFormat::Png];

/// Composes graphs onto one canvas and exports it.
///
/// Graphs are borrowed, not copied. Every call to [`GraphDrawer::draw`]
/// adds its graphs to the ones already held and redraws all of them on a
/// fresh canvas, so successive calls overlay figures.
#[derive(Debug, Clone)]
pub struct GraphDrawer<'g> {
    style: DrawStyle,
    graphs: Vec<&'g Graph>,
    canvas: Option<Canvas>,
}

impl<'g> GraphDrawer<'g> {
    pub fn new(style: DrawStyle) -> Self {
        Self {
            style,
            graphs: Vec::new(),
            canvas: None,
        }
    }

    /// Drawer with the classic style and the given figure size in inches.
    pub fn with_fig_size(width: f64, height: f64) -> Self {
        Self::new(DrawStyle::with_fig_size(width, height))
    }

    pub fn style(&self) -> &DrawStyle {
        &self.style
    }

    pub fn graphs(&self) -> &[&'g Graph] {
        &self.graphs
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    /// Adds `graphs` and redraws everything held so far.
    ///
    /// On error nothing changes: the new graphs are not kept and the
    /// previous canvas stays in place.
    pub fn draw(&mut self, graphs: &[&'g Graph]) -> Result<&mut Self> {
        let mut pending = self.graphs.clone();
        pending.extend_from_slice(graphs);

        let mut canvas = Canvas::new(&self.style);
        for graph in &pending {
            plot_graph(&mut canvas, graph, &self.style)?;
        }
        canvas.set_frame(Frame::illustration());

        log::debug!(
            "drew {} graph(s) as {} primitives",
            pending.len(),
            canvas.primitives().len()
        );
        self.graphs = pending;
        self.canvas = Some(canvas);
        Ok(self)
    }

    /// SVG document of the current canvas.
    pub fn render_svg(&self) -> Result<String> {
        Ok(render_svg(self.canvas.as_ref().ok_or(Error::NoCanvas)?))
    }

    /// Writes the figure and returns the paths written.
    ///
    /// `fig.pdf` writes exactly that file. A name without an extension,
    /// like `fig`, writes `fig.eps` and `fig.png`. `dpi` only affects
    /// raster output.
    pub fn save(&self, file_name: impl AsRef<Path>, dpi: f64) -> Result<Vec<PathBuf>> {
        let canvas = self.canvas.as_ref().ok_or(Error::NoCanvas)?;
        let path = file_name.as_ref();

        let targets: Vec<(PathBuf, OutputFormat)> = match path.extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy();
                let format = OutputFormat::from_extension(&ext)
                    .ok_or_else(|| Error::UnsupportedFormat(ext.to_string()))?;
                vec![(path.to_path_buf(), format)]
            }
            None => DEFAULT_FORMATS
                .iter()
                .map(|format| (path.with_extension(format.extension()), *format))
                .collect(),
        };

        let mut written = Vec::with_capacity(targets.len());
        for (target, format) in targets {
            write_canvas(canvas, &target, format, dpi)?;
            log::debug!("saved {}", target.display());
            written.push(target);
        }
        Ok(written)
    }
}

impl Default for GraphDrawer<'_> {
    fn default() -> Self {
        Self::new(DrawStyle::default())
    }
}

fn write_canvas(canvas: &Canvas, target: &Path, format: OutputFormat, dpi: f64) -> Result<()> {
    match format {
        OutputFormat::Svg => std::fs::write(target, render_svg(canvas))?,
        OutputFormat::Eps => std::fs::write(target, render_eps(canvas))?,
        OutputFormat::Pdf => std::fs::write(target, render_pdf(canvas))?,
        OutputFormat::Png => {
            let page_width = canvas.layout().width;
            write_output_png(&render_svg(canvas), target, page_width, dpi)?
        }
    }
    Ok(())
}

fn position(graph: &Graph, id: &VertexId) -> Result<Point> {
    graph.vertex(id).ok_or_else(|| Error::UnknownVertex(id.clone()))
}

/// Resolves one graph into canvas primitives: edges, then vertices, then labels.
fn plot_graph(canvas: &mut Canvas, graph: &Graph, style: &DrawStyle) -> Result<()> {
    if graph.vertices().is_empty() {
        return Err(Error::EmptyGraph);
    }

    if graph.edges().is_empty() {
        log::warn!("graph has no edges, drawing its vertices only");
    } else {
        plot_edges(canvas, graph, style)?;
    }

    if graph.node_colors().is_empty() {
        canvas.push(Primitive::Points {
            points: graph.vertices().values().copied().collect(),
            color: style.vertex_color,
            diameter: style.dot_diameter(),
        });
    } else {
        for (id, color) in graph.node_colors() {
            canvas.push(Primitive::Points {
                points: vec![position(graph, id)?],
                color: *color,
                diameter: style.dot_diameter(),
            });
        }
    }

    if graph.label_positions().is_empty() {
        log::info!("graph has no label positions, leaving vertices unlabeled");
    } else {
        for (id, offset) in graph.label_positions() {
            let text = match graph.label_style() {
                LabelStyle::Indexed => LabelText::indexed("v", id.to_string()),
                LabelStyle::Raw => LabelText::parse(&id.to_string()),
            };
            canvas.push(Primitive::Text {
                anchor: position(graph, id)? + *offset,
                text,
                font_size: style.font_size,
                color: style.text_color,
                h_align: HAlign::Center,
                v_align: VAlign::Center,
            });
        }
    }

    for (caption, at) in graph.graph_label() {
        canvas.push(Primitive::Text {
            anchor: *at,
            text: LabelText::parse(caption),
            font_size: style.font_size,
            color: style.text_color,
            h_align: HAlign::Center,
            v_align: VAlign::Baseline,
        });
    }
    Ok(())
}

fn plot_edges(canvas: &mut Canvas, graph: &Graph, style: &DrawStyle) -> Result<()> {
    match graph.edges() {
        EdgeSet::Pairs(pairs) => {
            for (u, v) in pairs {
                canvas.push(Primitive::Segment {
                    from: position(graph, u)?,
                    to: position(graph, v)?,
                    color: style.edge_color,
                    width: style.line_width,
                    end_markers: Some(style.dot_diameter()),
                });
            }
        }
        EdgeSet::Adjacency(map) => {
            // A key without neighbors is not an edge endpoint.
            for (u, neighbors) in map.iter().filter(|(_, neighbors)| !neighbors.is_empty()) {
                let from = position(graph, u)?;
                for v in neighbors {
                    canvas.push(Primitive::Segment {
                        from,
                        to: position(graph, v)?,
                        color: style.edge_color,
                        width: style.line_width,
                        end_markers: None,
                    });
                }
            }
        }
    }
    Ok(())
}
