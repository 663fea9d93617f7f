pub mod canvas;
pub mod circle;
pub mod color;
pub mod config;
pub mod error;
pub mod graph;
pub mod render;
pub mod scene;
pub mod style;
pub mod text_metrics;

pub use circle::CircularLayout;
pub use color::Color;
pub use config::{load_style, parse_style};
pub use error::{Error, Result};
pub use graph::{EdgeSet, Graph, LabelStyle, Point, VertexId};
pub use render::{DEFAULT_DPI, GraphDrawer, OutputFormat};
pub use scene::{Scene, load_scene_file, parse_scene};
pub use style::DrawStyle;
