use crate::graph::VertexId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("vertex {0} is already in the graph")]
    DuplicateVertex(VertexId),

    #[error("vertex {0} is not in the graph")]
    UnknownVertex(VertexId),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("the graph has no vertices")]
    EmptyGraph,

    #[error("edge structure must be a list of pairs or an adjacency map: {0}")]
    InvalidEdgeStructure(String),

    #[error("nothing has been drawn yet")]
    NoCanvas,

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("invalid scene: {0}")]
    Scene(String),

    #[error("raster export failed: {0}")]
    Raster(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
