use crate::error::{Error, Result};
use crate::graph::{Graph, Point, VertexId};
use std::f64::consts::PI;

/// Graph whose vertices `1..=n` sit evenly spaced on a circle around the origin.
///
/// Without an explicit phase the first vertex sits half a step past angle
/// zero. Each vertex gets a label offset pointing radially outward by `dr`
/// unless labels are turned off. No edges are created.
#[derive(Debug, Clone, PartialEq)]
pub struct CircularLayout {
    pub n: usize,
    pub radius: f64,
    /// Phase of the first vertex, in degrees.
    pub phi: Option<f64>,
    pub dr: f64,
    pub vertex_labels: bool,
}

impl CircularLayout {
    pub const DEFAULT_LABEL_OFFSET: f64 = 0.5;

    pub fn new(n: usize, radius: f64) -> Self {
        Self {
            n,
            radius,
            phi: None,
            dr: Self::DEFAULT_LABEL_OFFSET,
            vertex_labels: true,
        }
    }

    pub fn phase(mut self, degrees: f64) -> Self {
        self.phi = Some(degrees);
        self
    }

    pub fn label_offset(mut self, dr: f64) -> Self {
        self.dr = dr;
        self
    }

    pub fn vertex_labels(mut self, enabled: bool) -> Self {
        self.vertex_labels = enabled;
        self
    }

    /// Angle of vertex `k` (1-based) in radians.
    pub fn angle(&self, k: usize) -> f64 {
        let step = 2.0 * PI / self.n as f64;
        let start = match self.phi {
            Some(degrees) => degrees.to_radians(),
            None => 0.5 * step,
        };
        start + (k as f64 - 1.0) * step
    }

    pub fn build(&self) -> Result<Graph> {
        if self.n == 0 {
            return Err(Error::InvalidArgument(
                "a circular layout needs at least one vertex".to_string(),
            ));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "circle radius must be positive, got {}",
                self.radius
            )));
        }

        let mut graph = Graph::new();
        let mut labels = Vec::new();
        for k in 1..=self.n {
            let theta = self.angle(k);
            let (sin, cos) = theta.sin_cos();
            let id = VertexId::from(k);
            graph.add_vertex(id.clone(), Point::new(self.radius * cos, self.radius * sin))?;
            if self.vertex_labels {
                labels.push((id, Point::new(self.dr * cos, self.dr * sin)));
            }
        }
        graph.set_label_positions(labels);
        log::debug!("circular layout: {} vertices on radius {}", self.n, self.radius);
        Ok(graph)
    }
}
