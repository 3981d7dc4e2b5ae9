//! Quads as reported by `DOM.getBoxModel`, and the axis-aligned boxes derived from them

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reasons a coordinate list cannot form a [`Quad`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuadError {
    #[error("quad has no points")]
    Empty,

    #[error("quad has an odd number of coordinates ({0})")]
    OddLength(usize),

    #[error("quad coordinate {index} is not finite ({value})")]
    NonFinite { index: usize, value: f64 },
}

/// A flat `[x0, y0, x1, y1, ...]` polygon. The four-corner box-model quads
/// Chrome returns hold 8 numbers, but any non-empty list of points is accepted.
///
/// A `Quad` always holds at least one finite point.
#[derive(Debug, Clone, PartialEq)]
pub struct Quad(Vec<f64>);

impl Quad {
    pub fn new(coords: Vec<f64>) -> Result<Self, QuadError> {
        if coords.is_empty() {
            return Err(QuadError::Empty);
        }
        if coords.len() % 2 != 0 {
            return Err(QuadError::OddLength(coords.len()));
        }
        if let Some((index, &value)) = coords.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(QuadError::NonFinite { index, value });
        }
        Ok(Self(coords))
    }

    /// Iterate over the `(x, y)` points in order
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.0.chunks_exact(2).map(|p| (p[0], p[1]))
    }
}

/// Axis-aligned box; `xmin <= xmax` and `ymin <= ymax` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// Smallest box enclosing every point of `quad`.
    pub fn from_quad(quad: &Quad) -> Self {
        let mut points = quad.points();
        // Quad::new guarantees a first point.
        let (x0, y0) = points.next().unwrap_or_default();
        let mut bbox = Self { xmin: x0, ymin: y0, xmax: x0, ymax: y0 };
        for (x, y) in points {
            if x < bbox.xmin {
                bbox.xmin = x;
            }
            if y < bbox.ymin {
                bbox.ymin = y;
            }
            if x > bbox.xmax {
                bbox.xmax = x;
            }
            if y > bbox.ymax {
                bbox.ymax = y;
            }
        }
        bbox
    }

    /// Corners truncated toward zero, as pixel coordinates
    pub fn to_pixels(&self) -> (i64, i64, i64, i64) {
        (self.xmin as i64, self.ymin as i64, self.xmax as i64, self.ymax as i64)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {} {}]", self.xmin, self.ymin, self.xmax, self.ymax)
    }
}
