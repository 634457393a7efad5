//! Path, layer and pass records.
//!
//! `Path` validates its points once, at construction. Everything
//! downstream of the adapter boundary can rely on a path holding at
//! least two finite points.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::geometry::{polyline_length, Point};

/// Stroke end cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

/// Stroke corner join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

/// Optional per-path stroke metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrokeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<LineCap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<LineJoin>,
    /// Explicit color overriding the layer stroke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Unvalidated wire shape of a path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathRecord {
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub style: StrokeStyle,
}

/// An ordered polyline of at least two finite points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PathRecord", into = "PathRecord")]
pub struct Path {
    points: Vec<Point>,
    style: StrokeStyle,
}

impl Path {
    /// Creates a path with default stroke metadata.
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        Self::with_style(points, StrokeStyle::default())
    }

    /// Creates a path, rejecting non-finite coordinates and short point lists.
    pub fn with_style(points: Vec<Point>, style: StrokeStyle) -> Result<Self, GeometryError> {
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(GeometryError::NonFiniteCoordinate { index });
        }
        if points.len() < 2 {
            return Err(GeometryError::TooFewPoints {
                count: points.len(),
            });
        }
        Ok(Self { points, style })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Drawn length of the polyline in mm.
    pub fn length(&self) -> f64 {
        polyline_length(&self.points)
    }

    /// Reverses the point order in place.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Returns a copy of this path traversed end to start.
    pub fn reversed(&self) -> Self {
        let mut path = self.clone();
        path.reverse();
        path
    }

    pub fn into_parts(self) -> (Vec<Point>, StrokeStyle) {
        (self.points, self.style)
    }
}

impl TryFrom<PathRecord> for Path {
    type Error = GeometryError;

    fn try_from(record: PathRecord) -> Result<Self, Self::Error> {
        Path::with_style(record.points, record.style)
    }
}

impl From<Path> for PathRecord {
    fn from(path: Path) -> Self {
        PathRecord {
            points: path.points,
            style: path.style,
        }
    }
}

/// All paths sharing one color, in generation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Original output-sequence index, defines global ordering
    pub base_order: usize,
    /// Display name independent of split state
    pub base_label: String,
    /// Stroke color
    pub stroke: String,
    pub paths: Vec<Path>,
}

impl Layer {
    /// Creates an empty layer.
    pub fn new(base_order: usize, base_label: impl Into<String>, stroke: impl Into<String>) -> Self {
        Self {
            base_order,
            base_label: base_label.into(),
            stroke: stroke.into(),
            paths: Vec::new(),
        }
    }

    pub fn with_paths(mut self, paths: Vec<Path>) -> Self {
        self.paths = paths;
        self
    }

    pub fn push_path(&mut self, path: Path) {
        self.paths.push(path);
    }

    /// Total drawn length of all paths in mm.
    pub fn total_length(&self) -> f64 {
        self.paths.iter().map(Path::length).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// One budget-bounded execution unit sent to the plotter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pass {
    pub base_order: usize,
    pub base_label: String,
    pub label: String,
    pub stroke: String,
    pub paths: Vec<Path>,
    /// Accumulated drawn length in mm
    pub travel_mm: f64,
}

/// Label for pass `index` (1-based) of `count` passes cut from one layer.
pub fn pass_label(base_label: &str, index: usize, count: usize) -> String {
    if count > 1 {
        format!("{} (pass {}/{})", base_label, index, count)
    } else {
        base_label.to_string()
    }
}
