//! Realized layer tree.
//!
//! Each layer node owns the drawn commands of one color. Polylines are
//! kept as validated paths at full precision; curves are held as lyon
//! paths and only flattened when geometry is extracted.

use lyon::path::iterator::PathIterator;
use lyon::path::Event;
use plotpass_core::{Layer, Pass, Path, Point, StrokeStyle};

/// Default curve flattening tolerance in mm.
pub const DEFAULT_TOLERANCE: f32 = 0.05;

/// One drawn command.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Straight segments, the geometry of record
    Polyline(Path),
    /// Curved outline, flattened on extraction
    Curve {
        path: lyon::path::Path,
        style: StrokeStyle,
    },
}

impl DrawCommand {
    pub fn from_path(path: &Path) -> Self {
        Self::Polyline(path.clone())
    }

    pub fn curve(path: lyon::path::Path, style: StrokeStyle) -> Self {
        Self::Curve { path, style }
    }

    pub fn style(&self) -> &StrokeStyle {
        match self {
            Self::Polyline(path) => path.style(),
            Self::Curve { style, .. } => style,
        }
    }

    /// Extracts the command as polylines, one per subpath.
    ///
    /// Polylines come back unchanged. Curves are flattened at `tolerance`;
    /// closed subpaths repeat their first point and subpaths with fewer
    /// than two usable points are skipped.
    pub fn polylines(&self, tolerance: f32) -> Vec<Path> {
        match self {
            Self::Polyline(path) => vec![path.clone()],
            Self::Curve { path, style } => flatten(path, style, tolerance),
        }
    }
}

fn flatten(path: &lyon::path::Path, style: &StrokeStyle, tolerance: f32) -> Vec<Path> {
    let mut out = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for event in path.iter().flattened(tolerance) {
        match event {
            Event::Begin { at } => {
                current.clear();
                current.push(Point::new(at.x as f64, at.y as f64));
            }
            Event::Line { to, .. } => {
                current.push(Point::new(to.x as f64, to.y as f64));
            }
            Event::End { first, close, .. } => {
                if close {
                    current.push(Point::new(first.x as f64, first.y as f64));
                }
                let points = std::mem::take(&mut current);
                match Path::with_style(points, style.clone()) {
                    Ok(path) => out.push(path),
                    Err(e) => tracing::debug!("Skipping drawn subpath: {}", e),
                }
            }
            _ => {}
        }
    }

    out
}

/// A rendered layer group.
#[derive(Debug, Clone)]
pub struct LayerNode {
    pub base_order: usize,
    pub base_label: String,
    /// Display label, carries the pass suffix once split
    pub label: String,
    pub stroke: String,
    pub commands: Vec<DrawCommand>,
}

impl LayerNode {
    pub fn new(base_order: usize, base_label: impl Into<String>, stroke: impl Into<String>) -> Self {
        let base_label = base_label.into();
        Self {
            base_order,
            label: base_label.clone(),
            base_label,
            stroke: stroke.into(),
            commands: Vec::new(),
        }
    }

    pub fn from_layer(layer: &Layer) -> Self {
        let mut node = Self::new(layer.base_order, layer.base_label.clone(), layer.stroke.clone());
        node.commands = layer.paths.iter().map(DrawCommand::from_path).collect();
        node
    }

    pub fn from_pass(pass: &Pass) -> Self {
        Self {
            base_order: pass.base_order,
            base_label: pass.base_label.clone(),
            label: pass.label.clone(),
            stroke: pass.stroke.clone(),
            commands: pass.paths.iter().map(DrawCommand::from_path).collect(),
        }
    }

    /// Extracts the node's drawn geometry as an engine layer.
    pub fn to_layer(&self, tolerance: f32) -> Layer {
        let paths = self
            .commands
            .iter()
            .flat_map(|command| command.polylines(tolerance))
            .collect();
        Layer::new(self.base_order, self.base_label.clone(), self.stroke.clone()).with_paths(paths)
    }
}

/// The realized tree of layer groups, in output order.
#[derive(Debug, Clone)]
pub struct LayerTree {
    layers: Vec<LayerNode>,
    tolerance: f32,
}

impl LayerTree {
    pub fn new(tolerance: f32) -> Self {
        Self {
            layers: Vec::new(),
            tolerance,
        }
    }

    pub fn from_nodes(layers: Vec<LayerNode>, tolerance: f32) -> Self {
        Self { layers, tolerance }
    }

    pub fn from_layers(layers: &[Layer], tolerance: f32) -> Self {
        Self::from_nodes(layers.iter().map(LayerNode::from_layer).collect(), tolerance)
    }

    pub fn layers(&self) -> &[LayerNode] {
        &self.layers
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Extracts every node's geometry as engine layers.
    pub fn to_layers(&self) -> Vec<Layer> {
        self.layers
            .iter()
            .map(|node| node.to_layer(self.tolerance))
            .collect()
    }

    /// Swaps in a fully built node list in one step.
    pub fn replace(&mut self, layers: Vec<LayerNode>) {
        self.layers = layers;
    }

    /// Labels of the current nodes, in order.
    pub fn labels(&self) -> Vec<&str> {
        self.layers.iter().map(|node| node.label.as_str()).collect()
    }
}

impl Default for LayerTree {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}
