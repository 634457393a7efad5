//! Cancellable layer-tree builder.
//!
//! Paths are appended one at a time as the preview renderer generates
//! them. With optimization enabled each append asks the optimizer for a
//! placement and inserts the drawn command at that slot, so the node's
//! command list always mirrors the optimizer's working sequence.

use std::collections::HashMap;

use plotpass_core::{distance, AbortSignal, Path, Point, StrokeStyle};
use plotpass_engine::{OptimizerState, Orientation, Placement};

use crate::error::{LayerError, Result};
use crate::tree::{DrawCommand, LayerNode, LayerTree};

/// Builds a [`LayerTree`] from generated paths.
#[derive(Debug)]
pub struct LayerTreeBuilder {
    state: OptimizerState,
    abort: AbortSignal,
    optimize: bool,
    tolerance: f32,
    nodes: Vec<LayerNode>,
    slots: HashMap<String, usize>,
}

impl LayerTreeBuilder {
    pub fn new(tolerance: f32, optimize: bool, abort: AbortSignal) -> Result<Self> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(LayerError::InvalidTolerance { tolerance });
        }
        Ok(Self {
            state: OptimizerState::new(),
            abort,
            optimize,
            tolerance,
            nodes: Vec::new(),
            slots: HashMap::new(),
        })
    }

    /// Declares the layer group for `key` ahead of its first path.
    ///
    /// Re-declaring an existing key updates its label and stroke.
    pub fn declare_layer(
        &mut self,
        key: &str,
        base_order: usize,
        base_label: impl Into<String>,
        stroke: impl Into<String>,
    ) {
        let node = LayerNode::new(base_order, base_label, stroke);
        match self.slots.get(key) {
            Some(&slot) => {
                let existing = &mut self.nodes[slot];
                existing.base_order = node.base_order;
                existing.label = node.label;
                existing.base_label = node.base_label;
                existing.stroke = node.stroke;
            }
            None => {
                self.slots.insert(key.to_string(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Appends one generated path to the group `key`.
    ///
    /// Fails with [`LayerError::Aborted`] once the abort signal is raised.
    /// Degenerate paths are skipped and return `Ok(None)`. Undeclared keys
    /// get a group labeled and stroked with the key itself.
    pub fn append_path(
        &mut self,
        key: &str,
        points: Vec<Point>,
        style: StrokeStyle,
    ) -> Result<Option<Placement>> {
        if self.abort.is_aborted() {
            return Err(LayerError::Aborted);
        }

        let path = match Path::with_style(points, style) {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!(layer = key, "Skipping path: {}", e);
                return Ok(None);
            }
        };

        let slot = self.slot_for(key);
        let commands = &mut self.nodes[slot].commands;

        let placement = if self.optimize {
            let placement = self.state.register_path(key, path.clone());
            let oriented = match placement.orientation {
                Orientation::Forward => path,
                Orientation::Reversed => path.reversed(),
            };
            commands.insert(placement.index, DrawCommand::from_path(&oriented));
            placement
        } else {
            let cost = commands
                .last()
                .and_then(|last| last.polylines(self.tolerance).pop())
                .map_or(0.0, |last| distance(last.end(), path.start()));
            commands.push(DrawCommand::from_path(&path));
            Placement {
                index: commands.len() - 1,
                orientation: Orientation::Forward,
                cost,
            }
        };

        Ok(Some(placement))
    }

    /// Appends a curved command, flattened at the builder's tolerance.
    ///
    /// Each flattened subpath is placed like a generated polyline.
    pub fn append_curve(
        &mut self,
        key: &str,
        curve: lyon::path::Path,
        style: StrokeStyle,
    ) -> Result<Vec<Placement>> {
        let polylines = DrawCommand::curve(curve, style).polylines(self.tolerance);
        let mut placements = Vec::with_capacity(polylines.len());
        for path in polylines {
            let (points, style) = path.into_parts();
            if let Some(placement) = self.append_path(key, points, style)? {
                placements.push(placement);
            }
        }
        Ok(placements)
    }

    fn slot_for(&mut self, key: &str) -> usize {
        if let Some(&slot) = self.slots.get(key) {
            return slot;
        }
        let order = self.nodes.len();
        self.declare_layer(key, order, key, key);
        self.nodes.len() - 1
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_aborted()
    }

    /// Pen-up travel of the optimizer's working sequence for `key`.
    pub fn pen_up_travel(&self, key: &str) -> f64 {
        self.state.group(key).map_or(0.0, |g| g.pen_up_travel())
    }

    pub fn finish(self) -> LayerTree {
        LayerTree::from_nodes(self.nodes, self.tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(x0: f64, x1: f64) -> Vec<Point> {
        vec![Point::new(x0, 0.0), Point::new(x1, 0.0)]
    }

    #[test]
    fn test_invalid_tolerance() {
        let err = LayerTreeBuilder::new(0.0, true, AbortSignal::new()).unwrap_err();
        assert_eq!(err, LayerError::InvalidTolerance { tolerance: 0.0 });
    }

    #[test]
    fn test_unoptimized_append_keeps_order() {
        let mut builder = LayerTreeBuilder::new(0.05, false, AbortSignal::new()).unwrap();
        builder.append_path("#000", segment(20.0, 30.0), StrokeStyle::default()).unwrap();
        let placement = builder
            .append_path("#000", segment(0.0, 10.0), StrokeStyle::default())
            .unwrap()
            .unwrap();
        assert_eq!(placement.index, 1);
        assert_eq!(placement.cost, 30.0);

        let layers = builder.finish().to_layers();
        assert_eq!(layers[0].paths[0].start(), Point::new(20.0, 0.0));
        assert_eq!(layers[0].paths[1].start(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_curve_is_flattened_into_group() {
        let mut builder = LayerTreeBuilder::new(0.01, true, AbortSignal::new()).unwrap();
        let mut curve = lyon::path::Path::builder();
        curve.begin(lyon::math::point(0.0, 0.0));
        curve.quadratic_bezier_to(lyon::math::point(5.0, 10.0), lyon::math::point(10.0, 0.0));
        curve.end(false);

        let placements = builder
            .append_curve("#000", curve.build(), StrokeStyle::default())
            .unwrap();
        assert_eq!(placements.len(), 1);

        let layers = builder.finish().to_layers();
        assert_eq!(layers[0].paths.len(), 1);
        assert!(layers[0].paths[0].points().len() > 3);
    }

    #[test]
    fn test_degenerate_path_is_skipped() {
        let mut builder = LayerTreeBuilder::new(0.05, true, AbortSignal::new()).unwrap();
        let placement = builder
            .append_path("#000", vec![Point::new(1.0, 1.0)], StrokeStyle::default())
            .unwrap();
        assert!(placement.is_none());
    }
}
