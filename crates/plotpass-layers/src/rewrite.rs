//! Budgeted rewrite of a realized layer tree.
//!
//! The new node list is computed from a snapshot of the tree and swapped
//! in with a single replacement, so readers never observe a half-split
//! tree.

use plotpass_core::{AbortSignal, Layer, TravelBudget};
use plotpass_engine::{build_passes, layer_key, PassPlan, PlanOptions};

use crate::builder::LayerTreeBuilder;
use crate::error::Result;
use crate::tree::{LayerNode, LayerTree};

/// Computes the split node list for `tree` without touching it.
pub fn split_tree(tree: &LayerTree, budget: Option<TravelBudget>) -> (Vec<LayerNode>, PassPlan) {
    let plan = build_passes(&tree.to_layers(), budget);
    let nodes = plan.passes.iter().map(LayerNode::from_pass).collect();
    (nodes, plan)
}

impl LayerTree {
    /// Splits the tree's layers into budgeted passes and replaces the
    /// tree's nodes with the pass nodes.
    pub fn apply_budget(&mut self, budget: Option<TravelBudget>) -> PassPlan {
        let (nodes, plan) = split_tree(self, budget);
        self.replace(nodes);
        plan
    }
}

/// Renders `layers` into a tree path by path, then applies the budget.
///
/// The abort signal is polled at every append; once raised the render
/// stops with [`LayerError::Aborted`](crate::LayerError::Aborted).
pub fn render_layers(
    layers: &[Layer],
    budget: Option<TravelBudget>,
    options: PlanOptions,
    tolerance: f32,
    abort: AbortSignal,
) -> Result<(LayerTree, PassPlan)> {
    let mut builder = LayerTreeBuilder::new(tolerance, options.optimize, abort)?;

    for (arrival, layer) in layers.iter().enumerate() {
        let key = layer_key(layer, arrival);
        builder.declare_layer(&key, layer.base_order, layer.base_label.clone(), layer.stroke.clone());
        for path in &layer.paths {
            builder.append_path(&key, path.points().to_vec(), path.style().clone())?;
        }
    }

    let mut tree = builder.finish();
    let plan = tree.apply_budget(budget);
    tracing::info!(
        passes = plan.total_layers,
        split_layers = plan.split_layers,
        "Layer tree rendered"
    );
    Ok((tree, plan))
}
