//! Optimize-then-split pipeline shared by every adapter.

use plotpass_core::{Layer, TravelBudget};
use serde::{Deserialize, Serialize};

use crate::optimizer::{optimize_layer_paths, pen_up_travel, OptimizerState};
use crate::passes::{build_passes_capped, PassPlan};

/// Pipeline stage reported through progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Optimize,
    Split,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimize => write!(f, "optimize"),
            Self::Split => write!(f, "split"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    /// Reorder paths within each layer before splitting
    pub optimize: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self { optimize: true }
    }
}

/// Reorders every layer through one caller-owned optimizer state.
pub fn optimize_layers(
    state: &mut OptimizerState,
    layers: &[Layer],
    mut on_progress: impl FnMut(Stage, usize, usize),
) -> Vec<Layer> {
    let total = layers.len();
    layers
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let optimized = optimize_layer_paths(state, i, layer);
            on_progress(Stage::Optimize, i + 1, total);
            optimized
        })
        .collect()
}

/// Runs the full pipeline without progress reporting.
pub fn plan(layers: &[Layer], budget: Option<TravelBudget>, options: PlanOptions) -> PassPlan {
    plan_with_progress(layers, budget, options, |_, _, _| {})
}

/// Runs optional optimization followed by budgeted pass building.
pub fn plan_with_progress(
    layers: &[Layer],
    budget: Option<TravelBudget>,
    options: PlanOptions,
    on_progress: impl FnMut(Stage, usize, usize),
) -> PassPlan {
    plan_capped_with_progress(layers, budget, options, usize::MAX, on_progress).0
}

/// Like [`plan_with_progress`], with splitting bounded to `max_fragments`.
///
/// The flag is true when the fragment allowance ran out.
pub fn plan_capped_with_progress(
    layers: &[Layer],
    budget: Option<TravelBudget>,
    options: PlanOptions,
    max_fragments: usize,
    mut on_progress: impl FnMut(Stage, usize, usize),
) -> (PassPlan, bool) {
    let result = if options.optimize {
        let mut state = OptimizerState::new();
        let before: f64 = layers.iter().map(|l| pen_up_travel(&l.paths)).sum();
        let optimized = optimize_layers(&mut state, layers, &mut on_progress);
        let after: f64 = optimized.iter().map(|l| pen_up_travel(&l.paths)).sum();
        tracing::debug!(
            before_mm = before,
            after_mm = after,
            "Pen-up travel optimized"
        );
        on_progress(Stage::Split, 0, 1);
        build_passes_capped(&optimized, budget, max_fragments)
    } else {
        on_progress(Stage::Split, 0, 1);
        build_passes_capped(layers, budget, max_fragments)
    };
    on_progress(Stage::Split, 1, 1);
    result
}
