//! # PlotPass Engine
//!
//! Travel optimization and budgeted pass splitting for pen-plotter output.
//!
//! ## Pipeline
//!
//! ```text
//! Layers (paths grouped by color)
//!   └── Travel Optimizer   reorder / reorient paths within a layer
//!         └── Path Splitter   cut paths at the budget boundary
//!               └── Pass Builder   bucket fragments, label, order
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plotpass_engine::{build_passes_meters, Layer};
//!
//! let plan = build_passes_meters(&layers, Some(2.0));
//! for pass in &plan.passes {
//!     println!("{} {:.1} mm", pass.label, pass.travel_mm);
//! }
//! ```

pub mod optimizer;
pub mod passes;
pub mod pipeline;
pub mod splitter;

pub use optimizer::{
    layer_key, optimize_layer, optimize_layer_paths, pen_up_travel, OptimizerState, Orientation,
    Placement, TravelOptimizer,
};
pub use passes::{build_passes, build_passes_capped, build_passes_meters, PassPlan};
pub use pipeline::{
    optimize_layers, plan, plan_capped_with_progress, plan_with_progress, PlanOptions, Stage,
};
pub use splitter::{split_path, split_path_limited};

pub use plotpass_core::{Layer, Pass, Path, Point, TravelBudget};
