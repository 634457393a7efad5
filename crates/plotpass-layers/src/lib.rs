//! # PlotPass Layers
//!
//! Preview-rendering adapter. Paths are collected into a realized tree of
//! drawing commands, optimized as they arrive, and the finished tree is
//! rewritten into budgeted passes by the shared engine. Curves are kept
//! as lyon paths until they are flattened.

pub mod builder;
pub mod error;
pub mod rewrite;
pub mod tree;

pub use builder::LayerTreeBuilder;
pub use error::{LayerError, Result};
pub use rewrite::{render_layers, split_tree};
pub use tree::{DrawCommand, LayerNode, LayerTree, DEFAULT_TOLERANCE};
