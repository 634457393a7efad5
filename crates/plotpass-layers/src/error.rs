//! Error types for the layer-tree adapter

use thiserror::Error;

/// Layer-tree rendering error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerError {
    /// The abort signal was raised before this append
    #[error("Render aborted")]
    Aborted,

    /// Flattening tolerance must be positive and finite
    #[error("Invalid flattening tolerance: {tolerance}")]
    InvalidTolerance {
        /// The rejected tolerance in mm.
        tolerance: f32,
    },
}

/// Result type for layer operations
pub type Result<T> = std::result::Result<T, LayerError>;
