//! Error handling for PlotPass
//!
//! Geometry errors are produced by the validating constructors at the
//! adapter boundary. The engine itself never fails on degenerate input;
//! callers turn these errors into silent skips.

use thiserror::Error;

/// Geometry validation error
///
/// Raised when raw point data cannot form a drawable path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Fewer than two points survived validation
    #[error("Path needs at least 2 points, got {count}")]
    TooFewPoints {
        /// The number of points supplied.
        count: usize,
    },

    /// A coordinate is NaN or infinite
    #[error("Non-finite coordinate at point {index}")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        index: usize,
    },
}
