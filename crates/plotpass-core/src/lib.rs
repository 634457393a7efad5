//! # PlotPass Core
//!
//! Core types and utilities shared by every PlotPass crate.
//! Provides drawing-space geometry, validated path/layer/pass records,
//! travel budgets and the cooperative abort signal used by the adapters.

pub mod abort;
pub mod error;
pub mod geometry;
pub mod model;
pub mod units;

pub use abort::AbortSignal;
pub use error::GeometryError;
pub use geometry::{distance, interpolate, polyline_length, Point, LENGTH_EPSILON_MM, ZERO_LENGTH_MM};
pub use model::{pass_label, Layer, LineCap, LineJoin, Pass, Path, StrokeStyle};
pub use units::{TravelBudget, MM_PER_METER};
