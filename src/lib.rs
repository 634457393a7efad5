//! # PlotPass
//!
//! Pen-plotter travel optimization and budgeted pass splitting.
//!
//! ## Architecture
//!
//! PlotPass is organized as a workspace with multiple crates:
//!
//! 1. **plotpass-core** - Geometry, path/layer/pass records, budgets, abort signal
//! 2. **plotpass-engine** - Travel optimizer, path splitter, pass builder
//! 3. **plotpass-layers** - Preview adapter over a realized lyon layer tree
//! 4. **plotpass-worker** - Background worker adapter with timeout and restart
//! 5. **plotpass-settings** - TOML/JSON configuration
//! 6. **plotpass** - CLI binary that integrates all crates

pub mod cli;

pub use plotpass_core::{
    AbortSignal, GeometryError, Layer, Pass, Path, Point, StrokeStyle, TravelBudget,
};
pub use plotpass_engine::{build_passes, plan, PassPlan, PlanOptions};
pub use plotpass_layers::{render_layers, LayerError, LayerTree};
pub use plotpass_settings::Config;
pub use plotpass_worker::{
    LayerRecord, RenderResponse, RenderSummary, WorkerClient, WorkerError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - stderr output, human-readable or JSON lines
/// - RUST_LOG environment variable support
/// - INFO as the default level
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(false),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_line_number(true),
            )
            .try_init()?;
    }

    Ok(())
}
