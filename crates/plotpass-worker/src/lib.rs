//! # PlotPass Worker
//!
//! Runs the render pipeline behind a message-passing boundary.
//!
//! - [`protocol`]: JSON frames exchanged with the worker
//! - [`caps`]: resource caps applied to every render
//! - [`worker`]: the worker message loop and its factory seam
//! - [`client`]: supervising client with timeout, abort and restart
//!
//! ```rust,ignore
//! let client = WorkerClient::new(ClientConfig::default(), LocalWorkerFactory::default());
//! let response = client
//!     .render(&layers, Some(2.0), PlanOptions::default(), &AbortSignal::new())
//!     .await?;
//! ```

pub mod caps;
pub mod client;
pub mod error;
pub mod protocol;
pub mod worker;

pub use caps::ResourceCaps;
pub use client::{ClientConfig, ClientStats, WorkerClient};
pub use error::{Result, WorkerError};
pub use protocol::{
    LayerRecord, ProgressEvent, RenderRequest, RenderResponse, RenderSummary, WorkerMessage,
};
pub use worker::{
    spawn_worker, LocalWorkerFactory, RenderWorker, WorkerFactory, WorkerHandle, WorkerOptions,
};
