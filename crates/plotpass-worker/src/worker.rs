//! Background render worker.
//!
//! The worker owns one message loop on a tokio task. Requests are handled
//! one at a time in arrival order; the CPU-bound pipeline runs on the
//! blocking pool so the loop keeps forwarding progress frames.

use std::time::Duration;

use plotpass_core::TravelBudget;
use plotpass_engine::{plan_capped_with_progress, PlanOptions, Stage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::caps::{fragment_cap_warning, layers_from_records, ResourceCaps};
use crate::protocol::{
    decode_request, encode, RenderRequest, RenderResponse, RenderSummary, WorkerMessage,
};

/// Worker startup and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerOptions {
    pub caps: ResourceCaps,
    /// Simulated bootstrap time before `Ready` is emitted
    pub bootstrap_delay: Duration,
}

/// Synchronous render core run inside the worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderWorker {
    caps: ResourceCaps,
}

impl RenderWorker {
    pub fn new(caps: ResourceCaps) -> Self {
        Self { caps }
    }

    /// Applies the input caps, then runs the shared pipeline with the
    /// fragment allowance.
    pub fn process(
        &self,
        request: RenderRequest,
        on_progress: impl FnMut(Stage, usize, usize),
    ) -> RenderResponse {
        let mut warnings = Vec::new();
        let layers = layers_from_records(request.layers, &self.caps, &mut warnings);
        let budget = TravelBudget::from_meters(request.max_travel_per_layer_meters);
        let options = PlanOptions {
            optimize: request.optimize,
        };

        let max_fragments = self.caps.max_total_fragments;
        let (plan, truncated) =
            plan_capped_with_progress(&layers, budget, options, max_fragments, on_progress);
        if truncated {
            fragment_cap_warning(max_fragments, &mut warnings);
        }

        RenderResponse {
            summary: RenderSummary {
                limit_meters: plan.limit_meters,
                split_layers: plan.split_layers,
                total_layers: plan.passes.len(),
                warnings,
            },
            passes: plan.passes,
        }
    }
}

/// Channels to a running worker.
#[derive(Debug)]
pub struct WorkerHandle {
    inbound: mpsc::UnboundedSender<String>,
    outbound: mpsc::UnboundedReceiver<String>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Assembles a handle from an already running message loop.
    pub fn from_parts(
        inbound: mpsc::UnboundedSender<String>,
        outbound: mpsc::UnboundedReceiver<String>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            inbound,
            outbound,
            task,
        }
    }

    /// Sends one request frame. Returns false once the worker is gone.
    pub fn send(&self, frame: String) -> bool {
        self.inbound.send(frame).is_ok()
    }

    /// Receives the next worker frame, `None` once the worker is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    /// Stops the message loop.
    ///
    /// A pipeline already running on the blocking pool finishes on its
    /// own; its frames are discarded.
    pub fn terminate(self) {
        self.task.abort();
    }
}

/// Source of worker instances, one per (re)start.
pub trait WorkerFactory: Send + Sync + 'static {
    fn spawn(&self) -> WorkerHandle;
}

/// Spawns in-process workers running [`RenderWorker`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalWorkerFactory {
    pub options: WorkerOptions,
}

impl LocalWorkerFactory {
    pub fn new(options: WorkerOptions) -> Self {
        Self { options }
    }
}

impl WorkerFactory for LocalWorkerFactory {
    fn spawn(&self) -> WorkerHandle {
        spawn_worker(self.options)
    }
}

fn send_frame(tx: &mpsc::UnboundedSender<String>, message: &WorkerMessage) {
    match encode(message) {
        Ok(frame) => {
            let _ = tx.send(frame);
        }
        Err(e) => tracing::error!("Failed to encode worker frame: {}", e),
    }
}

/// Starts a worker message loop on the current tokio runtime.
pub fn spawn_worker(options: WorkerOptions) -> WorkerHandle {
    let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel::<String>();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<String>();
    let worker = RenderWorker::new(options.caps);

    let task = tokio::spawn(async move {
        if !options.bootstrap_delay.is_zero() {
            tokio::time::sleep(options.bootstrap_delay).await;
        }
        tracing::debug!("Render worker ready");
        send_frame(&outbound_tx, &WorkerMessage::Ready);

        while let Some(frame) = inbound_rx.recv().await {
            let request = match decode_request(&frame) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!("Rejected malformed request: {}", e);
                    send_frame(
                        &outbound_tx,
                        &WorkerMessage::Error {
                            id: None,
                            error: e.to_string(),
                        },
                    );
                    continue;
                }
            };

            let id = request.id;
            send_frame(&outbound_tx, &WorkerMessage::Ack { id });

            let progress_tx = outbound_tx.clone();
            let job = tokio::task::spawn_blocking(move || {
                worker.process(request, |stage, completed, total| {
                    send_frame(
                        &progress_tx,
                        &WorkerMessage::Progress {
                            id,
                            stage,
                            completed,
                            total,
                        },
                    );
                })
            });

            let message = match job.await {
                Ok(response) => {
                    tracing::debug!(
                        %id,
                        passes = response.passes.len(),
                        "Render finished"
                    );
                    WorkerMessage::result(id, response)
                }
                Err(e) => WorkerMessage::Error {
                    id: Some(id),
                    error: format!("Render failed: {}", e),
                },
            };
            send_frame(&outbound_tx, &message);
        }
    });

    WorkerHandle::from_parts(inbound_tx, outbound_rx, task)
}
