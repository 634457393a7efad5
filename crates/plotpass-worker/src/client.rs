//! Supervising client for the render worker.
//!
//! A supervisor task owns the worker handle. Callers talk to it through a
//! command channel and get their result on a oneshot keyed by request
//! id. The supervisor queues requests until the worker reports `Ready`,
//! republishes progress on a broadcast channel and restarts the worker on
//! timeout, abort, transport errors or a closed channel.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use plotpass_core::{AbortSignal, Layer};
use plotpass_engine::PlanOptions;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{Result, WorkerError};
use crate::protocol::{
    decode_message, encode, ProgressEvent, RenderRequest, RenderResponse, WorkerMessage,
};
use crate::worker::{WorkerFactory, WorkerHandle};

/// Client-side settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Wall-clock limit per render, measured from dispatch
    pub timeout: Duration,
    /// Capacity of the progress broadcast channel
    pub progress_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(30_000),
            progress_capacity: 256,
        }
    }
}

/// Counters kept by the supervisor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub restarts: usize,
    pub completed: usize,
    pub last_restart_reason: Option<String>,
}

type Reply = oneshot::Sender<Result<RenderResponse>>;

enum Command {
    Render { request: RenderRequest, reply: Reply },
    TimedOut { id: Uuid },
    Abort,
}

/// Handle used to submit renders to a supervised worker.
pub struct WorkerClient {
    commands: mpsc::UnboundedSender<Command>,
    progress: broadcast::Sender<ProgressEvent>,
    stats: Arc<Mutex<ClientStats>>,
    config: ClientConfig,
    supervisor: JoinHandle<()>,
}

impl WorkerClient {
    /// Starts the supervisor and the first worker instance.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: ClientConfig, factory: impl WorkerFactory) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (progress, _) = broadcast::channel(config.progress_capacity.max(1));
        let stats = Arc::new(Mutex::new(ClientStats::default()));

        let factory: Arc<dyn WorkerFactory> = Arc::new(factory);
        let supervisor = Supervisor {
            worker: Some(factory.spawn()),
            factory,
            commands: commands_rx,
            ready: false,
            queued: VecDeque::new(),
            inflight: HashMap::new(),
            progress: progress.clone(),
            stats: Arc::clone(&stats),
        };

        Self {
            commands: commands_tx,
            progress,
            stats,
            config,
            supervisor: tokio::spawn(supervisor.run()),
        }
    }

    /// Receives progress notifications for every render from now on.
    pub fn subscribe_progress(&self) -> broadcast::Receiver<ProgressEvent> {
        self.progress.subscribe()
    }

    pub fn stats(&self) -> ClientStats {
        self.stats.lock().clone()
    }

    /// Renders `layers` in the worker.
    pub async fn render(
        &self,
        layers: &[Layer],
        budget_meters: Option<f64>,
        options: PlanOptions,
        abort: &AbortSignal,
    ) -> Result<RenderResponse> {
        let request = RenderRequest::new(layers, budget_meters, options.optimize);
        self.render_request(request, abort).await
    }

    /// Sends a prepared request and waits for its result.
    ///
    /// The abort signal is checked once, before dispatch. A raised abort
    /// restarts the worker and fails with [`WorkerError::Aborted`].
    pub async fn render_request(
        &self,
        request: RenderRequest,
        abort: &AbortSignal,
    ) -> Result<RenderResponse> {
        if abort.is_aborted() {
            let _ = self.commands.send(Command::Abort);
            return Err(WorkerError::Aborted);
        }

        let id = request.id;
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Render { request, reply })
            .map_err(|_| WorkerError::Closed)?;

        match tokio::time::timeout(self.config.timeout, response).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(WorkerError::Closed),
            Err(_) => {
                let _ = self.commands.send(Command::TimedOut { id });
                Err(WorkerError::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                })
            }
        }
    }
}

impl Drop for WorkerClient {
    fn drop(&mut self) {
        self.supervisor.abort();
    }
}

enum Event {
    Command(Option<Command>),
    Frame(Option<String>),
}

struct Supervisor {
    factory: Arc<dyn WorkerFactory>,
    worker: Option<WorkerHandle>,
    commands: mpsc::UnboundedReceiver<Command>,
    ready: bool,
    /// Encoded frames waiting for `Ready`, in arrival order
    queued: VecDeque<String>,
    inflight: HashMap<Uuid, Reply>,
    progress: broadcast::Sender<ProgressEvent>,
    stats: Arc<Mutex<ClientStats>>,
}

impl Supervisor {
    async fn run(mut self) {
        loop {
            let event = match self.worker.as_mut() {
                Some(worker) => tokio::select! {
                    command = self.commands.recv() => Event::Command(command),
                    frame = worker.recv() => Event::Frame(frame),
                },
                None => Event::Command(self.commands.recv().await),
            };

            match event {
                Event::Command(Some(command)) => self.handle_command(command),
                Event::Command(None) => break,
                Event::Frame(Some(frame)) => self.handle_frame(&frame),
                Event::Frame(None) => self.restart(
                    "worker channel closed",
                    WorkerError::Terminated {
                        reason: "worker channel closed".into(),
                    },
                ),
            }
        }

        if let Some(worker) = self.worker.take() {
            worker.terminate();
        }
        tracing::debug!("Worker supervisor stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Render { request, reply } => {
                let id = request.id;
                let frame = match encode(&request) {
                    Ok(frame) => frame,
                    Err(e) => {
                        let _ = reply.send(Err(e));
                        return;
                    }
                };
                self.inflight.insert(id, reply);
                if self.ready {
                    self.dispatch(frame);
                } else {
                    tracing::trace!(%id, "Queueing request until worker is ready");
                    self.queued.push_back(frame);
                }
            }
            Command::TimedOut { id } => {
                if self.inflight.remove(&id).is_none() {
                    tracing::debug!(%id, "Timeout for a request that already finished");
                    return;
                }
                self.restart(
                    "render timed out",
                    WorkerError::Terminated {
                        reason: "worker restarted after a timeout".into(),
                    },
                );
            }
            Command::Abort => self.restart(
                "render aborted",
                WorkerError::Terminated {
                    reason: "worker restarted after an abort".into(),
                },
            ),
        }
    }

    fn handle_frame(&mut self, frame: &str) {
        let message = match decode_message(frame) {
            Ok(message) => message,
            Err(e) => {
                let reason = match &e {
                    WorkerError::Transport { reason } => reason.clone(),
                    other => other.to_string(),
                };
                self.restart("undecodable worker frame", WorkerError::Transport { reason });
                return;
            }
        };

        match message {
            WorkerMessage::Ready => {
                self.ready = true;
                tracing::debug!(queued = self.queued.len(), "Worker ready");
                while let Some(frame) = self.queued.pop_front() {
                    self.dispatch(frame);
                }
            }
            WorkerMessage::Ack { id } => {
                tracing::trace!(%id, "Request acknowledged");
            }
            WorkerMessage::Progress {
                id,
                stage,
                completed,
                total,
            } => {
                // No subscribers is fine
                let _ = self.progress.send(ProgressEvent {
                    id,
                    stage,
                    completed,
                    total,
                });
            }
            WorkerMessage::Result {
                id,
                passes,
                summary,
            } => {
                if let Some(reply) = self.inflight.remove(&id) {
                    self.stats.lock().completed += 1;
                    let _ = reply.send(Ok(RenderResponse { passes, summary }));
                } else {
                    tracing::debug!(%id, "Dropping result for unknown request");
                }
            }
            WorkerMessage::Error { id: Some(id), error } => {
                if let Some(reply) = self.inflight.remove(&id) {
                    let _ = reply.send(Err(WorkerError::Remote { message: error }));
                }
            }
            WorkerMessage::Error { id: None, error } => {
                tracing::warn!("Worker reported an uncorrelated error: {}", error);
            }
        }
    }

    fn dispatch(&mut self, frame: String) {
        let sent = self.worker.as_ref().is_some_and(|w| w.send(frame));
        if !sent {
            self.restart(
                "worker inbound channel closed",
                WorkerError::Terminated {
                    reason: "worker channel closed".into(),
                },
            );
        }
    }

    /// Replaces the worker and fails every outstanding request with `error`.
    fn restart(&mut self, reason: &str, error: WorkerError) {
        tracing::warn!(
            outstanding = self.inflight.len(),
            "Restarting render worker: {}",
            reason
        );

        if let Some(worker) = self.worker.take() {
            worker.terminate();
        }
        {
            let mut stats = self.stats.lock();
            stats.restarts += 1;
            stats.last_restart_reason = Some(reason.to_string());
        }

        for (_, reply) in self.inflight.drain() {
            let _ = reply.send(Err(error.clone()));
        }
        self.queued.clear();

        self.ready = false;
        self.worker = Some(self.factory.spawn());
    }
}
