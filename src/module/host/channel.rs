//! Worker host
//!
//! Runs a bootstrap on a dedicated thread. The thread owns the registry and
//! handles inbound messages one at a time, in arrival order; outbound
//! messages go back over a channel.

use serde_json::Value;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::module::loader::{Script, ScriptMap};
use crate::module::manager::WorkerBootstrap;
use crate::module::traits::{HostEnvironment, ModuleError};

/// Host side of a worker thread
pub struct ChannelHost {
    scripts: ScriptMap,
    outbound: mpsc::UnboundedSender<Value>,
    closed: bool,
}

impl ChannelHost {
    pub fn new(scripts: ScriptMap, outbound: mpsc::UnboundedSender<Value>) -> Self {
        Self {
            scripts,
            outbound,
            closed: false,
        }
    }
}

impl HostEnvironment for ChannelHost {
    fn load_source(&mut self, url: &str) -> Result<Script, ModuleError> {
        self.scripts.load(url)
    }

    fn emit(&mut self, message: Value) {
        if self.closed {
            debug!("Worker closed, dropping outbound message");
            return;
        }
        if self.outbound.send(message).is_err() {
            warn!("Outbound channel closed, dropping message");
        }
    }

    fn shutdown(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Handle to a worker context running on its own thread
pub struct WorkerHandle {
    inbound: mpsc::UnboundedSender<Value>,
    outbound: mpsc::UnboundedReceiver<Value>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Spawn a worker thread
    ///
    /// `setup` runs on the worker thread and imports the scripts the init
    /// message will refer to.
    pub fn spawn<F>(config: RuntimeConfig, setup: F) -> Result<Self, ModuleError>
    where
        F: FnOnce(&mut ScriptMap) + Send + 'static,
    {
        let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel::<Value>();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<Value>();

        let thread = thread::Builder::new()
            .name("worker-runtime".to_string())
            .spawn(move || {
                let mut scripts = ScriptMap::new();
                setup(&mut scripts);
                let mut worker = WorkerBootstrap::new(ChannelHost::new(scripts, outbound_tx), config);

                while let Some(message) = inbound_rx.blocking_recv() {
                    if let Err(e) = worker.on_message(message) {
                        debug!("Worker {} message not handled: {}", worker.context_id(), e);
                    }
                    if worker.is_terminated() {
                        break;
                    }
                }

                // Stop accepting before the outbound side closes
                drop(inbound_rx);
                debug!("Worker {} stopped", worker.context_id());
                drop(worker);
            })
            .map_err(|e| ModuleError::Body(anyhow::Error::new(e).context("failed to spawn worker thread")))?;

        Ok(Self {
            inbound: inbound_tx,
            outbound: outbound_rx,
            thread: Some(thread),
        })
    }

    /// Send a message into the worker
    pub fn post_message(&self, message: Value) -> Result<(), ModuleError> {
        self.inbound
            .send(message)
            .map_err(|_| ModuleError::ContextClosed)
    }

    /// Next message posted by the worker; `None` once the worker has stopped
    pub async fn recv(&mut self) -> Option<Value> {
        self.outbound.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv), for use outside a runtime
    pub fn blocking_recv(&mut self) -> Option<Value> {
        self.outbound.blocking_recv()
    }

    /// Close the inbound side and wait for the worker thread to finish
    pub fn join(mut self) -> Result<(), ModuleError> {
        let thread = self.thread.take();
        drop(self);
        match thread {
            Some(thread) => thread
                .join()
                .map_err(|_| ModuleError::Body(anyhow::anyhow!("worker thread panicked"))),
            None => Ok(()),
        }
    }
}
