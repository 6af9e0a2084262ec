//! Worker bootstrap
//!
//! Message-level entry point of a worker context. The first message carries
//! the module batch; once it is registered and built, the server module's
//! message handler takes over and every later message goes straight to it.

use serde_json::Value;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

use crate::config::RuntimeConfig;
use crate::module::ipc::protocol::{Acknowledgment, InitMessage};
use crate::module::registry::{
    DependencyBuilder, MessageHandler, Registry, MESSAGE_HANDLER_KEY, NAME_KEY,
};
use crate::module::traits::{HostEnvironment, ModuleError};

/// Observable bootstrap state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// Waiting for the init message
    Initializing,
    /// Server handler installed, routing messages to it
    Routing,
    /// Init failed and the context was shut down
    Terminated,
}

enum State {
    Initializing,
    Routing(MessageHandler),
    Terminated,
}

/// Bootstrap of one worker context
///
/// Owns the context's registry for its whole lifetime.
pub struct WorkerBootstrap<H: HostEnvironment> {
    context_id: String,
    host: H,
    registry: Rc<Registry>,
    config: RuntimeConfig,
    state: State,
}

impl<H: HostEnvironment> WorkerBootstrap<H> {
    /// Create a bootstrap with an empty registry
    pub fn new(host: H, config: RuntimeConfig) -> Self {
        Self::with_registry(host, config, Rc::new(Registry::new()))
    }

    /// Create a bootstrap over a registry that may already hold built-ins
    pub fn with_registry(host: H, config: RuntimeConfig, registry: Rc<Registry>) -> Self {
        let context_id = format!("worker_{}", uuid::Uuid::new_v4());
        debug!("Created worker context {}", context_id);
        Self {
            context_id,
            host,
            registry,
            config,
            state: State::Initializing,
        }
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn state(&self) -> BootstrapState {
        match self.state {
            State::Initializing => BootstrapState::Initializing,
            State::Routing(_) => BootstrapState::Routing,
            State::Terminated => BootstrapState::Terminated,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.state() == BootstrapState::Terminated
    }

    /// Handle one incoming message
    ///
    /// While initializing, the message must be the init batch; a failure is
    /// reported to the host, the context is shut down, and the error is
    /// returned. While routing, the message is passed to the server handler;
    /// a handler that shuts the host down terminates the context.
    pub fn on_message(&mut self, message: Value) -> Result<(), ModuleError> {
        match &self.state {
            State::Initializing => self.initialize(message),
            State::Routing(handler) => {
                let handler = Rc::clone(handler);
                let result = handler(&mut self.host, message);
                if self.host.is_closed() {
                    info!("Worker {} shut down by its message handler", self.context_id);
                    self.state = State::Terminated;
                }
                result.map_err(|e| {
                    warn!("Worker {} message handler failed: {:#}", self.context_id, e);
                    ModuleError::Body(e)
                })
            }
            State::Terminated => {
                debug!("Worker {} is closed, dropping message", self.context_id);
                Err(ModuleError::ContextClosed)
            }
        }
    }

    fn initialize(&mut self, message: Value) -> Result<(), ModuleError> {
        match self.install_server(message) {
            Ok(handler) => {
                self.state = State::Routing(handler);
                self.host.emit(Acknowledgment::ready().to_message());
                info!(
                    "Worker {} initialized with {} modules",
                    self.context_id,
                    self.registry.len()
                );
                Ok(())
            }
            Err(err) => {
                error!("Worker {} init failed: {}", self.context_id, err);
                self.host.emit(Acknowledgment::failed(&err).to_message());
                self.host.shutdown();
                self.state = State::Terminated;
                Err(err)
            }
        }
    }

    fn install_server(&mut self, message: Value) -> Result<MessageHandler, ModuleError> {
        let init = InitMessage::from_message(message)?;
        let server_id = init.server()?.id.clone();

        let records = self.registry.register(&init.mods, &mut self.host)?;
        let server = records
            .first()
            .map(|record| record.exports().clone())
            .ok_or(ModuleError::EmptyBatch)?;

        let report = DependencyBuilder::new(Rc::clone(&self.registry))
            .with_debug(self.config.debug)
            .build(records)?;
        debug!(
            "Worker {} built {} modules in {} passes",
            self.context_id,
            report.ordered.len() + report.forced.len(),
            report.passes
        );

        let handler = server
            .handler(MESSAGE_HANDLER_KEY)
            .ok_or(ModuleError::MissingHandler(server_id))?;
        if let Some(name) = init.name {
            server.set_value(NAME_KEY, Value::String(name));
        }
        Ok(handler)
    }
}
