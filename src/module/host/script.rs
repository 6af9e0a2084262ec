//! Embedded host
//!
//! Sources come from an in-memory script map; emitted messages are collected
//! in an outbox the embedder drains.

use serde_json::Value;
use std::mem;
use tracing::debug;

use crate::module::loader::{Script, ScriptMap};
use crate::module::traits::{HostEnvironment, ModuleError};

#[derive(Debug, Default)]
pub struct ScriptHost {
    scripts: ScriptMap,
    outbox: Vec<Value>,
    closed: bool,
}

impl ScriptHost {
    pub fn new(scripts: ScriptMap) -> Self {
        Self {
            scripts,
            outbox: Vec::new(),
            closed: false,
        }
    }

    pub fn scripts_mut(&mut self) -> &mut ScriptMap {
        &mut self.scripts
    }

    /// Messages emitted so far
    pub fn outbox(&self) -> &[Value] {
        &self.outbox
    }

    /// Drain the emitted messages
    pub fn take_outbox(&mut self) -> Vec<Value> {
        mem::take(&mut self.outbox)
    }
}

impl HostEnvironment for ScriptHost {
    fn load_source(&mut self, url: &str) -> Result<Script, ModuleError> {
        self.scripts.load(url)
    }

    fn emit(&mut self, message: Value) {
        if self.closed {
            debug!("Host closed, dropping outbound message");
            return;
        }
        self.outbox.push(message);
    }

    fn shutdown(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
