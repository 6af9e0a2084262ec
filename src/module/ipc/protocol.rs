//! Bootstrap message protocol
//!
//! Defines the inbound init message and the outbound acknowledgments.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as StdError;

use crate::module::registry::ModuleDescriptor;
use crate::module::traits::ModuleError;

/// Error code reported when the worker fails to initialize
pub const INIT_ERROR_CODE: u32 = 10;

/// Prefix of the failure reason
pub const INIT_ERROR_REASON: &str = "server worker, init error! ";

/// First message a worker context receives
///
/// `mods[0]` is the server module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitMessage {
    pub mods: Vec<ModuleDescriptor>,
    /// Name attached to the server module's exports
    #[serde(default)]
    pub name: Option<String>,
}

impl InitMessage {
    pub fn new(mods: Vec<ModuleDescriptor>) -> Self {
        Self { mods, name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parse an inbound message
    pub fn from_message(message: Value) -> Result<Self, ModuleError> {
        Ok(serde_json::from_value(message)?)
    }

    /// The server module descriptor
    pub fn server(&self) -> Result<&ModuleDescriptor, ModuleError> {
        self.mods.first().ok_or(ModuleError::EmptyBatch)
    }

    pub fn to_message(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Structured report of a failed bootstrap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Numeric error code
    pub error: u32,
    /// Diagnostic trace: the error and its chain of causes
    pub stack: String,
    /// Human-readable reason
    pub reason: String,
}

impl FailureReport {
    pub fn from_error(err: &ModuleError) -> Self {
        Self {
            error: INIT_ERROR_CODE,
            stack: error_chain(err),
            reason: format!("{}{}", INIT_ERROR_REASON, err),
        }
    }
}

fn error_chain(err: &ModuleError) -> String {
    let mut lines = vec![format!("{:?}", err)];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {}", cause));
        source = cause.source();
    }
    lines.join("\n")
}

/// Outbound acknowledgment of the init message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Acknowledgment {
    /// `{ ok: true }`
    Ready { ok: bool },
    /// `{ error, stack, reason }`
    Failed(FailureReport),
}

impl Acknowledgment {
    pub fn ready() -> Self {
        Acknowledgment::Ready { ok: true }
    }

    pub fn failed(err: &ModuleError) -> Self {
        Acknowledgment::Failed(FailureReport::from_error(err))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Acknowledgment::Ready { ok: true })
    }

    pub fn to_message(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Parse an outbound message back into an acknowledgment
    pub fn from_message(message: Value) -> Option<Self> {
        serde_json::from_value(message).ok()
    }
}
