//! Module system traits and interfaces
//!
//! Defines the capability interface a worker context must provide to the
//! bootstrap, the shared error type, and the observable record lifecycle.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::module::loader::Script;

/// Module record lifecycle state
///
/// `Registered -> Pending -> Building -> Loaded`. A pre-built (built-in)
/// record starts directly in `Loaded`. The state never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadState {
    /// Registered from a descriptor, no construction routine defined yet
    Registered,
    /// Construction routine defined, not yet run
    Pending,
    /// Construction routine is currently executing
    Building,
    /// Construction finished
    Loaded,
}

/// Host capabilities the bootstrap depends on
///
/// The same core runs under different hosts (an embedded engine that keeps
/// scripts in memory, or a worker thread fed through channels) by swapping
/// the implementation of this trait.
pub trait HostEnvironment {
    /// Fetch the source for `url` into the context
    ///
    /// The returned script is run immediately by the registry; it is expected
    /// to `define` the modules it provides.
    fn load_source(&mut self, url: &str) -> Result<Script, ModuleError>;

    /// Post a message out of the context
    fn emit(&mut self, message: Value);

    /// Terminate the context; no further messages will be handled
    fn shutdown(&mut self);

    /// True once `shutdown` has been called
    fn is_closed(&self) -> bool;
}

/// Module system errors
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("invalid amd mod: {0}")]
    MalformedModule(String),

    #[error("invalid require: {id}, from: {from}")]
    UnresolvedRequire { id: String, from: String },

    #[error("failed to load source {url}: {reason}")]
    SourceLoadFailure { url: String, reason: String },

    #[error("invalid define: {0}")]
    InvalidDefine(String),

    #[error("duplicate module id: {0}")]
    DuplicateModule(String),

    #[error("server module {0} exports no message handler")]
    MissingHandler(String),

    #[error("init message carries no modules")]
    EmptyBatch,

    #[error("invalid init message: {0}")]
    InvalidMessage(String),

    #[error("worker context is closed")]
    ContextClosed,

    #[error("invalid utf8")]
    InvalidUtf8,

    #[error(transparent)]
    Body(#[from] anyhow::Error),
}

impl From<serde_json::Error> for ModuleError {
    fn from(e: serde_json::Error) -> Self {
        ModuleError::InvalidMessage(e.to_string())
    }
}
