//! Module system for worker contexts
//!
//! A worker context receives one init message describing a batch of code
//! units, registers and builds them, then hands message routing over to the
//! first unit of the batch (the server module).
//!
//! ## Architecture
//!
//! - **Registry**: one record per module id, created once, never replaced
//! - **Dependency building**: dependency-ordered construction with forced
//!   construction of cyclic groups and partial exports for require cycles
//! - **Bootstrap**: init message handling and the handoff to the server
//! - **Hosts**: source loading and message posting are capabilities of the
//!   host, so the same core runs embedded or on a worker thread

pub mod host;
pub mod ipc;
pub mod loader;
pub mod manager;
pub mod registry;
pub mod resolver;
pub mod traits;

pub use host::{ChannelHost, ScriptHost, WorkerHandle};
pub use ipc::{Acknowledgment, FailureReport, InitMessage};
pub use loader::{DefineScope, Script, ScriptMap};
pub use manager::{BootstrapState, WorkerBootstrap};
pub use registry::{
    BuildReport, DependencyBuilder, Export, Exports, ModuleDescriptor, ModuleRecord, Registry,
    Require,
};
pub use resolver::IdKind;
pub use traits::{HostEnvironment, LoadState, ModuleError};
