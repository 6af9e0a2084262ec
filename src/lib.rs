//! Worker Runtime - module loading for message-passing worker contexts
//!
//! A worker context is bootstrapped by a single init message carrying a
//! batch of module descriptors. The runtime registers the modules, loads
//! their sources through the host, builds them in dependency order (cyclic
//! groups included), and installs the first module's message handler as the
//! context's router.
//!
//! ## Design Principles
//!
//! 1. **Single writer**: one worker context owns its registry; all
//!    construction runs on the thread that handles its messages
//! 2. **Cycle tolerance**: require cycles terminate and observe partially
//!    populated exports
//! 3. **Fail-fast init**: any init error is reported once with code 10 and
//!    the context is shut down
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use worker_runtime::module::registry::MESSAGE_HANDLER_KEY;
//! use worker_runtime::{InitMessage, ModuleDescriptor, RuntimeConfig, ScriptHost, ScriptMap, WorkerBootstrap};
//!
//! let mut scripts = ScriptMap::new();
//! scripts.define_module("server.js", "/app/server", |_, exports, _| {
//!     exports.set_handler(MESSAGE_HANDLER_KEY, |host, message| {
//!         host.emit(message);
//!         Ok(())
//!     });
//!     Ok(())
//! });
//!
//! let mut worker = WorkerBootstrap::new(ScriptHost::new(scripts), RuntimeConfig::default());
//! let init = InitMessage::new(vec![ModuleDescriptor::new("/app/server", "server.js")]);
//! worker.on_message(init.to_message()).unwrap();
//! worker.on_message(json!("ping")).unwrap();
//!
//! assert_eq!(worker.host().outbox(), &[json!({ "ok": true }), json!("ping")]);
//! ```

pub mod config;
pub mod module;
pub mod utils;

pub use config::{ConfigError, RuntimeConfig};
pub use module::{
    Acknowledgment, BootstrapState, ChannelHost, DependencyBuilder, Exports, HostEnvironment,
    InitMessage, LoadState, ModuleDescriptor, ModuleError, Registry, ScriptHost, ScriptMap,
    WorkerBootstrap, WorkerHandle,
};
