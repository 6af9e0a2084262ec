//! Host environments
//!
//! Implementations of [`HostEnvironment`](crate::module::traits::HostEnvironment):
//! an embedded host that keeps everything in memory, and a worker host that
//! runs the bootstrap on its own thread behind message channels.

pub mod channel;
pub mod script;

pub use channel::{ChannelHost, WorkerHandle};
pub use script::ScriptHost;
