//! Module source loading
//!
//! Sources are scripts: running one defines the construction routines of the
//! modules it provides.

pub mod loader;

pub use loader::{script, DefineScope, Script, ScriptMap};
