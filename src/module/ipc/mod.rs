//! Worker message protocol
//!
//! Wire types exchanged with the worker context during bootstrap.

pub mod protocol;

pub use protocol::{Acknowledgment, FailureReport, InitMessage, INIT_ERROR_CODE, INIT_ERROR_REASON};
