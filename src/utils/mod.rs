//! Shared utilities

pub mod env;
pub mod logging;
pub mod text;

pub use env::{env_bool, env_bool_opt, env_opt};
pub use logging::{init_logging, init_logging_from_config};
#[cfg(feature = "json-logging")]
pub use logging::init_json_logging;
pub use text::{utf8_decode, utf8_decode_strict};
