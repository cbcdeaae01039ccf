//! Logging utilities.
//!
//! Library code only talks to the `log` facade. Binaries and test harnesses
//! call [`init_logging`] once to install an `env_logger` backend.

mod init;

pub use init::{init_logging, LoggingConfig};
