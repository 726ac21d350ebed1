//! The process-wide default logger.
//!
//! Programs that do not want to pass a [`Logger`] around can configure and
//! use this one through free functions. It starts with the default settings,
//! writes to stdout and stderr, and lives until the process exits.
//!
//! ```no_run
//! use elastic_logger::{global, Severity};
//!
//! global::set_index("checkout");
//! global::set_log_level(Severity::Warning);
//!
//! global::info("service started");
//! elastic_logger::error!("payment {} declined", 1042);
//! ```

use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::config::LoggerConfig;
use crate::logger::Logger;
use crate::severity::Severity;
use crate::sink::IndexClient;

lazy_static! {
    static ref GLOBAL: Logger = Logger::new();
}

/// The process-wide logger.
pub fn logger() -> &'static Logger {
    &GLOBAL
}

pub fn set_index(index: impl Into<String>) {
    GLOBAL.set_index(index);
}

pub fn set_log_level(level: Severity) {
    GLOBAL.set_log_level(level);
}

pub fn set_time_format(layout: impl Into<String>) {
    GLOBAL.set_time_format(layout);
}

/// Applies `config` to the process-wide logger.
pub fn configure(config: &LoggerConfig) {
    GLOBAL.apply_config(config);
}

/// Binds the remote client of the process-wide logger.
///
/// Only the first call in the life of the process takes effect; the return
/// value says whether this one did.
pub fn set_elasticsearch_client(client: Arc<dyn IndexClient>) -> bool {
    GLOBAL.set_client(client)
}

/// Routes records from the `log` facade into the process-wide logger.
///
/// Fails if another `log` implementation is already installed.
pub fn install_log_bridge() -> Result<(), log::SetLoggerError> {
    crate::log_bridge::install(logger())
}

#[track_caller]
#[inline(never)]
pub fn debug(message: impl fmt::Display) {
    GLOBAL.debug(message);
}

#[track_caller]
#[inline(never)]
pub fn info(message: impl fmt::Display) {
    GLOBAL.info(message);
}

#[track_caller]
#[inline(never)]
pub fn warning(message: impl fmt::Display) {
    GLOBAL.warning(message);
}

#[track_caller]
#[inline(never)]
pub fn error(message: impl fmt::Display) {
    GLOBAL.error(message);
}

/// Logs at FATAL through the process-wide logger and exits with status 1.
#[track_caller]
#[inline(never)]
pub fn fatal(message: impl fmt::Display) -> ! {
    GLOBAL.fatal(message)
}
