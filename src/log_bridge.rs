//! Adapter from the `log` facade.
//!
//! Libraries that log through `log::info!` and friends end up in the same
//! sinks as direct calls. The facade's `Trace` level has no counterpart and is
//! recorded as DEBUG.
//!
//! Records emitted while the same thread is indexing a document (a client
//! that logs through `log`, for instance) are written to the console only.

use std::borrow::Cow;

use crate::call_site::{self, CallSite, UNKNOWN};
use crate::logger::Logger;
use crate::severity::Severity;

impl log::Log for Logger {
    /// Always `true`: the console sink takes every record, and the remote
    /// threshold is applied at dispatch time.
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let file: Cow<'static, str> = match (record.file_static(), record.file()) {
            (Some(file), _) => Cow::Borrowed(file),
            (None, Some(file)) => Cow::Owned(file.to_string()),
            (None, None) => Cow::Borrowed(UNKNOWN),
        };
        let function = record
            .file()
            .and_then(call_site::caller_function)
            .map(Cow::Owned)
            .unwrap_or(Cow::Borrowed(UNKNOWN));
        let site = CallSite::new(file, record.line().unwrap_or(0), function);

        self.log_target(Severity::from(record.level()), site, record.target(), record.args());
    }

    fn flush(&self) {}
}

/// Registers `logger` as the `log` facade's implementation and lets every
/// level through.
pub fn install(logger: &'static Logger) -> Result<(), log::SetLoggerError> {
    log::set_logger(logger)?;
    log::set_max_level(log::LevelFilter::Trace);
    tracing::debug!("log facade bridge installed");
    Ok(())
}
