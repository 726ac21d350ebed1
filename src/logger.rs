//! Core implementation of the structured logger.
//!
//! This module provides the `Logger` struct, its builder, and the dispatch
//! path shared by every entry point.

use std::fmt;
use std::io::Write;
use std::panic::Location;
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::call_site::CallSite;
use crate::clock::{system_now, Clock};
use crate::config::LoggerConfig;
use crate::encoder;
use crate::error::LoggerError;
use crate::record::RecordBuilder;
use crate::severity::Severity;
use crate::sink::{self, IndexClient, RemoteSink, StreamSink};

/// Everything a dispatch reads from shared state, guarded by one lock.
struct SharedConfig {
    index: String,
    threshold: Severity,
    time_format: String,
    client: Option<Arc<dyn IndexClient>>,
}

/// A consistent view of [`SharedConfig`] taken once per dispatch.
struct Snapshot {
    time_format: String,
    remote: Option<RemoteSink>,
}

/// A leveled structured logger writing JSON records to a local stream and,
/// optionally, to a remote index.
///
/// Every call:
///
/// 1. Builds a [`LogRecord`](crate::LogRecord) stamped with the current time
///    and the caller's file, line and function
/// 2. Encodes it as a single-line JSON object
/// 3. Writes it to the console stream, whatever its severity
/// 4. Forwards it to the bound [`IndexClient`] if its severity reaches the
///    configured threshold
///
/// Failures in steps 2–4 are written to the error stream and otherwise
/// ignored. No entry point returns an error, and only [`Logger::fatal`]
/// affects control flow.
///
/// # Thread Safety
///
/// `Logger` is `Send + Sync` and meant to be shared. Index, threshold, time
/// format and client live behind a single mutex: setters write under it and
/// each dispatch reads all four under it in one acquisition, so no record is
/// ever produced from a half-applied change. The remote write itself runs
/// after the lock is released, so a slow backend blocks only the calling
/// thread. Console lines are serialized by the console stream's own lock.
///
/// # Blocking
///
/// The remote write is synchronous and carries no deadline of its own. A slow
/// or unreachable backend stalls the logging thread for as long as the client
/// takes to give up.
///
/// # Examples
///
/// ```
/// # use elastic_logger::{Logger, Severity};
/// let logger = Logger::builder()
///     .index("service-logs")
///     .log_level(Severity::Warning)
///     .console(std::io::sink())
///     .build();
///
/// logger.info("cache warmed");
/// logger.error(format_args!("request {} failed", 42));
/// ```
pub struct Logger {
    shared: Mutex<SharedConfig>,
    console: StreamSink,
    errors: StreamSink,
    clock: Arc<Clock>,
}

impl Logger {
    /// Creates a logger with default settings writing to stdout and stderr.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a logger from `config` writing to stdout and stderr.
    pub fn from_config(config: LoggerConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Sets the index records are forwarded to, starting with the next record.
    pub fn set_index(&self, index: impl Into<String>) {
        let index = index.into();
        tracing::debug!(%index, "log index changed");
        self.shared.lock().index = index;
    }

    /// Sets the minimum severity forwarded to the remote sink.
    ///
    /// The console sink is not affected.
    pub fn set_log_level(&self, level: Severity) {
        tracing::debug!(%level, "log threshold changed");
        self.shared.lock().threshold = level;
    }

    /// Sets the strftime layout used for the `timestamp` field.
    ///
    /// The layout is not validated here; records fall back to the default
    /// layout while an unrenderable one is configured.
    pub fn set_time_format(&self, layout: impl Into<String>) {
        let layout = layout.into();
        tracing::debug!(%layout, "log time format changed");
        self.shared.lock().time_format = layout;
    }

    /// Applies every setting of `config` at once.
    pub fn apply_config(&self, config: &LoggerConfig) {
        let mut shared = self.shared.lock();
        shared.index = config.index.clone();
        shared.threshold = config.level;
        shared.time_format = config.time_format.clone();
        tracing::debug!(index = %config.index, level = %config.level, "log config applied");
    }

    /// Binds the remote indexing client.
    ///
    /// Only the first call has an effect; later calls leave the bound client
    /// in place. Returns `true` if this call bound `client`.
    pub fn set_client(&self, client: Arc<dyn IndexClient>) -> bool {
        let mut shared = self.shared.lock();
        if shared.client.is_some() {
            tracing::trace!("index client already bound, ignoring");
            return false;
        }
        shared.client = Some(client);
        tracing::debug!("index client bound");
        true
    }

    pub fn has_client(&self) -> bool {
        self.shared.lock().client.is_some()
    }

    pub fn index(&self) -> String {
        self.shared.lock().index.clone()
    }

    pub fn log_level(&self) -> Severity {
        self.shared.lock().threshold
    }

    pub fn time_format(&self) -> String {
        self.shared.lock().time_format.clone()
    }

    /// The current settings, read under one lock acquisition.
    pub fn config(&self) -> LoggerConfig {
        let shared = self.shared.lock();
        LoggerConfig {
            index: shared.index.clone(),
            level: shared.threshold,
            time_format: shared.time_format.clone(),
        }
    }

    #[track_caller]
    #[inline(never)]
    pub fn debug(&self, message: impl fmt::Display) {
        self.dispatch(Severity::Debug, CallSite::capture(Location::caller()), message);
    }

    #[track_caller]
    #[inline(never)]
    pub fn info(&self, message: impl fmt::Display) {
        self.dispatch(Severity::Info, CallSite::capture(Location::caller()), message);
    }

    #[track_caller]
    #[inline(never)]
    pub fn warning(&self, message: impl fmt::Display) {
        self.dispatch(Severity::Warning, CallSite::capture(Location::caller()), message);
    }

    #[track_caller]
    #[inline(never)]
    pub fn error(&self, message: impl fmt::Display) {
        self.dispatch(Severity::Error, CallSite::capture(Location::caller()), message);
    }

    /// Logs at FATAL and exits the process with status 1.
    ///
    /// The exit happens after the dispatch attempt whether or not the record
    /// reached the remote index.
    #[track_caller]
    #[inline(never)]
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        self.dispatch(Severity::Fatal, CallSite::capture(Location::caller()), message);
        self.exit()
    }

    /// Logs at `severity`. A FATAL record logged this way does not exit.
    #[track_caller]
    #[inline(never)]
    pub fn log(&self, severity: Severity, message: impl fmt::Display) {
        self.dispatch(severity, CallSite::capture(Location::caller()), message);
    }

    /// Logs with an explicit call site. Used by the logging macros.
    pub fn log_at(&self, severity: Severity, call_site: CallSite, message: impl fmt::Display) {
        self.dispatch(severity, call_site, message);
    }

    /// Logs at FATAL with an explicit call site and exits with status 1.
    pub fn fatal_at(&self, call_site: CallSite, message: impl fmt::Display) -> ! {
        self.dispatch(Severity::Fatal, call_site, message);
        self.exit()
    }

    /// Logs a record from the `log` facade. Clients may keep records of some
    /// targets off the remote sink.
    pub(crate) fn log_target(
        &self,
        severity: Severity,
        call_site: CallSite,
        target: &str,
        message: impl fmt::Display,
    ) {
        self.dispatch_target(severity, call_site, Some(target), message);
    }

    fn exit(&self) -> ! {
        let _ = self.console.flush();
        let _ = self.errors.flush();
        std::process::exit(1)
    }

    fn snapshot(&self) -> Snapshot {
        let shared = self.shared.lock();
        Snapshot {
            time_format: shared.time_format.clone(),
            remote: shared
                .client
                .as_ref()
                .map(|client| RemoteSink::new(client.clone(), shared.index.clone(), shared.threshold)),
        }
    }

    fn dispatch(&self, severity: Severity, call_site: CallSite, message: impl fmt::Display) {
        self.dispatch_target(severity, call_site, None, message);
    }

    /// Writes the record to the console, then to the remote sink when the
    /// threshold allows it. A record produced while this thread is already
    /// inside a remote write stays on the console.
    fn dispatch_target(
        &self,
        severity: Severity,
        call_site: CallSite,
        target: Option<&str>,
        message: impl fmt::Display,
    ) {
        let snapshot = self.snapshot();
        let now: DateTime<Local> = (self.clock)();
        let record = RecordBuilder::new(&snapshot.time_format).build(
            severity,
            message.to_string(),
            &call_site,
            &now,
        );

        let encoded = match encoder::encode(&record) {
            Ok(encoded) => encoded,
            Err(err) => {
                self.report(&err);
                return;
            }
        };

        if let Err(err) = self.console.write_line(&encoded) {
            self.report(&LoggerError::Io(err));
        }

        let Some(remote) = snapshot.remote else {
            return;
        };
        if !remote.accepts(severity) || sink::forwarding() {
            return;
        }
        if target.is_some_and(|target| !remote.forwards_target(target)) {
            return;
        }
        if let Err(err) = remote.write(&encoded) {
            self.report(&err);
        }
    }

    fn report(&self, err: &LoggerError) {
        // Nowhere left to report a failing error stream.
        let _ = self.errors.write_line(err.to_string().as_bytes());
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.lock();
        f.debug_struct("Logger")
            .field("index", &shared.index)
            .field("threshold", &shared.threshold)
            .field("time_format", &shared.time_format)
            .field("client_bound", &shared.client.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Logger`].
///
/// Unset streams default to stdout (console) and stderr (errors); an unset
/// clock reads local wall-clock time.
#[derive(Default)]
pub struct LoggerBuilder {
    config: LoggerConfig,
    console: Option<StreamSink>,
    errors: Option<StreamSink>,
    client: Option<Arc<dyn IndexClient>>,
    clock: Option<Arc<Clock>>,
}

impl LoggerBuilder {
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.config.index = index.into();
        self
    }

    pub fn log_level(mut self, level: Severity) -> Self {
        self.config.level = level;
        self
    }

    pub fn time_format(mut self, layout: impl Into<String>) -> Self {
        self.config.time_format = layout.into();
        self
    }

    /// Stream every record is written to.
    pub fn console(mut self, writer: impl Write + Send + 'static) -> Self {
        self.console = Some(StreamSink::new(writer));
        self
    }

    /// Stream encoding and indexing failures are reported to.
    pub fn error_stream(mut self, writer: impl Write + Send + 'static) -> Self {
        self.errors = Some(StreamSink::new(writer));
        self
    }

    /// Binds the remote client up front. Later [`Logger::set_client`] calls
    /// are then ignored.
    pub fn client(mut self, client: Arc<dyn IndexClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Local> + Send + Sync + 'static,
    {
        let clock: Arc<Clock> = Arc::new(clock);
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Logger {
        let LoggerConfig {
            index,
            level,
            time_format,
        } = self.config;

        Logger {
            shared: Mutex::new(SharedConfig {
                index,
                threshold: level,
                time_format,
                client: self.client,
            }),
            console: self.console.unwrap_or_else(StreamSink::stdout),
            errors: self.errors.unwrap_or_else(StreamSink::stderr),
            clock: self.clock.unwrap_or_else(|| Arc::new(system_now) as Arc<Clock>),
        }
    }
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("config", &self.config)
            .field("client_bound", &self.client.is_some())
            .finish_non_exhaustive()
    }
}

/// Logs a formatted message at the given severity.
///
/// The call site is captured at compile time. Prefix the arguments with
/// `logger: <expr>,` to log through a specific [`Logger`]; otherwise the
/// process-wide logger from [`global`](crate::global) is used. A FATAL record
/// logged with this macro does not exit; use [`fatal!`](crate::fatal!).
///
/// # Examples
///
/// ```
/// # use elastic_logger::{log, Logger, Severity};
/// let logger = Logger::builder().console(std::io::sink()).build();
/// let attempt = 3;
/// log!(logger: logger, Severity::Warning, "retrying, attempt {}", attempt);
/// ```
#[macro_export]
macro_rules! log {
    (logger: $logger:expr, $severity:expr, $($arg:tt)+) => {
        $logger.log_at($severity, $crate::call_site!(), ::std::format_args!($($arg)+))
    };
    ($severity:expr, $($arg:tt)+) => {
        $crate::global::logger().log_at($severity, $crate::call_site!(), ::std::format_args!($($arg)+))
    };
}

/// Logs a formatted DEBUG message. See [`log!`](crate::log!).
#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Severity::Debug, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Debug, $($arg)+)
    };
}

/// Logs a formatted INFO message. See [`log!`](crate::log!).
#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Severity::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Info, $($arg)+)
    };
}

/// Logs a formatted WARNING message. See [`log!`](crate::log!).
#[macro_export]
macro_rules! warning {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Severity::Warning, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Warning, $($arg)+)
    };
}

/// Logs a formatted ERROR message. See [`log!`](crate::log!).
#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Severity::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Error, $($arg)+)
    };
}

/// Logs a formatted FATAL message and exits the process with status 1.
#[macro_export]
macro_rules! fatal {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.fatal_at($crate::call_site!(), ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global::logger().fatal_at($crate::call_site!(), ::std::format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let logger = Logger::builder().console(std::io::sink()).build();
        assert_eq!(logger.index(), "logs");
        assert_eq!(logger.log_level(), Severity::Error);
        assert_eq!(logger.time_format(), "%Y-%m-%d %H:%M:%S");
        assert!(!logger.has_client());
    }

    #[test]
    fn test_apply_config_is_atomic_view() {
        let logger = Logger::builder().console(std::io::sink()).build();
        let config = LoggerConfig {
            index: "audit".into(),
            level: Severity::Debug,
            time_format: "%s".into(),
        };
        logger.apply_config(&config);
        assert_eq!(logger.config(), config);
    }

    #[test]
    fn test_snapshot_without_client_has_no_remote() {
        let logger = Logger::builder().console(std::io::sink()).build();
        assert!(logger.snapshot().remote.is_none());
    }

    #[test]
    fn test_debug_output_hides_streams() {
        let logger = Logger::builder().console(std::io::sink()).build();
        let rendered = format!("{:?}", logger);
        assert!(rendered.contains("client_bound: false"));
        assert!(rendered.contains("\"logs\""));
    }
}
