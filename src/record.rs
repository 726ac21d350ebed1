use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::call_site::CallSite;
use crate::clock::format_timestamp;
use crate::severity::Severity;

/// A structured log record, exactly as it is written to the sinks.
///
/// Field order matches the wire format:
///
/// ```json
/// {"timestamp":"2023-01-14 13:04:05","level":"ERROR","message":"boom","file":"src/main.rs:12","function":"main()"}
/// ```
///
/// A record is built once per logging call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogRecord {
    timestamp: String,
    level: Severity,
    message: String,
    file: String,
    function: String,
}

impl LogRecord {
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `path:line` of the call site.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Bare caller name followed by `()`.
    pub fn function(&self) -> &str {
        &self.function
    }
}

/// Assembles [`LogRecord`]s for a given timestamp layout.
///
/// # Examples
///
/// ```
/// # use chrono::{Local, TimeZone};
/// # use elastic_logger::{CallSite, RecordBuilder, Severity};
/// let now = Local.with_ymd_and_hms(2023, 1, 14, 13, 4, 5).unwrap();
/// let site = CallSite::new("src/main.rs", 12, "main");
///
/// let record = RecordBuilder::new("%Y-%m-%d %H:%M:%S")
///     .build(Severity::Error, "boom".to_string(), &site, &now);
///
/// assert_eq!(record.timestamp(), "2023-01-14 13:04:05");
/// assert_eq!(record.file(), "src/main.rs:12");
/// assert_eq!(record.function(), "main()");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RecordBuilder<'a> {
    layout: &'a str,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(layout: &'a str) -> Self {
        Self { layout }
    }

    pub fn build(
        &self,
        level: Severity,
        message: String,
        call_site: &CallSite,
        now: &DateTime<Local>,
    ) -> LogRecord {
        LogRecord {
            timestamp: format_timestamp(now, self.layout),
            level,
            message,
            file: call_site.location(),
            function: call_site.function_label(),
        }
    }
}
