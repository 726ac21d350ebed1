use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

use crate::config::DEFAULT_TIME_FORMAT;

/// Wall-clock source used to timestamp records.
///
/// The logger reads the clock once per dispatch, at the moment the record is
/// built. Tests install a fixed clock through
/// [`LoggerBuilder::clock`](crate::LoggerBuilder::clock).
pub type Clock = dyn Fn() -> DateTime<Local> + Send + Sync;

/// Returns the current local time.
pub fn system_now() -> DateTime<Local> {
    Local::now()
}

/// Checks whether `layout` is a strftime pattern chrono can render.
///
/// # Examples
///
/// ```
/// # use elastic_logger::clock::is_valid_layout;
/// assert!(is_valid_layout("%Y-%m-%d %H:%M:%S"));
/// assert!(!is_valid_layout("%Y-%Q"));
/// ```
pub fn is_valid_layout(layout: &str) -> bool {
    StrftimeItems::new(layout).all(|item| !matches!(item, Item::Error))
}

/// Renders `time` using `layout`.
///
/// An invalid layout never fails the logging call: the timestamp is rendered
/// with [`DEFAULT_TIME_FORMAT`] instead.
///
/// # Examples
///
/// ```
/// # use chrono::{Local, TimeZone};
/// # use elastic_logger::clock::format_timestamp;
/// let time = Local.with_ymd_and_hms(2023, 1, 14, 13, 4, 5).unwrap();
/// assert_eq!(format_timestamp(&time, "%d/%m/%Y"), "14/01/2023");
/// assert_eq!(format_timestamp(&time, "%Q"), "2023-01-14 13:04:05");
/// ```
pub fn format_timestamp(time: &DateTime<Local>, layout: &str) -> String {
    let mut out = String::with_capacity(layout.len() + 16);
    if is_valid_layout(layout) && write!(out, "{}", time.format(layout)).is_ok() {
        return out;
    }

    format!("{}", time.format(DEFAULT_TIME_FORMAT))
}
