use std::io::BufRead;

use crate::error::LoggerError;
use crate::record::LogRecord;
use crate::severity::Severity;

/// Reader for console output produced by the logger.
///
/// Each non-blank line is parsed as one [`LogRecord`]. Lines that are not a
/// valid record (wrong shape, extra or missing fields, unknown level) yield
/// [`LoggerError::Decode`] carrying the 1-based line number, and reading
/// continues with the next line.
///
/// # Examples
///
/// ```
/// # use elastic_logger::{RecordReader, Severity};
/// let output = concat!(
///     r#"{"timestamp":"t","level":"INFO","message":"up","file":"main.rs:3","function":"main()"}"#, "\n",
///     "\n",
///     r#"{"timestamp":"t","level":"ERROR","message":"down","file":"main.rs:9","function":"main()"}"#, "\n",
/// );
///
/// let records: Vec<_> = RecordReader::new(output.as_bytes())
///     .at_least(Severity::Warning)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].message(), "down");
/// ```
#[derive(Debug)]
pub struct RecordReader<R> {
    inner: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            buf: String::new(),
        }
    }

    /// Reads the next record, or `None` at end of input.
    pub fn read_record(&mut self) -> Option<Result<LogRecord, LoggerError>> {
        loop {
            self.buf.clear();
            match self.inner.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(err) => return Some(Err(LoggerError::Io(err))),
            }

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }

            let line = self.line;
            return Some(
                serde_json::from_str(text).map_err(|source| LoggerError::Decode { line, source }),
            );
        }
    }

    /// Keeps only records at or above `min`. Errors are passed through.
    pub fn at_least(self, min: Severity) -> impl Iterator<Item = Result<LogRecord, LoggerError>> {
        self.filter(move |result| match result {
            Ok(record) => record.level().reaches(min),
            Err(_) => true,
        })
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<LogRecord, LoggerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record()
    }
}
