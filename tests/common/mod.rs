#![allow(dead_code)]

use chrono::{DateTime, Local, TimeZone};
use elastic_logger::{IndexClient, IndexError, Logger, LoggerBuilder};
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory stream standing in for stdout or stderr.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Stream whose writes always fail.
pub struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Client that records every document it receives.
#[derive(Default)]
pub struct RecordingClient {
    pub documents: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingClient {
    pub fn count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn indices(&self) -> Vec<String> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .map(|(index, _)| index.clone())
            .collect()
    }

    pub fn json_documents(&self) -> Vec<serde_json::Value> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| serde_json::from_slice(body).unwrap())
            .collect()
    }
}

impl IndexClient for RecordingClient {
    fn index(&self, index: &str, document: &[u8]) -> Result<(), IndexError> {
        self.documents
            .lock()
            .unwrap()
            .push((index.to_string(), document.to_vec()));
        Ok(())
    }
}

/// Client that counts attempts and always fails.
#[derive(Default)]
pub struct FailingClient {
    pub attempts: AtomicUsize,
}

impl IndexClient for FailingClient {
    fn index(&self, _index: &str, _document: &[u8]) -> Result<(), IndexError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(IndexError::Other("connection refused".to_string()))
    }
}

/// Asserts that a record's `function` field is `expected`.
///
/// Call sites captured at runtime need debug info; optimized builds without it
/// record the `???()` placeholder instead of a wrong name.
pub fn assert_function(record: &serde_json::Value, expected: &str) {
    let function = record["function"].as_str().unwrap();
    if cfg!(debug_assertions) {
        assert_eq!(function, expected);
    } else {
        assert!(
            function == expected || function == "???()",
            "unexpected function {}",
            function
        );
    }
}

pub fn fixed_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2023, 1, 14, 13, 4, 5).unwrap()
}

/// Logger writing to in-memory streams with a fixed clock.
pub fn captured(builder: LoggerBuilder) -> (Logger, Capture, Capture) {
    let console = Capture::default();
    let errors = Capture::default();
    let logger = builder
        .console(console.clone())
        .error_stream(errors.clone())
        .clock(fixed_time)
        .build();
    (logger, console, errors)
}
