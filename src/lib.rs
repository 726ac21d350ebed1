//! # Elastic Logger
//!
//! A leveled structured logger that turns `logger.error("boom")` into a JSON
//! record and fans it out to two sinks:
//!
//! * **Console**: every record, regardless of severity, is written as one
//!   line to stdout (or any `Write` you supply)
//! * **Remote index**: records at or above the configured threshold are also
//!   written to an indexing backend such as Elasticsearch, once a client has
//!   been bound
//!
//! ## Record Format
//!
//! ```json
//! {"timestamp":"2023-01-14 13:04:05","level":"ERROR","message":"boom","file":"src/main.rs:12","function":"main()"}
//! ```
//!
//! `file` and `function` name the code that called the logger, not the
//! logger's internals.
//!
//! ## Main Components
//!
//! * `Logger`: the dispatcher, owning its configuration and client
//! * `global`: a process-wide `Logger` behind free functions
//! * `IndexClient`: the seam for remote backends, with `ElasticsearchClient`
//!   as the bundled implementation
//! * `RecordReader`: parses console output back into records
//!
//! ## Quick Start
//!
//! ```
//! use elastic_logger::{IndexClient, IndexError, Logger, Severity};
//! use std::sync::Arc;
//!
//! struct Stdout;
//! impl IndexClient for Stdout {
//!     fn index(&self, index: &str, document: &[u8]) -> Result<(), IndexError> {
//!         println!("{} <- {}", index, String::from_utf8_lossy(document));
//!         Ok(())
//!     }
//! }
//!
//! let logger = Logger::builder()
//!     .index("orders")
//!     .log_level(Severity::Warning)
//!     .build();
//! logger.set_client(Arc::new(Stdout));
//!
//! logger.info("only on the console");
//! logger.warning("console and index");
//! elastic_logger::error!(logger: logger, "order {} failed", 17);
//! ```

pub mod call_site;
pub mod clock;
pub mod config;
#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;
pub mod encoder;
pub mod error;
pub mod global;
pub mod log_bridge;
pub mod logger;
pub mod reader;
pub mod record;
pub mod severity;
pub mod sink;
pub mod symbol_cache;

pub use call_site::CallSite;
pub use config::LoggerConfig;
#[cfg(feature = "elasticsearch")]
pub use elasticsearch::ElasticsearchClient;
pub use error::{ConfigError, IndexError, LoggerError, ParseSeverityError};
pub use logger::{Logger, LoggerBuilder};
pub use reader::RecordReader;
pub use record::{LogRecord, RecordBuilder};
pub use severity::Severity;
pub use sink::{IndexClient, RemoteSink, StreamSink};
