use std::cell::Cell;
use std::fmt;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{IndexError, LoggerError};
use crate::severity::Severity;

/// Handle to a remote indexing backend.
///
/// Implementations own everything about reaching the backend: transport, TLS,
/// authentication, timeouts. The logger only asks them to store one encoded
/// record in one index, synchronously, and reports whatever error comes back.
///
/// # Usage
///
/// ```
/// # use elastic_logger::{IndexClient, IndexError};
/// # use std::sync::Mutex;
/// // Keeps every document in memory
/// #[derive(Default)]
/// struct MemoryIndex(Mutex<Vec<(String, Vec<u8>)>>);
///
/// impl IndexClient for MemoryIndex {
///     fn index(&self, index: &str, document: &[u8]) -> Result<(), IndexError> {
///         self.0.lock().unwrap().push((index.to_string(), document.to_vec()));
///         Ok(())
///     }
/// }
/// ```
pub trait IndexClient: Send + Sync {
    /// Writes `document`, a JSON object, into `index`.
    ///
    /// Called on the logging thread, which blocks until this returns.
    fn index(&self, index: &str, document: &[u8]) -> Result<(), IndexError>;

    /// Whether records from the `log` facade with this `target` may be
    /// forwarded to this client.
    ///
    /// Clients whose transport logs through `log` on threads of its own
    /// return `false` for those targets; such records stay on the console.
    fn forwards_target(&self, _target: &str) -> bool {
        true
    }
}

impl<T: IndexClient + ?Sized> IndexClient for Arc<T> {
    fn index(&self, index: &str, document: &[u8]) -> Result<(), IndexError> {
        (**self).index(index, document)
    }

    fn forwards_target(&self, target: &str) -> bool {
        (**self).forwards_target(target)
    }
}

thread_local! {
    static FORWARDING: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is inside [`RemoteSink::write`].
///
/// Records produced while a client is indexing (including by the client
/// itself) are kept off the remote sink.
pub fn forwarding() -> bool {
    FORWARDING.with(Cell::get)
}

/// Marks the current thread as forwarding until dropped.
struct ForwardingGuard;

impl ForwardingGuard {
    fn enter() -> Self {
        FORWARDING.with(|flag| flag.set(true));
        ForwardingGuard
    }
}

impl Drop for ForwardingGuard {
    fn drop(&mut self) {
        FORWARDING.with(|flag| flag.set(false));
    }
}

/// A local byte stream that accepts whole lines.
///
/// Every line is assembled in memory and handed to the underlying writer in a
/// single `write_all` while the stream's lock is held, so lines from
/// concurrent callers never interleave.
pub struct StreamSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl StreamSink {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Writes `bytes` followed by a newline, then flushes.
    pub fn write_line(&self, bytes: &[u8]) -> io::Result<()> {
        let mut line = Vec::with_capacity(bytes.len() + 1);
        line.extend_from_slice(bytes);
        line.push(b'\n');

        let mut writer = self.writer.lock();
        writer.write_all(&line)?;
        writer.flush()
    }

    pub fn flush(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }
}

impl fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSink").finish_non_exhaustive()
    }
}

/// The remote destination resolved for one dispatch: a bound client, the
/// index name and the threshold as they were when the dispatch started.
pub struct RemoteSink {
    client: Arc<dyn IndexClient>,
    index: String,
    threshold: Severity,
}

impl RemoteSink {
    pub fn new(client: Arc<dyn IndexClient>, index: String, threshold: Severity) -> Self {
        Self {
            client,
            index,
            threshold,
        }
    }

    /// Whether a record of `level` is forwarded.
    pub fn accepts(&self, level: Severity) -> bool {
        level.reaches(self.threshold)
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn forwards_target(&self, target: &str) -> bool {
        self.client.forwards_target(target)
    }

    /// Sends one encoded record to the client.
    ///
    /// A panic inside the client is caught and returned as
    /// [`IndexError::Panicked`]; it never unwinds into the logging call.
    pub fn write(&self, document: &[u8]) -> Result<(), LoggerError> {
        let _forwarding = ForwardingGuard::enter();
        let client = &self.client;
        let index = self.index.as_str();
        match panic::catch_unwind(AssertUnwindSafe(|| client.index(index, document))) {
            Ok(result) => result.map_err(LoggerError::from),
            Err(payload) => Err(IndexError::Panicked(panic_message(payload.as_ref())).into()),
        }
    }
}

impl fmt::Debug for RemoteSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSink")
            .field("index", &self.index)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
