//! The `log` facade accepts one logger per process, so the bridge is
//! installed once and exercised from a single test function.

mod common;

use common::{assert_function, captured, Capture, RecordingClient};
use elastic_logger::{log_bridge, IndexClient, IndexError, Logger, Severity};
use std::sync::Arc;

const TRANSPORT_TARGET: &str = "chatty_transport";

/// Client whose transport logs through the `log` facade while indexing.
#[derive(Default)]
struct ChattyClient {
    inner: RecordingClient,
}

impl IndexClient for ChattyClient {
    fn index(&self, index: &str, document: &[u8]) -> Result<(), IndexError> {
        log::debug!(target: TRANSPORT_TARGET, "starting new connection");
        log::warn!("connection pool exhausted");
        self.inner.index(index, document)
    }

    fn forwards_target(&self, target: &str) -> bool {
        target != TRANSPORT_TARGET
    }
}

fn leaked_logger() -> (&'static Logger, Capture, Capture, Arc<ChattyClient>) {
    let client = Arc::new(ChattyClient::default());
    let (logger, console, errors) =
        captured(Logger::builder().log_level(Severity::Debug).client(client.clone()));
    (Box::leak(Box::new(logger)), console, errors, client)
}

#[test]
fn test_bridge_with_logging_client() {
    let (logger, console, errors, client) = leaked_logger();
    log_bridge::install(logger).unwrap();

    // Records the client emits while indexing stay on the console.
    logger.error("one record");

    let lines = console.json_lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["message"], "one record");
    assert_eq!(lines[1]["message"], "starting new connection");
    assert_eq!(lines[1]["level"], "DEBUG");
    assert_eq!(lines[2]["message"], "connection pool exhausted");
    assert_eq!(lines[2]["level"], "WARNING");
    assert_eq!(client.inner.count(), 1);
    assert_eq!(client.inner.json_documents()[0]["message"], "one record");
    assert!(errors.contents().is_empty());

    // Outside a remote write, facade records are indexed unless the client
    // declines their target.
    log::info!("facade record");
    log::info!(target: TRANSPORT_TARGET, "transport noise");

    let documents = client.inner.json_documents();
    assert_eq!(client.inner.count(), 2);
    assert_eq!(documents[1]["message"], "facade record");
    assert_function(&documents[1], "test_bridge_with_logging_client()");

    let lines = console.json_lines();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[6]["message"], "transport noise");
}
