use crate::error::LoggerError;
use crate::record::LogRecord;

/// Serializes a record into its JSON wire form.
///
/// The result is a single JSON object without a trailing newline; the console
/// sink adds the line terminator and the remote sink sends it as the document
/// body. Every field is a string, so for well-formed records this cannot fail
/// in practice, but the error is still surfaced to the dispatcher rather than
/// unwrapped.
pub fn encode(record: &LogRecord) -> Result<Vec<u8>, LoggerError> {
    serde_json::to_vec(record).map_err(LoggerError::Encode)
}
