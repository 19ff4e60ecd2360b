use std::io;

use thiserror::Error;

/// Error kinds surfaced by the logging pipeline.
///
/// Buffer and rotation errors are local to a single sink or operation and
/// never prevent delivery to the remaining sinks. Configuration errors are
/// raised at construction time only, before any logger is usable.
#[derive(Debug, Error)]
pub enum LogError {
    /// A buffer consume requested more bytes than were written. This is a
    /// programming error on the caller's side; the operation is aborted and
    /// the buffer cursors are left untouched.
    #[error("consume of {requested} bytes exceeds {readable} readable bytes")]
    OutOfRange { requested: usize, readable: usize },

    /// A single formatted record exceeds a size-rotated sink's maximum file
    /// size. The record can never be written to that destination under the
    /// current configuration.
    #[error("record of {len} bytes exceeds maximum file size of {max_size} bytes")]
    RecordTooLarge { len: u64, max_size: u64 },

    /// The formatter failed to render a record. Recovered inside `emit` by
    /// substituting a fallback payload; logging continues.
    #[error("format failure: {0}")]
    Format(String),

    /// An underlying open or write failed. The affected sink is marked
    /// degraded and skipped; remaining sinks keep receiving records.
    #[error("sink I/O failure on {target}: {source}")]
    SinkIo {
        target: String,
        #[source]
        source: io::Error,
    },

    /// `submit` was called after shutdown was requested. The original
    /// implementation dropped such records silently; rejecting makes the
    /// data loss visible to the caller.
    #[error("pipeline already stopped")]
    PipelineStopped,

    /// Invalid format pattern or missing required configuration field.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LogError {
    pub(crate) fn sink_io(target: impl Into<String>, source: io::Error) -> Self {
        Self::SinkIo {
            target: target.into(),
            source,
        }
    }
}
