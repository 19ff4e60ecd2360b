use std::thread::ThreadId;

use chrono::{DateTime, Local};

use crate::level::Level;

/// A single log record, captured at the emit call site.
///
/// Wall-clock time and thread identity are taken when the record is
/// constructed, before any formatting or delivery happens, so the rendered
/// output reflects the moment of the call rather than the moment of the
/// (possibly asynchronous) write.
#[derive(Debug, Clone)]
pub struct LogRecord<'a> {
    /// Name of the logger that produced the record.
    pub name: &'a str,
    /// Source file of the call site.
    pub file: &'a str,
    /// Source line of the call site.
    pub line: u32,
    /// Identity of the emitting thread.
    pub tid: ThreadId,
    /// Wall-clock timestamp of the call.
    pub time: DateTime<Local>,
    /// Severity of the record.
    pub level: Level,
    /// Rendered payload text.
    pub payload: &'a str,
}

impl<'a> LogRecord<'a> {
    pub fn new(name: &'a str, file: &'a str, line: u32, level: Level, payload: &'a str) -> Self {
        Self {
            name,
            file,
            line,
            tid: std::thread::current().id(),
            time: Local::now(),
            level,
            payload,
        }
    }
}
