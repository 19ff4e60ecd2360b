use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::LogError;
use crate::format::{Format, DEFAULT_PATTERN};
use crate::level::Level;
use crate::pipeline::AsyncPipeline;
use crate::record::LogRecord;
use crate::sink::Sink;

/// How records travel from the emit call to the sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// The caller writes to every sink under the logger mutex.
    Sync,
    /// Records are appended to the pipeline and a worker thread writes
    /// them. `check_space` enables backpressure: producers block for
    /// buffer space instead of letting the buffer grow unboundedly.
    Async { check_space: bool },
}

/// Immutable logger configuration, validated once by [`Logger::new`].
///
/// There is no ordering dependency between the fields, so a plain record
/// replaces the staged builder of classic logging libraries.
///
/// # Examples
///
/// ```
/// use rolling_logger::{DeliveryMode, Level, Logger, LoggerConfig, Sink};
///
/// let logger = Logger::new(LoggerConfig {
///     limit_level: Level::Info,
///     mode: DeliveryMode::Sync,
///     sinks: vec![Sink::stdout()],
///     ..LoggerConfig::new("app")
/// })
/// .unwrap();
/// rolling_logger::log_info!(logger, "listening on port {}", 8080).unwrap();
/// ```
pub struct LoggerConfig {
    /// Logger name; required, non-empty.
    pub name: String,
    /// Records below this level are discarded before formatting.
    pub limit_level: Level,
    pub mode: DeliveryMode,
    /// Format pattern; [`DEFAULT_PATTERN`] when `None`.
    pub pattern: Option<String>,
    /// Ordered destinations; defaults to a single stdout sink when empty.
    pub sinks: Vec<Sink>,
}

impl LoggerConfig {
    /// A synchronous, Debug-threshold, default-pattern configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            limit_level: Level::Debug,
            mode: DeliveryMode::Sync,
            pattern: None,
            sinks: Vec::new(),
        }
    }
}

struct SinkSlot {
    sink: Sink,
    degraded: bool,
}

/// A leveled, named logger routing records to its sinks.
///
/// Cheap calls below the threshold return before any formatting happens.
/// In synchronous mode the calling thread writes to every sink in list
/// order under the logger mutex; in asynchronous mode the rendered bytes
/// go through the [`AsyncPipeline`] and the worker writes each drained
/// batch to every sink exactly once.
///
/// A sink whose I/O fails is marked degraded, reported once on stderr,
/// and skipped from then on; the remaining sinks keep receiving records.
pub struct Logger {
    name: String,
    limit_level: AtomicU8,
    format: Format,
    sinks: Arc<Mutex<Vec<SinkSlot>>>,
    pipeline: Option<AsyncPipeline>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("limit_level", &self.limit_level.load(Ordering::Relaxed))
            .field("async", &self.pipeline.is_some())
            .finish()
    }
}

impl Logger {
    /// Validates `config` and starts the logger (including the worker
    /// thread for asynchronous mode).
    pub fn new(config: LoggerConfig) -> Result<Logger, LogError> {
        if config.name.is_empty() {
            return Err(LogError::Config("logger name must not be empty".into()));
        }
        let format = match &config.pattern {
            Some(pattern) => Format::new(pattern)?,
            None => Format::new(DEFAULT_PATTERN)?,
        };
        let mut sinks = config.sinks;
        if sinks.is_empty() {
            sinks.push(Sink::stdout());
        }
        let slots: Vec<SinkSlot> = sinks
            .into_iter()
            .map(|sink| SinkSlot {
                sink,
                degraded: false,
            })
            .collect();
        let sinks = Arc::new(Mutex::new(slots));

        let pipeline = match config.mode {
            DeliveryMode::Sync => None,
            DeliveryMode::Async { check_space } => {
                let worker_sinks = Arc::clone(&sinks);
                Some(AsyncPipeline::new(check_space, move |data| {
                    deliver_to_sinks(&worker_sinks, data);
                }))
            }
        };

        Ok(Logger {
            name: config.name,
            limit_level: AtomicU8::new(config.limit_level as u8),
            format,
            sinks,
            pipeline,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limit_level(&self) -> Level {
        Level::from_u8(self.limit_level.load(Ordering::Relaxed))
    }

    /// Adjusts the threshold at runtime; takes effect on the next emit.
    pub fn set_limit_level(&self, level: Level) {
        self.limit_level.store(level as u8, Ordering::Relaxed);
    }

    /// Formats and routes one record.
    ///
    /// Returns immediately when `level` is below the threshold. A render
    /// failure is recovered by substituting a fallback line; the only
    /// caller-visible error is [`LogError::PipelineStopped`] from an
    /// asynchronous logger that has been shut down.
    pub fn emit(
        &self,
        level: Level,
        file: &str,
        line: u32,
        args: fmt::Arguments<'_>,
    ) -> Result<(), LogError> {
        if level < self.limit_level() {
            return Ok(());
        }
        let payload = fmt::format(args);
        let record = LogRecord::new(&self.name, file, line, level, &payload);
        let bytes = match self.format.render(&record) {
            Ok(bytes) => bytes,
            Err(err) => format!("[{} format failure: {err}] {payload}\n", self.name).into_bytes(),
        };
        match &self.pipeline {
            Some(pipeline) => pipeline.submit(&bytes),
            None => {
                deliver_to_sinks(&self.sinks, &bytes);
                Ok(())
            }
        }
    }

    pub fn debug(&self, file: &str, line: u32, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        self.emit(Level::Debug, file, line, args)
    }

    pub fn info(&self, file: &str, line: u32, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        self.emit(Level::Info, file, line, args)
    }

    pub fn warning(&self, file: &str, line: u32, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        self.emit(Level::Warning, file, line, args)
    }

    pub fn error(&self, file: &str, line: u32, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        self.emit(Level::Error, file, line, args)
    }

    pub fn fatal(&self, file: &str, line: u32, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        self.emit(Level::Fatal, file, line, args)
    }

    /// Drains and stops the pipeline of an asynchronous logger; everything
    /// submitted before this call is written before it returns. A no-op
    /// for synchronous loggers. Also runs on drop.
    pub fn shutdown(&self) {
        if let Some(pipeline) = &self.pipeline {
            pipeline.stop();
        }
    }
}

fn deliver_to_sinks(slots: &Mutex<Vec<SinkSlot>>, data: &[u8]) {
    let mut slots = slots.lock();
    for slot in slots.iter_mut() {
        if slot.degraded {
            continue;
        }
        match slot.sink.log(data) {
            Ok(()) => {}
            Err(err @ LogError::SinkIo { .. }) => {
                slot.degraded = true;
                eprintln!(
                    "rolling_logger: sink {} degraded, skipping from now on: {err}",
                    slot.sink.target()
                );
            }
            Err(err) => {
                // Rotation errors stay local to this sink and this span.
                eprintln!("rolling_logger: sink {} dropped a span: {err}", slot.sink.target());
            }
        }
    }
}

/// Logs at Debug level, capturing the call site's file and line.
///
/// ```
/// # use rolling_logger::{Logger, LoggerConfig};
/// # let logger = Logger::new(LoggerConfig::new("doc")).unwrap();
/// rolling_logger::log_debug!(logger, "x = {}", 42).unwrap();
/// ```
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(file!(), line!(), format_args!($($arg)*))
    };
}

/// Logs at Info level, capturing the call site's file and line.
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(file!(), line!(), format_args!($($arg)*))
    };
}

/// Logs at Warning level, capturing the call site's file and line.
#[macro_export]
macro_rules! log_warning {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warning(file!(), line!(), format_args!($($arg)*))
    };
}

/// Logs at Error level, capturing the call site's file and line.
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(file!(), line!(), format_args!($($arg)*))
    };
}

/// Logs at Fatal level, capturing the call site's file and line.
#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)*) => {
        $logger.fatal(file!(), line!(), format_args!($($arg)*))
    };
}
