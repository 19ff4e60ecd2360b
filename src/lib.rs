//! # Rolling Logger
//!
//! A leveled text-logging pipeline with non-blocking delivery and
//! rotating file destinations.
//!
//! Application threads emit leveled, named records; a background path
//! serializes them to one or more destinations without blocking callers
//! on slow I/O:
//!
//! * **Double-buffered delivery**: producers append into one buffer while
//!   a dedicated worker drains the other; the two are exchanged in O(1)
//!   with no byte copying
//! * **Backpressure or unbounded growth**: pick whether producers block
//!   for buffer space or the buffer grows without limit
//! * **Rotating sinks**: console, fixed file, size-rotated file and
//!   time-rotated file destinations, each deciding per write whether to
//!   open a new backing file
//! * **Pattern formatting**: `%`-token patterns compiled and validated at
//!   construction
//! * **Graceful shutdown**: stopping an asynchronous logger drains every
//!   record accepted before the stop was requested
//!
//! ## Main Components
//!
//! * [`Logger`]: level gating and sync/async dispatch, built from an
//!   immutable [`LoggerConfig`]
//! * [`AsyncPipeline`]: the producer/consumer double-buffering loop
//! * [`Sink`]: the closed set of destinations and their rotation policies
//! * [`Buffer`]: the growable double-cursor byte arena underneath it all
//! * [`registry`]: process-global name → logger map
//! * [`bridge`]: adapter for the `log` facade
//!
//! ## Quick Start
//!
//! ```
//! use rolling_logger::{DeliveryMode, Level, Logger, LoggerConfig, Sink, log_info};
//! # let dir = tempfile::tempdir().unwrap();
//! # let path = dir.path().join("app.log");
//!
//! let logger = Logger::new(LoggerConfig {
//!     limit_level: Level::Info,
//!     mode: DeliveryMode::Async { check_space: true },
//!     sinks: vec![Sink::stdout(), Sink::fixed_file(&path).unwrap()],
//!     ..LoggerConfig::new("app")
//! })
//! .unwrap();
//!
//! log_info!(logger, "service ready after {} ms", 12).unwrap();
//! logger.shutdown();
//! ```

pub mod bridge;
pub mod buffer;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod pipeline;
pub mod record;
pub mod registry;
pub mod sink;

pub use buffer::Buffer;
pub use error::LogError;
pub use format::{Format, DEFAULT_PATTERN};
pub use level::Level;
pub use logger::{DeliveryMode, Logger, LoggerConfig};
pub use pipeline::AsyncPipeline;
pub use record::LogRecord;
pub use sink::Sink;
