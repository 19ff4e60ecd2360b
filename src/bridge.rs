use std::sync::Arc;

use crate::error::LogError;
use crate::level::Level;
use crate::logger::Logger;

/// Adapter making a [`Logger`] the `log` crate's global backend, so
/// `log::info!`-style call sites in dependencies drain into this crate's
/// pipeline.
struct FacadeBridge {
    logger: Arc<Logger>,
}

fn map_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warning,
        log::Level::Info => Level::Info,
        // The facade's Trace has no counterpart; it folds into Debug.
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

impl log::Log for FacadeBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        map_level(metadata.level()) >= self.logger.limit_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        let level = map_level(record.level());
        // A stopped asynchronous logger has nowhere to report the error;
        // the facade contract is infallible.
        let _ = self.logger.emit(
            level,
            record.file().unwrap_or("<unknown>"),
            record.line().unwrap_or(0),
            format_args!("{}", record.args()),
        );
    }

    fn flush(&self) {}
}

/// Installs `logger` as the `log` facade's global backend.
///
/// Level gating stays with the [`Logger`] (its threshold can change at
/// runtime), so the facade's max level is opened all the way up.
///
/// Fails with [`LogError::Config`] if a global logger is already
/// installed; the facade only accepts one per process.
pub fn install(logger: Arc<Logger>) -> Result<(), LogError> {
    log::set_boxed_logger(Box::new(FacadeBridge { logger }))
        .map_err(|e| LogError::Config(format!("log facade already has a backend: {e}")))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_levels_map_onto_crate_levels() {
        assert_eq!(map_level(log::Level::Error), Level::Error);
        assert_eq!(map_level(log::Level::Warn), Level::Warning);
        assert_eq!(map_level(log::Level::Info), Level::Info);
        assert_eq!(map_level(log::Level::Debug), Level::Debug);
        assert_eq!(map_level(log::Level::Trace), Level::Debug);
    }
}
