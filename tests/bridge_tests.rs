use std::fs;
use std::sync::Arc;

use rolling_logger::{bridge, DeliveryMode, Level, Logger, LoggerConfig, Sink};
use tempfile::tempdir;

// The `log` facade accepts exactly one global backend per process, so the
// whole flow lives in one test.
#[test]
fn test_facade_records_flow_through_installed_logger() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("facade.log");
    let logger = Arc::new(
        Logger::new(LoggerConfig {
            limit_level: Level::Info,
            mode: DeliveryMode::Sync,
            pattern: Some("%p %m%n".to_string()),
            sinks: vec![Sink::fixed_file(&path).unwrap()],
            ..LoggerConfig::new("facade")
        })
        .unwrap(),
    );

    bridge::install(Arc::clone(&logger)).unwrap();

    log::error!("broken: {}", "pipe");
    log::warn!("wobbly");
    log::info!("fine");
    // Below the Info threshold after Trace folds into Debug.
    log::debug!("hidden");
    log::trace!("also hidden");

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "ERROR broken: pipe\nWARNING wobbly\nINFO fine\n");

    // A second install must be rejected, not silently swapped.
    let err = bridge::install(logger).unwrap_err();
    assert!(matches!(err, rolling_logger::LogError::Config(_)), "got: {err}");
}
