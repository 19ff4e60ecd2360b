//! Process-global logger registry.
//!
//! Loggers own their sinks exclusively, but callers across a process need
//! a way to reach a named logger without threading references through
//! every module. The registry maps names to shared logger handles; all
//! threads share it and access is serialized by a mutex.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;

use crate::logger::Logger;

lazy_static! {
    static ref LOGGER_REGISTRY: Mutex<HashMap<String, Arc<Logger>>> = Mutex::new(HashMap::new());
}

/// Registers `logger` under its own name, replacing any previous logger
/// registered under that name.
pub fn register(logger: Arc<Logger>) {
    let mut registry = LOGGER_REGISTRY.lock().unwrap();
    registry.insert(logger.name().to_string(), logger);
}

/// Looks up a logger by name.
pub fn get(name: &str) -> Option<Arc<Logger>> {
    let registry = LOGGER_REGISTRY.lock().unwrap();
    registry.get(name).cloned()
}

/// Removes a logger from the registry, returning it if present. The
/// logger itself keeps working for holders of other handles.
pub fn unregister(name: &str) -> Option<Arc<Logger>> {
    let mut registry = LOGGER_REGISTRY.lock().unwrap();
    registry.remove(name)
}
