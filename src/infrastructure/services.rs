//! Browser-backed implementations of the domain logging abstractions.

use chrono::DateTime;
use once_cell::sync::Lazy;
use wasm_bindgen::JsValue;

use crate::domain::logging::{BufferLogger, LogEntry, LogLevel, Logger, TimeProvider};

/// Lines shown by the on-page debug console.
pub static DEBUG_BUFFER: Lazy<BufferLogger> = Lazy::new(|| BufferLogger::new(LogLevel::Debug, 200));

/// Writes to the browser console and mirrors into [`DEBUG_BUFFER`]
pub struct ConsoleLogger {
    min_level: LogLevel,
    mirror: bool,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level, mirror: true }
    }

    pub fn new_development() -> Self {
        Self::new(LogLevel::Debug)
    }

    pub fn new_production() -> Self {
        Self::new(LogLevel::Info)
    }

    pub fn without_mirror(mut self) -> Self {
        self.mirror = false;
        self
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        let line = JsValue::from_str(&entry.format_line());
        match entry.level {
            LogLevel::Trace | LogLevel::Debug => web_sys::console::debug_1(&line),
            LogLevel::Info => web_sys::console::info_1(&line),
            LogLevel::Warn => web_sys::console::warn_1(&line),
            LogLevel::Error => web_sys::console::error_1(&line),
        }
        if self.mirror {
            DEBUG_BUFFER.log(entry);
        }
    }
}

/// Wall clock from `Date.now()`
#[derive(Default)]
pub struct BrowserTimeProvider;

impl BrowserTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TimeProvider for BrowserTimeProvider {
    fn current_timestamp(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        match DateTime::from_timestamp_millis(timestamp as i64) {
            Some(date) => date.format("%H:%M:%S%.3f").to_string(),
            None => timestamp.to_string(),
        }
    }
}
