use std::cell::RefCell;

use gloo::storage::errors::StorageError;
use gloo::storage::{LocalStorage, Storage};

use crate::application::settings::{Settings, SettingsStore, decode_settings, encode_settings};
use crate::domain::logging::LogComponent;
use crate::{log_debug, log_warn};

pub const SETTINGS_KEY: &str = "ohlcChartSettings";

/// Settings blob in `window.localStorage`
#[derive(Debug, Clone)]
pub struct LocalStorageSettings {
    key: String,
}

impl Default for LocalStorageSettings {
    fn default() -> Self {
        Self::new(SETTINGS_KEY)
    }
}

impl LocalStorageSettings {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl SettingsStore for LocalStorageSettings {
    fn load(&self) -> Option<Settings> {
        match LocalStorage::get::<Settings>(&self.key) {
            Ok(settings) => {
                log_debug!(LogComponent::Infrastructure("LocalStorageSettings"), "settings restored");
                Some(settings.sanitized())
            }
            Err(StorageError::KeyNotFound(_)) => None,
            Err(e) => {
                log_warn!(
                    LogComponent::Infrastructure("LocalStorageSettings"),
                    "ignoring unreadable settings: {}",
                    e
                );
                None
            }
        }
    }

    fn save(&self, settings: &Settings) {
        if let Err(e) = LocalStorage::set(&self.key, settings) {
            log_warn!(LogComponent::Infrastructure("LocalStorageSettings"), "failed to save settings: {}", e);
        }
    }
}

/// In-memory settings blob
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    blob: RefCell<Option<String>>,
    writes: RefCell<usize>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already stored raw blob, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self { blob: RefCell::new(Some(raw.into())), writes: RefCell::new(0) }
    }

    pub fn raw(&self) -> Option<String> {
        self.blob.borrow().clone()
    }

    pub fn writes(&self) -> usize {
        *self.writes.borrow()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Option<Settings> {
        let raw = self.blob.borrow().clone()?;
        match decode_settings(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log_warn!(LogComponent::Infrastructure("MemorySettingsStore"), "{}", e);
                None
            }
        }
    }

    fn save(&self, settings: &Settings) {
        match encode_settings(settings) {
            Ok(raw) => {
                *self.blob.borrow_mut() = Some(raw);
                *self.writes.borrow_mut() += 1;
            }
            Err(e) => {
                log_warn!(LogComponent::Infrastructure("MemorySettingsStore"), "{}", e);
            }
        }
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for std::rc::Rc<S> {
    fn load(&self) -> Option<Settings> {
        (**self).load()
    }

    fn save(&self, settings: &Settings) {
        (**self).save(settings)
    }
}
