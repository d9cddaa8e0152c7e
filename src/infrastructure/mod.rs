pub mod frame;
pub mod rendering;
pub mod services;
pub mod storage;

pub use frame::BrowserFrameHost;
pub use services::{BrowserTimeProvider, ConsoleLogger, DEBUG_BUFFER};
pub use storage::{LocalStorageSettings, MemorySettingsStore};
