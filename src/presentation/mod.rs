pub mod runtime;
pub mod wasm_api;

pub use runtime::{BrowserRuntime, ChartRuntime, LoadSummary, attach_canvas, install_browser_runtime, with_global_runtime};
pub use wasm_api::ChartApi;
