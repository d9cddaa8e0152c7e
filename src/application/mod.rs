pub mod controller;
pub mod render_config;
pub mod scheduler;
pub mod settings;
pub mod state;

pub use controller::{ChartController, InputEvent, Intent, InteractionState, InteractionTuning, KeyInput, Outcome, Redraw};
pub use render_config::{HoverState, RenderConfig, RenderFrame};
pub use scheduler::{FrameHost, FrameScheduler, ManualFrameHost};
pub use settings::{Settings, SettingsStore, decode_settings, encode_settings};
pub use state::{ChartState, PLOT_MARGINS, PlotMargins};
