pub mod canvas;
pub mod chart_renderer;
pub mod surface;

pub use canvas::CanvasSurface;
pub use chart_renderer::{CANDLE_BODY_MIN_HEIGHT_PX, ChartRenderer};
pub use surface::{DrawOp, DrawSurface, LineStyle, RecordingSurface, TextAlign};
