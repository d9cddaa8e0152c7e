use crate::application::settings::Settings;
use crate::domain::chart::{ChartArea, ChartKind, FilterState, Theme, ViewportRange};
use crate::domain::market_data::{Dataset, SeriesField};

/// Drawing options resolved once per redraw
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub kind: ChartKind,
    pub filters: FilterState,
    pub show_cluster_colors: bool,
    pub show_volume: bool,
    pub crosshair_enabled: bool,
    pub candle_width_ratio: f64,
    pub x_field: SeriesField,
    pub y_field: SeriesField,
    pub histogram_field: SeriesField,
    pub theme: Theme,
}

impl RenderConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            kind: settings.chart_type,
            filters: FilterState::new(settings.cluster_filter, settings.candle_type_filter),
            show_cluster_colors: settings.show_cluster_colors,
            show_volume: settings.show_volume,
            crosshair_enabled: settings.crosshair_enabled,
            candle_width_ratio: settings.candle_width,
            x_field: settings.x_field,
            y_field: settings.y_field,
            histogram_field: settings.histogram_field,
            theme: Theme::default(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Pointer-derived overlay state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HoverState {
    /// Record under the pointer, after snapping.
    pub index: Option<usize>,
    /// Crosshair position; x is snapped when snapping is on.
    pub crosshair: Option<(f64, f64)>,
    /// Raw pointer position of the last hover update.
    pub pointer: Option<(f64, f64)>,
}

impl HoverState {
    pub fn is_active(&self) -> bool {
        self.index.is_some() || self.crosshair.is_some()
    }
}

/// Everything the renderer reads for one frame
#[derive(Debug, Clone)]
pub struct RenderFrame<'a> {
    pub dataset: &'a Dataset,
    pub window: Option<ViewportRange>,
    pub area: ChartArea,
    pub hover: HoverState,
    pub config: RenderConfig,
}
