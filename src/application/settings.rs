//! Persisted user preferences.
//!
//! The blob is a flat JSON object written after every state change and read
//! once at startup. Missing keys take their defaults so older blobs keep
//! loading; a blob that does not parse is treated as absent.

use serde::{Deserialize, Serialize};

use crate::domain::chart::{CandleTypeFilter, ChartKind, ClusterFilter, ViewportRange};
use crate::domain::errors::SettingsError;
use crate::domain::market_data::SeriesField;

pub const MIN_VISIBLE_POINTS: usize = 10;
pub const MAX_VISIBLE_POINTS: usize = 200;
pub const MIN_SENSITIVITY: f64 = 0.1;
pub const MAX_SENSITIVITY: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub max_visible_points: usize,
    pub panning_sensitivity: f64,
    pub panel_opacity: f64,
    pub chart_type: ChartKind,
    /// Candle body width as a fraction of its column
    pub candle_width: f64,
    pub cluster_filter: ClusterFilter,
    pub candle_type_filter: CandleTypeFilter,
    pub show_cluster_colors: bool,
    pub show_volume: bool,
    pub x_field: SeriesField,
    pub y_field: SeriesField,
    pub histogram_field: SeriesField,
    pub zoom_level: f64,
    pub pan_offset_x: f64,
    pub pan_offset_y: f64,
    pub visible_start_index: Option<usize>,
    pub visible_end_index: Option<usize>,
    pub crosshair_enabled: bool,
    pub crosshair_snap_to_candles: bool,
    pub controls_panel_visible: bool,
    pub stats_panel_visible: bool,
    pub legend_panel_visible: bool,
    pub is_fullscreen: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_visible_points: 50,
            panning_sensitivity: 1.0,
            panel_opacity: 0.9,
            chart_type: ChartKind::Candlestick,
            candle_width: 0.7,
            cluster_filter: ClusterFilter::All,
            candle_type_filter: CandleTypeFilter::All,
            show_cluster_colors: true,
            show_volume: true,
            x_field: SeriesField::Timestamp,
            y_field: SeriesField::Close,
            histogram_field: SeriesField::Close,
            zoom_level: 1.0,
            pan_offset_x: 0.0,
            pan_offset_y: 0.0,
            visible_start_index: None,
            visible_end_index: None,
            crosshair_enabled: true,
            crosshair_snap_to_candles: true,
            controls_panel_visible: true,
            stats_panel_visible: true,
            legend_panel_visible: true,
            is_fullscreen: false,
        }
    }
}

impl Settings {
    /// Pull every numeric field back into its legal range.
    pub fn sanitized(mut self) -> Self {
        let defaults = Settings::default();
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };

        self.max_visible_points = self.max_visible_points.clamp(MIN_VISIBLE_POINTS, MAX_VISIBLE_POINTS);
        self.panning_sensitivity = round_tenth(
            finite_or(self.panning_sensitivity, defaults.panning_sensitivity).clamp(MIN_SENSITIVITY, MAX_SENSITIVITY),
        );
        self.panel_opacity = finite_or(self.panel_opacity, defaults.panel_opacity).clamp(0.1, 1.0);
        self.candle_width = finite_or(self.candle_width, defaults.candle_width).clamp(0.1, 1.0);
        self.zoom_level = finite_or(self.zoom_level, defaults.zoom_level);
        self.pan_offset_x = finite_or(self.pan_offset_x, 0.0);
        self.pan_offset_y = finite_or(self.pan_offset_y, 0.0);

        match (self.visible_start_index, self.visible_end_index) {
            (Some(start), Some(end)) if start <= end => {}
            _ => {
                self.visible_start_index = None;
                self.visible_end_index = None;
            }
        }
        self
    }

    /// Saved window, if both bounds were stored.
    pub fn visible_range(&self) -> Option<ViewportRange> {
        match (self.visible_start_index, self.visible_end_index) {
            (Some(start), Some(end)) if start <= end => Some(ViewportRange::new(start, end)),
            _ => None,
        }
    }
}

/// Sensitivity moves in 0.1 steps; keep it from drifting to 0.30000000000000004.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn decode_settings(raw: &str) -> Result<Settings, SettingsError> {
    serde_json::from_str::<Settings>(raw)
        .map(Settings::sanitized)
        .map_err(|e| SettingsError::Corrupt(e.to_string()))
}

pub fn encode_settings(settings: &Settings) -> Result<String, SettingsError> {
    serde_json::to_string(settings).map_err(|e| SettingsError::Corrupt(e.to_string()))
}

/// Best-effort key-value persistence for [`Settings`]
pub trait SettingsStore {
    /// `None` when nothing was saved or the saved blob is unusable.
    fn load(&self) -> Option<Settings>;
    /// Fire-and-forget; failures are logged by the implementation.
    fn save(&self, settings: &Settings);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let settings = Settings {
            max_visible_points: 5000,
            panning_sensitivity: 0.0,
            candle_width: f64::NAN,
            visible_start_index: Some(9),
            visible_end_index: Some(3),
            ..Settings::default()
        }
        .sanitized();
        assert_eq!(settings.max_visible_points, MAX_VISIBLE_POINTS);
        assert_eq!(settings.panning_sensitivity, MIN_SENSITIVITY);
        assert_eq!(settings.candle_width, 0.7);
        assert_eq!(settings.visible_range(), None);
    }

    #[test]
    fn partial_blob_uses_defaults() {
        let settings = decode_settings(r#"{"chartType":"histogram","clusterFilter":"2"}"#).unwrap();
        assert_eq!(settings.chart_type, ChartKind::Histogram);
        assert_eq!(settings.cluster_filter, ClusterFilter::Only(2));
        assert_eq!(settings.max_visible_points, 50);
    }

    #[test]
    fn corrupt_blob_is_an_error() {
        assert!(matches!(decode_settings("{not json"), Err(SettingsError::Corrupt(_))));
    }
}
