use ohlc_cluster_chart::application::{ChartState, Settings, SettingsStore, decode_settings, encode_settings};
use ohlc_cluster_chart::domain::chart::{CandleTypeFilter, ChartKind, ClusterFilter, ViewportRange};
use ohlc_cluster_chart::domain::market_data::{SampleGenerator, SeriesField};
use ohlc_cluster_chart::infrastructure::MemorySettingsStore;
use serde_json::json;

#[test]
fn default_blob_layout() {
    let value = serde_json::to_value(Settings::default()).unwrap();
    assert_eq!(
        value,
        json!({
            "maxVisiblePoints": 50,
            "panningSensitivity": 1.0,
            "panelOpacity": 0.9,
            "chartType": "candlestick",
            "candleWidth": 0.7,
            "clusterFilter": "all",
            "candleTypeFilter": "all",
            "showClusterColors": true,
            "showVolume": true,
            "xField": "timestamp",
            "yField": "close",
            "histogramField": "close",
            "zoomLevel": 1.0,
            "panOffsetX": 0.0,
            "panOffsetY": 0.0,
            "visibleStartIndex": null,
            "visibleEndIndex": null,
            "crosshairEnabled": true,
            "crosshairSnapToCandles": true,
            "controlsPanelVisible": true,
            "statsPanelVisible": true,
            "legendPanelVisible": true,
            "isFullscreen": false
        })
    );
}

#[test]
fn partial_blob_fills_defaults_and_clamps() {
    let settings = decode_settings(
        r#"{"maxVisiblePoints": 5000, "panningSensitivity": 0.04, "chartType": "line", "clusterFilter": "3"}"#,
    )
    .unwrap();
    assert_eq!(settings.max_visible_points, 200);
    assert_eq!(settings.panning_sensitivity, 0.1);
    assert_eq!(settings.chart_type, ChartKind::Line);
    assert_eq!(settings.cluster_filter, ClusterFilter::Only(3));
    assert_eq!(settings.candle_type_filter, CandleTypeFilter::All);
    assert_eq!(settings.y_field, SeriesField::Close);
}

#[test]
fn unknown_enum_value_is_corrupt() {
    assert!(decode_settings(r#"{"chartType": "pie"}"#).is_err());
    assert!(decode_settings("not json").is_err());
}

#[test]
fn encode_then_decode_keeps_choices() {
    let settings = Settings {
        chart_type: ChartKind::Histogram,
        histogram_field: SeriesField::Volume,
        visible_start_index: Some(10),
        visible_end_index: Some(59),
        ..Settings::default()
    };
    let raw = encode_settings(&settings).unwrap();
    assert_eq!(decode_settings(&raw).unwrap(), settings);
}

#[test]
fn inverted_saved_window_is_dropped() {
    let settings = Settings { visible_start_index: Some(40), visible_end_index: Some(10), ..Settings::default() };
    let settings = settings.sanitized();
    assert_eq!(settings.visible_range(), None);
    assert_eq!(settings.visible_start_index, None);
}

#[test]
fn corrupt_store_starts_from_defaults() {
    let store = MemorySettingsStore::with_raw("{\"maxVisiblePoints\": 12");
    assert!(store.load().is_none());
    let settings = store.load().unwrap_or_default();
    assert_eq!(settings, Settings::default());
}

#[test]
fn saved_window_is_restored_once() {
    let saved = Settings { visible_start_index: Some(10), visible_end_index: Some(59), ..Settings::default() };
    let mut state = ChartState::new(saved);

    state.replace_dataset(Vec::new());
    assert_eq!(state.window(), None);

    state.replace_dataset(SampleGenerator::new(1).generate(100));
    assert_eq!(state.window(), Some(ViewportRange::new(10, 59)));

    state.replace_dataset(SampleGenerator::new(2).generate(100));
    assert_eq!(state.window(), Some(ViewportRange::new(50, 99)));
}

#[test]
fn snapshot_carries_live_window() {
    let mut state = ChartState::new(Settings::default());
    state.replace_dataset(SampleGenerator::new(3).generate(70));
    let snapshot = state.settings_snapshot();
    assert_eq!(snapshot.visible_start_index, Some(20));
    assert_eq!(snapshot.visible_end_index, Some(69));
    assert_eq!(snapshot.max_visible_points, 50);
}
