use std::str::FromStr;

use wasm_bindgen::prelude::*;

use crate::application::{InputEvent, Intent, KeyInput};
use crate::domain::chart::{CandleTypeFilter, ChartKind, ClusterFilter};
use crate::domain::errors::AppError;
use crate::domain::market_data::SeriesField;
use crate::presentation::runtime::{BrowserRuntime, install_browser_runtime, with_global_runtime};

fn js_error(message: impl Into<String>) -> JsValue {
    JsValue::from_str(&message.into())
}

fn runtime<R>(f: impl FnOnce(&mut BrowserRuntime) -> R) -> Result<R, JsValue> {
    with_global_runtime(f).ok_or_else(|| js_error("chart runtime is not available"))
}

fn parse<T: FromStr>(kind: &str, value: &str) -> Result<T, JsValue> {
    T::from_str(value).map_err(|_| js_error(format!("unknown {} '{}'", kind, value)))
}

impl From<AppError> for JsValue {
    fn from(error: AppError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

/// JavaScript-facing handle to the chart on one canvas
#[wasm_bindgen]
pub struct ChartApi {
    canvas_id: String,
}

#[wasm_bindgen]
impl ChartApi {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: String) -> ChartApi {
        install_browser_runtime(&canvas_id);
        Self { canvas_id }
    }

    #[wasm_bindgen(getter, js_name = canvasId)]
    pub fn canvas_id(&self) -> String {
        self.canvas_id.clone()
    }

    /// Parse CSV text and show it; returns a one-line summary.
    #[wasm_bindgen(js_name = loadCsv)]
    pub fn load_csv(&self, text: &str) -> Result<String, JsValue> {
        let summary = runtime(|rt| rt.load_csv(text))??;
        Ok(summary.to_string())
    }

    pub fn regenerate(&self, count: u32, seed: u32) -> Result<String, JsValue> {
        runtime(|rt| rt.regenerate(count as usize, u64::from(seed)).to_string())
    }

    pub fn clear(&self) -> Result<(), JsValue> {
        runtime(|rt| {
            rt.clear();
        })
    }

    #[wasm_bindgen(js_name = setChartType)]
    pub fn set_chart_type(&self, kind: &str) -> Result<(), JsValue> {
        let kind: ChartKind = parse("chart type", kind)?;
        runtime(|rt| {
            rt.update_settings(|s| s.chart_type = kind);
        })
    }

    #[wasm_bindgen(js_name = setClusterFilter)]
    pub fn set_cluster_filter(&self, filter: &str) -> Result<(), JsValue> {
        let filter: ClusterFilter = parse("cluster filter", filter)?;
        runtime(|rt| {
            rt.update_settings(|s| s.cluster_filter = filter);
        })
    }

    #[wasm_bindgen(js_name = setCandleTypeFilter)]
    pub fn set_candle_type_filter(&self, filter: &str) -> Result<(), JsValue> {
        let filter: CandleTypeFilter = parse("candle type filter", filter)?;
        runtime(|rt| {
            rt.update_settings(|s| s.candle_type_filter = filter);
        })
    }

    #[wasm_bindgen(js_name = setFields)]
    pub fn set_fields(&self, x_field: &str, y_field: &str) -> Result<(), JsValue> {
        let x: SeriesField = parse("field", x_field)?;
        let y: SeriesField = parse("field", y_field)?;
        runtime(|rt| {
            rt.update_settings(|s| {
                s.x_field = x;
                s.y_field = y;
            });
        })
    }

    #[wasm_bindgen(js_name = setHistogramField)]
    pub fn set_histogram_field(&self, field: &str) -> Result<(), JsValue> {
        let field: SeriesField = parse("field", field)?;
        runtime(|rt| {
            rt.update_settings(|s| s.histogram_field = field);
        })
    }

    #[wasm_bindgen(js_name = setShowClusterColors)]
    pub fn set_show_cluster_colors(&self, on: bool) -> Result<(), JsValue> {
        runtime(|rt| {
            rt.update_settings(|s| s.show_cluster_colors = on);
        })
    }

    #[wasm_bindgen(js_name = setShowVolume)]
    pub fn set_show_volume(&self, on: bool) -> Result<(), JsValue> {
        runtime(|rt| {
            rt.update_settings(|s| s.show_volume = on);
        })
    }

    #[wasm_bindgen(js_name = setCandleWidth)]
    pub fn set_candle_width(&self, ratio: f64) -> Result<(), JsValue> {
        runtime(|rt| {
            rt.update_settings(|s| s.candle_width = ratio);
        })
    }

    #[wasm_bindgen(js_name = setMaxVisiblePoints)]
    pub fn set_max_visible_points(&self, points: u32) -> Result<(), JsValue> {
        runtime(|rt| {
            rt.apply(Intent::SetWindow(points as usize));
        })
    }

    #[wasm_bindgen(js_name = setPanningSensitivity)]
    pub fn set_panning_sensitivity(&self, sensitivity: f64) -> Result<(), JsValue> {
        runtime(|rt| {
            rt.update_settings(|s| s.panning_sensitivity = sensitivity);
        })
    }

    #[wasm_bindgen(js_name = setFullscreen)]
    pub fn set_fullscreen(&self, on: bool) -> Result<(), JsValue> {
        runtime(|rt| {
            rt.apply(Intent::SetFullscreen(on));
            rt.sync_canvas_size();
        })
    }

    #[wasm_bindgen(js_name = jumpToLatest)]
    pub fn jump_to_latest(&self) -> Result<(), JsValue> {
        runtime(|rt| {
            rt.apply(Intent::JumpToLatest);
        })
    }

    #[wasm_bindgen(js_name = jumpToEarliest)]
    pub fn jump_to_earliest(&self) -> Result<(), JsValue> {
        runtime(|rt| {
            rt.apply(Intent::JumpToEarliest);
        })
    }

    /// Forward a key press; returns whether it was consumed.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&self, key: &str) -> Result<bool, JsValue> {
        runtime(|rt| rt.dispatch(InputEvent::Key(KeyInput::new(key))).prevent_default)
    }

    /// Re-read the canvas size after the page layout changed.
    pub fn resize(&self) -> Result<(), JsValue> {
        runtime(|rt| {
            rt.sync_canvas_size();
        })
    }

    #[wasm_bindgen(js_name = visibleRange)]
    pub fn visible_range(&self) -> Result<Option<Vec<u32>>, JsValue> {
        runtime(|rt| {
            rt.controller()
                .state()
                .window()
                .map(|w| vec![w.start as u32, w.end as u32])
        })
    }

    #[wasm_bindgen(js_name = statsJson)]
    pub fn stats_json(&self) -> Result<String, JsValue> {
        let stats = runtime(|rt| rt.stats())?;
        serde_json::to_string(&stats).map_err(|e| js_error(e.to_string()))
    }

    #[wasm_bindgen(js_name = settingsJson)]
    pub fn settings_json(&self) -> Result<String, JsValue> {
        Ok(runtime(|rt| rt.settings_json())??)
    }
}
