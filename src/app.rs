use leptos::html::Canvas;
use leptos::*;
use std::str::FromStr;
use strum::IntoEnumIterator;
use wasm_bindgen::JsCast;

use crate::application::{InputEvent, Intent, Outcome, Settings};
use crate::domain::chart::filters::cluster_color;
use crate::domain::chart::{CandleTypeFilter, ChartKind, ClusterFilter};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{DatasetStats, SeriesField};
use crate::event_utils::{
    EventOptions, key_input, primary_button_pressed, touch_points, wheel_has_modifier,
    window_event_listener_with_options,
};
use crate::global_signals;
use crate::infrastructure::DEBUG_BUFFER;
use crate::presentation::runtime::{install_browser_runtime, with_global_runtime};
use crate::{log_info, log_warn};

pub const CANVAS_ID: &str = "ohlc-chart-canvas";
const SAMPLE_SIZE: usize = 500;

global_signals! {
    status_signal => status: String,
    settings_signal => settings: Settings,
    stats_signal => stats: DatasetStats,
    visible_stats_signal => visible_stats: DatasetStats,
    visible_range_signal => visible_range: Option<(usize, usize)>,
    csv_input_signal => csv_input: String,
    log_lines_signal => log_lines: Vec<String>,
    log_paused_signal => log_paused: bool,
}

/// Copy the runtime's state into the UI signals.
fn refresh_panels() {
    let snapshot = with_global_runtime(|rt| {
        (
            rt.settings(),
            rt.stats(),
            rt.visible_stats(),
            rt.controller().state().window().map(|w| (w.start, w.end)),
        )
    });
    if let Some((settings, stats, visible, window)) = snapshot {
        settings_signal().set(settings);
        stats_signal().set(stats);
        visible_stats_signal().set(visible);
        visible_range_signal().set(window);
    }
    if !log_paused_signal().get_untracked() {
        log_lines_signal().set(DEBUG_BUFFER.lines());
    }
}

fn dispatch(event: InputEvent) -> Outcome {
    let outcome = with_global_runtime(|rt| rt.dispatch(event)).unwrap_or_default();
    if outcome.persist {
        refresh_panels();
    }
    outcome
}

fn apply(intent: Intent) {
    with_global_runtime(|rt| rt.apply(intent));
    refresh_panels();
}

fn edit_settings(edit: impl FnOnce(&mut Settings)) {
    with_global_runtime(|rt| rt.update_settings(edit));
    refresh_panels();
}

fn set_fullscreen(on: bool) {
    apply(Intent::SetFullscreen(on));
    // the wrapper class has changed by now, so the canvas has its new CSS size
    with_global_runtime(|rt| rt.sync_canvas_size());
}

fn regenerate() {
    let seed = js_sys::Date::now() as u64;
    if let Some(summary) = with_global_runtime(|rt| rt.regenerate(SAMPLE_SIZE, seed)) {
        status_signal().set(format!("{} (seed {})", summary, seed));
    }
    refresh_panels();
}

fn load_csv_input() {
    let text = csv_input_signal().get_untracked();
    let message = match with_global_runtime(|rt| rt.load_csv(&text)) {
        Some(Ok(summary)) => summary.to_string(),
        Some(Err(e)) => {
            log_warn!(LogComponent::Presentation("App"), "csv load failed: {}", e);
            e.to_string()
        }
        None => "Chart is not ready".to_string(),
    };
    status_signal().set(message);
    refresh_panels();
}

fn mount_runtime() {
    if with_global_runtime(|_| ()).is_some() {
        return;
    }
    install_browser_runtime(CANVAS_ID);
    let empty = with_global_runtime(|rt| rt.stats().total == 0).unwrap_or(false);
    if empty {
        regenerate();
    } else {
        refresh_panels();
    }
    log_info!(LogComponent::Presentation("App"), "chart mounted on #{}", CANVAS_ID);
}

#[component]
pub fn App() -> impl IntoView {
    let key_listener = window_event_listener_with_options("keydown", &EventOptions::active(), |event| {
        let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
            return;
        };
        let was_fullscreen = settings_signal().get_untracked().is_fullscreen;
        let outcome = dispatch(InputEvent::Key(key_input(event)));
        if outcome.prevent_default {
            event.prevent_default();
        }
        if was_fullscreen != settings_signal().get_untracked().is_fullscreen {
            with_global_runtime(|rt| rt.sync_canvas_size());
        }
    });
    let resize_listener = window_event_listener_with_options("resize", &EventOptions::default(), |_| {
        with_global_runtime(|rt| rt.sync_canvas_size());
    });
    on_cleanup(move || {
        key_listener.remove();
        resize_listener.remove();
    });

    view! {
        <style>
            {r#"
            .ohlc-chart-app {
                font-family: 'SF Pro Display', -apple-system, BlinkMacSystemFont, sans-serif;
                background: #131722;
                min-height: 100vh;
                padding: 16px;
                color: #d1d4dc;
            }
            .header {
                display: flex;
                justify-content: space-between;
                align-items: baseline;
                margin-bottom: 12px;
            }
            .controls {
                display: flex;
                flex-wrap: wrap;
                gap: 12px;
                padding: 12px;
                border-radius: 8px;
                background: #1e222d;
                margin-bottom: 12px;
            }
            .control {
                display: flex;
                flex-direction: column;
                font-size: 12px;
                gap: 4px;
            }
            .chart-wrapper {
                position: relative;
                height: 520px;
            }
            .chart-wrapper.fullscreen {
                position: fixed;
                inset: 0;
                height: 100vh;
                z-index: 100;
                background: #131722;
            }
            .chart-wrapper canvas {
                width: 100%;
                height: 100%;
                display: block;
                cursor: crosshair;
                touch-action: none;
            }
            .panel {
                position: absolute;
                top: 24px;
                padding: 8px 12px;
                border-radius: 6px;
                background: #1e222d;
                font-size: 12px;
                pointer-events: none;
            }
            .stats-panel { left: 24px; }
            .legend-panel { right: 90px; }
            .legend-swatch {
                display: inline-block;
                width: 10px;
                height: 10px;
                margin-right: 6px;
                border-radius: 2px;
            }
            .status {
                color: #72c685;
                font-size: 14px;
                margin: 8px 0;
            }
            .debug-console {
                background: rgba(0, 0, 0, 0.8);
                border-radius: 10px;
                padding: 12px;
                max-height: 240px;
                overflow-y: auto;
                border: 1px solid #2a2e39;
            }
            .debug-header {
                display: flex;
                justify-content: space-between;
                align-items: center;
                margin-bottom: 8px;
                color: #72c685;
                font-weight: bold;
            }
            .debug-btn {
                background: #2a2e39;
                color: white;
                border: none;
                padding: 5px 10px;
                border-radius: 5px;
                cursor: pointer;
                font-size: 12px;
                margin-left: 5px;
            }
            .log-line {
                font-family: 'Courier New', monospace;
                font-size: 11px;
                margin: 2px 0;
            }
            "#}
        </style>
        <div class="ohlc-chart-app">
            <Header />
            <Show when=move || settings_signal().get().controls_panel_visible>
                <Controls />
            </Show>
            <ChartView />
            <div class="status">{move || status_signal().get()}</div>
            <DataInput />
            <DebugConsole />
        </div>
    }
}

#[component]
fn Header() -> impl IntoView {
    let range_label = move || match visible_range_signal().get() {
        Some((start, end)) => format!("Showing {}..={} of {}", start, end, stats_signal().get().total),
        None => "No data".to_string(),
    };

    view! {
        <div class="header">
            <h2>"OHLC Cluster Chart"</h2>
            <span>{range_label}</span>
            <div>
                <PanelToggle label="Controls" get={|s| s.controls_panel_visible} set={|s, on| s.controls_panel_visible = on} />
                <PanelToggle label="Stats" get={|s| s.stats_panel_visible} set={|s, on| s.stats_panel_visible = on} />
                <PanelToggle label="Legend" get={|s| s.legend_panel_visible} set={|s, on| s.legend_panel_visible = on} />
                <button class="debug-btn" on:click=move |_| set_fullscreen(!settings_signal().get_untracked().is_fullscreen)>
                    {move || if settings_signal().get().is_fullscreen { "Exit fullscreen" } else { "Fullscreen" }}
                </button>
            </div>
        </div>
    }
}

#[component]
fn PanelToggle(label: &'static str, get: fn(&Settings) -> bool, set: fn(&mut Settings, bool)) -> impl IntoView {
    view! {
        <button
            class="debug-btn"
            on:click=move |_| {
                let on = !get(&settings_signal().get_untracked());
                edit_settings(|s| set(s, on));
            }
        >
            {move || format!("{} {}", if get(&settings_signal().get()) { "Hide" } else { "Show" }, label)}
        </button>
    }
}

#[component]
fn Checkbox(label: &'static str, get: fn(&Settings) -> bool, set: fn(&mut Settings, bool)) -> impl IntoView {
    view! {
        <label class="control">
            {label}
            <input
                type="checkbox"
                prop:checked=move || get(&settings_signal().get())
                on:change=move |ev| {
                    let on = event_target_checked(&ev);
                    edit_settings(|s| set(s, on));
                }
            />
        </label>
    }
}

#[component]
fn FieldSelect(label: &'static str, get: fn(&Settings) -> SeriesField, set: fn(&mut Settings, SeriesField)) -> impl IntoView {
    view! {
        <label class="control">
            {label}
            <select on:change=move |ev| {
                if let Ok(field) = SeriesField::from_str(&event_target_value(&ev)) {
                    edit_settings(|s| set(s, field));
                }
            }>
                {SeriesField::iter()
                    .map(move |field| {
                        let value: &'static str = field.into();
                        view! {
                            <option value=value prop:selected=move || get(&settings_signal().get()) == field>
                                {field.to_string()}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        </label>
    }
}

#[component]
fn Controls() -> impl IntoView {
    let cluster_ids = move || stats_signal().get().clusters.keys().copied().collect::<Vec<i32>>();

    view! {
        <div class="controls">
            <label class="control">
                "Chart"
                <select on:change=move |ev| {
                    if let Ok(kind) = ChartKind::from_str(&event_target_value(&ev)) {
                        edit_settings(|s| s.chart_type = kind);
                    }
                }>
                    {ChartKind::iter()
                        .map(|kind| {
                            let value: &'static str = kind.into();
                            view! {
                                <option value=value prop:selected=move || settings_signal().get().chart_type == kind>
                                    {kind.to_string()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </label>
            <label class="control">
                "Cluster"
                <select on:change=move |ev| {
                    if let Ok(filter) = ClusterFilter::from_str(&event_target_value(&ev)) {
                        edit_settings(|s| s.cluster_filter = filter);
                    }
                }>
                    <option value="all" prop:selected=move || settings_signal().get().cluster_filter == ClusterFilter::All>
                        "All"
                    </option>
                    <For
                        each=cluster_ids
                        key=|id| *id
                        children=move |id| view! {
                            <option
                                value=id.to_string()
                                prop:selected=move || settings_signal().get().cluster_filter == ClusterFilter::Only(id)
                            >
                                {format!("Cluster {}", id)}
                            </option>
                        }
                    />
                </select>
            </label>
            <label class="control">
                "Direction"
                <select on:change=move |ev| {
                    if let Ok(filter) = CandleTypeFilter::from_str(&event_target_value(&ev)) {
                        edit_settings(|s| s.candle_type_filter = filter);
                    }
                }>
                    {CandleTypeFilter::iter()
                        .map(|filter| {
                            let value: &'static str = filter.into();
                            view! {
                                <option
                                    value=value
                                    prop:selected=move || settings_signal().get().candle_type_filter == filter
                                >
                                    {filter.to_string()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </label>
            <FieldSelect label="X field" get={|s| s.x_field} set={|s, f| s.x_field = f} />
            <FieldSelect label="Y field" get={|s| s.y_field} set={|s, f| s.y_field = f} />
            <FieldSelect label="Histogram field" get={|s| s.histogram_field} set={|s, f| s.histogram_field = f} />
            <label class="control">
                {move || format!("Window: {} points", settings_signal().get().max_visible_points)}
                <input
                    type="range"
                    min="10"
                    max="200"
                    step="10"
                    prop:value=move || settings_signal().get().max_visible_points.to_string()
                    on:input=move |ev| {
                        if let Ok(points) = event_target_value(&ev).parse::<usize>() {
                            apply(Intent::SetWindow(points));
                        }
                    }
                />
            </label>
            <label class="control">
                {move || format!("Pan sensitivity: {:.1}x", settings_signal().get().panning_sensitivity)}
                <input
                    type="range"
                    min="0.1"
                    max="5"
                    step="0.1"
                    prop:value=move || settings_signal().get().panning_sensitivity.to_string()
                    on:input=move |ev| {
                        if let Ok(value) = event_target_value(&ev).parse::<f64>() {
                            edit_settings(|s| s.panning_sensitivity = value);
                        }
                    }
                />
            </label>
            <label class="control">
                {move || format!("Candle width: {:.0}%", settings_signal().get().candle_width * 100.0)}
                <input
                    type="range"
                    min="0.1"
                    max="1"
                    step="0.05"
                    prop:value=move || settings_signal().get().candle_width.to_string()
                    on:input=move |ev| {
                        if let Ok(value) = event_target_value(&ev).parse::<f64>() {
                            edit_settings(|s| s.candle_width = value);
                        }
                    }
                />
            </label>
            <Checkbox label="Cluster colors" get={|s| s.show_cluster_colors} set={|s, on| s.show_cluster_colors = on} />
            <Checkbox label="Volume" get={|s| s.show_volume} set={|s, on| s.show_volume = on} />
            <Checkbox label="Crosshair" get={|s| s.crosshair_enabled} set={|s, on| s.crosshair_enabled = on} />
            <Checkbox label="Snap" get={|s| s.crosshair_snap_to_candles} set={|s, on| s.crosshair_snap_to_candles = on} />
            <div class="control">
                <button class="debug-btn" on:click=move |_| apply(Intent::JumpToEarliest)>"Earliest"</button>
                <button class="debug-btn" on:click=move |_| apply(Intent::JumpToLatest)>"Latest"</button>
                <button class="debug-btn" on:click=move |_| regenerate()>"Regenerate"</button>
            </div>
        </div>
    }
}

#[component]
fn ChartView() -> impl IntoView {
    let canvas_ref = create_node_ref::<Canvas>();

    create_effect(move |_| {
        if canvas_ref.get().is_some() {
            // wait until the canvas is attached and laid out
            request_animation_frame(mount_runtime);
        }
    });

    let handle_mouse_down = move |ev: web_sys::MouseEvent| {
        let outcome = dispatch(InputEvent::PointerDown { x: f64::from(ev.offset_x()), y: f64::from(ev.offset_y()) });
        if outcome.prevent_default {
            ev.prevent_default();
        }
    };
    let handle_mouse_move = move |ev: web_sys::MouseEvent| {
        dispatch(InputEvent::PointerMove {
            x: f64::from(ev.offset_x()),
            y: f64::from(ev.offset_y()),
            pressed: primary_button_pressed(&ev),
        });
    };
    let handle_mouse_up = move |ev: web_sys::MouseEvent| {
        dispatch(InputEvent::PointerUp { x: f64::from(ev.offset_x()), y: f64::from(ev.offset_y()) });
    };
    let handle_mouse_leave = move |_ev: web_sys::MouseEvent| {
        dispatch(InputEvent::PointerLeave);
    };
    let handle_wheel = move |ev: web_sys::WheelEvent| {
        let outcome = dispatch(InputEvent::Wheel { delta_y: ev.delta_y(), modifier: wheel_has_modifier(&ev) });
        if outcome.prevent_default {
            ev.prevent_default();
        }
    };
    let touches = move |ev: &web_sys::TouchEvent| -> Vec<(f64, f64)> {
        canvas_ref.get_untracked().map(|canvas| touch_points(ev, &canvas)).unwrap_or_default()
    };
    let handle_touch_start = move |ev: web_sys::TouchEvent| {
        if dispatch(InputEvent::TouchStart { touches: touches(&ev) }).prevent_default {
            ev.prevent_default();
        }
    };
    let handle_touch_move = move |ev: web_sys::TouchEvent| {
        if dispatch(InputEvent::TouchMove { touches: touches(&ev) }).prevent_default {
            ev.prevent_default();
        }
    };
    let handle_touch_end = move |_ev: web_sys::TouchEvent| {
        dispatch(InputEvent::TouchEnd);
    };

    view! {
        <div class="chart-wrapper" class:fullscreen=move || settings_signal().get().is_fullscreen>
            <canvas
                id=CANVAS_ID
                node_ref=canvas_ref
                on:mousedown=handle_mouse_down
                on:mousemove=handle_mouse_move
                on:mouseup=handle_mouse_up
                on:mouseleave=handle_mouse_leave
                on:wheel=handle_wheel
                on:touchstart=handle_touch_start
                on:touchmove=handle_touch_move
                on:touchend=handle_touch_end
            />
            <Show when=move || settings_signal().get().stats_panel_visible>
                <StatsPanel />
            </Show>
            <Show when=move || settings_signal().get().legend_panel_visible>
                <LegendPanel />
            </Show>
        </div>
    }
}

fn format_price(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

#[component]
fn StatsPanel() -> impl IntoView {
    let opacity = move || format!("opacity: {}", settings_signal().get().panel_opacity);
    let visible = move || visible_stats_signal().get();

    view! {
        <div class="panel stats-panel" style=opacity>
            <div>{move || format!("Visible: {} / {}", visible().total, stats_signal().get().total)}</div>
            <div>{move || format!("Bullish {} · Bearish {} · Neutral {}", visible().bullish, visible().bearish, visible().neutral)}</div>
            <div>{move || format!("Low {} · High {}", format_price(visible().min_low), format_price(visible().max_high))}</div>
            <div>{move || format!("Volume {:.0}", visible().total_volume)}</div>
            <div>
                {move || match (visible().first_date, visible().last_date) {
                    (Some(first), Some(last)) => format!("{} → {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d")),
                    _ => String::new(),
                }}
            </div>
        </div>
    }
}

#[component]
fn LegendPanel() -> impl IntoView {
    let opacity = move || format!("opacity: {}", settings_signal().get().panel_opacity);
    let entries = move || stats_signal().get().clusters.into_iter().collect::<Vec<(i32, usize)>>();

    view! {
        <div class="panel legend-panel" style=opacity>
            <For
                each=entries
                key=|(id, count)| (*id, *count)
                children=move |(id, count)| view! {
                    <div>
                        <span class="legend-swatch" style=format!("background: {}", cluster_color(id).to_css())></span>
                        {format!("Cluster {} ({})", id, count)}
                    </div>
                }
            />
        </div>
    }
}

#[component]
fn DataInput() -> impl IntoView {
    view! {
        <div class="controls">
            <label class="control" style="flex: 1">
                "CSV (timestamp,open,high,low,close,volume[,predicted_cluster])"
                <textarea
                    rows="4"
                    prop:value=move || csv_input_signal().get()
                    on:input=move |ev| csv_input_signal().set(event_target_value(&ev))
                />
            </label>
            <div class="control">
                <button class="debug-btn" on:click=move |_| load_csv_input()>"Load CSV"</button>
                <button
                    class="debug-btn"
                    on:click=move |_| {
                        with_global_runtime(|rt| rt.clear());
                        status_signal().set("Cleared".to_string());
                        refresh_panels();
                    }
                >
                    "Clear"
                </button>
            </div>
        </div>
    }
}

#[component]
fn DebugConsole() -> impl IntoView {
    let logs = log_lines_signal();
    let is_paused = log_paused_signal();
    // newest first; the index keeps keys unique across identical lines
    let entries = move || logs.get().into_iter().enumerate().rev().collect::<Vec<(usize, String)>>();

    view! {
        <div class="debug-console">
            <div class="debug-header">
                <span>"Log"</span>
                <div>
                    <button class="debug-btn" on:click=move |_| logs.set(DEBUG_BUFFER.lines())>"Refresh"</button>
                    <button
                        class="debug-btn"
                        on:click=move |_| {
                            is_paused.update(|p| *p = !*p);
                            if !is_paused.get_untracked() {
                                logs.set(DEBUG_BUFFER.lines());
                            }
                        }
                    >
                        {move || if is_paused.get() { "Resume" } else { "Pause" }}
                    </button>
                    <button
                        class="debug-btn"
                        on:click=move |_| {
                            DEBUG_BUFFER.clear();
                            logs.set(Vec::new());
                        }
                    >
                        "Clear"
                    </button>
                </div>
            </div>
            <For
                each=entries
                key=|(i, line)| (*i, line.len())
                children=move |(_, line)| view! { <div class="log-line">{line}</div> }
            />
        </div>
    }
}
