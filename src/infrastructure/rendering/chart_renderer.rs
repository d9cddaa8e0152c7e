//! Chart drawing: background, grid, series, axes, crosshair and tooltip, in
//! that order, onto any [`DrawSurface`].

use std::collections::BTreeMap;

use crate::application::render_config::{RenderConfig, RenderFrame};
use crate::domain::chart::coords::{AXIS_PADDING_RATIO, PRICE_PADDING_RATIO};
use crate::domain::chart::filters::{candle_type_color, cluster_color, record_color};
use crate::domain::chart::{ChartArea, ChartKind, CoordinateMapper, Histogram, TooltipData, ValueDomain, ViewportRange};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Dataset, Record, SeriesField};
use crate::infrastructure::rendering::surface::{DrawSurface, LineStyle, TextAlign};
use crate::log_trace;
use crate::time_utils::{format_millis_label, format_time_label};

/// Candle bodies thinner than this are drawn as a flat line.
pub const CANDLE_BODY_MIN_HEIGHT_PX: f64 = 6.0;
pub const VOLUME_PANEL_RATIO: f64 = 0.2;
pub const PANEL_GAP_PX: f64 = 8.0;

const Y_TICKS: usize = 5;
const X_LABELS: usize = 6;
const AXIS_FONT_PX: f64 = 11.0;
const TOOLTIP_FONT_PX: f64 = 12.0;
const TOOLTIP_LINE_PX: f64 = 16.0;
const TOOLTIP_PADDING_PX: f64 = 8.0;
const SCATTER_RADIUS_PX: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum AxisFormat {
    Number,
    Count,
    Time { span_millis: f64 },
}

impl AxisFormat {
    fn for_field(field: SeriesField, domain: Option<ValueDomain>) -> Self {
        if field.is_time() {
            AxisFormat::Time { span_millis: domain.map_or(0.0, |d| d.span()) }
        } else {
            AxisFormat::Number
        }
    }

    fn label(&self, value: f64) -> String {
        match self {
            AxisFormat::Number => format_value(value),
            AxisFormat::Count => format!("{:.0}", value),
            AxisFormat::Time { span_millis } => format_millis_label(value, *span_millis),
        }
    }
}

/// Axis label with abbreviated precision for its magnitude.
pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1000.0 {
        format!("{:.0}", value)
    } else if magnitude >= 1.0 || magnitude == 0.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.4}", value)
    }
}

/// Geometry and scales of one frame, shared by every drawing pass
struct Layout {
    plot: ChartArea,
    volume: Option<ChartArea>,
    mapper: CoordinateMapper,
    x: Option<ValueDomain>,
    y: Option<ValueDomain>,
    y_format: AxisFormat,
    histogram: Option<Histogram>,
    x_labels: Vec<(f64, String)>,
    y_labels: Vec<(f64, String)>,
}

#[derive(Debug, Default)]
pub struct ChartRenderer {
    frames_drawn: u64,
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Draw one frame. Without a surface nothing happens and `false` is
    /// returned.
    pub fn render<S: DrawSurface>(&mut self, surface: Option<&mut S>, frame: &RenderFrame<'_>) -> bool {
        let Some(surface) = surface else {
            log_trace!(LogComponent::Infrastructure("ChartRenderer"), "no surface, frame skipped");
            return false;
        };
        let surface: &mut dyn DrawSurface = surface;
        let config = &frame.config;
        let (width, height) = surface.size();

        surface.clear();
        surface.vertical_gradient(
            ChartArea::new(0.0, 0.0, width, height),
            config.theme.background_top,
            config.theme.background_bottom,
        );
        self.frames_drawn += 1;

        let window = match frame.window {
            Some(window) if !frame.area.is_empty() => window,
            _ => {
                draw_placeholder(surface, frame.area, config, "No data");
                return true;
            }
        };

        let visible = config.filters.visible(frame.dataset, window);
        let layout = build_layout(frame, window, &visible);

        draw_grid(surface, frame.area, &layout, config);
        match config.kind {
            ChartKind::Candlestick => draw_candles(surface, &layout, &visible, config),
            ChartKind::Scatter => draw_scatter(surface, &layout, &visible, config),
            ChartKind::Line => draw_line(surface, &layout, &visible, config),
            ChartKind::Histogram => draw_histogram(surface, &layout, config),
        }
        if visible.is_empty() {
            draw_placeholder(surface, frame.area, config, "No records match the filters");
        }
        draw_axes(surface, frame.area, &layout, config);
        draw_crosshair(surface, frame, &layout);
        draw_tooltip(surface, frame, window);

        log_trace!(
            LogComponent::Infrastructure("ChartRenderer"),
            "frame {} drew {} of {} records as {}",
            self.frames_drawn,
            visible.len(),
            window.len(),
            config.kind
        );
        true
    }
}

fn build_layout(frame: &RenderFrame<'_>, window: ViewportRange, visible: &[(usize, &Record)]) -> Layout {
    let config = &frame.config;
    let (plot, volume) = if config.kind == ChartKind::Candlestick && config.show_volume {
        let (upper, lower) = frame.area.split_bottom(VOLUME_PANEL_RATIO, PANEL_GAP_PX);
        (upper, Some(lower))
    } else {
        (frame.area, None)
    };
    let mapper = CoordinateMapper::new(plot, window.start, window.len());

    let mut layout = Layout {
        plot,
        volume,
        mapper,
        x: None,
        y: None,
        y_format: AxisFormat::Number,
        histogram: None,
        x_labels: Vec::new(),
        y_labels: Vec::new(),
    };

    let mut x_format = AxisFormat::Number;
    match config.kind {
        ChartKind::Candlestick => {
            layout.y = ValueDomain::from_values(visible.iter().flat_map(|(_, r)| [r.low, r.high]), PRICE_PADDING_RATIO);
        }
        ChartKind::Scatter | ChartKind::Line => {
            layout.x = ValueDomain::from_values(visible.iter().map(|(_, r)| config.x_field.value_of(r)), AXIS_PADDING_RATIO);
            layout.y = ValueDomain::from_values(visible.iter().map(|(_, r)| config.y_field.value_of(r)), AXIS_PADDING_RATIO);
            x_format = AxisFormat::for_field(config.x_field, layout.x);
            layout.y_format = AxisFormat::for_field(config.y_field, layout.y);
        }
        ChartKind::Histogram => {
            let records: Vec<&Record> = visible.iter().map(|(_, r)| *r).collect();
            layout.histogram = Histogram::build(&records, config.histogram_field);
            if let Some(histogram) = &layout.histogram {
                layout.x = Some(ValueDomain::new(histogram.lower(), histogram.upper()));
                layout.y = Some(ValueDomain::new(0.0, histogram.max_count() as f64));
            }
            x_format = AxisFormat::for_field(config.histogram_field, layout.x);
            layout.y_format = AxisFormat::Count;
        }
    }

    layout.x_labels = match layout.x {
        Some(domain) => domain
            .ticks(X_LABELS)
            .into_iter()
            .map(|v| (mapper.value_to_x(v, &domain), x_format.label(v)))
            .collect(),
        None if config.kind == ChartKind::Candlestick => index_labels(frame.dataset, window, &mapper),
        None => Vec::new(),
    };
    layout.y_labels = match layout.y {
        Some(domain) => domain
            .ticks(Y_TICKS)
            .into_iter()
            .map(|v| (mapper.value_to_y(v, &domain), layout.y_format.label(v)))
            .collect(),
        None => Vec::new(),
    };
    layout
}

/// Time labels for evenly spaced records of an index-based x axis.
fn index_labels(dataset: &Dataset, window: ViewportRange, mapper: &CoordinateMapper) -> Vec<(f64, String)> {
    let records = dataset.window(window);
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Vec::new();
    };
    let span = last.date - first.date;
    let count = X_LABELS.min(records.len());
    let mut labels = Vec::with_capacity(count);
    let mut previous = None;
    for k in 0..count {
        let offset = if count == 1 { 0 } else { k * (records.len() - 1) / (count - 1) };
        if previous == Some(offset) {
            continue;
        }
        previous = Some(offset);
        let record = &records[offset];
        labels.push((mapper.index_to_x(window.start + offset), format_time_label(record.date, span)));
    }
    labels
}

fn draw_placeholder(surface: &mut dyn DrawSurface, area: ChartArea, config: &RenderConfig, message: &str) {
    let (cx, cy) = if area.is_empty() {
        let (w, h) = surface.size();
        (w / 2.0, h / 2.0)
    } else {
        (area.x + area.width / 2.0, area.y + area.height / 2.0)
    };
    surface.text(message, cx, cy, TextAlign::Center, config.theme.axis_text, TOOLTIP_FONT_PX);
}

fn draw_grid(surface: &mut dyn DrawSurface, area: ChartArea, layout: &Layout, config: &RenderConfig) {
    let style = LineStyle::solid(config.theme.grid, 1.0);
    for (y, _) in &layout.y_labels {
        surface.line((area.x, *y), (area.right(), *y), style);
    }
    for (x, _) in &layout.x_labels {
        surface.line((*x, area.y), (*x, area.bottom()), style);
    }
}

fn draw_candles(surface: &mut dyn DrawSurface, layout: &Layout, visible: &[(usize, &Record)], config: &RenderConfig) {
    let Some(domain) = layout.y else {
        return;
    };
    let mapper = &layout.mapper;
    let body_width = (mapper.step() * config.candle_width_ratio).max(1.0);
    let half = body_width / 2.0;

    for &(index, record) in visible {
        let color = record_color(record, config.show_cluster_colors, &config.theme);
        let x = mapper.index_to_x(index);
        let high_y = mapper.value_to_y(record.high, &domain);
        let low_y = mapper.value_to_y(record.low, &domain);
        surface.line((x, high_y), (x, low_y), LineStyle::solid(color, 1.0));

        let open_y = mapper.value_to_y(record.open, &domain);
        let close_y = mapper.value_to_y(record.close, &domain);
        let body_height = (open_y - close_y).abs();
        if body_height < CANDLE_BODY_MIN_HEIGHT_PX {
            let mid = (open_y + close_y) / 2.0;
            surface.line((x - half, mid), (x + half, mid), LineStyle::solid(color, 2.0));
        } else {
            let body = ChartArea::new(x - half, open_y.min(close_y), body_width, body_height);
            if record.is_bullish() {
                surface.stroke_rect(body, LineStyle::solid(color, 1.0));
            } else {
                surface.fill_rect(body, color);
            }
        }
    }

    if let Some(panel) = layout.volume {
        let max_volume = visible
            .iter()
            .map(|(_, r)| r.volume)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        if max_volume <= 0.0 {
            return;
        }
        for &(index, record) in visible {
            if !(record.volume.is_finite() && record.volume > 0.0) {
                continue;
            }
            let color = record_color(record, config.show_cluster_colors, &config.theme).with_alpha(0.5);
            let bar_height = record.volume / max_volume * panel.height;
            let x = mapper.index_to_x(index);
            surface.fill_rect(ChartArea::new(x - half, panel.bottom() - bar_height, body_width, bar_height), color);
        }
    }
}

/// Plot positions for the selected field pair, skipping non-finite values.
fn field_points<'a>(
    layout: &Layout,
    visible: &[(usize, &'a Record)],
    config: &RenderConfig,
) -> Vec<((f64, f64), &'a Record)> {
    let (Some(x_domain), Some(y_domain)) = (layout.x, layout.y) else {
        return Vec::new();
    };
    visible
        .iter()
        .filter_map(|&(_, record)| {
            let xv = config.x_field.value_of(record);
            let yv = config.y_field.value_of(record);
            if !(xv.is_finite() && yv.is_finite()) {
                return None;
            }
            let point = (layout.mapper.value_to_x(xv, &x_domain), layout.mapper.value_to_y(yv, &y_domain));
            Some((point, record))
        })
        .collect()
}

fn draw_scatter(surface: &mut dyn DrawSurface, layout: &Layout, visible: &[(usize, &Record)], config: &RenderConfig) {
    for (point, record) in field_points(layout, visible, config) {
        let color = record_color(record, config.show_cluster_colors, &config.theme);
        surface.circle(point, SCATTER_RADIUS_PX, color);
    }
}

fn draw_line(surface: &mut dyn DrawSurface, layout: &Layout, visible: &[(usize, &Record)], config: &RenderConfig) {
    let points = field_points(layout, visible, config);

    if config.show_cluster_colors {
        let mut by_cluster: BTreeMap<i32, Vec<(f64, f64)>> = BTreeMap::new();
        for (point, record) in &points {
            by_cluster.entry(record.cluster).or_default().push(*point);
        }
        for (cluster, path) in by_cluster {
            let color = cluster_color(cluster);
            match path.as_slice() {
                [single] => surface.circle(*single, SCATTER_RADIUS_PX / 2.0, color),
                _ => surface.path(&path, LineStyle::solid(color, 1.5)),
            }
        }
        return;
    }

    if let [(point, record)] = points.as_slice() {
        surface.circle(*point, SCATTER_RADIUS_PX / 2.0, candle_type_color(record.candle_type(), &config.theme));
        return;
    }
    for pair in points.windows(2) {
        let (from, _) = pair[0];
        let (to, record) = pair[1];
        let color = candle_type_color(record.candle_type(), &config.theme);
        surface.line(from, to, LineStyle::solid(color, 1.5));
    }
}

fn draw_histogram(surface: &mut dyn DrawSurface, layout: &Layout, config: &RenderConfig) {
    let Some(histogram) = &layout.histogram else {
        return;
    };
    let max_count = histogram.max_count();
    if max_count == 0 || histogram.bins.is_empty() {
        return;
    }
    let plot = layout.plot;
    let bar_width = plot.width / histogram.bins.len() as f64;
    let inset = if bar_width > 3.0 { 1.0 } else { 0.0 };

    for (slot, bin) in histogram.bins.iter().enumerate() {
        let x = plot.x + slot as f64 * bar_width + inset;
        let segments: Vec<_> = if config.show_cluster_colors {
            bin.by_cluster.iter().map(|(cluster, n)| (cluster_color(*cluster), *n)).collect()
        } else {
            bin.by_candle_type
                .segments()
                .iter()
                .map(|(candle_type, n)| (candle_type_color(*candle_type, &config.theme), *n))
                .collect()
        };

        let mut base = plot.bottom();
        for (color, count) in segments.into_iter().filter(|(_, n)| *n > 0) {
            let height = count as f64 / max_count as f64 * plot.height;
            surface.fill_rect(ChartArea::new(x, base - height, bar_width - 2.0 * inset, height), color);
            base -= height;
        }
    }
}

fn draw_axes(surface: &mut dyn DrawSurface, area: ChartArea, layout: &Layout, config: &RenderConfig) {
    let axis = LineStyle::solid(config.theme.grid, 1.0);
    surface.line((area.x, area.bottom()), (area.right(), area.bottom()), axis);
    surface.line((area.right(), area.y), (area.right(), area.bottom()), axis);

    for (y, label) in &layout.y_labels {
        surface.text(label, area.right() + 6.0, *y, TextAlign::Left, config.theme.axis_text, AXIS_FONT_PX);
    }
    for (x, label) in &layout.x_labels {
        surface.text(label, *x, area.bottom() + 14.0, TextAlign::Center, config.theme.axis_text, AXIS_FONT_PX);
    }
}

fn draw_crosshair(surface: &mut dyn DrawSurface, frame: &RenderFrame<'_>, layout: &Layout) {
    let config = &frame.config;
    if !config.crosshair_enabled {
        return;
    }
    let Some((x, y)) = frame.hover.crosshair else {
        return;
    };
    let area = frame.area;
    if !area.contains(x, y) {
        return;
    }
    let style = LineStyle::dashed(config.theme.crosshair, 1.0);
    surface.line((x, area.y), (x, area.bottom()), style);
    surface.line((area.x, y), (area.right(), y), style);

    let plot = layout.plot;
    if let Some(domain) = layout.y {
        if y >= plot.y && y <= plot.bottom() {
            let label = layout.y_format.label(layout.mapper.y_to_value(y, &domain));
            let width = surface.measure_text(&label, AXIS_FONT_PX) + 8.0;
            surface.fill_rect(ChartArea::new(area.right() + 2.0, y - 8.0, width, 16.0), config.theme.crosshair);
            surface.text(&label, area.right() + 6.0, y, TextAlign::Left, config.theme.tooltip_text, AXIS_FONT_PX);
        }
    }
}

fn draw_tooltip(surface: &mut dyn DrawSurface, frame: &RenderFrame<'_>, window: ViewportRange) {
    let config = &frame.config;
    if config.kind == ChartKind::Histogram {
        return;
    }
    let (Some(index), Some((x, y))) = (frame.hover.index, frame.hover.crosshair) else {
        return;
    };
    let Some(record) = frame.dataset.get(index) else {
        return;
    };
    if !window.contains(index) || !config.filters.passes(record) {
        return;
    }

    let tooltip = TooltipData::new(index, record, x, y);
    let text_width = tooltip
        .lines
        .iter()
        .map(|line| surface.measure_text(line, TOOLTIP_FONT_PX))
        .fold(0.0_f64, f64::max);
    let width = text_width + 2.0 * TOOLTIP_PADDING_PX;
    let height = tooltip.lines.len() as f64 * TOOLTIP_LINE_PX + TOOLTIP_PADDING_PX;

    let (surface_width, surface_height) = surface.size();
    let mut left = x + 12.0;
    if left + width > surface_width {
        left = x - 12.0 - width;
    }
    let left = left.max(0.0);
    let top = (y - height / 2.0).clamp(0.0, (surface_height - height).max(0.0));

    let accent = record_color(record, config.show_cluster_colors, &config.theme);
    let frame_box = ChartArea::new(left, top, width, height);
    surface.fill_rect(frame_box, config.theme.tooltip_background);
    surface.stroke_rect(frame_box, LineStyle::solid(accent, 1.0));
    for (row, line) in tooltip.lines.iter().enumerate() {
        let line_y = top + TOOLTIP_PADDING_PX / 2.0 + TOOLTIP_LINE_PX * (row as f64 + 0.5);
        surface.text(line, left + TOOLTIP_PADDING_PX, line_y, TextAlign::Left, config.theme.tooltip_text, TOOLTIP_FONT_PX);
    }
}
