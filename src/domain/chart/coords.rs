//! Data index / value ↔ pixel mapping.
//!
//! Every division is guarded: a zero-width window or a degenerate value
//! range maps to a fixed edge of the chart area instead of NaN.

use super::value_objects::ChartArea;

/// Padding applied on each side of a scatter/line/histogram axis
pub const AXIS_PADDING_RATIO: f64 = 0.05;
/// Padding applied on each side of the candlestick price axis
pub const PRICE_PADDING_RATIO: f64 = 0.10;

/// Horizontal center of point `index` inside its column slot.
pub fn index_to_x(index: usize, window_start: usize, window_len: usize, area: &ChartArea) -> f64 {
    if window_len == 0 {
        return area.x;
    }
    let step = area.width / window_len as f64;
    let offset = index as f64 - window_start as f64;
    area.x + offset * step + step / 2.0
}

/// Linear value → y mapping, larger values upward.
///
/// `chart_height` may be smaller than `area.height` when a sub-panel shares
/// the area. A zero or non-finite value range yields the bottom of the chart.
pub fn value_to_y(value: f64, min_value: f64, max_value: f64, area: &ChartArea, chart_height: f64) -> f64 {
    let bottom = area.y + chart_height;
    let range = max_value - min_value;
    if range == 0.0 || !range.is_finite() || !value.is_finite() {
        return bottom;
    }
    bottom - (value - min_value) / range * chart_height
}

/// Inverse of [`value_to_y`]; a degenerate range yields `min_value`.
pub fn y_to_value(y: f64, min_value: f64, max_value: f64, area: &ChartArea, chart_height: f64) -> f64 {
    let range = max_value - min_value;
    if range == 0.0 || !range.is_finite() || chart_height <= 0.0 {
        return min_value;
    }
    min_value + (area.y + chart_height - y) / chart_height * range
}

/// Linear value → x mapping for value axes (scatter, line, histogram).
/// A degenerate range yields the left edge.
pub fn value_to_x(value: f64, min_value: f64, max_value: f64, area: &ChartArea) -> f64 {
    let range = max_value - min_value;
    if range == 0.0 || !range.is_finite() || !value.is_finite() {
        return area.x;
    }
    area.x + (value - min_value) / range * area.width
}

/// Dataset index under `px`, or `None` outside the window or chart area.
pub fn pixel_to_index(px: f64, window_start: usize, window_len: usize, area: &ChartArea) -> Option<usize> {
    if window_len == 0 || area.width <= 0.0 || !area.contains_x(px) {
        return None;
    }
    let step = area.width / window_len as f64;
    let slot = ((px - area.x) / step).floor();
    if slot < 0.0 || slot >= window_len as f64 {
        return None;
    }
    Some(window_start + slot as usize)
}

/// Snap `px` to the closest plotted point in the window.
///
/// Linear scan; on equal distance the lowest index wins.
pub fn nearest_index_snap(
    px: f64,
    window_start: usize,
    window_len: usize,
    area: &ChartArea,
) -> Option<(f64, usize)> {
    let mut best: Option<(f64, usize, f64)> = None;
    for index in window_start..window_start + window_len {
        let x = index_to_x(index, window_start, window_len, area);
        let distance = (x - px).abs();
        match best {
            Some((_, _, d)) if distance >= d => {}
            _ => best = Some((x, index, distance)),
        }
    }
    best.map(|(x, index, _)| (x, index))
}

/// Padded min/max of the values shown on one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueDomain {
    pub min: f64,
    pub max: f64,
}

impl ValueDomain {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Min/max over finite values, padded by `padding_ratio` of the span on
    /// each side. Identical values stay a zero-width domain.
    pub fn from_values(values: impl IntoIterator<Item = f64>, padding_ratio: f64) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        let padding = (max - min) * padding_ratio;
        Some(Self { min: min - padding, max: max + padding })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.span() == 0.0
    }

    /// Evenly spaced tick values from min to max inclusive.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.min],
            _ if self.is_degenerate() => vec![self.min],
            _ => {
                let step = self.span() / (count - 1) as f64;
                (0..count).map(|i| self.min + step * i as f64).collect()
            }
        }
    }
}

/// Index and value mapping bundled for one frame of one chart area
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    pub area: ChartArea,
    pub window_start: usize,
    pub window_len: usize,
}

impl CoordinateMapper {
    pub fn new(area: ChartArea, window_start: usize, window_len: usize) -> Self {
        Self { area, window_start, window_len }
    }

    /// Width of one column slot.
    pub fn step(&self) -> f64 {
        if self.window_len == 0 { 0.0 } else { self.area.width / self.window_len as f64 }
    }

    pub fn index_to_x(&self, index: usize) -> f64 {
        index_to_x(index, self.window_start, self.window_len, &self.area)
    }

    pub fn value_to_y(&self, value: f64, domain: &ValueDomain) -> f64 {
        value_to_y(value, domain.min, domain.max, &self.area, self.area.height)
    }

    pub fn y_to_value(&self, y: f64, domain: &ValueDomain) -> f64 {
        y_to_value(y, domain.min, domain.max, &self.area, self.area.height)
    }

    pub fn value_to_x(&self, value: f64, domain: &ValueDomain) -> f64 {
        value_to_x(value, domain.min, domain.max, &self.area)
    }

    pub fn pixel_to_index(&self, px: f64) -> Option<usize> {
        pixel_to_index(px, self.window_start, self.window_len, &self.area)
    }

    pub fn nearest_index_snap(&self, px: f64) -> Option<(f64, usize)> {
        nearest_index_snap(px, self.window_start, self.window_len, &self.area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> ChartArea {
        ChartArea::new(50.0, 10.0, 500.0, 300.0)
    }

    #[test]
    fn index_to_x_centers_points_in_slots() {
        assert_eq!(index_to_x(20, 20, 10, &area()), 75.0);
        assert_eq!(index_to_x(29, 20, 10, &area()), 525.0);
    }

    #[test]
    fn value_to_y_maps_extremes_to_edges() {
        assert_eq!(value_to_y(0.0, 0.0, 100.0, &area(), 300.0), 310.0);
        assert_eq!(value_to_y(100.0, 0.0, 100.0, &area(), 300.0), 10.0);
        assert_eq!(value_to_y(42.0, 10.0, 10.0, &area(), 300.0), 310.0);
    }

    #[test]
    fn y_to_value_inverts_value_to_y() {
        let y = value_to_y(37.5, 0.0, 100.0, &area(), 300.0);
        assert!((y_to_value(y, 0.0, 100.0, &area(), 300.0) - 37.5).abs() < 1e-9);
    }

    #[test]
    fn pixel_to_index_rejects_outside_area() {
        assert_eq!(pixel_to_index(49.9, 0, 10, &area()), None);
        assert_eq!(pixel_to_index(550.0, 0, 10, &area()), None);
        assert_eq!(pixel_to_index(50.0, 5, 10, &area()), Some(5));
        assert_eq!(pixel_to_index(549.9, 5, 10, &area()), Some(14));
    }

    #[test]
    fn snap_prefers_lowest_index_on_tie() {
        // Exactly between the centers of slots 0 (75) and 1 (125).
        assert_eq!(nearest_index_snap(100.0, 0, 10, &area()), Some((75.0, 0)));
        assert_eq!(nearest_index_snap(0.0, 3, 0, &area()), None);
    }

    #[test]
    fn domain_padding_and_degenerate_values() {
        let domain = ValueDomain::from_values([10.0, 20.0], AXIS_PADDING_RATIO).unwrap();
        assert!((domain.min - 9.5).abs() < 1e-9);
        assert!((domain.max - 20.5).abs() < 1e-9);
        let flat = ValueDomain::from_values([5.0, 5.0, f64::NAN], PRICE_PADDING_RATIO).unwrap();
        assert!(flat.is_degenerate());
        assert_eq!(flat.ticks(5), vec![5.0]);
        assert!(ValueDomain::from_values(Vec::<f64>::new(), 0.1).is_none());
    }
}
