//! Visible-window bookkeeping over an ordered dataset.
//!
//! All operations work on an inclusive `[start, end]` index range and keep
//! two invariants: the range lies inside `[0, len - 1]`, and its size never
//! exceeds the configured maximum. When a move would leave the dataset the
//! window is translated back inside rather than truncated.

use serde::{Deserialize, Serialize};

/// Smallest pan that is applied; anything that rounds below it is jitter.
pub const MIN_PAN_POINTS: i64 = 1;

/// Value Object - inclusive index range into the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewportRange {
    pub start: usize,
    pub end: usize,
}

impl ViewportRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Show the most recent `max_visible_points` records.
pub fn initialize(dataset_len: usize, max_visible_points: usize) -> Option<ViewportRange> {
    if dataset_len == 0 {
        return None;
    }
    let end = dataset_len - 1;
    let size = max_visible_points.max(1).min(dataset_len);
    Some(ViewportRange::new(end + 1 - size, end))
}

/// Pull a possibly stale range back inside the dataset and the size limit.
///
/// Idempotent: clamping an already valid range returns it unchanged.
pub fn clamp_to_bounds(
    range: ViewportRange,
    dataset_len: usize,
    max_visible_points: usize,
) -> Option<ViewportRange> {
    if dataset_len == 0 {
        return None;
    }
    let last = dataset_len - 1;
    let max_points = max_visible_points.max(1);

    let end = range.end.min(last);
    let start = range.start.min(end);
    let end = if end - start + 1 > max_points { start + max_points - 1 } else { end };
    Some(ViewportRange::new(start, end))
}

/// Shift the window by a pixel delta; negative moves towards older records.
pub fn pan(
    range: ViewportRange,
    delta_pixels: f64,
    pixels_per_point: f64,
    dataset_len: usize,
) -> ViewportRange {
    if pixels_per_point.is_nan() || pixels_per_point <= 0.0 || !delta_pixels.is_finite() {
        return range;
    }
    let points = (delta_pixels / pixels_per_point).round();
    if points.abs() < MIN_PAN_POINTS as f64 {
        return range;
    }
    pan_points(range, points as i64, dataset_len)
}

/// Shift the window by a whole number of points, preserving its size.
pub fn pan_points(range: ViewportRange, points: i64, dataset_len: usize) -> ViewportRange {
    if dataset_len == 0 || points == 0 {
        return range;
    }
    let last = dataset_len as i64 - 1;
    let size = (range.len() as i64).min(dataset_len as i64);

    let mut start = range.start as i64 + points;
    let mut end = start + size - 1;
    if end > last {
        let overflow = end - last;
        start -= overflow;
        end -= overflow;
    }
    if start < 0 {
        end -= start;
        start = 0;
    }
    ViewportRange::new(start as usize, end.min(last) as usize)
}

/// Change the window size keeping the newest visible record anchored.
pub fn resize_window(range: ViewportRange, new_max_points: usize, dataset_len: usize) -> ViewportRange {
    if dataset_len == 0 {
        return range;
    }
    let end = range.end.min(dataset_len - 1);
    let size = new_max_points.max(1).min(dataset_len);
    ViewportRange::new((end + 1).saturating_sub(size), end)
}

/// Place the window so that it starts at `target_start`, as far as the
/// dataset allows.
pub fn pan_to_index(range: ViewportRange, target_start: usize, dataset_len: usize) -> ViewportRange {
    if dataset_len == 0 {
        return range;
    }
    let size = range.len().min(dataset_len);
    let start = target_start.min(dataset_len - size);
    ViewportRange::new(start, start + size - 1)
}

/// Stateful owner of the visible window and its size limit
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportManager {
    range: Option<ViewportRange>,
    max_visible_points: usize,
}

impl ViewportManager {
    pub fn new(max_visible_points: usize) -> Self {
        Self { range: None, max_visible_points: max_visible_points.max(1) }
    }

    pub fn max_visible_points(&self) -> usize {
        self.max_visible_points
    }

    /// Recompute defaults for a freshly replaced dataset.
    pub fn reset(&mut self, dataset_len: usize) {
        self.range = initialize(dataset_len, self.max_visible_points);
    }

    /// Adopt an externally supplied range (restored settings), clamped.
    pub fn restore(&mut self, range: ViewportRange, dataset_len: usize) {
        self.range = clamp_to_bounds(range, dataset_len, self.max_visible_points);
    }

    /// The clamped current window; `None` for an empty dataset.
    pub fn current(&self, dataset_len: usize) -> Option<ViewportRange> {
        self.range.and_then(|r| clamp_to_bounds(r, dataset_len, self.max_visible_points))
    }

    fn update(&mut self, dataset_len: usize, op: impl FnOnce(ViewportRange) -> ViewportRange) -> bool {
        let Some(current) = self.current(dataset_len) else {
            return false;
        };
        let next = op(current);
        self.range = Some(next);
        next != current
    }

    /// Returns `true` when the window moved.
    pub fn pan_pixels(&mut self, delta_pixels: f64, pixels_per_point: f64, dataset_len: usize) -> bool {
        self.update(dataset_len, |r| pan(r, delta_pixels, pixels_per_point, dataset_len))
    }

    pub fn pan_points(&mut self, points: i64, dataset_len: usize) -> bool {
        self.update(dataset_len, |r| pan_points(r, points, dataset_len))
    }

    pub fn jump_to(&mut self, target_start: usize, dataset_len: usize) -> bool {
        self.update(dataset_len, |r| pan_to_index(r, target_start, dataset_len))
    }

    pub fn jump_to_latest(&mut self, dataset_len: usize) -> bool {
        self.jump_to(dataset_len, dataset_len)
    }

    pub fn jump_to_earliest(&mut self, dataset_len: usize) -> bool {
        self.jump_to(0, dataset_len)
    }

    /// Change the size limit; the window follows while keeping its end.
    pub fn set_max_visible_points(&mut self, max_visible_points: usize, dataset_len: usize) -> bool {
        let max_visible_points = max_visible_points.max(1);
        let limit_changed = max_visible_points != self.max_visible_points;
        self.max_visible_points = max_visible_points;
        let window_changed = match self.range {
            Some(range) if dataset_len > 0 => {
                let next = resize_window(range, max_visible_points, dataset_len);
                self.range = Some(next);
                next != range
            }
            _ => false,
        };
        limit_changed || window_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_shows_latest_points() {
        assert_eq!(initialize(100, 50), Some(ViewportRange::new(50, 99)));
        assert_eq!(initialize(30, 50), Some(ViewportRange::new(0, 29)));
        assert_eq!(initialize(0, 50), None);
    }

    #[test]
    fn pan_below_threshold_is_ignored() {
        let range = ViewportRange::new(10, 19);
        assert_eq!(pan(range, 4.0, 10.0, 100), range);
        assert_eq!(pan(range, -4.9, 10.0, 100), range);
        assert_eq!(pan(range, 5.0, 10.0, 100), ViewportRange::new(11, 20));
    }

    #[test]
    fn pan_translates_back_at_right_edge() {
        let range = ViewportRange::new(80, 89);
        assert_eq!(pan_points(range, 25, 100), ViewportRange::new(90, 99));
    }

    #[test]
    fn pan_with_zero_pixel_scale_is_noop() {
        let range = ViewportRange::new(0, 9);
        assert_eq!(pan(range, 50.0, 0.0, 100), range);
    }

    #[test]
    fn clamp_rederives_end_when_window_too_large() {
        let range = ViewportRange::new(10, 90);
        assert_eq!(clamp_to_bounds(range, 100, 20), Some(ViewportRange::new(10, 29)));
    }

    #[test]
    fn manager_reports_changes() {
        let mut manager = ViewportManager::new(50);
        manager.reset(100);
        assert!(manager.pan_points(-10, 100));
        assert_eq!(manager.current(100), Some(ViewportRange::new(40, 89)));
        assert!(!manager.pan_points(0, 100));
        assert!(manager.jump_to_latest(100));
        assert_eq!(manager.current(100), Some(ViewportRange::new(50, 99)));
    }
}
