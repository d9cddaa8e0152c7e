//! Application state owned by the interaction controller.

use crate::application::render_config::{HoverState, RenderConfig, RenderFrame};
use crate::application::settings::Settings;
use crate::domain::chart::{ChartArea, CoordinateMapper, ViewportManager, ViewportRange};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Dataset, DatasetStats, Record};
use crate::log_info;

/// Space around the plot rectangle reserved for axis labels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotMargins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

pub const PLOT_MARGINS: PlotMargins = PlotMargins { left: 12.0, right: 72.0, top: 16.0, bottom: 32.0 };

impl PlotMargins {
    /// Plot rectangle inside a surface of the given logical size.
    pub fn plot_area(&self, width: f64, height: f64) -> ChartArea {
        ChartArea::new(
            self.left,
            self.top,
            (width - self.left - self.right).max(0.0),
            (height - self.top - self.bottom).max(0.0),
        )
    }
}

#[derive(Debug, Clone)]
pub struct ChartState {
    dataset: Dataset,
    viewport: ViewportManager,
    settings: Settings,
    surface: (f64, f64),
    area: ChartArea,
    hover: HoverState,
    /// Saved window applied to the first non-empty dataset only.
    pending_restore: Option<ViewportRange>,
}

impl Default for ChartState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl ChartState {
    pub fn new(settings: Settings) -> Self {
        let settings = settings.sanitized();
        Self {
            dataset: Dataset::default(),
            viewport: ViewportManager::new(settings.max_visible_points),
            pending_restore: settings.visible_range(),
            surface: (0.0, 0.0),
            area: ChartArea::default(),
            hover: HoverState::default(),
            settings,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn area(&self) -> ChartArea {
        self.area
    }

    pub fn surface_size(&self) -> (f64, f64) {
        self.surface
    }

    pub fn hover(&self) -> HoverState {
        self.hover
    }

    pub fn max_visible_points(&self) -> usize {
        self.viewport.max_visible_points()
    }

    /// Clamped visible window; `None` while the dataset is empty.
    pub fn window(&self) -> Option<ViewportRange> {
        self.viewport.current(self.dataset.len())
    }

    pub fn mapper(&self) -> Option<CoordinateMapper> {
        let window = self.window()?;
        if self.area.is_empty() {
            return None;
        }
        Some(CoordinateMapper::new(self.area, window.start, window.len()))
    }

    /// Swap in a new dataset; the window jumps to the most recent records
    /// unless a saved window is still waiting to be restored.
    pub fn replace_dataset(&mut self, records: Vec<Record>) {
        self.dataset = self.dataset.replaced_with(records);
        let len = self.dataset.len();
        let restore = if len > 0 { self.pending_restore.take() } else { None };
        match restore {
            Some(range) => self.viewport.restore(range, len),
            None => self.viewport.reset(len),
        }
        self.hover = HoverState::default();
        log_info!(
            LogComponent::Application("ChartState"),
            "dataset generation {} with {} records, window {:?}",
            self.dataset.generation(),
            len,
            self.window()
        );
    }

    pub fn clear_dataset(&mut self) {
        self.replace_dataset(Vec::new());
    }

    /// Recompute the plot rectangle; returns `true` when it changed.
    pub fn resize_surface(&mut self, width: f64, height: f64) -> bool {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        let area = PLOT_MARGINS.plot_area(width, height);
        let changed = area != self.area || (width, height) != self.surface;
        self.surface = (width, height);
        self.area = area;
        changed
    }

    pub fn set_hover(&mut self, hover: HoverState) {
        self.hover = hover;
    }

    pub(crate) fn viewport_mut(&mut self) -> (&mut ViewportManager, usize) {
        (&mut self.viewport, self.dataset.len())
    }

    /// Edit settings in place; values are re-clamped and the window is
    /// resized only when `max_visible_points` itself changed. Returns `true`
    /// when anything changed.
    pub fn update_settings(&mut self, edit: impl FnOnce(&mut Settings)) -> bool {
        let before = self.settings.clone();
        edit(&mut self.settings);
        self.settings = std::mem::take(&mut self.settings).sanitized();
        if self.settings.max_visible_points != before.max_visible_points {
            let len = self.dataset.len();
            self.viewport.set_max_visible_points(self.settings.max_visible_points, len);
        }
        self.settings != before
    }

    /// Settings as they should be persisted, including the live window.
    pub fn settings_snapshot(&self) -> Settings {
        let mut snapshot = self.settings.clone();
        snapshot.max_visible_points = self.viewport.max_visible_points();
        if let Some(window) = self.window() {
            snapshot.visible_start_index = Some(window.start);
            snapshot.visible_end_index = Some(window.end);
        }
        snapshot
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig::from_settings(&self.settings)
    }

    pub fn frame(&self) -> RenderFrame<'_> {
        RenderFrame {
            dataset: &self.dataset,
            window: self.window(),
            area: self.area,
            hover: self.hover,
            config: self.render_config(),
        }
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats::compute(self.dataset.records())
    }

    /// Statistics over the filtered records of the current window.
    pub fn visible_stats(&self) -> DatasetStats {
        let Some(window) = self.window() else {
            return DatasetStats::default();
        };
        let filters = self.render_config().filters;
        DatasetStats::compute(self.dataset.window(window).iter().filter(|r| filters.passes(r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::SampleGenerator;

    #[test]
    fn saved_window_is_restored_once() {
        let settings = Settings {
            visible_start_index: Some(10),
            visible_end_index: Some(59),
            ..Settings::default()
        };
        let mut state = ChartState::new(settings);
        state.replace_dataset(SampleGenerator::new(3).generate(100));
        assert_eq!(state.window(), Some(ViewportRange::new(10, 59)));

        state.replace_dataset(SampleGenerator::new(4).generate(100));
        assert_eq!(state.window(), Some(ViewportRange::new(50, 99)));
    }

    #[test]
    fn plot_area_never_goes_negative() {
        let mut state = ChartState::default();
        state.resize_surface(40.0, 20.0);
        assert!(state.area().is_empty());
        assert!(state.mapper().is_none());
    }
}
