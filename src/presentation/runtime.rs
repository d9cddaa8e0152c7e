//! Glue between the controller, the renderer, the frame scheduler and the
//! settings store.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::application::{
    ChartController, ChartState, FrameHost, FrameScheduler, InputEvent, Intent, Outcome, Redraw, Settings,
    SettingsStore, encode_settings,
};
use crate::domain::errors::AppError;
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{DatasetStats, Record, SampleGenerator, parse_csv};
use crate::infrastructure::rendering::{CanvasSurface, ChartRenderer, DrawSurface};
use crate::infrastructure::{BrowserFrameHost, LocalStorageSettings};
use crate::{log_info, log_warn};

/// Result of a successful dataset load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.skipped {
            0 => write!(f, "Loaded {} records", self.loaded),
            1 => write!(f, "Loaded {} records (1 row skipped)", self.loaded),
            n => write!(f, "Loaded {} records ({} rows skipped)", self.loaded, n),
        }
    }
}

pub struct ChartRuntime<S: DrawSurface, H: FrameHost> {
    controller: ChartController,
    renderer: ChartRenderer,
    surface: Option<S>,
    scheduler: FrameScheduler<H>,
    store: Box<dyn SettingsStore>,
    on_frame: Rc<dyn Fn()>,
}

impl<S: DrawSurface, H: FrameHost> ChartRuntime<S, H> {
    /// `on_frame` runs when a throttled frame fires; it is expected to call
    /// [`ChartRuntime::flush_frame`] on this runtime.
    pub fn new(store: Box<dyn SettingsStore>, host: H, on_frame: Rc<dyn Fn()>) -> Self {
        let settings = store.load().unwrap_or_default();
        log_info!(
            LogComponent::Presentation("ChartRuntime"),
            "starting with {} points, {} chart",
            settings.max_visible_points,
            settings.chart_type
        );
        Self {
            controller: ChartController::new(ChartState::new(settings)),
            renderer: ChartRenderer::new(),
            surface: None,
            scheduler: FrameScheduler::new(host),
            store,
            on_frame,
        }
    }

    pub fn controller(&self) -> &ChartController {
        &self.controller
    }

    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    pub fn scheduler(&self) -> &FrameScheduler<H> {
        &self.scheduler
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn attach_surface(&mut self, surface: S) {
        self.surface = Some(surface);
        self.surface_resized();
        self.draw();
    }

    pub fn detach_surface(&mut self) -> Option<S> {
        self.scheduler.cancel();
        self.surface.take()
    }

    /// Pick up the surface's current size and relayout.
    pub fn surface_resized(&mut self) -> Outcome {
        let Some((width, height)) = self.surface.as_ref().map(|s| s.size()) else {
            return Outcome::default();
        };
        self.dispatch(InputEvent::SurfaceResized { width, height })
    }

    pub fn dispatch(&mut self, event: InputEvent) -> Outcome {
        let outcome = self.controller.handle(event);
        self.settle(outcome)
    }

    pub fn apply(&mut self, intent: Intent) -> Outcome {
        let outcome = self.controller.apply(intent);
        self.settle(outcome)
    }

    pub fn update_settings(&mut self, edit: impl FnOnce(&mut Settings)) -> Outcome {
        let outcome = self.controller.update_settings(edit);
        self.settle(outcome)
    }

    pub fn load_csv(&mut self, text: &str) -> Result<LoadSummary, AppError> {
        let report = parse_csv(text)?;
        let summary = LoadSummary { loaded: report.records.len(), skipped: report.skipped() };
        self.load_records(report.records);
        Ok(summary)
    }

    /// Replace the dataset with a seeded random walk.
    pub fn regenerate(&mut self, count: usize, seed: u64) -> LoadSummary {
        let records = SampleGenerator::new(seed).with_clusters(4).generate(count);
        let summary = LoadSummary { loaded: records.len(), skipped: 0 };
        self.load_records(records);
        summary
    }

    pub fn load_records(&mut self, records: Vec<Record>) -> Outcome {
        let outcome = self.controller.load_records(records);
        self.settle(outcome)
    }

    pub fn clear(&mut self) -> Outcome {
        let outcome = self.controller.clear_records();
        self.settle(outcome)
    }

    pub fn settings(&self) -> Settings {
        self.controller.state().settings_snapshot()
    }

    pub fn settings_json(&self) -> Result<String, AppError> {
        Ok(encode_settings(&self.settings())?)
    }

    pub fn stats(&self) -> DatasetStats {
        self.controller.state().stats()
    }

    pub fn visible_stats(&self) -> DatasetStats {
        self.controller.state().visible_stats()
    }

    /// Paint now.
    pub fn draw(&mut self) -> bool {
        let frame = self.controller.state().frame();
        self.renderer.render(self.surface.as_mut(), &frame)
    }

    /// Entry point of a throttled frame.
    pub fn flush_frame(&mut self) -> bool {
        self.scheduler.frame_flushed();
        self.draw()
    }

    fn settle(&mut self, outcome: Outcome) -> Outcome {
        if outcome.persist {
            self.store.save(&self.controller.state().settings_snapshot());
        }
        match outcome.redraw {
            Redraw::Immediate => {
                self.scheduler.cancel();
                self.draw();
            }
            Redraw::Throttled => {
                let on_frame = self.on_frame.clone();
                self.scheduler.request(Box::new(move || on_frame()));
            }
            Redraw::None => {}
        }
        outcome
    }
}

pub type BrowserRuntime = ChartRuntime<CanvasSurface, BrowserFrameHost>;

impl BrowserRuntime {
    /// Re-read the canvas CSS size (window resize, fullscreen) and relayout.
    pub fn sync_canvas_size(&mut self) -> Outcome {
        if let Some(surface) = self.surface.as_mut() {
            surface.sync_size();
        }
        self.surface_resized()
    }
}

thread_local! {
    static GLOBAL_RUNTIME: RefCell<Option<Rc<RefCell<BrowserRuntime>>>> = const { RefCell::new(None) };
}

pub fn set_global_runtime(runtime: Rc<RefCell<BrowserRuntime>>) {
    GLOBAL_RUNTIME.with(|cell| {
        *cell.borrow_mut() = Some(runtime);
    });
}

/// Run `f` against the installed runtime. `None` when nothing is installed
/// or the runtime is already borrowed further up the stack.
pub fn with_global_runtime<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut BrowserRuntime) -> R,
{
    let runtime = GLOBAL_RUNTIME.with(|cell| cell.borrow().clone())?;
    let mut guard = runtime.try_borrow_mut().ok()?;
    Some(f(&mut guard))
}

/// Build the browser runtime for `canvas_id` and install it globally.
///
/// A missing canvas is logged; the runtime still works and draws once a
/// surface is attached.
pub fn install_browser_runtime(canvas_id: &str) {
    let on_frame: Rc<dyn Fn()> = Rc::new(|| {
        with_global_runtime(|runtime| runtime.flush_frame());
    });
    let mut runtime = BrowserRuntime::new(Box::new(LocalStorageSettings::default()), BrowserFrameHost, on_frame);
    match CanvasSurface::from_element_id(canvas_id) {
        Ok(surface) => runtime.attach_surface(surface),
        Err(e) => {
            log_warn!(LogComponent::Presentation("ChartRuntime"), "{}", e);
        }
    }
    set_global_runtime(Rc::new(RefCell::new(runtime)));
}

/// Attach the canvas to an already installed runtime.
pub fn attach_canvas(canvas_id: &str) -> Result<(), AppError> {
    let surface = CanvasSurface::from_element_id(canvas_id)?;
    with_global_runtime(|runtime| runtime.attach_surface(surface))
        .ok_or_else(|| AppError::Rendering("chart runtime not installed".to_string()))
}
