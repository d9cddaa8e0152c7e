//! Pointer, wheel, touch and keyboard handling as an explicit state machine.
//!
//! Raw input is first translated into an [`Intent`]; applying the intent is
//! the only place chart state changes. Every application yields an
//! [`Outcome`] telling the host whether to redraw now, on the next frame, or
//! not at all, and whether the settings blob needs rewriting.

use crate::application::render_config::HoverState;
use crate::application::settings::{Settings, MAX_SENSITIVITY, MAX_VISIBLE_POINTS, MIN_SENSITIVITY, MIN_VISIBLE_POINTS, round_tenth};
use crate::application::state::ChartState;
use crate::domain::logging::LogComponent;
use crate::domain::market_data::Record;
use crate::{log_debug, log_trace};

/// Thresholds and step sizes for input handling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionTuning {
    /// Pointer movement below this many pixels does not trigger a hover redraw.
    pub hover_threshold_px: f64,
    pub wheel_step: usize,
    pub min_window: usize,
    pub max_window: usize,
    pub key_pan_points: i64,
    pub page_step: usize,
    pub sensitivity_step: f64,
    pub min_sensitivity: f64,
    pub max_sensitivity: f64,
    /// Window sizes bound to the digit keys 1 to 4.
    pub presets: [usize; 4],
}

impl Default for InteractionTuning {
    fn default() -> Self {
        Self {
            hover_threshold_px: 1.0,
            wheel_step: 10,
            min_window: MIN_VISIBLE_POINTS,
            max_window: MAX_VISIBLE_POINTS,
            key_pan_points: 10,
            page_step: 10,
            sensitivity_step: 0.1,
            min_sensitivity: MIN_SENSITIVITY,
            max_sensitivity: MAX_SENSITIVITY,
            presets: [20, 50, 100, 200],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    /// Button held; `anchor_x` is where the last applied pan left off.
    Dragging { anchor_x: f64 },
    HoverOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    /// Focus is in an input or textarea; shortcuts must not fire.
    pub in_text_field: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), in_text_field: false }
    }
}

/// Input as delivered by the host, in surface-local logical pixels
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64, pressed: bool },
    PointerUp { x: f64, y: f64 },
    PointerLeave,
    /// `modifier` is ctrl, meta or shift held during the wheel event.
    Wheel { delta_y: f64, modifier: bool },
    TouchStart { touches: Vec<(f64, f64)> },
    TouchMove { touches: Vec<(f64, f64)> },
    TouchEnd,
    Key(KeyInput),
    SurfaceResized { width: f64, height: f64 },
}

/// A requested state change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    BeginDrag { x: f64, y: f64 },
    DragTo { x: f64, y: f64 },
    EndDrag,
    /// End a drag whose release was missed, then hover where the pointer is.
    ReleaseAt { x: f64, y: f64 },
    Hover { x: f64, y: f64 },
    ClearHover,
    Pan { delta_px: f64 },
    PanPoints(i64),
    SetWindow(usize),
    AdjustWindow(i64),
    JumpToLatest,
    JumpToEarliest,
    AdjustSensitivity(f64),
    ToggleCrosshair,
    ToggleSnap,
    SetFullscreen(bool),
    ResizeSurface { width: f64, height: f64 },
}

/// How soon the chart must be repainted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Redraw {
    #[default]
    None,
    /// Coalesced into the next display frame.
    Throttled,
    Immediate,
}

impl Redraw {
    pub fn merge(self, other: Redraw) -> Redraw {
        self.max(other)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub redraw: Redraw,
    /// The host should stop the browser's default action for the event.
    pub prevent_default: bool,
    /// Persisted settings are stale.
    pub persist: bool,
}

impl Outcome {
    fn redraw(redraw: Redraw) -> Self {
        Self { redraw, ..Self::default() }
    }

    /// Immediate redraw plus a settings write, or nothing.
    fn changed(changed: bool) -> Self {
        if changed {
            Self { redraw: Redraw::Immediate, prevent_default: false, persist: true }
        } else {
            Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartController {
    state: ChartState,
    interaction: InteractionState,
    tuning: InteractionTuning,
}

impl Default for ChartController {
    fn default() -> Self {
        Self::new(ChartState::default())
    }
}

impl ChartController {
    pub fn new(state: ChartState) -> Self {
        Self::with_tuning(state, InteractionTuning::default())
    }

    pub fn with_tuning(state: ChartState, tuning: InteractionTuning) -> Self {
        Self { state, interaction: InteractionState::Idle, tuning }
    }

    pub fn state(&self) -> &ChartState {
        &self.state
    }

    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    pub fn tuning(&self) -> &InteractionTuning {
        &self.tuning
    }

    /// Translate and apply one input event.
    pub fn handle(&mut self, event: InputEvent) -> Outcome {
        let Some((intent, prevent_default)) = self.translate(&event) else {
            return Outcome::default();
        };
        let mut outcome = self.apply(intent);
        outcome.prevent_default |= prevent_default;
        outcome
    }

    /// Map an event to an intent given the current interaction state.
    /// The flag asks the host to suppress the browser default.
    pub fn translate(&self, event: &InputEvent) -> Option<(Intent, bool)> {
        let dragging = matches!(self.interaction, InteractionState::Dragging { .. });
        match *event {
            InputEvent::PointerDown { x, y } => Some((Intent::BeginDrag { x, y }, false)),
            InputEvent::PointerMove { x, y, pressed } => match (dragging, pressed) {
                (true, true) => Some((Intent::DragTo { x, y }, false)),
                // The release happened outside the surface.
                (true, false) => Some((Intent::ReleaseAt { x, y }, false)),
                (false, _) => Some((Intent::Hover { x, y }, false)),
            },
            InputEvent::PointerUp { .. } if dragging => Some((Intent::EndDrag, false)),
            InputEvent::PointerUp { .. } => None,
            InputEvent::PointerLeave => Some((Intent::ClearHover, false)),
            InputEvent::Wheel { delta_y, modifier } => {
                if !modifier || delta_y == 0.0 || !delta_y.is_finite() {
                    return None;
                }
                let step = self.tuning.wheel_step as i64;
                let delta = if delta_y > 0.0 { step } else { -step };
                Some((Intent::AdjustWindow(delta), true))
            }
            InputEvent::TouchStart { ref touches } => match touches.as_slice() {
                [(x, y)] => Some((Intent::BeginDrag { x: *x, y: *y }, false)),
                _ => None,
            },
            InputEvent::TouchMove { ref touches } => match touches.as_slice() {
                [(x, y)] if dragging => Some((Intent::DragTo { x: *x, y: *y }, true)),
                [(x, y)] => Some((Intent::Hover { x: *x, y: *y }, false)),
                _ => None,
            },
            InputEvent::TouchEnd if dragging => Some((Intent::EndDrag, false)),
            InputEvent::TouchEnd => None,
            InputEvent::Key(ref key) => self.key_intent(key).map(|intent| (intent, true)),
            InputEvent::SurfaceResized { width, height } => Some((Intent::ResizeSurface { width, height }, false)),
        }
    }

    fn key_intent(&self, key: &KeyInput) -> Option<Intent> {
        if key.in_text_field {
            return None;
        }
        let tuning = &self.tuning;
        let intent = match key.key.as_str() {
            "1" => Intent::SetWindow(tuning.presets[0]),
            "2" => Intent::SetWindow(tuning.presets[1]),
            "3" => Intent::SetWindow(tuning.presets[2]),
            "4" => Intent::SetWindow(tuning.presets[3]),
            "ArrowLeft" => Intent::PanPoints(-tuning.key_pan_points),
            "ArrowRight" => Intent::PanPoints(tuning.key_pan_points),
            "Home" => Intent::JumpToLatest,
            "End" => Intent::JumpToEarliest,
            "+" | "=" => Intent::AdjustSensitivity(tuning.sensitivity_step),
            "-" | "_" => Intent::AdjustSensitivity(-tuning.sensitivity_step),
            "PageUp" => Intent::AdjustWindow(tuning.page_step as i64),
            "PageDown" => Intent::AdjustWindow(-(tuning.page_step as i64)),
            "c" | "C" => Intent::ToggleCrosshair,
            "s" | "S" => Intent::ToggleSnap,
            "Escape" if self.state.settings().is_fullscreen => Intent::SetFullscreen(false),
            _ => return None,
        };
        Some(intent)
    }

    pub fn apply(&mut self, intent: Intent) -> Outcome {
        log_trace!(LogComponent::Application("ChartController"), "{:?} in {:?}", intent, self.interaction);
        match intent {
            Intent::BeginDrag { x, y } => {
                if !self.state.area().contains(x, y) {
                    return Outcome::default();
                }
                self.interaction = InteractionState::Dragging { anchor_x: x };
                Outcome::default()
            }
            Intent::DragTo { x, y } => self.drag_to(x, y),
            Intent::EndDrag => {
                self.interaction = InteractionState::Idle;
                Outcome::default()
            }
            Intent::ReleaseAt { x, y } => {
                self.interaction = InteractionState::Idle;
                Outcome::redraw(self.hover_at(x, y))
            }
            Intent::Hover { x, y } => Outcome::redraw(self.hover_at(x, y)),
            Intent::ClearHover => {
                self.interaction = InteractionState::Idle;
                let was_active = self.state.hover().is_active();
                self.state.set_hover(HoverState::default());
                Outcome::redraw(if was_active { Redraw::Immediate } else { Redraw::None })
            }
            Intent::Pan { delta_px } => {
                let step = self.state.mapper().map_or(0.0, |m| m.step());
                let (viewport, len) = self.state.viewport_mut();
                let moved = viewport.pan_pixels(delta_px, step, len);
                self.after_window_change(moved)
            }
            Intent::PanPoints(points) => {
                let (viewport, len) = self.state.viewport_mut();
                let moved = viewport.pan_points(points, len);
                self.after_window_change(moved)
            }
            Intent::SetWindow(points) => {
                let points = points.clamp(self.tuning.min_window, self.tuning.max_window);
                let changed = self.state.update_settings(|s| s.max_visible_points = points);
                self.after_window_change(changed)
            }
            Intent::AdjustWindow(delta) => {
                let current = self.state.max_visible_points() as i64;
                let next = (current + delta).clamp(self.tuning.min_window as i64, self.tuning.max_window as i64);
                self.apply(Intent::SetWindow(next as usize))
            }
            Intent::JumpToLatest => {
                let (viewport, len) = self.state.viewport_mut();
                let moved = viewport.jump_to_latest(len);
                self.after_window_change(moved)
            }
            Intent::JumpToEarliest => {
                let (viewport, len) = self.state.viewport_mut();
                let moved = viewport.jump_to_earliest(len);
                self.after_window_change(moved)
            }
            Intent::AdjustSensitivity(delta) => {
                let (min, max) = (self.tuning.min_sensitivity, self.tuning.max_sensitivity);
                let changed = self.state.update_settings(|s| {
                    s.panning_sensitivity = round_tenth((s.panning_sensitivity + delta).clamp(min, max));
                });
                Outcome { redraw: Redraw::None, prevent_default: false, persist: changed }
            }
            Intent::ToggleCrosshair => {
                let changed = self.state.update_settings(|s| s.crosshair_enabled = !s.crosshair_enabled);
                Outcome::changed(changed)
            }
            Intent::ToggleSnap => {
                let changed = self.state.update_settings(|s| s.crosshair_snap_to_candles = !s.crosshair_snap_to_candles);
                self.refresh_hover();
                Outcome::changed(changed)
            }
            Intent::SetFullscreen(on) => {
                let changed = self.state.update_settings(|s| s.is_fullscreen = on);
                Outcome::changed(changed)
            }
            Intent::ResizeSurface { width, height } => {
                let changed = self.state.resize_surface(width, height);
                if changed {
                    self.refresh_hover();
                }
                Outcome::redraw(if changed { Redraw::Immediate } else { Redraw::None })
            }
        }
    }

    /// Replace the dataset and reset hover and drag state.
    pub fn load_records(&mut self, records: Vec<Record>) -> Outcome {
        self.state.replace_dataset(records);
        self.interaction = InteractionState::Idle;
        Outcome::changed(true)
    }

    pub fn clear_records(&mut self) -> Outcome {
        self.load_records(Vec::new())
    }

    /// Settings edits coming from UI controls.
    pub fn update_settings(&mut self, edit: impl FnOnce(&mut Settings)) -> Outcome {
        let changed = self.state.update_settings(edit);
        if changed {
            self.refresh_hover();
        }
        Outcome::changed(changed)
    }

    fn drag_to(&mut self, x: f64, y: f64) -> Outcome {
        let InteractionState::Dragging { anchor_x } = self.interaction else {
            return Outcome::default();
        };
        let sensitivity = self.state.settings().panning_sensitivity;
        let step = self.state.mapper().map_or(0.0, |m| m.step());
        // Dragging right reveals older records.
        let delta = -(x - anchor_x) * sensitivity;
        let (viewport, len) = self.state.viewport_mut();
        let moved = viewport.pan_pixels(delta, step, len);
        if moved {
            self.interaction = InteractionState::Dragging { anchor_x: x };
            log_debug!(
                LogComponent::Application("ChartController"),
                "drag pan to {:?}",
                self.state.window()
            );
        }
        let hover = self.hover_at(x, y);
        let redraw = if moved { Redraw::Immediate } else { hover };
        Outcome { redraw, prevent_default: false, persist: moved }
    }

    fn after_window_change(&mut self, changed: bool) -> Outcome {
        if changed {
            self.refresh_hover();
        }
        Outcome::changed(changed)
    }

    fn resolve_hover(&self, x: f64, y: f64) -> HoverState {
        if !self.state.area().contains(x, y) {
            return HoverState::default();
        }
        let pointer = Some((x, y));
        let Some(mapper) = self.state.mapper() else {
            return HoverState { index: None, crosshair: pointer, pointer };
        };
        let hit = if self.state.settings().crosshair_snap_to_candles {
            mapper.nearest_index_snap(x)
        } else {
            mapper.pixel_to_index(x).map(|index| (x, index))
        };
        match hit {
            Some((cx, index)) => HoverState { index: Some(index), crosshair: Some((cx, y)), pointer },
            None => HoverState { index: None, crosshair: pointer, pointer },
        }
    }

    /// Update hover for a pointer position and pick the redraw urgency:
    /// a new index repaints now, plain movement waits for the next frame and
    /// sub-pixel jitter is ignored altogether.
    fn hover_at(&mut self, x: f64, y: f64) -> Redraw {
        let previous = self.state.hover();
        let next = self.resolve_hover(x, y);

        if !matches!(self.interaction, InteractionState::Dragging { .. }) {
            self.interaction =
                if next.pointer.is_some() { InteractionState::HoverOnly } else { InteractionState::Idle };
        }

        let redraw = if next.index != previous.index || next.crosshair.is_some() != previous.crosshair.is_some() {
            Redraw::Immediate
        } else if next.crosshair.is_none() {
            Redraw::None
        } else {
            match previous.pointer {
                Some((px, py))
                    if (x - px).abs() < self.tuning.hover_threshold_px
                        && (y - py).abs() < self.tuning.hover_threshold_px =>
                {
                    Redraw::None
                }
                _ => Redraw::Throttled,
            }
        };

        if redraw != Redraw::None {
            self.state.set_hover(next);
        }
        redraw
    }

    /// Re-resolve hover after the window or layout moved under the pointer.
    fn refresh_hover(&mut self) {
        if let Some((x, y)) = self.state.hover().pointer {
            let hover = self.resolve_hover(x, y);
            self.state.set_hover(hover);
        }
    }
}
