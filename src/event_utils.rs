use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent};

use crate::application::KeyInput;

#[derive(Clone, Debug)]
pub struct EventOptions {
    pub passive: bool,
}

impl Default for EventOptions {
    fn default() -> Self {
        Self { passive: true }
    }
}

impl EventOptions {
    /// Listener that may call `prevent_default`.
    pub fn active() -> Self {
        Self { passive: false }
    }

    fn to_gloo(&self) -> EventListenerOptions {
        if self.passive { EventListenerOptions::default() } else { EventListenerOptions::enable_prevent_default() }
    }
}

/// Window listener removed when the handle is dropped
pub struct WindowEventListenerHandle {
    _listener: Option<EventListener>,
}

impl WindowEventListenerHandle {
    pub fn is_attached(&self) -> bool {
        self._listener.is_some()
    }

    pub fn remove(self) {}
}

pub fn window_event_listener_with_options(
    event_name: &'static str,
    options: &EventOptions,
    mut cb: impl FnMut(&Event) + 'static,
) -> WindowEventListenerHandle {
    let listener = web_sys::window().map(|window| {
        EventListener::new_with_options(&window, event_name, options.to_gloo(), move |event| cb(event))
    });
    WindowEventListenerHandle { _listener: listener }
}

/// Focus sits in a form field, so chart shortcuts must stay quiet.
fn is_text_target(event: &Event) -> bool {
    let Some(element) = event.target().and_then(|t| t.dyn_into::<HtmlElement>().ok()) else {
        return false;
    };
    matches!(element.tag_name().to_ascii_uppercase().as_str(), "INPUT" | "TEXTAREA" | "SELECT")
        || element.is_content_editable()
}

pub fn key_input(event: &KeyboardEvent) -> KeyInput {
    KeyInput { key: event.key(), in_text_field: is_text_target(event) }
}

/// Pointer position relative to the element's top-left corner.
pub fn pointer_position(event: &MouseEvent, element: &Element) -> (f64, f64) {
    let rect = element.get_bounding_client_rect();
    (f64::from(event.client_x()) - rect.left(), f64::from(event.client_y()) - rect.top())
}

/// Positions of all active touches relative to `element`.
pub fn touch_points(event: &TouchEvent, element: &Element) -> Vec<(f64, f64)> {
    let rect = element.get_bounding_client_rect();
    let touches = event.touches();
    (0..touches.length())
        .filter_map(|i| touches.get(i))
        .map(|touch| (f64::from(touch.client_x()) - rect.left(), f64::from(touch.client_y()) - rect.top()))
        .collect()
}

pub fn wheel_has_modifier(event: &MouseEvent) -> bool {
    event.ctrl_key() || event.meta_key() || event.shift_key()
}

pub fn primary_button_pressed(event: &MouseEvent) -> bool {
    event.buttons() & 1 == 1
}
