use ohlc_cluster_chart::application::{
    ChartController, ChartState, InputEvent, InteractionState, KeyInput, Redraw, Settings,
};
use ohlc_cluster_chart::domain::chart::{ClusterFilter, ViewportRange};
use ohlc_cluster_chart::domain::market_data::SampleGenerator;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;

/// 100 records on an 800x400 surface: window [50, 99], 716 px plot width.
fn controller() -> ChartController {
    let mut controller = ChartController::new(ChartState::new(Settings::default()));
    controller.handle(InputEvent::SurfaceResized { width: WIDTH, height: HEIGHT });
    controller.load_records(SampleGenerator::new(7).generate(100));
    controller
}

fn step(controller: &ChartController) -> f64 {
    controller.state().mapper().unwrap().step()
}

fn key(controller: &mut ChartController, key: &str) -> bool {
    controller.handle(InputEvent::Key(KeyInput::new(key))).prevent_default
}

#[test]
fn drag_right_reveals_older_records() {
    let mut c = controller();
    assert_eq!(c.state().window(), Some(ViewportRange::new(50, 99)));
    let step = step(&c);

    c.handle(InputEvent::PointerDown { x: 400.0, y: 200.0 });
    assert_eq!(c.interaction(), InteractionState::Dragging { anchor_x: 400.0 });

    let x = 400.0 + step * 5.0;
    let outcome = c.handle(InputEvent::PointerMove { x, y: 200.0, pressed: true });
    assert_eq!(c.state().window(), Some(ViewportRange::new(45, 94)));
    assert_eq!(outcome.redraw, Redraw::Immediate);
    assert!(outcome.persist);
    assert_eq!(c.interaction(), InteractionState::Dragging { anchor_x: x });

    c.handle(InputEvent::PointerUp { x, y: 200.0 });
    assert_eq!(c.interaction(), InteractionState::Idle);
}

#[test]
fn tiny_drag_keeps_anchor() {
    let mut c = controller();
    let step = step(&c);
    c.handle(InputEvent::PointerDown { x: 400.0, y: 200.0 });
    let outcome = c.handle(InputEvent::PointerMove { x: 400.0 + step * 0.3, y: 200.0, pressed: true });
    assert!(!outcome.persist);
    assert_eq!(c.state().window(), Some(ViewportRange::new(50, 99)));
    assert_eq!(c.interaction(), InteractionState::Dragging { anchor_x: 400.0 });
}

#[test]
fn sensitivity_scales_drag() {
    let mut c = controller();
    c.update_settings(|s| s.panning_sensitivity = 2.0);
    let step = step(&c);
    c.handle(InputEvent::PointerDown { x: 300.0, y: 200.0 });
    c.handle(InputEvent::PointerMove { x: 300.0 - step * 3.0, y: 200.0, pressed: true });
    // dragging left moves toward newer records, but the window is already at the end
    assert_eq!(c.state().window(), Some(ViewportRange::new(50, 99)));
    c.handle(InputEvent::PointerMove { x: 300.0 + step * 3.0, y: 200.0, pressed: true });
    assert_eq!(c.state().window(), Some(ViewportRange::new(44, 93)));
}

#[test]
fn press_outside_plot_does_not_drag() {
    let mut c = controller();
    c.handle(InputEvent::PointerDown { x: 5.0, y: 5.0 });
    assert_eq!(c.interaction(), InteractionState::Idle);
}

#[test]
fn hover_redraw_urgency() {
    let mut c = controller();

    let first = c.handle(InputEvent::PointerMove { x: 100.0, y: 100.0, pressed: false });
    assert_eq!(first.redraw, Redraw::Immediate);
    assert_eq!(c.state().hover().index, Some(56));
    assert_eq!(c.interaction(), InteractionState::HoverOnly);

    let jitter = c.handle(InputEvent::PointerMove { x: 100.5, y: 100.2, pressed: false });
    assert_eq!(jitter.redraw, Redraw::None);
    assert_eq!(c.state().hover().pointer, Some((100.0, 100.0)));

    let small = c.handle(InputEvent::PointerMove { x: 103.0, y: 100.0, pressed: false });
    assert_eq!(small.redraw, Redraw::Throttled);
    assert_eq!(c.state().hover().index, Some(56));

    let next_column = c.handle(InputEvent::PointerMove { x: 100.0 + step(&c), y: 100.0, pressed: false });
    assert_eq!(next_column.redraw, Redraw::Immediate);
    assert_eq!(c.state().hover().index, Some(57));

    let leave = c.handle(InputEvent::PointerLeave);
    assert_eq!(leave.redraw, Redraw::Immediate);
    assert!(!c.state().hover().is_active());
    assert_eq!(c.interaction(), InteractionState::Idle);
}

#[test]
fn hover_follows_window_after_pan() {
    let mut c = controller();
    c.handle(InputEvent::PointerMove { x: 100.0, y: 100.0, pressed: false });
    assert_eq!(c.state().hover().index, Some(56));
    key(&mut c, "ArrowLeft");
    assert_eq!(c.state().hover().index, Some(46));
}

#[test]
fn wheel_needs_modifier() {
    let mut c = controller();
    let plain = c.handle(InputEvent::Wheel { delta_y: 120.0, modifier: false });
    assert!(!plain.prevent_default);
    assert_eq!(c.state().max_visible_points(), 50);

    let zoom_out = c.handle(InputEvent::Wheel { delta_y: 120.0, modifier: true });
    assert!(zoom_out.prevent_default);
    assert_eq!(c.state().max_visible_points(), 60);
    assert_eq!(c.state().window(), Some(ViewportRange::new(40, 99)));

    c.handle(InputEvent::Wheel { delta_y: -3.0, modifier: true });
    c.handle(InputEvent::Wheel { delta_y: -3.0, modifier: true });
    assert_eq!(c.state().max_visible_points(), 40);
}

#[test]
fn window_size_is_clamped() {
    let mut c = controller();
    for _ in 0..30 {
        key(&mut c, "PageUp");
    }
    assert_eq!(c.state().max_visible_points(), 200);
    assert_eq!(c.state().window(), Some(ViewportRange::new(0, 99)));
    for _ in 0..30 {
        key(&mut c, "PageDown");
    }
    assert_eq!(c.state().max_visible_points(), 10);
}

#[test]
fn navigation_keys() {
    let mut c = controller();
    assert!(key(&mut c, "ArrowLeft"));
    assert_eq!(c.state().window(), Some(ViewportRange::new(40, 89)));
    key(&mut c, "End");
    assert_eq!(c.state().window(), Some(ViewportRange::new(0, 49)));
    key(&mut c, "Home");
    assert_eq!(c.state().window(), Some(ViewportRange::new(50, 99)));
    key(&mut c, "1");
    assert_eq!(c.state().window(), Some(ViewportRange::new(80, 99)));
    key(&mut c, "4");
    assert_eq!(c.state().max_visible_points(), 200);
}

#[test]
fn sensitivity_keys_clamp_and_round() {
    let mut c = controller();
    key(&mut c, "+");
    key(&mut c, "+");
    assert_eq!(c.state().settings().panning_sensitivity, 1.2);
    for _ in 0..60 {
        key(&mut c, "+");
    }
    assert_eq!(c.state().settings().panning_sensitivity, 5.0);
    for _ in 0..80 {
        key(&mut c, "-");
    }
    assert_eq!(c.state().settings().panning_sensitivity, 0.1);
}

#[test]
fn toggles_flip_settings() {
    let mut c = controller();
    key(&mut c, "c");
    assert!(!c.state().settings().crosshair_enabled);
    key(&mut c, "s");
    assert!(!c.state().settings().crosshair_snap_to_candles);
    key(&mut c, "C");
    assert!(c.state().settings().crosshair_enabled);
}

#[test]
fn keys_in_text_fields_are_ignored() {
    let mut c = controller();
    let outcome = c.handle(InputEvent::Key(KeyInput { key: "ArrowLeft".to_string(), in_text_field: true }));
    assert!(!outcome.prevent_default);
    assert_eq!(c.state().window(), Some(ViewportRange::new(50, 99)));
}

#[test]
fn escape_only_acts_in_fullscreen() {
    let mut c = controller();
    assert!(!key(&mut c, "Escape"));

    c.update_settings(|s| s.is_fullscreen = true);
    let outcome = c.handle(InputEvent::Key(KeyInput::new("Escape")));
    assert!(outcome.prevent_default);
    assert!(outcome.persist);
    assert!(!c.state().settings().is_fullscreen);
}

#[test]
fn multi_touch_is_ignored() {
    let mut c = controller();
    let two = vec![(100.0, 100.0), (200.0, 100.0)];
    c.handle(InputEvent::TouchStart { touches: two.clone() });
    assert_eq!(c.interaction(), InteractionState::Idle);
    let outcome = c.handle(InputEvent::TouchMove { touches: two });
    assert_eq!(outcome.redraw, Redraw::None);
}

#[test]
fn single_touch_drags_and_blocks_scrolling() {
    let mut c = controller();
    let step = step(&c);
    c.handle(InputEvent::TouchStart { touches: vec![(300.0, 150.0)] });
    let outcome = c.handle(InputEvent::TouchMove { touches: vec![(300.0 + step * 10.0, 150.0)] });
    assert!(outcome.prevent_default);
    assert_eq!(c.state().window(), Some(ViewportRange::new(40, 89)));
    c.handle(InputEvent::TouchEnd);
    assert_eq!(c.interaction(), InteractionState::Idle);
}

#[test]
fn input_without_data_is_harmless() {
    let mut c = ChartController::new(ChartState::default());
    c.handle(InputEvent::SurfaceResized { width: WIDTH, height: HEIGHT });
    c.handle(InputEvent::PointerDown { x: 300.0, y: 200.0 });
    let outcome = c.handle(InputEvent::PointerMove { x: 500.0, y: 200.0, pressed: true });
    assert!(!outcome.persist);
    assert_eq!(c.state().window(), None);
    key(&mut c, "ArrowLeft");
    key(&mut c, "Home");
    assert_eq!(c.state().window(), None);
}

#[test]
fn reloading_resets_window_and_hover() {
    let mut c = controller();
    key(&mut c, "End");
    c.handle(InputEvent::PointerMove { x: 100.0, y: 100.0, pressed: false });
    c.load_records(SampleGenerator::new(9).generate(80));
    assert_eq!(c.state().window(), Some(ViewportRange::new(30, 79)));
    assert!(!c.state().hover().is_active());
}

#[test]
fn toggles_keep_a_narrow_restored_window() {
    let settings = Settings { visible_start_index: Some(0), visible_end_index: Some(29), ..Settings::default() };
    let mut c = ChartController::new(ChartState::new(settings));
    c.handle(InputEvent::SurfaceResized { width: WIDTH, height: HEIGHT });
    c.load_records(SampleGenerator::new(7).generate(100));
    assert_eq!(c.state().window(), Some(ViewportRange::new(0, 29)));

    key(&mut c, "ArrowRight");
    assert_eq!(c.state().window(), Some(ViewportRange::new(10, 39)));

    key(&mut c, "c");
    key(&mut c, "s");
    c.update_settings(|s| s.cluster_filter = ClusterFilter::Only(1));
    assert_eq!(c.state().window(), Some(ViewportRange::new(10, 39)));
    assert_eq!(c.state().max_visible_points(), 50);

    key(&mut c, "PageUp");
    assert_eq!(c.state().window(), Some(ViewportRange::new(0, 39)));
}

#[test]
fn missed_release_hovers_at_the_pointer() {
    let mut c = controller();
    c.handle(InputEvent::PointerDown { x: 400.0, y: 200.0 });
    let outcome = c.handle(InputEvent::PointerMove { x: 100.0, y: 100.0, pressed: false });
    assert_eq!(outcome.redraw, Redraw::Immediate);
    assert!(!outcome.persist);
    assert_eq!(c.state().window(), Some(ViewportRange::new(50, 99)));
    assert_eq!(c.interaction(), InteractionState::HoverOnly);
    assert_eq!(c.state().hover().index, Some(56));
    assert_eq!(c.state().hover().pointer, Some((100.0, 100.0)));
}
