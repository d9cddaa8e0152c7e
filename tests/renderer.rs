use chrono::{Duration, TimeZone, Utc};
use ohlc_cluster_chart::application::{ChartController, ChartState, InputEvent, Settings};
use ohlc_cluster_chart::domain::chart::{ChartKind, ClusterFilter};
use ohlc_cluster_chart::domain::market_data::{Record, SampleGenerator};
use ohlc_cluster_chart::infrastructure::rendering::{ChartRenderer, DrawOp, RecordingSurface};
use strum::IntoEnumIterator;

fn controller(settings: Settings, records: Vec<Record>) -> ChartController {
    let mut controller = ChartController::new(ChartState::new(settings));
    controller.handle(InputEvent::SurfaceResized { width: 800.0, height: 400.0 });
    controller.load_records(records);
    controller
}

fn draw(controller: &ChartController) -> RecordingSurface {
    let mut surface = RecordingSurface::new(800.0, 400.0);
    let mut renderer = ChartRenderer::new();
    assert!(renderer.render(Some(&mut surface), &controller.state().frame()));
    surface
}

fn sample() -> Vec<Record> {
    SampleGenerator::new(5).generate(120)
}

#[test]
fn every_chart_kind_draws_finite_geometry() {
    for kind in ChartKind::iter() {
        let mut c = controller(Settings { chart_type: kind, ..Settings::default() }, sample());
        c.handle(InputEvent::PointerMove { x: 300.0, y: 150.0, pressed: false });
        let surface = draw(&c);
        assert!(surface.coordinates().iter().all(|v| v.is_finite()), "{} produced NaN", kind);
        assert!(surface.ops().len() > 10, "{} drew almost nothing", kind);
    }
}

#[test]
fn missing_surface_skips_the_frame() {
    let c = controller(Settings::default(), sample());
    let mut renderer = ChartRenderer::new();
    assert!(!renderer.render::<RecordingSurface>(None, &c.state().frame()));
    assert_eq!(renderer.frames_drawn(), 0);
}

#[test]
fn empty_dataset_shows_placeholder() {
    let c = controller(Settings::default(), Vec::new());
    let surface = draw(&c);
    assert_eq!(surface.texts(), vec!["No data"]);
}

#[test]
fn filters_that_hide_everything_say_so() {
    let settings = Settings { cluster_filter: ClusterFilter::Only(99), ..Settings::default() };
    let surface = draw(&controller(settings, sample()));
    assert!(surface.texts().contains(&"No records match the filters"));
}

#[test]
fn candle_bodies_by_direction() {
    let start = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
    let records = vec![
        Record::new(start, 10.0, 21.0, 9.0, 20.0, 5.0),
        Record::new(start + Duration::minutes(1), 20.0, 21.0, 9.0, 10.0, 5.0),
        Record::new(start + Duration::minutes(2), 15.0, 16.0, 14.0, 15.0, 5.0),
    ];
    let settings = Settings { show_volume: false, ..Settings::default() };
    let surface = draw(&controller(settings, records.clone()));

    assert_eq!(surface.count(|op| matches!(op, DrawOp::StrokeRect { .. })), 1);
    assert_eq!(surface.count(|op| matches!(op, DrawOp::FillRect { .. })), 1);
    // the doji body collapses into a thick line
    assert_eq!(surface.count(|op| matches!(op, DrawOp::Line { style, .. } if style.width == 2.0)), 1);

    let with_volume = draw(&controller(Settings::default(), records));
    assert_eq!(with_volume.count(|op| matches!(op, DrawOp::FillRect { .. })), 4);
}

#[test]
fn hover_shows_crosshair_and_tooltip() {
    let mut c = controller(Settings::default(), sample());
    c.handle(InputEvent::PointerMove { x: 100.0, y: 100.0, pressed: false });
    let index = c.state().hover().index.unwrap();
    let record = c.state().dataset().get(index).unwrap().clone();

    let surface = draw(&c);
    let cluster_line = format!("Cluster: {}", record.cluster);
    assert!(surface.texts().iter().any(|t| *t == cluster_line));
    assert!(surface.texts().iter().any(|t| t.ends_with(&record.timestamp)));
    assert_eq!(surface.count(|op| matches!(op, DrawOp::Line { style, .. } if style.dashed)), 2);
}

#[test]
fn crosshair_can_be_turned_off() {
    let settings = Settings { crosshair_enabled: false, ..Settings::default() };
    let mut c = controller(settings, sample());
    c.handle(InputEvent::PointerMove { x: 100.0, y: 100.0, pressed: false });
    let surface = draw(&c);
    assert_eq!(surface.count(|op| matches!(op, DrawOp::Line { style, .. } if style.dashed)), 0);
}

#[test]
fn histogram_has_no_tooltip() {
    let settings = Settings { chart_type: ChartKind::Histogram, ..Settings::default() };
    let mut c = controller(settings, sample());
    c.handle(InputEvent::PointerMove { x: 100.0, y: 100.0, pressed: false });
    let surface = draw(&c);
    assert!(!surface.texts().iter().any(|t| t.starts_with("Open:")));
}

#[test]
fn tooltip_is_hidden_for_filtered_record() {
    let records = sample();
    let mut c = controller(Settings::default(), records);
    c.handle(InputEvent::PointerMove { x: 100.0, y: 100.0, pressed: false });
    let index = c.state().hover().index.unwrap();
    let hovered_cluster = c.state().dataset().get(index).unwrap().cluster;
    c.update_settings(|s| s.cluster_filter = ClusterFilter::Only(hovered_cluster + 1));

    let surface = draw(&c);
    assert!(!surface.texts().iter().any(|t| t.starts_with("Open:")));
}
