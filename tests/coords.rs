use ohlc_cluster_chart::domain::chart::ChartArea;
use ohlc_cluster_chart::domain::chart::coords::{
    CoordinateMapper, ValueDomain, index_to_x, nearest_index_snap, pixel_to_index, value_to_x, value_to_y, y_to_value,
};
use quickcheck_macros::quickcheck;

fn area() -> ChartArea {
    ChartArea::new(0.0, 0.0, 100.0, 200.0)
}

#[test]
fn points_sit_in_the_middle_of_their_column() {
    let area = area();
    assert_eq!(index_to_x(10, 10, 4, &area), 12.5);
    assert_eq!(index_to_x(13, 10, 4, &area), 87.5);
    assert_eq!(index_to_x(3, 0, 0, &area), area.x);
}

#[test]
fn pixel_lookup_stays_inside_window() {
    let area = area();
    assert_eq!(pixel_to_index(0.0, 10, 4, &area), Some(10));
    assert_eq!(pixel_to_index(99.9, 10, 4, &area), Some(13));
    assert_eq!(pixel_to_index(100.0, 10, 4, &area), None);
    assert_eq!(pixel_to_index(-1.0, 10, 4, &area), None);
    assert_eq!(pixel_to_index(50.0, 10, 0, &area), None);
}

#[test]
fn snap_prefers_lower_index_on_ties() {
    let area = area();
    // 25.0 is exactly between the centers of the first two columns
    assert_eq!(nearest_index_snap(25.0, 10, 4, &area), Some((12.5, 10)));
    assert_eq!(nearest_index_snap(26.0, 10, 4, &area), Some((37.5, 11)));
    assert_eq!(nearest_index_snap(500.0, 10, 4, &area), Some((87.5, 13)));
    assert_eq!(nearest_index_snap(50.0, 10, 0, &area), None);
}

#[quickcheck]
fn snap_stays_inside_window(px: i16, start: u16, len: u8) -> bool {
    let area = area();
    let start = start as usize;
    let len = len as usize % 250 + 1;
    match nearest_index_snap(f64::from(px), start, len, &area) {
        Some((x, index)) => {
            (start..start + len).contains(&index) && x == index_to_x(index, start, len, &area)
        }
        None => false,
    }
}

#[quickcheck]
fn pixel_lookup_never_leaves_window(px: i16, start: u16, len: u8) -> bool {
    let area = area();
    let start = start as usize;
    let len = len as usize % 250 + 1;
    pixel_to_index(f64::from(px), start, len, &area).is_none_or(|index| (start..start + len).contains(&index))
}

#[test]
fn degenerate_ranges_stay_finite() {
    let area = area();
    let y = value_to_y(42.0, 42.0, 42.0, &area, area.height);
    assert!(y.is_finite());
    assert_eq!(y, area.bottom());
    assert_eq!(y_to_value(10.0, 5.0, 5.0, &area, area.height), 5.0);
    assert_eq!(value_to_x(7.0, 7.0, 7.0, &area), area.x);
    assert_eq!(value_to_y(f64::NAN, 0.0, 1.0, &area, area.height), area.bottom());
}

#[test]
fn value_axis_grows_upward() {
    let area = area();
    assert_eq!(value_to_y(0.0, 0.0, 10.0, &area, 200.0), 200.0);
    assert_eq!(value_to_y(10.0, 0.0, 10.0, &area, 200.0), 0.0);
    assert_eq!(value_to_y(5.0, 0.0, 10.0, &area, 100.0), 50.0);
}

#[quickcheck]
fn y_mapping_round_trips(value: i32, min: i16, span: u16) -> bool {
    let area = area();
    let min = f64::from(min);
    let max = min + f64::from(span) + 1.0;
    let value = f64::from(value % 10_000);
    let y = value_to_y(value, min, max, &area, area.height);
    let back = y_to_value(y, min, max, &area, area.height);
    (back - value).abs() < 1e-6 * value.abs().max(1.0)
}

#[test]
fn domain_padding_and_ticks() {
    let domain = ValueDomain::from_values([10.0, 20.0, f64::NAN], 0.1).unwrap();
    assert_eq!(domain, ValueDomain::new(9.0, 21.0));
    assert_eq!(domain.ticks(3), vec![9.0, 15.0, 21.0]);

    let flat = ValueDomain::from_values([3.0, 3.0], 0.1).unwrap();
    assert!(flat.is_degenerate());
    assert_eq!(flat.ticks(5), vec![3.0]);
    assert!(ValueDomain::from_values([f64::INFINITY], 0.1).is_none());
}

#[test]
fn mapper_bundles_window_and_area() {
    let mapper = CoordinateMapper::new(ChartArea::new(10.0, 0.0, 200.0, 100.0), 40, 10);
    assert_eq!(mapper.step(), 20.0);
    assert_eq!(mapper.index_to_x(40), 20.0);
    assert_eq!(mapper.pixel_to_index(205.0), Some(49));
    assert_eq!(mapper.nearest_index_snap(31.0), Some((40.0, 41)));
}
