use chrono::{Duration, TimeZone, Utc};
use ohlc_cluster_chart::domain::chart::Histogram;
use ohlc_cluster_chart::domain::chart::histogram::{MAX_BINS, bin_count};
use ohlc_cluster_chart::domain::market_data::{Record, SeriesField};
use quickcheck_macros::quickcheck;

fn records(closes: &[f64]) -> Vec<Record> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i % 3 == 0 { close } else { close - 1.0 };
            Record::new(start + Duration::minutes(i as i64), open, close + 1.0, open - 1.0, close, 10.0)
                .with_cluster(i as i32 % 4)
        })
        .collect()
}

#[quickcheck]
fn every_record_lands_in_one_bin(values: Vec<i32>) -> bool {
    let closes: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();
    let records = records(&closes);
    let refs: Vec<&Record> = records.iter().collect();
    match Histogram::build(&refs, SeriesField::Close) {
        None => records.is_empty(),
        Some(histogram) => {
            let by_cluster: usize = histogram.bins.iter().flat_map(|b| b.by_cluster.values()).sum();
            let by_type: usize = histogram
                .bins
                .iter()
                .map(|b| b.by_candle_type.bullish + b.by_candle_type.bearish + b.by_candle_type.neutral)
                .sum();
            histogram.total() == records.len()
                && by_cluster == records.len()
                && by_type == records.len()
                && histogram.bins.len() == bin_count(records.len())
        }
    }
}

#[test]
fn bin_count_follows_square_root() {
    assert_eq!(bin_count(0), 1);
    assert_eq!(bin_count(1), 1);
    assert_eq!(bin_count(15), 3);
    assert_eq!(bin_count(16), 4);
    assert_eq!(bin_count(10_000), MAX_BINS);
}

#[test]
fn maximum_goes_into_last_bin() {
    let records = records(&[0.0, 2.5, 5.0, 7.5, 10.0]);
    let refs: Vec<&Record> = records.iter().collect();
    let histogram = Histogram::with_bins(&refs, SeriesField::Close, 4).unwrap();
    let counts: Vec<usize> = histogram.bins.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![1, 1, 1, 2]);
    assert_eq!(histogram.lower(), 0.0);
    assert_eq!(histogram.upper(), 10.0);
}

#[test]
fn flat_values_share_the_first_bin() {
    let records = records(&[3.0; 9]);
    let refs: Vec<&Record> = records.iter().collect();
    let histogram = Histogram::build(&refs, SeriesField::Close).unwrap();
    assert_eq!(histogram.bins.len(), 3);
    assert_eq!(histogram.bins[0].count, 9);
    assert_eq!(histogram.max_count(), 9);
}

#[test]
fn empty_input_has_no_histogram() {
    assert!(Histogram::build(&[], SeriesField::Volume).is_none());
}
