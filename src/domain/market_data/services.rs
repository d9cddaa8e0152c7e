use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::entities::{CandleType, Record};

/// Deterministic random-walk generator used for "regenerate" and demos.
///
/// Uses a xorshift state so that the same seed always yields the same
/// dataset, on every target.
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    state: u64,
    clusters: i32,
    start: DateTime<Utc>,
    step: Duration,
    base_price: f64,
}

impl SampleGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
            clusters: 4,
            start: DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default(),
            step: Duration::minutes(1),
            base_price: 100.0,
        }
    }

    pub fn with_clusters(mut self, clusters: i32) -> Self {
        self.clusters = clusters.max(1);
        self
    }

    pub fn with_start(mut self, start: DateTime<Utc>, step: Duration) -> Self {
        self.start = start;
        self.step = step;
        self
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price.max(1.0);
        self
    }

    fn next_unit(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 11) as f64 / (1u64 << 53) as f64
    }

    pub fn generate(&mut self, count: usize) -> Vec<Record> {
        let mut records = Vec::with_capacity(count);
        let mut close = self.base_price;

        for i in 0..count {
            let open = close;
            let drift = (self.next_unit() - 0.5) * open * 0.02;
            close = (open + drift).max(0.01);
            let high = open.max(close) + self.next_unit() * open * 0.005;
            let low = (open.min(close) - self.next_unit() * open * 0.005).max(0.0);
            let volume = 500.0 + self.next_unit() * 1500.0;
            let cluster = (self.next_unit() * self.clusters as f64) as i32 % self.clusters;
            let date = self.start + self.step * i as i32;

            records.push(Record::new(date, open, high, low, close, volume).with_cluster(cluster));
        }
        records
    }
}

/// Summary numbers shown next to the chart (legend and stat panels)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub total: usize,
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
    pub clusters: BTreeMap<i32, usize>,
    pub min_low: Option<f64>,
    pub max_high: Option<f64>,
    pub total_volume: f64,
    pub first_date: Option<DateTime<Utc>>,
    pub last_date: Option<DateTime<Utc>>,
}

impl DatasetStats {
    pub fn compute<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total += 1;
            match record.candle_type() {
                CandleType::Bullish => stats.bullish += 1,
                CandleType::Bearish => stats.bearish += 1,
                CandleType::Neutral => stats.neutral += 1,
            }
            *stats.clusters.entry(record.cluster).or_default() += 1;
            stats.min_low = Some(stats.min_low.map_or(record.low, |v| v.min(record.low)));
            stats.max_high = Some(stats.max_high.map_or(record.high, |v| v.max(record.high)));
            stats.total_volume += record.volume;
            stats.first_date.get_or_insert(record.date);
            stats.last_date = Some(record.date);
        }
        stats
    }

    pub fn bullish_ratio(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.bullish as f64 / self.total as f64 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_deterministic_and_consistent() {
        let a = SampleGenerator::new(42).generate(200);
        let b = SampleGenerator::new(42).generate(200);
        assert_eq!(a, b);
        assert!(a.iter().all(Record::is_consistent));
        assert!(a.iter().all(|r| (0..4).contains(&r.cluster)));
        assert!(a.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn stats_count_every_record_once() {
        let records = SampleGenerator::new(7).generate(120);
        let stats = DatasetStats::compute(&records);
        assert_eq!(stats.total, 120);
        assert_eq!(stats.bullish + stats.bearish + stats.neutral, 120);
        assert_eq!(stats.clusters.values().sum::<usize>(), 120);
        assert_eq!(stats.first_date, Some(records[0].date));
    }
}
