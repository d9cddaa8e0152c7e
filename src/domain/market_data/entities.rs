use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{AsRefStr, EnumIter};

use crate::domain::chart::ViewportRange;

/// Domain entity - one OHLCV row with its cluster label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Timestamp text exactly as it was ingested
    pub timestamp: String,
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub cluster: i32,
}

impl Record {
    pub fn new(date: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp: date.format("%Y-%m-%d %H:%M:%S").to_string(),
            date,
            open,
            high,
            low,
            close,
            volume,
            cluster: 0,
        }
    }

    pub fn with_cluster(mut self, cluster: i32) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn candle_type(&self) -> CandleType {
        CandleType::classify(self.open, self.close)
    }

    pub fn is_bullish(&self) -> bool {
        self.candle_type() == CandleType::Bullish
    }

    pub fn is_bearish(&self) -> bool {
        self.candle_type() == CandleType::Bearish
    }

    /// `high >= max(open, close)` and `low <= min(open, close)`.
    /// Ingestion does not reject rows that break this.
    pub fn is_consistent(&self) -> bool {
        self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.date.timestamp_millis()
    }
}

/// Direction of price movement within one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
pub enum CandleType {
    #[display(fmt = "Bullish")]
    #[strum(serialize = "bullish")]
    Bullish,
    #[display(fmt = "Bearish")]
    #[strum(serialize = "bearish")]
    Bearish,
    /// Doji: close equals open
    #[display(fmt = "Neutral")]
    #[strum(serialize = "neutral")]
    Neutral,
}

impl CandleType {
    pub fn classify(open: f64, close: f64) -> Self {
        if close > open {
            CandleType::Bullish
        } else if close < open {
            CandleType::Bearish
        } else {
            CandleType::Neutral
        }
    }
}

/// Ordered, copy-on-replace collection of records.
///
/// Cloning is cheap and readers keep whatever generation they cloned; a
/// replacement never mutates the shared vector in place.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Arc<Vec<Record>>,
    generation: u64,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records: Arc::new(records), generation: 0 }
    }

    /// Build the successor of `self` holding `records`.
    pub fn replaced_with(&self, records: Vec<Record>) -> Self {
        Self { records: Arc::new(records), generation: self.generation + 1 }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records inside an inclusive viewport range, clipped to the dataset.
    pub fn window(&self, range: ViewportRange) -> &[Record] {
        if self.records.is_empty() || range.start >= self.records.len() {
            return &[];
        }
        let end = range.end.min(self.records.len() - 1);
        &self.records[range.start..=end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(open: f64, close: f64) -> Record {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Record::new(date, open, open.max(close) + 1.0, open.min(close) - 1.0, close, 10.0)
    }

    #[test]
    fn classifies_doji_as_neutral() {
        assert_eq!(record(10.0, 10.0).candle_type(), CandleType::Neutral);
        assert_eq!(record(10.0, 11.0).candle_type(), CandleType::Bullish);
        assert_eq!(record(10.0, 9.0).candle_type(), CandleType::Bearish);
    }

    #[test]
    fn replacement_bumps_generation_and_keeps_old_copy() {
        let first = Dataset::new(vec![record(1.0, 2.0)]);
        let second = first.replaced_with(vec![record(1.0, 2.0), record(2.0, 3.0)]);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(second.generation(), first.generation() + 1);
    }

    #[test]
    fn window_is_clipped_to_dataset() {
        let data = Dataset::new((0..5).map(|i| record(i as f64, i as f64 + 1.0)).collect());
        assert_eq!(data.window(ViewportRange::new(3, 10)).len(), 2);
        assert!(data.window(ViewportRange::new(7, 9)).is_empty());
    }
}
