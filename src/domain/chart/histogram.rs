//! Equal-width binning of one field over the filtered visible records.

use std::collections::BTreeMap;

use crate::domain::market_data::{CandleType, Record, SeriesField};

/// Upper bound on the number of bins
pub const MAX_BINS: usize = 20;

/// `min(20, floor(sqrt(n)))`, never below one.
pub fn bin_count(sample_count: usize) -> usize {
    ((sample_count as f64).sqrt().floor() as usize).clamp(1, MAX_BINS)
}

/// Per-direction tallies inside one bin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandleTypeCounts {
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
}

impl CandleTypeCounts {
    fn add(&mut self, candle_type: CandleType) {
        match candle_type {
            CandleType::Bullish => self.bullish += 1,
            CandleType::Bearish => self.bearish += 1,
            CandleType::Neutral => self.neutral += 1,
        }
    }

    /// Segments in stacking order, bottom first.
    pub fn segments(&self) -> [(CandleType, usize); 3] {
        [
            (CandleType::Bullish, self.bullish),
            (CandleType::Bearish, self.bearish),
            (CandleType::Neutral, self.neutral),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub by_cluster: BTreeMap<i32, usize>,
    pub by_candle_type: CandleTypeCounts,
}

impl HistogramBin {
    fn empty(lower: f64, upper: f64) -> Self {
        Self { lower, upper, count: 0, by_cluster: BTreeMap::new(), by_candle_type: CandleTypeCounts::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub field: SeriesField,
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Bin `records` by `field` with the default bin count for their number.
    pub fn build(records: &[&Record], field: SeriesField) -> Option<Self> {
        Self::with_bins(records, field, bin_count(records.len()))
    }

    /// Every record lands in exactly one bin; the maximum goes into the last
    /// bin and a zero-width range puts everything in the first.
    pub fn with_bins(records: &[&Record], field: SeriesField, bins: usize) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let bins = bins.max(1);
        let values: Vec<f64> = records.iter().map(|r| field.value_of(r)).collect();
        let (min, max) = values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let (min, max) = if min.is_finite() { (min, max) } else { (0.0, 0.0) };
        let width = (max - min) / bins as f64;

        let mut out: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin::empty(min + width * i as f64, min + width * (i + 1) as f64))
            .collect();

        for (record, value) in records.iter().zip(values) {
            let slot = if width > 0.0 && value.is_finite() {
                (((value - min) / width).floor() as usize).min(bins - 1)
            } else {
                0
            };
            let bin = &mut out[slot];
            bin.count += 1;
            *bin.by_cluster.entry(record.cluster).or_default() += 1;
            bin.by_candle_type.add(record.candle_type());
        }

        Some(Self { field, bins: out })
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    pub fn lower(&self) -> f64 {
        self.bins.first().map_or(0.0, |b| b.lower)
    }

    pub fn upper(&self) -> f64 {
        self.bins.last().map_or(0.0, |b| b.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_count_follows_square_root_rule() {
        assert_eq!(bin_count(0), 1);
        assert_eq!(bin_count(3), 1);
        assert_eq!(bin_count(50), 7);
        assert_eq!(bin_count(10_000), MAX_BINS);
    }
}
