//! Per-record visibility and color decisions.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{EnumIter, EnumString, IntoStaticStr};

use super::value_objects::{CLUSTER_PALETTE, Color, Theme};
use super::viewport::ViewportRange;
use crate::domain::market_data::{CandleType, Dataset, Record};

/// Which cluster labels pass the filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClusterFilter {
    #[default]
    All,
    Only(i32),
}

impl FromStr for ClusterFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(ClusterFilter::All);
        }
        s.parse::<i32>().map(ClusterFilter::Only).map_err(|_| format!("invalid cluster filter '{}'", s))
    }
}

impl TryFrom<String> for ClusterFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClusterFilter> for String {
    fn from(filter: ClusterFilter) -> Self {
        match filter {
            ClusterFilter::All => "all".to_string(),
            ClusterFilter::Only(id) => id.to_string(),
        }
    }
}

/// Which price directions pass the filter. Neutral records only pass `All`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CandleTypeFilter {
    #[default]
    #[display(fmt = "All")]
    #[strum(serialize = "all")]
    All,
    #[display(fmt = "Bullish")]
    #[strum(serialize = "bullish")]
    Bullish,
    #[display(fmt = "Bearish")]
    #[strum(serialize = "bearish")]
    Bearish,
}

/// Combined filter applied on every redraw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub cluster: ClusterFilter,
    pub candle_type: CandleTypeFilter,
}

impl FilterState {
    pub fn new(cluster: ClusterFilter, candle_type: CandleTypeFilter) -> Self {
        Self { cluster, candle_type }
    }

    pub fn passes(&self, record: &Record) -> bool {
        let cluster_ok = match self.cluster {
            ClusterFilter::All => true,
            ClusterFilter::Only(id) => record.cluster == id,
        };
        let type_ok = match self.candle_type {
            CandleTypeFilter::All => true,
            CandleTypeFilter::Bullish => record.candle_type() == CandleType::Bullish,
            CandleTypeFilter::Bearish => record.candle_type() == CandleType::Bearish,
        };
        cluster_ok && type_ok
    }

    pub fn is_passthrough(&self) -> bool {
        self.cluster == ClusterFilter::All && self.candle_type == CandleTypeFilter::All
    }

    /// Filter pass over the visible window: `(dataset index, record)` pairs
    /// in window order.
    pub fn visible<'a>(&self, dataset: &'a Dataset, range: ViewportRange) -> Vec<(usize, &'a Record)> {
        dataset
            .window(range)
            .iter()
            .enumerate()
            .map(|(offset, record)| (range.start + offset, record))
            .filter(|(_, record)| self.passes(record))
            .collect()
    }
}

/// Palette entry for a cluster id; negative ids use entry 0.
pub fn cluster_color(cluster: i32) -> Color {
    usize::try_from(cluster)
        .map(|id| CLUSTER_PALETTE[id % CLUSTER_PALETTE.len()])
        .unwrap_or(CLUSTER_PALETTE[0])
}

pub fn candle_type_color(candle_type: CandleType, theme: &Theme) -> Color {
    match candle_type {
        CandleType::Bullish => theme.bullish,
        CandleType::Bearish => theme.bearish,
        CandleType::Neutral => theme.neutral,
    }
}

/// Color for a record under the current coloring mode
pub fn record_color(record: &Record, show_cluster_colors: bool, theme: &Theme) -> Color {
    if show_cluster_colors {
        cluster_color(record.cluster)
    } else {
        candle_type_color(record.candle_type(), theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_filter_parses_and_prints() {
        assert_eq!("all".parse::<ClusterFilter>(), Ok(ClusterFilter::All));
        assert_eq!("3".parse::<ClusterFilter>(), Ok(ClusterFilter::Only(3)));
        assert!("x".parse::<ClusterFilter>().is_err());
        assert_eq!(String::from(ClusterFilter::Only(-1)), "-1");
    }

    #[test]
    fn palette_lookup_wraps_and_defaults() {
        assert_eq!(cluster_color(0), CLUSTER_PALETTE[0]);
        assert_eq!(cluster_color(9), CLUSTER_PALETTE[1]);
        assert_eq!(cluster_color(-4), CLUSTER_PALETTE[0]);
    }
}
