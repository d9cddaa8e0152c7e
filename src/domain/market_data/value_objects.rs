use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use super::entities::Record;

/// Value Object - numeric field of a record that can be plotted on an axis
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SeriesField {
    #[display(fmt = "Open")]
    #[strum(serialize = "open")]
    Open,
    #[display(fmt = "High")]
    #[strum(serialize = "high")]
    High,
    #[display(fmt = "Low")]
    #[strum(serialize = "low")]
    Low,
    #[display(fmt = "Close")]
    #[strum(serialize = "close")]
    Close,
    #[display(fmt = "Volume")]
    #[strum(serialize = "volume")]
    Volume,
    #[display(fmt = "Cluster")]
    #[strum(serialize = "cluster")]
    Cluster,
    /// Synthetic field: the record date as epoch milliseconds
    #[display(fmt = "Timestamp")]
    #[strum(serialize = "timestamp")]
    Timestamp,
}

impl SeriesField {
    pub fn value_of(&self, record: &Record) -> f64 {
        match self {
            SeriesField::Open => record.open,
            SeriesField::High => record.high,
            SeriesField::Low => record.low,
            SeriesField::Close => record.close,
            SeriesField::Volume => record.volume,
            SeriesField::Cluster => record.cluster as f64,
            SeriesField::Timestamp => record.timestamp_millis() as f64,
        }
    }

    pub fn is_time(&self) -> bool {
        matches!(self, SeriesField::Timestamp)
    }
}
