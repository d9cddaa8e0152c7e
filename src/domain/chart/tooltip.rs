use crate::domain::market_data::{CandleType, Record};

/// Text shown next to the hovered record
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipData {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub lines: Vec<String>,
}

impl TooltipData {
    pub fn new(index: usize, record: &Record, x: f64, y: f64) -> Self {
        let change = record.close - record.open;
        let change_pct = if record.open != 0.0 { change / record.open * 100.0 } else { 0.0 };
        let trend = match record.candle_type() {
            CandleType::Bullish => "▲",
            CandleType::Bearish => "▼",
            CandleType::Neutral => "■",
        };

        let lines = vec![
            format!("{} {}", trend, record.timestamp),
            format!("Open:   {:.2}", record.open),
            format!("High:   {:.2}", record.high),
            format!("Low:    {:.2}", record.low),
            format!("Close:  {:.2}", record.close),
            format!("Change: {:+.2} ({:+.2}%)", change, change_pct),
            format!("Volume: {:.2}", record.volume),
            format!("Cluster: {}", record.cluster),
        ];

        Self { index, x, y, lines }
    }

    pub fn formatted_text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn doji_tooltip_shows_zero_change() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let record = Record::new(date, 10.0, 11.0, 9.0, 10.0, 3.0).with_cluster(2);
        let tooltip = TooltipData::new(4, &record, 1.0, 2.0);
        assert_eq!(tooltip.lines[0], "■ 2024-05-01 09:30:00");
        assert_eq!(tooltip.lines[5], "Change: +0.00 (+0.00%)");
        assert_eq!(tooltip.lines[7], "Cluster: 2");
    }
}
