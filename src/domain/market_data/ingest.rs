//! CSV text → records.
//!
//! Rows that cannot be turned into a [`Record`] are skipped and reported as
//! warnings; ingestion only fails as a whole when the header lacks a required
//! column or when no row survives.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::entities::Record;
use crate::domain::errors::IngestionError;
use crate::domain::logging::LogComponent;
use crate::{log_info, log_warn};

const REQUIRED_COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];
const CLUSTER_COLUMN: &str = "predicted_cluster";

/// Epoch values at or above this magnitude are read as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Outcome of a successful ingestion
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub records: Vec<Record>,
    pub warnings: Vec<IngestionError>,
}

impl IngestReport {
    pub fn skipped(&self) -> usize {
        self.warnings.len()
    }
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
    cluster: Option<usize>,
    width: usize,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Result<Self, IngestionError> {
        let find = |name: &str| header.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let mut required = [0usize; 6];
        for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = find(name).ok_or_else(|| IngestionError::MissingColumn(name.to_string()))?;
        }
        Ok(Self {
            timestamp: required[0],
            open: required[1],
            high: required[2],
            low: required[3],
            close: required[4],
            volume: required[5],
            cluster: find(CLUSTER_COLUMN),
            width: header.len(),
        })
    }
}

/// Parse CSV text with a header row into records, keeping row order.
pub fn parse_csv(text: &str) -> Result<IngestReport, IngestionError> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let (_, header_line) = lines.next().ok_or(IngestionError::EmptyInput)?;
    let columns = ColumnMap::from_header(&split_row(header_line))?;

    let mut report = IngestReport::default();
    for (idx, line) in lines {
        let line_no = idx + 1;
        match parse_row(&split_row(line), &columns, line_no) {
            Ok(record) => report.records.push(record),
            Err(warning) => {
                log_warn!(LogComponent::Domain("Ingest"), "skipping row: {}", warning);
                report.warnings.push(warning);
            }
        }
    }

    if report.records.is_empty() {
        return Err(IngestionError::NoValidRows { skipped: report.warnings.len() });
    }

    log_info!(
        LogComponent::Domain("Ingest"),
        "ingested {} records ({} skipped)",
        report.records.len(),
        report.warnings.len()
    );
    Ok(report)
}

fn parse_row(fields: &[String], columns: &ColumnMap, line: usize) -> Result<Record, IngestionError> {
    if fields.len() != columns.width {
        return Err(IngestionError::ColumnCount { line, expected: columns.width, found: fields.len() });
    }

    let timestamp = fields[columns.timestamp].trim();
    let date = parse_date(timestamp)
        .ok_or_else(|| IngestionError::UnparseableDate { line, value: timestamp.to_string() })?;

    let number = |index: usize, field: &'static str| -> Result<f64, IngestionError> {
        let raw = fields[index].trim();
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(IngestionError::InvalidNumber { line, field, value: raw.to_string() }),
        }
    };

    let cluster = match columns.cluster.map(|i| fields[i].trim()) {
        None | Some("") => 0,
        Some(raw) => parse_cluster(raw).ok_or_else(|| IngestionError::InvalidNumber {
            line,
            field: CLUSTER_COLUMN,
            value: raw.to_string(),
        })?,
    };

    Ok(Record {
        timestamp: timestamp.to_string(),
        date,
        open: number(columns.open, "open")?,
        high: number(columns.high, "high")?,
        low: number(columns.low, "low")?,
        close: number(columns.close, "close")?,
        volume: number(columns.volume, "volume")?,
        cluster,
    })
}

/// Cluster labels sometimes arrive as `2.0` from numeric exports.
fn parse_cluster(raw: &str) -> Option<i32> {
    if let Ok(v) = raw.parse::<i32>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok()?;
    (v.fract() == 0.0 && v.abs() <= i32::MAX as f64).then_some(v as i32)
}

/// Accepts RFC 3339, a handful of naive layouts, plain dates and epoch
/// seconds or milliseconds.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    if let Ok(epoch) = raw.parse::<i64>() {
        return if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
            DateTime::from_timestamp_millis(epoch)
        } else {
            DateTime::from_timestamp(epoch, 0)
        };
    }
    None
}

/// Split one CSV line, honouring double-quoted fields and `""` escapes.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_row_handles_quotes() {
        assert_eq!(split_row(r#"a,"b,c","d""e""#), vec!["a", "b,c", "d\"e"]);
        assert_eq!(split_row("1,2,\r"), vec!["1", "2", ""]);
    }

    #[test]
    fn parse_date_accepts_supported_layouts() {
        let expected = parse_date("2024-03-01T12:30:00Z").unwrap();
        assert_eq!(parse_date("2024-03-01 12:30:00"), Some(expected));
        assert_eq!(parse_date("2024-03-01T12:30:00"), Some(expected));
        assert_eq!(parse_date(&expected.timestamp().to_string()), Some(expected));
        assert_eq!(parse_date(&expected.timestamp_millis().to_string()), Some(expected));
        assert!(parse_date("2024-03-01").is_some());
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn parse_cluster_accepts_integral_floats() {
        assert_eq!(parse_cluster("3"), Some(3));
        assert_eq!(parse_cluster("2.0"), Some(2));
        assert_eq!(parse_cluster("2.5"), None);
    }
}
