use chrono::{DateTime, Duration, Utc};

/// Format a time-axis label with a granularity that suits the visible span.
///
/// - span under 2 minutes -> `HH:MM:SS`
/// - span up to 2 days -> `HH:MM`
/// - span up to 90 days -> `DD.MM`
/// - anything longer -> `MM.YYYY`
pub fn format_time_label(date: DateTime<Utc>, span: Duration) -> String {
    let pattern = if span < Duration::minutes(2) {
        "%H:%M:%S"
    } else if span <= Duration::days(2) {
        "%H:%M"
    } else if span <= Duration::days(90) {
        "%d.%m"
    } else {
        "%m.%Y"
    };
    date.format(pattern).to_string()
}

/// Same as [`format_time_label`] for millisecond values on a field axis.
pub fn format_millis_label(millis: f64, span_millis: f64) -> String {
    if !millis.is_finite() {
        return String::new();
    }
    let span = Duration::milliseconds(span_millis.abs().min(i64::MAX as f64) as i64);
    match DateTime::<Utc>::from_timestamp_millis(millis as i64) {
        Some(date) => format_time_label(date, span),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn granularity_follows_span() {
        let date = Utc.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap();
        assert_eq!(format_time_label(date, Duration::seconds(30)), "14:05:09");
        assert_eq!(format_time_label(date, Duration::hours(5)), "14:05");
        assert_eq!(format_time_label(date, Duration::days(20)), "07.03");
        assert_eq!(format_time_label(date, Duration::days(400)), "03.2024");
    }

    #[test]
    fn millis_labels_use_utc() {
        assert_eq!(format_millis_label(0.0, 60_000.0), "00:00:00");
        assert_eq!(format_millis_label(f64::NAN, 1.0), "");
    }
}
