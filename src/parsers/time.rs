use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use once_cell::sync::Lazy;
use std::time::Duration;

/// Asia/Dubai has no daylight saving, so a fixed UTC+4 offset is exact.
static DUBAI: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::east_opt(4 * 3600).expect("Invalid Dubai offset"));

pub fn dubai_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&*DUBAI)
}

/// `DD/MM/YYYY, HH:MM:SS` in Dubai time.
pub fn capture_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&*DUBAI)
        .format("%d/%m/%Y, %H:%M:%S")
        .to_string()
}

/// Elapsed runtime as `1h 02m 03s` or `2m 05s`.
pub fn format_runtime(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else {
        format!("{}m {:02}s", minutes, seconds)
    }
}
