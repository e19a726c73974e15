use chrono::{DateTime, Local, Utc};
use humansize::{format_size, DECIMAL};

/// Format a throughput in human-readable units per second (e.g. "1.50 MB/s")
pub fn format_rate(bytes_per_sec: u64) -> String {
    format!("{}/s", format_size(bytes_per_sec, DECIMAL))
}

/// Format a byte count in human-readable units
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a percentage with one decimal place
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Format a sample timestamp in local time (HH:MM:SS)
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    let local: DateTime<Local> = timestamp.into();
    local.format("%H:%M:%S").to_string()
}
