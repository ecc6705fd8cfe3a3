use chrono::{DateTime, Local, NaiveDate};

/// This is the standard way of naming a daily file in daybook. Shared by the
/// journal files and the usage ledger's day buckets.
pub fn date_to_day_name(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Compact date embedded in analysis log file names.
pub fn date_to_compact_name(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// HH:MM stamp that starts every journal line.
pub fn line_time_stamp(now: DateTime<Local>) -> String {
    now.format("%H:%M").to_string()
}

/// Timestamp used to qualify backup copies of rewritten files.
pub fn backup_time_stamp(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d_%H-%M-%S").to_string()
}
