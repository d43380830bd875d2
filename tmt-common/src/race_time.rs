//! Human-readable race time formatting
//!
//! Race times are carried as integer milliseconds everywhere; this module only
//! renders them for log lines and summaries.

/// Times below one minute render as `S.mmm`
const MINUTE_MS: u64 = 60_000;
/// Times below one hour render as `M:SS.mmm`, longer ones as `H:MM:SS.mmm`
const HOUR_MS: u64 = 3_600_000;

/// Format milliseconds as a race clock.
///
/// # Examples
///
/// ```
/// use tmt_common::race_time::format_race_time;
///
/// assert_eq!(format_race_time(45_123), "45.123");
/// assert_eq!(format_race_time(95_000), "1:35.000");
/// assert_eq!(format_race_time(3_723_004), "1:02:03.004");
/// assert_eq!(format_race_time(-1_500), "-1.500");
/// ```
pub fn format_race_time(ms: i64) -> String {
    let is_negative = ms < 0;
    let abs_ms = ms.unsigned_abs();

    let millis = abs_ms % 1000;
    let total_secs = abs_ms / 1000;

    let formatted = if abs_ms < MINUTE_MS {
        format!("{}.{:03}", total_secs, millis)
    } else if abs_ms < HOUR_MS {
        format!("{}:{:02}.{:03}", total_secs / 60, total_secs % 60, millis)
    } else {
        format!(
            "{}:{:02}:{:02}.{:03}",
            total_secs / 3600,
            (total_secs % 3600) / 60,
            total_secs % 60,
            millis
        )
    };

    if is_negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Format an optional time, rendering `None` as `"-"`
pub fn format_race_time_opt(ms: Option<i64>) -> String {
    match ms {
        Some(ms) => format_race_time(ms),
        None => "-".to_string(),
    }
}
