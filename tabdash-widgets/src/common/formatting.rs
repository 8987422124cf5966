// tabdash-widgets/src/common/formatting.rs
use chrono::TimeDelta;

/// Format a remaining duration as `12d 04h 33m 07s`
///
/// Negative durations are shown as zero.
///
/// # Example
/// ```rust
/// use chrono::TimeDelta;
/// use tabdash_widgets::common::format_countdown;
/// assert_eq!(format_countdown(TimeDelta::seconds(90061)), "1d 01h 01m 01s");
/// ```
pub fn format_countdown(remaining: TimeDelta) -> String {
    let total = remaining.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    format!("{}d {:02}h {:02}m {:02}s", days, hours, minutes, seconds)
}

/// Format percentage with 1 decimal place
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}
