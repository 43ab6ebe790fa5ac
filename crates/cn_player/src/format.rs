/// `m:ss`, fractional seconds floored.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Share of `max` already played, in percent.
pub fn progress_percent(position: f64, max: f64) -> f64 {
    if max <= 0.0 || !max.is_finite() || !position.is_finite() {
        return 0.0;
    }
    position.max(0.0) / max * 100.0
}
