// WHY: single place for LRC time-tag arithmetic shared by the renderer and the retime engine
// Rendering works in f64 seconds, manual retiming in integer milliseconds

/// Format milliseconds as `mm:ss.mmm`, clamping negative input to zero
pub fn format_millis(ms: i64) -> String {
    let ms = ms.max(0);
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;
    let rem = ms % 1000;
    format!("{minutes:02}:{seconds:02}.{rem:03}")
}

/// Convert seconds to whole milliseconds, rounding to nearest and flooring at zero
pub fn seconds_to_millis(seconds: f64) -> i64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as i64
}

/// Format `seconds + offset` as `mm:ss.mmm`
/// WHY: the offset may push early tokens below zero, the result is floored at 00:00.000
pub fn format_seconds(seconds: f64, offset_seconds: f64) -> String {
    format_millis(seconds_to_millis(seconds + offset_seconds))
}

/// Format a complete bracketed tag, e.g. `[01:02.345]`
pub fn format_tag_millis(ms: i64) -> String {
    format!("[{}]", format_millis(ms))
}

/// Parse `[mm:ss.xx]`, `mm:ss.xxx` or `mm:ss` into milliseconds
///
/// Returns `None` for anything malformed; callers decide whether that means
/// "no valid time" or zero. Sub-millisecond digits round to the nearest millisecond.
pub fn parse_tag_millis(tag: &str) -> Option<i64> {
    let clean = tag.trim().trim_start_matches('[').trim_end_matches(']');
    let (minutes, seconds) = clean.split_once(':')?;
    let minutes: i64 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;
    if minutes < 0 || !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(((minutes as f64 * 60.0 + seconds) * 1000.0).round() as i64)
}
