//! Human-friendly duration strings ("25s", "15m", "3h", "1d", "1.5 hours")

use std::time::Duration;

const SECOND_MS: f64 = 1_000.0;
const MINUTE_MS: f64 = SECOND_MS * 60.0;
const HOUR_MS: f64 = MINUTE_MS * 60.0;
const DAY_MS: f64 = HOUR_MS * 24.0;
const WEEK_MS: f64 = DAY_MS * 7.0;
const YEAR_MS: f64 = DAY_MS * 365.25;

/// Inputs longer than this are rejected outright
const MAX_INPUT_LEN: usize = 100;

/// Parse a duration string
///
/// Accepts a non-negative decimal number followed by an optional unit.
/// A bare number is taken as milliseconds. Returns `None` if the string
/// is not a valid duration.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() || input.len() > MAX_INPUT_LEN {
        return None;
    }

    let split = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);
    // Digits are required on both sides of a decimal point
    if number.starts_with('.') || number.ends_with('.') {
        return None;
    }

    let value: f64 = number.parse().ok()?;

    let unit = unit.trim_start().to_ascii_lowercase();
    let factor = match unit.as_str() {
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => SECOND_MS,
        "m" | "min" | "mins" | "minute" | "minutes" => MINUTE_MS,
        "h" | "hr" | "hrs" | "hour" | "hours" => HOUR_MS,
        "d" | "day" | "days" => DAY_MS,
        "w" | "week" | "weeks" => WEEK_MS,
        "y" | "yr" | "yrs" | "year" | "years" => YEAR_MS,
        _ => return None,
    };

    let millis = value * factor;
    if !millis.is_finite() {
        return None;
    }
    Some(Duration::from_millis(millis.round() as u64))
}
