//! Display formatting shared by dashboard pages: dates, fixed-point numbers
//! and status badges.

use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use maud::html;

pub const INVALID_DATE: &str = "Invalid Date";
pub const DEFAULT_DECIMALS: usize = 2;
pub const MAX_DECIMALS: usize = 100;

const DATE_DISPLAY_FORMAT: &str = "%b %-d, %Y, %I:%M %p";
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
/// Above this magnitude fixed-point output switches to exponent form.
const FIXED_POINT_LIMIT: f64 = 1e21;
/// Digits needed to spell out any finite f64 exactly.
const EXACT_DIGITS: usize = 1100;

/// Formats `input` as e.g. `Jan 5, 2024, 02:30 PM` in the local zone.
pub fn format_date(input: &str) -> String {
    format_date_in(input, &Local)
}

/// Offset-bearing timestamps are converted into `tz`, naive date-times are
/// read as wall-clock time in `tz`, and bare dates as UTC midnight.
pub fn format_date_in<Tz>(input: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    parse_date_in(input.trim(), tz).map_or_else(
        || INVALID_DATE.to_string(),
        |moment| moment.format(DATE_DISPLAY_FORMAT).to_string(),
    )
}

fn parse_date_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(moment) = DateTime::parse_from_rfc3339(input) {
        return Some(moment.with_timezone(tz));
    }
    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
    {
        return tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| resolve_skipped_local(naive, tz));
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight).with_timezone(tz))
}

/// Wall-clock times skipped by a forward offset change are read with the
/// offset in effect the day before, which lands them past the gap.
fn resolve_skipped_local<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Tz>> {
    let day_before = naive.checked_sub_signed(TimeDelta::days(1))?;
    let offset = tz.from_local_datetime(&day_before).earliest()?.offset().fix();
    let utc = naive.checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))?;
    Some(tz.from_utc_datetime(&utc))
}

/// Fixed-point rendering with exact ties rounded away from zero.
///
/// Non-finite values render as `NaN`/`Infinity`/`-Infinity`, magnitudes of
/// 1e21 and above in exponent form (`1e+21`). `decimals` is capped at 100.
pub fn format_number(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.abs() >= FIXED_POINT_LIMIT {
        return format!("{value:e}").replacen('e', "e+", 1);
    }

    let decimals = decimals.min(MAX_DECIMALS);
    let (sign, magnitude) = if value < 0.0 { ("-", -value) } else { ("", value.abs()) };
    let magnitude = if is_exact_tie(magnitude, decimals) {
        // One ulp up tips an exact half over the boundary without reaching
        // the next one.
        f64::from_bits(magnitude.to_bits() + 1)
    } else {
        magnitude
    };
    format!("{sign}{magnitude:.decimals$}")
}

/// Parses the longest numeric prefix of `raw` before formatting; text with
/// no numeric prefix renders as `NaN`.
pub fn format_number_str(raw: &str, decimals: usize) -> String {
    format_number(parse_float_prefix(raw), decimals)
}

fn is_exact_tie(magnitude: f64, decimals: usize) -> bool {
    let exact = format!("{magnitude:.precision$}", precision = EXACT_DIGITS);
    let Some((_, fraction)) = exact.split_once('.') else {
        return false;
    };
    let Some(rest) = fraction.get(decimals..) else {
        return false;
    };
    let mut digits = rest.bytes();
    digits.next() == Some(b'5') && digits.all(|digit| digit == b'0')
}

fn parse_float_prefix(raw: &str) -> f64 {
    let text = raw.trim_start();
    let bytes = text.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if text[end..].starts_with("Infinity") {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = count_digits(&bytes[exponent_end..]);
        if exponent_digits > 0 {
            end = exponent_end + exponent_digits;
        }
    }

    text[..end].parse().unwrap_or(f64::NAN)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}

/// Human label for a backend status value; unknown values pass through.
pub fn status_label(status: &str) -> &str {
    match status {
        "active" => "Active",
        "inactive" => "Inactive",
        "pending" => "Pending",
        "approved" => "Approved",
        "rejected" => "Rejected",
        "achieved" => "Achieved",
        "not_achieved" => "Not Achieved",
        other => other,
    }
}

/// `<span class="badge badge-{status}">{label}</span>`, HTML-escaped.
pub fn status_badge(status: &str) -> String {
    html! {
        span class=(format!("badge badge-{status}")) { (status_label(status)) }
    }
    .into_string()
}
