//! Numeric chart series from extracted tables
//!
//! A column counts as numeric when at least one of its cells coerces to a
//! nonzero number. Zero and NaN never qualify a column on their own, so a
//! column holding only zeros is left out of the chart.

use std::borrow::Cow;

use serde::Serialize;
use tracing::debug;

use crate::tables::Row;

/// Numeric projection of one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Numeric column labels, in first-seen order
    pub labels: Vec<String>,
    /// One entry per source row, aligned to `labels`
    pub datasets: Vec<Vec<f64>>,
}

/// Build a chart series from a table's rows.
///
/// Returns `None` when no column qualifies as numeric. A row missing a
/// qualifying label contributes NaN for it, like an unparseable cell.
pub fn build_series(dataset: &[Row]) -> Option<ChartSeries> {
    let mut labels: Vec<String> = Vec::new();
    for row in dataset {
        for (label, value) in row.iter() {
            if is_truthy(coerce_number(value)) && !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
    }

    if labels.is_empty() {
        debug!(rows = dataset.len(), "no numeric columns");
        return None;
    }
    debug!(?labels, rows = dataset.len(), "numeric columns");

    let datasets = dataset
        .iter()
        .map(|row| {
            labels
                .iter()
                .map(|label| row.get(label).map_or(f64::NAN, parse_value))
                .collect()
        })
        .collect();

    Some(ChartSeries { labels, datasets })
}

fn parse_value(text: &str) -> f64 {
    parse_float_prefix(&normalize_separators(text))
}

/// Nonzero and not NaN
pub fn is_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Resolve commas in a number.
///
/// Commas grouping digits in threes (`1,234,567.5`) are thousands
/// separators and get stripped. A lone comma with no `.` that is not
/// followed by exactly three digits (`2,11`) is a decimal comma. Any other
/// comma is stripped. A decimal comma followed by exactly three digits
/// (`2,110`) cannot be told apart and is read as thousands (2110).
pub fn normalize_separators(text: &str) -> Cow<'_, str> {
    if !text.contains(',') {
        return Cow::Borrowed(text);
    }

    let trimmed = text.trim();
    let groups: Vec<&str> = trimmed.split(',').collect();
    let last = groups.len() - 1;

    let head_ends_in_digit = groups[0].chars().last().is_some_and(|c| c.is_ascii_digit());
    let grouped_in_threes = head_ends_in_digit
        && groups[1..].iter().enumerate().all(|(i, group)| {
            if i + 1 == last {
                leading_digits(group) == 3
            } else {
                group.len() == 3 && leading_digits(group) == 3
            }
        });

    if !grouped_in_threes
        && groups.len() == 2
        && !trimmed.contains('.')
        && head_ends_in_digit
        && leading_digits(groups[1]) > 0
    {
        return Cow::Owned(trimmed.replacen(',', ".", 1));
    }

    Cow::Owned(text.replace(',', ""))
}

fn leading_digits(text: &str) -> usize {
    text.bytes().take_while(u8::is_ascii_digit).count()
}

/// Strict whole-string coercion to a number.
///
/// Surrounding whitespace is ignored and an empty string is 0. Accepts a
/// signed decimal literal with optional fraction and exponent, `Infinity`,
/// or an unsigned `0x`/`0o`/`0b` integer. Anything else is NaN.
pub fn coerce_number(text: &str) -> f64 {
    let normalized = normalize_separators(text);
    let s = normalized.trim_matches(is_number_space);
    if s.is_empty() {
        return 0.0;
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }

    let (sign, unsigned) = split_sign(s);
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    if decimal_prefix_len(unsigned) == unsigned.len() {
        return unsigned.parse::<f64>().map_or(f64::NAN, |v| sign * v);
    }
    f64::NAN
}

/// Lenient parsing: the longest numeric prefix after leading whitespace.
///
/// `"12 km"` is 12, `"abc"` is NaN.
pub fn parse_float_prefix(text: &str) -> f64 {
    let s = text.trim_start_matches(is_number_space);
    let (sign, unsigned) = split_sign(s);
    if unsigned.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }

    let len = decimal_prefix_len(unsigned);
    if len == 0 {
        return f64::NAN;
    }
    unsigned[..len].parse::<f64>().map_or(f64::NAN, |v| sign * v)
}

fn is_number_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn split_sign(s: &str) -> (f64, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (-1.0, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (1.0, rest)
    } else {
        (1.0, s)
    }
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

/// Length of the leading `digits [. digits] [e [+-] digits]` run, or 0 when
/// the mantissa has no digit. A dangling exponent marker is not consumed.
fn decimal_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut pos = leading_digits(s);
    let mut mantissa_digits = pos;

    if bytes.get(pos) == Some(&b'.') {
        let fraction = leading_digits(&s[pos + 1..]);
        mantissa_digits += fraction;
        pos += 1 + fraction;
    }
    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = leading_digits(&s[exp..]);
        if exp_digits > 0 {
            pos = exp + exp_digits;
        }
    }
    pos
}
