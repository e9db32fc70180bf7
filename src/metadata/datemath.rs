//! Date-math expression resolution for index patterns
//!
//! A date-math pattern is wrapped in angle brackets and mixes static text
//! with `{...}` expressions anchored at `now`, for example
//! `<logs-{now/d}>` or `<audit-{now-1M/M{yyyy.MM}}>`. Anything that is not
//! a well-formed date-math pattern is returned verbatim; resolution never
//! fails.

use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Timelike, Utc};
use tracing::debug;

/// Resolves a date-math pattern against the current clock
pub fn resolve_date_math(pattern: &str) -> String {
    resolve_date_math_at(pattern, Utc::now())
}

/// Resolves a date-math pattern against a fixed point in time
pub fn resolve_date_math_at(pattern: &str, now: DateTime<Utc>) -> String {
    if !(pattern.starts_with('<') && pattern.ends_with('>') && pattern.len() >= 2) {
        return pattern.to_string();
    }

    let inner = &pattern[1..pattern.len() - 1];
    match render(inner, now) {
        Some(resolved) => resolved,
        None => {
            debug!(pattern, "malformed date math expression, using raw value");
            pattern.to_string()
        }
    }
}

fn render(inner: &str, now: DateTime<Utc>) -> Option<String> {
    let mut out = String::with_capacity(inner.len());
    let chars: Vec<char> = inner.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '{' {
            let end = matching_brace(&chars, i)?;
            let expr: String = chars[i + 1..end].iter().collect();
            out.push_str(&eval_expression(&expr, now)?);
            i = end + 1;
        } else if chars[i] == '}' {
            return None;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }

    Some(out)
}

/// Finds the brace closing the one at `open`, allowing one nested level for
/// the format block
fn matching_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, c) in chars.iter().enumerate().skip(open) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Evaluates one `now[math][{format}]` expression
fn eval_expression(expr: &str, now: DateTime<Utc>) -> Option<String> {
    let (math, format) = match expr.find('{') {
        Some(pos) => {
            if !expr.ends_with('}') {
                return None;
            }
            let format = &expr[pos + 1..expr.len() - 1];
            // a trailing |zone qualifier is accepted but the resolver only
            // computes in UTC
            let format = format.split('|').next().unwrap_or(format);
            (&expr[..pos], format)
        }
        None => (expr, "yyyy.MM.dd"),
    };

    let math = math.strip_prefix("now")?;
    let resolved = apply_math(now, math)?;
    Some(resolved.format(&joda_to_chrono(format)).to_string())
}

/// Applies a sequence of `+Nu`, `-Nu` and `/u` operations
fn apply_math(mut value: DateTime<Utc>, math: &str) -> Option<DateTime<Utc>> {
    let chars: Vec<char> = math.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '/' => {
                let unit = *chars.get(i + 1)?;
                value = round_down(value, unit)?;
                i += 2;
            }
            sign @ ('+' | '-') => {
                i += 1;
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let amount: i64 = chars[start..i].iter().collect::<String>().parse().ok()?;
                let amount = if sign == '-' { -amount } else { amount };
                let unit = *chars.get(i)?;
                value = shift(value, amount, unit)?;
                i += 1;
            }
            _ => return None,
        }
    }

    Some(value)
}

fn shift(value: DateTime<Utc>, amount: i64, unit: char) -> Option<DateTime<Utc>> {
    match unit {
        'y' => shift_months(value, amount.checked_mul(12)?),
        'M' => shift_months(value, amount),
        'w' => value.checked_add_signed(Duration::weeks(amount)),
        'd' => value.checked_add_signed(Duration::days(amount)),
        'h' | 'H' => value.checked_add_signed(Duration::hours(amount)),
        'm' => value.checked_add_signed(Duration::minutes(amount)),
        's' => value.checked_add_signed(Duration::seconds(amount)),
        _ => None,
    }
}

fn shift_months(value: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let months_abs = u32::try_from(months.unsigned_abs()).ok()?;
    if months >= 0 {
        value.checked_add_months(Months::new(months_abs))
    } else {
        value.checked_sub_months(Months::new(months_abs))
    }
}

fn round_down(value: DateTime<Utc>, unit: char) -> Option<DateTime<Utc>> {
    let midnight = |v: DateTime<Utc>| {
        Utc.with_ymd_and_hms(v.year(), v.month(), v.day(), 0, 0, 0)
            .single()
    };

    match unit {
        'y' => Utc.with_ymd_and_hms(value.year(), 1, 1, 0, 0, 0).single(),
        'M' => Utc
            .with_ymd_and_hms(value.year(), value.month(), 1, 0, 0, 0)
            .single(),
        'w' => {
            let days_from_monday = value.weekday().num_days_from_monday() as i64;
            midnight(value.checked_sub_signed(Duration::days(days_from_monday))?)
        }
        'd' => midnight(value),
        'h' | 'H' => value.with_minute(0)?.with_second(0)?.with_nanosecond(0),
        'm' => value.with_second(0)?.with_nanosecond(0),
        's' => value.with_nanosecond(0),
        _ => None,
    }
}

/// Translates the supported subset of joda-style format tokens
fn joda_to_chrono(format: &str) -> String {
    let mut out = String::with_capacity(format.len());
    let chars: Vec<char> = format.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let run_char = chars[i];
        let mut run = 0;
        while i + run < chars.len() && chars[i + run] == run_char {
            run += 1;
        }

        match (run_char, run) {
            ('y', 4) => out.push_str("%Y"),
            ('y', 2) => out.push_str("%y"),
            ('M', 2) => out.push_str("%m"),
            ('d', 2) => out.push_str("%d"),
            ('H', 2) => out.push_str("%H"),
            ('m', 2) => out.push_str("%M"),
            ('s', 2) => out.push_str("%S"),
            _ => {
                for _ in 0..run {
                    out.push(run_char);
                }
            }
        }
        i += run;
    }

    out
}
