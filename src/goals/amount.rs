use crate::goals::validate::FieldMark;
use regex::Regex;
use std::sync::OnceLock;

pub const AMOUNT_MIN: f64 = 100.0;
pub const AMOUNT_MAX: f64 = 10_000_000.0;
pub const AMOUNT_RANGE_MESSAGE: &str = "Amount must be between $100 and $10,000,000";

/// Result of running the amount field's input handler over raw text.
#[derive(Clone, Debug, PartialEq)]
pub struct AmountInput {
    pub cleaned: String,
    pub mark: FieldMark,
}

fn float_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|\d+\.?\d*(?:[eE][+-]?\d+)?|\.\d+(?:[eE][+-]?\d+)?)")
            .expect("float prefix pattern is valid")
    })
}

// Longest leading decimal literal, NaN when there is none ("12.5abc" -> 12.5).
pub fn parse_float_prefix(text: &str) -> f64 {
    let t = text.trim_start();
    float_prefix_re()
        .find(t)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn keep_last(value: &str, sep: char) -> String {
    if value.matches(sep).count() <= 1 {
        return value.to_string();
    }
    match value.rfind(sep) {
        Some(idx) => {
            let head: String = value[..idx].chars().filter(|c| *c != sep).collect();
            format!("{head}{}", &value[idx..])
        }
        None => value.to_string(),
    }
}

/// Keeps digits, commas and periods, then collapses repeated separators so only
/// the last comma and the last period survive.
pub fn clean_amount_text(raw: &str) -> String {
    let value: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let value = keep_last(&value, ',');
    keep_last(&value, '.')
}

/// Parses amount text with commas ignored. `None` means unset or outside
/// [AMOUNT_MIN, AMOUNT_MAX].
pub fn parse_investment_amount(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    let v = parse_float_prefix(&text.replace(',', ""));
    if (AMOUNT_MIN..=AMOUNT_MAX).contains(&v) {
        Some(v)
    } else {
        None
    }
}

/// Input handler for the amount field. Only a parsed, non-zero number outside the
/// range marks the field invalid; leftover non-numeric text is still written back.
pub fn format_amount_input(raw: &str) -> AmountInput {
    let cleaned = clean_amount_text(raw);
    let v = parse_float_prefix(&cleaned.replace(',', ""));
    let out_of_range = v != 0.0 && !v.is_nan() && !(AMOUNT_MIN..=AMOUNT_MAX).contains(&v);
    let mark = if out_of_range {
        FieldMark::invalid(Some(AMOUNT_RANGE_MESSAGE))
    } else {
        FieldMark::valid()
    };
    AmountInput { cleaned, mark }
}

/// Submit-time check: empty is fine, anything else must parse in range.
pub fn validate_amount(text: &str) -> (bool, FieldMark) {
    if !text.is_empty() && parse_investment_amount(text).is_none() {
        (false, FieldMark::invalid(Some(AMOUNT_RANGE_MESSAGE)))
    } else {
        (true, FieldMark::valid())
    }
}

// Adds one to a string of decimal digits ("999" -> "1000").
fn increment_digits(digits: &str) -> String {
    let mut out: Vec<u8> = digits.bytes().collect();
    for b in out.iter_mut().rev() {
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            return String::from_utf8_lossy(&out).into_owned();
        }
    }
    format!("1{}", String::from_utf8_lossy(&out))
}

/// en-US grouping with at most three fraction digits: 1234567.5 -> "1,234,567.5".
/// Rounds the shortest decimal form of `v` half away from zero, so 100.0625
/// becomes "100.063".
pub fn format_amount(v: f64) -> String {
    let repr = format!("{}", v.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let mut frac: Vec<u8> = frac_part.bytes().take(3).collect();
    frac.resize(3, b'0');
    let mut frac = String::from_utf8_lossy(&frac).into_owned();
    let mut int_part = int_part.to_string();
    if frac_part.as_bytes().get(3).is_some_and(|d| *d >= b'5') {
        frac = increment_digits(&frac);
        if frac.len() > 3 {
            frac = "000".to_string();
            int_part = increment_digits(&int_part);
        }
    }
    let frac = frac.trim_end_matches('0');
    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*d);
    }
    let sign = if v < 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}
