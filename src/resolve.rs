//! Scalar resolution (YAML 1.2 core schema).
//!
//! Turns the text of a scalar node, together with its style and tag, into a typed [`Value`].
//! Errors carry no location; the decoder attaches the node position.

use saphyr_parser::ScalarStyle;

use crate::de::Cfg;
use crate::error::Error;
use crate::tags::CoreTag;
use crate::value::Value;

/// Resolve one scalar.
pub(crate) fn resolve_scalar(
    text: &str,
    style: ScalarStyle,
    tag: Option<&str>,
    cfg: &Cfg,
) -> Result<Value, Error> {
    let core = CoreTag::classify(tag);
    if core.keeps_text() {
        return Ok(Value::String(text.to_owned()));
    }
    match core {
        CoreTag::Null => {
            if is_null_literal(text.trim()) {
                Ok(Value::Null)
            } else {
                Err(Error::invalid_scalar(format!("invalid !!null value `{text}`")))
            }
        }
        CoreTag::Bool => parse_bool(text.trim(), cfg)
            .map(Value::Bool)
            .ok_or_else(|| Error::invalid_scalar(format!("invalid !!bool value `{text}`"))),
        CoreTag::Int => parse_int(text.trim(), cfg.legacy_octal_numbers)
            .and_then(|n| i64::try_from(n).ok())
            .map(Value::Int)
            .ok_or_else(|| Error::invalid_scalar(format!("invalid !!int value `{text}`"))),
        CoreTag::Float => parse_float(text.trim())
            .or_else(|| parse_int(text.trim(), cfg.legacy_octal_numbers).map(|n| n as f64))
            .map(Value::Float)
            .ok_or_else(|| Error::invalid_scalar(format!("invalid !!float value `{text}`"))),
        _ => {
            if matches!(style, ScalarStyle::Plain) {
                Ok(resolve_plain(text, cfg))
            } else {
                Ok(Value::String(text.to_owned()))
            }
        }
    }
}

/// Untagged plain scalar: null, bool, int, float, then string.
fn resolve_plain(text: &str, cfg: &Cfg) -> Value {
    if is_null_literal(text) {
        return Value::Null;
    }
    if let Some(b) = parse_bool(text, cfg) {
        return Value::Bool(b);
    }
    if let Some(n) = parse_int(text, cfg.legacy_octal_numbers) {
        return match i64::try_from(n) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Float(n as f64),
        };
    }
    if let Some(f) = parse_float(text) {
        return Value::Float(f);
    }
    Value::String(text.to_owned())
}

/// True if plain `text` reads back as a string under the default schema.
pub(crate) fn resolves_to_string(text: &str) -> bool {
    matches!(resolve_plain(text, &Cfg::default()), Value::String(_))
}

pub(crate) fn is_null_literal(s: &str) -> bool {
    matches!(s, "" | "~" | "null" | "Null" | "NULL")
}

fn parse_bool(s: &str, cfg: &Cfg) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ if cfg.yaml11_booleans => parse_yaml11_bool(s),
        _ => None,
    }
}

/// Parse a YAML 1.1 boolean (handles the "Norway problem" only when asked to).
///
/// Accepted TRUE literals (case-insensitive): "y", "yes", "true", "on"
/// Accepted FALSE literals (case-insensitive): "n", "no", "false", "off"
fn parse_yaml11_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true")
        || s.eq_ignore_ascii_case("yes")
        || s.eq_ignore_ascii_case("y")
        || s.eq_ignore_ascii_case("on")
    {
        Some(true)
    } else if s.eq_ignore_ascii_case("false")
        || s.eq_ignore_ascii_case("no")
        || s.eq_ignore_ascii_case("n")
        || s.eq_ignore_ascii_case("off")
    {
        Some(false)
    } else {
        None
    }
}

/// Accumulate digits in the given radix, skipping `_` separators.
fn parse_digits_u128(digits: &str, radix: u32) -> Option<u128> {
    let mut val: u128 = 0;
    let mut saw = false;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        let d = c.to_digit(radix)?;
        val = val.checked_mul(radix as u128)?.checked_add(d as u128)?;
        saw = true;
    }
    if saw { Some(val) } else { None }
}

/// Parse an integer literal: decimal, `0x`, `0o`, `0b`, optional sign.
///
/// With `legacy_octal`, values starting with `00` are read as base 8.
fn parse_int(s: &str, legacy_octal: bool) -> Option<i128> {
    let (neg, rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let (radix, digits) = if let Some(r) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        (16, r)
    } else if let Some(r) = rest.strip_prefix("0o").or_else(|| rest.strip_prefix("0O")) {
        (8, r)
    } else if let Some(r) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        (2, r)
    } else if legacy_octal && rest.starts_with("00") {
        (8, &rest[2..])
    } else {
        (10, rest)
    };

    let mag = parse_digits_u128(digits, radix)?;
    if neg {
        if mag == (i128::MAX as u128) + 1 {
            return Some(i128::MIN);
        }
        i128::try_from(mag).ok().map(|m| -m)
    } else {
        i128::try_from(mag).ok()
    }
}

/// Parse a YAML 1.2 float, including `.inf` / `.nan` spellings.
///
/// Rust's own parser also accepts `inf` and `NaN`; those stay strings in YAML.
fn parse_float(s: &str) -> Option<f64> {
    match s.to_ascii_lowercase().as_str() {
        ".nan" => return Some(f64::NAN),
        ".inf" | "+.inf" => return Some(f64::INFINITY),
        "-.inf" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    let bytes = s.as_bytes();
    if !bytes.iter().any(u8::is_ascii_digit) {
        return None;
    }
    let allowed = |b: &u8| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-' | b'_');
    if !bytes.iter().all(allowed) {
        return None;
    }
    let cleaned: String = s.chars().filter(|c| *c != '_').collect();
    cleaned.parse::<f64>().ok()
}
