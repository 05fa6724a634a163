//! Minimal flow-style YAML rendering.
//!
//! Produces the compact single-line text that labels composite keys (`{a: 1, b: [x, y]}`)
//! and backs `Display` for [`Value`]. The output is stable for a given value and parses back
//! to an equal value, but it is never used to decide equality.

use std::fmt::{self, Write};

use crate::error::Error;
use crate::resolve;
use crate::value::Value;

/// Render `value` as minimal flow YAML.
///
/// ```rust
/// let value = yaml_keys::from_str("{a: 1, b: [x, 'true']}").unwrap();
/// assert_eq!(yaml_keys::to_flow_string(&value).unwrap(), r#"{a: 1, b: [x, "true"]}"#);
/// ```
pub fn to_flow_string(value: &Value) -> Result<String, Error> {
    let mut out = String::new();
    write_flow(&mut out, value).map_err(|_| Error::KeySerialization {
        msg: format!("formatter failed while rendering a {}", value.type_name()),
    })?;
    Ok(out)
}

pub(crate) fn write_flow<W: Write + ?Sized>(out: &mut W, value: &Value) -> fmt::Result {
    match value {
        Value::Null => out.write_str("null"),
        Value::Bool(true) => out.write_str("true"),
        Value::Bool(false) => out.write_str("false"),
        Value::Int(n) => write!(out, "{n}"),
        Value::Float(f) => write_float(out, *f),
        Value::String(s) => write_string(out, s),
        Value::Sequence(items) => {
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_flow(out, item)?;
            }
            out.write_char(']')
        }
        Value::Map(map) => {
            out.write_char('{')?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_flow(out, key.data())?;
                out.write_str(": ")?;
                write_flow(out, item)?;
            }
            out.write_char('}')
        }
    }
}

/// Write a float so that it reads back as a float (zmij may render `4e-6`, YAML wants `4.0e-6`).
fn write_float<W: Write + ?Sized>(out: &mut W, f: f64) -> fmt::Result {
    if f.is_nan() {
        return out.write_str(".nan");
    }
    if f.is_infinite() {
        return out.write_str(if f.is_sign_positive() { ".inf" } else { "-.inf" });
    }
    let mut buf = zmij::Buffer::new();
    let s = buf.format_finite(f);
    if s.contains('.') {
        return out.write_str(s);
    }
    match s.find(['e', 'E']) {
        Some(exp_pos) => {
            out.write_str(&s[..exp_pos])?;
            out.write_str(".0")?;
            out.write_str(&s[exp_pos..])
        }
        None => {
            out.write_str(s)?;
            out.write_str(".0")
        }
    }
}

fn write_string<W: Write + ?Sized>(out: &mut W, s: &str) -> fmt::Result {
    if is_plain_flow_safe(s) {
        return out.write_str(s);
    }
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            '\r' => out.write_str("\\r")?,
            '\0' => out.write_str("\\0")?,
            c if (c as u32) < 0x20 || c == '\u{7f}' => write!(out, "\\x{:02X}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

/// True if `s` can appear unquoted inside a flow collection and still read back as this string.
fn is_plain_flow_safe(s: &str) -> bool {
    let Some(first) = s.bytes().next() else {
        return false;
    };
    if first.is_ascii_whitespace() || s.ends_with(char::is_whitespace) {
        return false;
    }
    if matches!(
        first,
        b'-' | b'?'
            | b':'
            | b'['
            | b']'
            | b'{'
            | b'}'
            | b'#'
            | b'&'
            | b'*'
            | b'!'
            | b'|'
            | b'>'
            | b'\''
            | b'"'
            | b'%'
            | b'@'
            | b'`'
            | b','
            | b'.'
    ) {
        return false;
    }
    // `: ` would start a value and a bare `<<` key would merge.
    if s.contains(": ") || s.ends_with(':') || s == "<<" {
        return false;
    }
    // `#` may start a comment; the rest are flow indicators.
    if s
        .chars()
        .any(|c| c.is_control() || matches!(c, ',' | '[' | ']' | '{' | '}' | '#'))
    {
        return false;
    }
    // Plain text that would resolve to null, a bool or a number must be quoted. YAML 1.1
    // booleans are quoted too so the text survives readers that still honor them.
    if matches!(
        s.to_ascii_lowercase().as_str(),
        "y" | "yes" | "n" | "no" | "on" | "off"
    ) {
        return false;
    }
    resolve::resolves_to_string(s)
}
