// src/utils/serialization.rs
//! Canonical JSON serialization for commitment hashing.
//!
//! Target hashes embedded in already-issued credentials were computed over a
//! specific byte encoding of each field. Any deviation (a different float
//! layout, an unescaped slash, a raw UTF-8 character) yields a different
//! digest, so this encoder reproduces that encoding exactly:
//!
//! - no whitespace, object keys in insertion order
//! - `/` escaped as `\/`
//! - every non-ASCII character escaped as lowercase `\uXXXX`
//!   (UTF-16 surrogate pairs above the BMP)
//! - control characters as `\b \f \n \r \t`, otherwise `\u00XX`
//! - integers verbatim; floats in shortest round-trip form, integral floats
//!   without a fraction (`4.0` as `4`), switching to `1.0e+25` style outside
//!   `1e-4..1e17`
//! - empty objects, and objects keyed exactly `"0".."n-1"` in order, encode
//!   as arrays

use serde_json::{Map, Number, Value};
use std::fmt::Write;

/// Significant-digit threshold above which floats switch to exponent form.
const FLOAT_FIXED_MAX_EXPONENT: i32 = 17;

/// Serializes a JSON value into its canonical string form.
///
/// # Arguments
/// * `value` - Any JSON value
///
/// # Returns
/// The canonical encoding. Never fails: every `serde_json::Value` has one.
pub fn to_canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Serializes a single-entry object `{key: value}`.
pub fn single_entry(key: &str, value: &Value) -> String {
    let mut map = Map::new();
    map.insert(key.to_string(), value.clone());
    to_canonical_string(&Value::Object(map))
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => write_array(out, items.iter()),
        Value::Object(map) => {
            if is_list_like(map) {
                write_array(out, map.values());
            } else {
                out.push('{');
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_string(out, key);
                    out.push(':');
                    write_value(out, item);
                }
                out.push('}');
            }
        }
    }
}

fn write_array<'a>(out: &mut String, items: impl Iterator<Item = &'a Value>) {
    out.push('[');
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_value(out, item);
    }
    out.push(']');
}

// Objects with no keys, or keys "0", "1", ... in order, were arrays once decoded.
fn is_list_like(map: &Map<String, Value>) -> bool {
    map.keys()
        .enumerate()
        .all(|(i, key)| key.as_str() == i.to_string())
}

fn write_number(out: &mut String, n: &Number) {
    if let Some(i) = n.as_i64() {
        let _ = write!(out, "{}", i);
    } else if let Some(u) = n.as_u64() {
        // Beyond i64 the value was decoded as a float.
        out.push_str(&format_float(u as f64));
    } else if let Some(f) = n.as_f64() {
        out.push_str(&format_float(f));
    }
}

/// Formats a float the way credential issuers encoded it.
///
/// Starts from Rust's shortest round-trip digits and lays them out in fixed
/// notation when the decimal exponent is within `-3..=17`, exponent notation
/// otherwise. Fixed notation drops the fraction of integral values; exponent
/// notation always keeps one mantissa digit after the point.
pub fn format_float(f: f64) -> String {
    if !f.is_finite() {
        return "0".to_string();
    }

    let sci = format!("{:e}", f.abs());
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    // Position of the decimal point relative to the first digit.
    let decpt = exponent + 1;

    let mut out = String::new();
    if f.is_sign_negative() {
        out.push('-');
    }

    if decpt < -3 || decpt > FLOAT_FIXED_MAX_EXPONENT {
        out.push_str(&digits[..1]);
        out.push('.');
        if digits.len() > 1 {
            out.push_str(&digits[1..]);
        } else {
            out.push('0');
        }
        let exp = decpt - 1;
        let _ = write!(out, "e{}{}", if exp < 0 { '-' } else { '+' }, exp.abs());
    } else if decpt <= 0 {
        out.push_str("0.");
        out.push_str(&"0".repeat((-decpt) as usize));
        out.push_str(&digits);
    } else {
        let point = decpt as usize;
        if digits.len() <= point {
            out.push_str(&digits);
            out.push_str(&"0".repeat(point - digits.len()));
        } else {
            out.push_str(&digits[..point]);
            out.push('.');
            out.push_str(&digits[point..]);
        }
    }
    out
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{:04x}", unit);
                }
            }
        }
    }
    out.push('"');
}
