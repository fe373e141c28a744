//! Stable record keys for sources without a usable identifier

use crate::record::types::{is_absent, value_to_string};
use md5::{Digest, Md5};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Compute a 32-character lowercase hex MD5 key for a record.
///
/// With attribute names, the key covers only those attributes: the names are sorted,
/// and each value has its whitespace collapsed and is upper-cased, so the key ignores
/// argument order, spacing and case. Missing attributes still take their slot.
///
/// With no attribute names the whole record is hashed through its canonical JSON text.
pub fn compute_record_hash<S: AsRef<str>>(
    record: &Map<String, Value>,
    attribute_names: &[S],
) -> String {
    let input = if attribute_names.is_empty() {
        canonical_json(&Value::Object(record.clone()))
    } else {
        attribute_key(record, attribute_names)
    };
    hex::encode(Md5::digest(input.as_bytes()))
}

fn attribute_key<S: AsRef<str>>(record: &Map<String, Value>, attribute_names: &[S]) -> String {
    let mut names: Vec<&str> = attribute_names.iter().map(AsRef::as_ref).collect();
    names.sort_unstable();

    let mut key = String::new();
    for name in names {
        if let Some(value) = record.get(name).filter(|v| !is_absent(v)) {
            let text = value_to_string(value);
            let collapsed = WHITESPACE_RUN.replace_all(text.trim(), " ");
            key.push_str(&collapsed.to_uppercase());
        }
        key.push('|');
    }
    key
}

/// Serialize a value as sorted-key, ASCII-only JSON text with `", "` and `": "` separators.
///
/// Non-ASCII characters are written as lowercase `\uXXXX` escapes, so the text (and any
/// key hashed from it) does not depend on how the input was encoded.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => out.push_str(&i.to_string()),
            (_, Some(u), _) => out.push_str(&u.to_string()),
            (_, _, Some(f)) => write_float(f, out),
            _ => out.push_str(&n.to_string()),
        },
        Value::String(s) => write_ascii_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_ascii_string(key, out);
                out.push_str(": ");
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

/// Shortest round-trip digits; positional between 1e-4 and 1e16, scientific outside it
/// with a signed, two-digit minimum exponent (`1e-07`, `1.5e+20`). Whole values keep a
/// trailing `.0`.
fn write_float(f: f64, out: &mut String) {
    let sci = format!("{:e}", f);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if negative {
        out.push('-');
    }
    if !(-4..16).contains(&exponent) {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        out.push_str(&format!("e{}{:02}", sign, exponent.abs()));
    } else if exponent < 0 {
        out.push_str("0.");
        out.push_str(&"0".repeat((-exponent - 1) as usize));
        out.push_str(&digits);
    } else {
        let int_len = exponent as usize + 1;
        if digits.len() > int_len {
            out.push_str(&digits[..int_len]);
            out.push('.');
            out.push_str(&digits[int_len..]);
        } else {
            out.push_str(&digits);
            out.push_str(&"0".repeat(int_len - digits.len()));
            out.push_str(".0");
        }
    }
}

fn write_ascii_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_hash_shape() {
        let hash = compute_record_hash(&object(json!({"A": "foo"})), &["A"]);

        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_attribute_order_does_not_matter() {
        let left = compute_record_hash(&object(json!({"A": "foo", "B": "bar"})), &["B", "A"]);
        let right = compute_record_hash(&object(json!({"B": "bar", "A": "foo"})), &["A", "B"]);

        assert_eq!(left, right);
    }

    #[test]
    fn test_attribute_known_digest() {
        let hash = compute_record_hash(&object(json!({"A": "foo", "B": "bar"})), &["B", "A"]);

        // md5("FOO|BAR|")
        assert_eq!(hash, "dbaef1ffe6007d2ad2c7f25da38bc65c");
    }

    #[test]
    fn test_case_and_spacing_are_normalized() {
        let left = compute_record_hash(&object(json!({"A": "Foo  Bar"})), &["A"]);
        let right = compute_record_hash(&object(json!({"A": " foo\tbar "})), &["A"]);

        assert_eq!(left, right);
    }

    #[test]
    fn test_attribute_key_keeps_slots() {
        let record = object(json!({"A": "foo  bar", "C": null, "D": 7}));

        assert_eq!(attribute_key(&record, &["D", "C", "B", "A"]), "FOO BAR|||7|");
    }

    #[test]
    fn test_values_in_different_slots_differ() {
        let left = compute_record_hash(&object(json!({"A": "x"})), &["A", "B"]);
        let right = compute_record_hash(&object(json!({"B": "x"})), &["A", "B"]);

        assert_ne!(left, right);
    }

    #[test]
    fn test_whole_record_ignores_key_order() {
        let left = object(json!({"a": 1, "b": {"y": 2, "x": 1}}));
        let right = object(json!({"b": {"x": 1, "y": 2}, "a": 1}));

        assert_eq!(
            compute_record_hash::<&str>(&left, &[]),
            compute_record_hash::<&str>(&right, &[])
        );
    }

    #[test]
    fn test_whole_record_known_digest() {
        assert_eq!(
            compute_record_hash::<&str>(&Map::new(), &[]),
            "99914b932bd37a50b983c5e7c90ae93b"
        );
    }

    #[test]
    fn test_canonical_json_text() {
        let value = json!({
            "name": "Zoë \"Z\"",
            "age": 30,
            "tags": ["a", null, true],
            "empty": {}
        });

        assert_eq!(
            canonical_json(&value),
            r#"{"age": 30, "empty": {}, "name": "Zo\u00eb \"Z\"", "tags": ["a", null, true]}"#
        );
    }

    #[test]
    fn test_canonical_float_forms() {
        let cases = [
            ("1e-7", "1e-07"),
            ("0.00001", "1e-05"),
            ("0.0001", "0.0001"),
            ("1.5", "1.5"),
            ("123.456", "123.456"),
            ("100.0", "100.0"),
            ("-0.0", "-0.0"),
            ("1e15", "1000000000000000.0"),
            ("1e16", "1e+16"),
            ("2.5e-300", "2.5e-300"),
            ("-42", "-42"),
            ("18446744073709551615", "18446744073709551615"),
        ];
        for (input, expected) in cases {
            let value: Value = serde_json::from_str(input).unwrap();
            assert_eq!(canonical_json(&value), expected, "input {}", input);
        }
    }

    #[test]
    fn test_integers_past_u64_hash_as_floats() {
        let value: Value = serde_json::from_str("123456789012345678901").unwrap();
        assert_eq!(canonical_json(&value), "1.2345678901234568e+20");
    }

    #[test]
    fn test_canonical_json_escapes_astral_chars() {
        assert_eq!(canonical_json(&json!("😀\n")), r#""\ud83d\ude00\n""#);
    }
}
