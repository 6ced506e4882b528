//! Declared token types to host kinds, and JSON values to host values.
//!
//! Coercion never fails: a value that does not fit its kind is replaced
//! by the kind's default (opaque black, `0`, `""`, `false`) and the
//! problem is reported back so the caller can raise a warning.

use serde_json::Value;

use tokensync_host::{HostValue, Rgba, ValueKind};

/// Outcome of coercing one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: HostValue,
    /// Set when the default was substituted.
    pub problem: Option<String>,
}

impl Coerced {
    fn ok(value: HostValue) -> Self {
        Coerced {
            value,
            problem: None,
        }
    }

    fn fallback(kind: ValueKind, problem: String) -> Self {
        Coerced {
            value: placeholder(kind),
            problem: Some(problem),
        }
    }
}

/// Map a declared token type to a host kind. Unknown types are strings.
pub fn kind_for_type(token_type: &str) -> ValueKind {
    match token_type.trim().to_ascii_lowercase().as_str() {
        "color" | "colour" => ValueKind::Color,
        "number" | "float" | "integer" | "dimension" | "spacing" | "sizing" | "size"
        | "fontsize" | "fontweight" | "lineheight" | "letterspacing" | "borderradius"
        | "borderwidth" | "opacity" | "duration" => ValueKind::Number,
        "boolean" | "bool" => ValueKind::Boolean,
        _ => ValueKind::String,
    }
}

/// The value written for a kind before anything better is known.
pub fn placeholder(kind: ValueKind) -> HostValue {
    match kind {
        ValueKind::Color => HostValue::Color(Rgba::BLACK),
        ValueKind::Number => HostValue::Number(0.0),
        ValueKind::String => HostValue::String(String::new()),
        ValueKind::Boolean => HostValue::Boolean(false),
    }
}

pub fn coerce(kind: ValueKind, value: &Value) -> Coerced {
    match kind {
        ValueKind::Color => match parse_color(value) {
            Some(rgba) => Coerced::ok(HostValue::Color(rgba)),
            None => Coerced::fallback(kind, format!("malformed colour {}", value)),
        },
        ValueKind::Number => match parse_number(value) {
            Some(n) => Coerced::ok(HostValue::Number(n)),
            None => Coerced::fallback(kind, format!("not a number: {}", value)),
        },
        ValueKind::Boolean => match value {
            Value::Bool(b) => Coerced::ok(HostValue::Boolean(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => {
                Coerced::ok(HostValue::Boolean(true))
            }
            Value::String(s) if s.eq_ignore_ascii_case("false") => {
                Coerced::ok(HostValue::Boolean(false))
            }
            other => Coerced::fallback(kind, format!("not a boolean: {}", other)),
        },
        ValueKind::String => match value {
            Value::String(s) => Coerced::ok(HostValue::String(s.clone())),
            Value::Null => Coerced::fallback(kind, "null string value".to_string()),
            other => Coerced::ok(HostValue::String(other.to_string())),
        },
    }
}

/// Parse a hex string or an `{r, g, b, a}` object into normalized channels.
pub fn parse_color(value: &Value) -> Option<Rgba> {
    match value {
        Value::String(s) => parse_hex(s),
        Value::Object(map) => {
            let channel = |key: &str| map.get(key).and_then(Value::as_f64);
            let (r, g, b) = (channel("r")?, channel("g")?, channel("b")?);
            let a = match map.get("a") {
                Some(v) => v.as_f64()?,
                None => 1.0,
            };
            // 0-255 channels are accepted and scaled down.
            let scale = if r > 1.0 || g > 1.0 || b > 1.0 { 255.0 } else { 1.0 };
            let norm = |c: f64| (c / scale).clamp(0.0, 1.0);
            if [r, g, b, a].iter().any(|c| !c.is_finite() || *c < 0.0) {
                return None;
            }
            Some(Rgba {
                r: norm(r),
                g: norm(g),
                b: norm(b),
                a: a.clamp(0.0, 1.0),
            })
        }
        _ => None,
    }
}

fn parse_hex(s: &str) -> Option<Rgba> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digits: Vec<u8> = match hex.len() {
        // short forms double each digit
        3 | 4 => hex.chars().flat_map(|c| [c, c]).map(|c| c as u8).collect(),
        6 | 8 => hex.bytes().collect(),
        _ => return None,
    };
    let byte = |i: usize| -> Option<f64> {
        let pair = std::str::from_utf8(&digits[i * 2..i * 2 + 2]).ok()?;
        u8::from_str_radix(pair, 16).ok().map(|b| f64::from(b) / 255.0)
    };
    let a = if digits.len() == 8 { byte(3)? } else { 1.0 };
    Some(Rgba {
        r: byte(0)?,
        g: byte(1)?,
        b: byte(2)?,
        a,
    })
}

/// JSON numbers, or numeric strings with an optional unit suffix (`16px`).
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let t = s.trim();
            let numeric = |(i, c): &(usize, char)| {
                c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))
            };
            let end = t
                .char_indices()
                .find(|ic| !numeric(ic))
                .map(|(i, _)| i)
                .unwrap_or(t.len());
            let (num, unit) = t.split_at(end);
            if !unit.chars().all(|c| c.is_ascii_alphabetic() || c == '%') {
                return None;
            }
            num.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn type_mapping_is_case_insensitive() {
        assert_eq!(kind_for_type("COLOR"), ValueKind::Color);
        assert_eq!(kind_for_type("FLOAT"), ValueKind::Number);
        assert_eq!(kind_for_type("dimension"), ValueKind::Number);
        assert_eq!(kind_for_type("boolean"), ValueKind::Boolean);
        assert_eq!(kind_for_type("fontFamily"), ValueKind::String);
    }

    #[test]
    fn parses_every_hex_form() {
        let white = parse_color(&json!("#fff")).unwrap();
        assert!(approx(white.r, 1.0) && approx(white.a, 1.0));

        let half = parse_color(&json!("#0000ff80")).unwrap();
        assert!(approx(half.b, 1.0));
        assert!(approx(half.a, 128.0 / 255.0));

        let short_alpha = parse_color(&json!("#f008")).unwrap();
        assert!(approx(short_alpha.r, 1.0));
        assert!(approx(short_alpha.a, 136.0 / 255.0));

        let gray = parse_color(&json!("#F5F5F5")).unwrap();
        assert!(approx(gray.g, 245.0 / 255.0));
    }

    #[test]
    fn parses_channel_objects() {
        let c = parse_color(&json!({"r": 1.0, "g": 0.5, "b": 0.0})).unwrap();
        assert!(approx(c.g, 0.5) && approx(c.a, 1.0));

        let scaled = parse_color(&json!({"r": 255, "g": 0, "b": 51, "a": 0.5})).unwrap();
        assert!(approx(scaled.r, 1.0) && approx(scaled.b, 0.2) && approx(scaled.a, 0.5));
    }

    #[test]
    fn malformed_colour_falls_back_to_black() {
        for bad in [json!("#ggg"), json!("red"), json!("#12345"), json!(12), json!({"r": 1})] {
            let out = coerce(ValueKind::Color, &bad);
            assert_eq!(out.value, HostValue::Color(Rgba::BLACK), "{}", bad);
            assert!(out.problem.is_some());
        }
    }

    #[test]
    fn numbers_accept_unit_suffix() {
        assert_eq!(parse_number(&json!(16)), Some(16.0));
        assert_eq!(parse_number(&json!("16px")), Some(16.0));
        assert_eq!(parse_number(&json!("1.5rem")), Some(1.5));
        assert_eq!(parse_number(&json!("-2")), Some(-2.0));
        assert_eq!(parse_number(&json!("50%")), Some(50.0));
        assert_eq!(parse_number(&json!("px16")), None);
        assert_eq!(parse_number(&json!("1px2")), None);
    }

    #[test]
    fn failed_number_and_boolean_use_defaults() {
        let n = coerce(ValueKind::Number, &json!("wide"));
        assert_eq!(n.value, HostValue::Number(0.0));
        assert!(n.problem.is_some());

        let b = coerce(ValueKind::Boolean, &json!("yes"));
        assert_eq!(b.value, HostValue::Boolean(false));
        assert!(b.problem.is_some());

        let ok = coerce(ValueKind::Boolean, &json!("TRUE"));
        assert_eq!(ok, Coerced::ok(HostValue::Boolean(true)));
    }

    #[test]
    fn strings_stringify_scalars() {
        assert_eq!(
            coerce(ValueKind::String, &json!("Inter")).value,
            HostValue::String("Inter".to_string())
        );
        assert_eq!(
            coerce(ValueKind::String, &json!(400)).value,
            HostValue::String("400".to_string())
        );
    }
}
