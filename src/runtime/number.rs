//! Numeric literal parsing and the number ↔ string conversions.

use crate::error::RuntimeError;

/// Split a radix prefix (`0b`, `0o`, `0x`, any case) off a literal.
fn radix_prefix(text: &str) -> Option<(u32, &str)> {
    let bytes = text.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'b' | b'B' => 2,
        b'o' | b'O' => 8,
        b'x' | b'X' => 16,
        _ => return None,
    };
    Some((radix, &text[2..]))
}

/// Evaluate the text of a NumericLiteral token.
///
/// Radix literals are checked digit by digit; the first digit outside the
/// radix is reported.
pub fn parse_numeric_literal(text: &str) -> Result<f64, RuntimeError> {
    let invalid = |digit: char, radix: u32| RuntimeError::InvalidNumericLiteral {
        literal: text.to_string(),
        digit,
        radix,
    };

    if let Some((radix, digits)) = radix_prefix(text) {
        if digits.is_empty() {
            return Err(invalid('0', radix));
        }
        return digits.chars().try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix)
                .map(|d| acc * f64::from(radix) + f64::from(d))
                .ok_or_else(|| invalid(c, radix))
        });
    }

    if let Some(bad) = text.chars().find(|c| !c.is_ascii_digit() && *c != '.') {
        return Err(invalid(bad, 10));
    }
    text.parse::<f64>().map_err(|_| invalid('.', 10))
}

/// ToNumber applied to a string.
pub fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if radix_prefix(trimmed).is_some() {
        return parse_numeric_literal(trimmed).unwrap_or(f64::NAN);
    }
    let decimal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !decimal {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// ToString applied to a number: shortest round-trip digits, exponent form
/// outside `[1e-6, 1e21)`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{n}");
    }
    let exponential = format!("{n:e}");
    match exponential.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => exponential,
    }
}
