//! Recognizers for quoted, numeric and f-string literals.

/// Interior of a literal whose first and last characters are the same quote.
///
/// A lone quote character counts as a literal with an empty interior.
pub fn unquote(text: &str) -> Option<&str> {
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    if !text.ends_with(quote) {
        return None;
    }
    if text.len() < 2 {
        return Some("");
    }
    Some(&text[1..text.len() - 1])
}

/// Interior of an `f"..."` / `f'...'` literal.
///
/// Drops the two-character prefix and the final character without checking
/// that the closing quote matches.
pub fn fstring_body(text: &str) -> Option<&str> {
    if !(text.starts_with("f\"") || text.starts_with("f'")) {
        return None;
    }
    let rest = &text[2..];
    let end = rest.char_indices().last().map(|(i, _)| i).unwrap_or(0);
    Some(&rest[..end])
}

/// Parse text the way an assignment's right-hand side is tested for a number.
///
/// Accepts signed decimals with optional fraction and exponent, the `.5` and
/// `5.` forms, `Infinity`, and unsigned `0x`/`0o`/`0b` integers. Blank text
/// is zero, as with JavaScript's `Number("")`.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }

    if let Some(n) = parse_radix(text) {
        return Some(n);
    }

    let (sign, unsigned) = match text.as_bytes()[0] {
        b'-' => (-1.0, &text[1..]),
        b'+' => (1.0, &text[1..]),
        _ => (1.0, text),
    };
    if unsigned == "Infinity" {
        return Some(sign * f64::INFINITY);
    }
    if !is_decimal(unsigned) {
        return None;
    }
    unsigned.parse::<f64>().ok().map(|n| sign * n)
}

fn parse_radix(text: &str) -> Option<f64> {
    let lower = text.get(..2)?.to_ascii_lowercase();
    let radix = match lower.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
    })
}

/// `digits [. digits] [e [+-] digits]` where either side of the dot may be empty
/// but not both.
fn is_decimal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        mantissa_digits += i - frac_start;
    }
    if mantissa_digits == 0 {
        return false;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"hello\""), Some("hello"));
        assert_eq!(unquote("'hello'"), Some("hello"));
        assert_eq!(unquote("\"\""), Some(""));
        assert_eq!(unquote("\""), Some(""));
        assert_eq!(unquote("\"mixed'"), None);
        assert_eq!(unquote("bare"), None);
        assert_eq!(unquote(""), None);
        assert_eq!(unquote("'héllo'"), Some("héllo"));
    }

    #[test]
    fn test_fstring_body() {
        assert_eq!(fstring_body("f\"Hi {name}\""), Some("Hi {name}"));
        assert_eq!(fstring_body("f'x'"), Some("x"));
        assert_eq!(fstring_body("f\""), Some(""));
        assert_eq!(fstring_body("f\"é\""), Some("é"));
        assert_eq!(fstring_body("\"plain\""), None);
        assert_eq!(fstring_body("format"), None);
    }

    #[test]
    fn test_parse_number_decimal_forms() {
        assert_eq!(parse_number("5"), Some(5.0));
        assert_eq!(parse_number("-3.25"), Some(-3.25));
        assert_eq!(parse_number("+7"), Some(7.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("5."), Some(5.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("2.5E-1"), Some(0.25));
        assert_eq!(parse_number("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_parse_number_blank_is_zero() {
        assert_eq!(parse_number(""), Some(0.0));
        assert_eq!(parse_number("   "), Some(0.0));
    }

    #[test]
    fn test_parse_number_radix_forms() {
        assert_eq!(parse_number("0x1F"), Some(31.0));
        assert_eq!(parse_number("0o17"), Some(15.0));
        assert_eq!(parse_number("0b101"), Some(5.0));
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("0b102"), None);
    }

    #[test]
    fn test_parse_number_rejects_non_numbers() {
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("1e"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("1 + 2"), None);
        assert_eq!(parse_number("-"), None);
    }
}
