//! Numeric literal parsing shared by address and length tokens
//!
//! Literals are either hexadecimal with a `0x`/`0X` prefix or plain decimal.
//! Signs are never part of a literal; the address grammar handles `+`/`-`
//! as offset operators.

use crate::session::constants::ADDRESS_MASK;

/// Parse a literal that must fit the device's 32-bit pointer width.
///
/// On failure returns a short reason suitable for an error message.
pub(crate) fn parse_literal(text: &str) -> Result<u64, &'static str> {
    if text.is_empty() {
        return Err("missing number");
    }

    let (digits, radix) = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(if radix == 16 {
            "invalid hexadecimal number"
        } else {
            "invalid decimal number"
        });
    }

    let value = u64::from_str_radix(digits, radix).map_err(|_| "number too large")?;
    if value > ADDRESS_MASK {
        return Err("number exceeds 32 bits");
    }
    Ok(value)
}

/// True when `text` looks like the start of a numeric literal
pub(crate) fn starts_numeric(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_digit())
}
