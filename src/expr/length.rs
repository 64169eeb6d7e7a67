//! Length token resolution
//!
//! A length is either a byte count (`0x1000`, `256`) or a primitive type
//! name. Type names use the target's sizes, not the host's:
//!
//! | Type | Bytes |
//! |------|-------|
//! | `char`, `uchar`, `bool` | 1 |
//! | `short`, `ushort` | 2 |
//! | `int`, `uint`, `long`, `ulong`, `float`, `ptr` | 4 |
//! | `double` | 8 |
//!
//! `int` and `uint` may carry an explicit bit width from {8, 16, 32, 64}
//! (`int32`, `uint16`), which replaces the default width.

use super::literal::{parse_literal, starts_numeric};
use crate::session::constants::POINTER_BYTES;
use crate::session::errors::LengthError;

/// Named primitive types accepted as lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Char,
    UChar,
    Bool,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Pointer,
}

impl PrimitiveType {
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "char" => PrimitiveType::Char,
            "uchar" => PrimitiveType::UChar,
            "bool" => PrimitiveType::Bool,
            "short" => PrimitiveType::Short,
            "ushort" => PrimitiveType::UShort,
            "int" => PrimitiveType::Int,
            "uint" => PrimitiveType::UInt,
            "long" => PrimitiveType::Long,
            "ulong" => PrimitiveType::ULong,
            "float" => PrimitiveType::Float,
            "double" => PrimitiveType::Double,
            "ptr" => PrimitiveType::Pointer,
            _ => return None,
        };
        Some(ty)
    }

    /// Canonical width in bytes on the target
    pub fn width(self) -> u64 {
        match self {
            PrimitiveType::Char | PrimitiveType::UChar | PrimitiveType::Bool => 1,
            PrimitiveType::Short | PrimitiveType::UShort => 2,
            PrimitiveType::Int
            | PrimitiveType::UInt
            | PrimitiveType::Long
            | PrimitiveType::ULong
            | PrimitiveType::Float => 4,
            PrimitiveType::Double => 8,
            PrimitiveType::Pointer => POINTER_BYTES,
        }
    }

    /// Whether a bit-width suffix may follow the name
    pub fn accepts_bit_width(self) -> bool {
        matches!(self, PrimitiveType::Int | PrimitiveType::UInt)
    }
}

const ALLOWED_BIT_WIDTHS: [u64; 4] = [8, 16, 32, 64];

/// Resolve a length token to a byte count
pub fn parse_length(token: &str) -> Result<u64, LengthError> {
    let unknown = || LengthError::UnknownLengthSpecifier {
        token: token.to_string(),
    };

    if starts_numeric(token) {
        return parse_literal(token).map_err(|_| unknown());
    }

    let split = token
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(token.len());
    let (name, bits) = token.split_at(split);
    let ty = PrimitiveType::from_name(name).ok_or_else(unknown)?;

    if bits.is_empty() {
        return Ok(ty.width());
    }
    if !ty.accepts_bit_width() {
        return Err(unknown());
    }

    match bits.parse::<u64>() {
        Ok(bits) if ALLOWED_BIT_WIDTHS.contains(&bits) => Ok(bits / 8),
        _ => Err(unknown()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_lengths() {
        assert_eq!(parse_length("0x4"), Ok(4));
        assert_eq!(parse_length("256"), Ok(256));
        assert_eq!(parse_length("0x1000"), Ok(0x1000));
    }

    #[test]
    fn test_named_types() {
        assert_eq!(parse_length("char"), Ok(1));
        assert_eq!(parse_length("short"), Ok(2));
        assert_eq!(parse_length("int"), Ok(4));
        assert_eq!(parse_length("float"), Ok(4));
        assert_eq!(parse_length("double"), Ok(8));
        assert_eq!(parse_length("ptr"), Ok(POINTER_BYTES));
    }

    #[test]
    fn test_sized_integers() {
        assert_eq!(parse_length("int32"), Ok(4));
        assert_eq!(parse_length("uint16"), Ok(2));
        assert_eq!(parse_length("int8"), Ok(1));
        assert_eq!(parse_length("uint64"), Ok(8));
    }

    #[test]
    fn test_rejections() {
        for token in ["bogus", "int12", "int0", "float32", "char8", "Int", "0xg", "int32x", ""] {
            assert_eq!(
                parse_length(token),
                Err(LengthError::UnknownLengthSpecifier {
                    token: token.to_string()
                }),
                "token {:?} should be rejected",
                token
            );
        }
    }
}
