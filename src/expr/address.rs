//! Address expression parser
//!
//! Grammar:
//!
//! ```text
//! token  := base ( ('+' | '-') offset )?
//! base   := hexliteral | decliteral | '$' index | '%' name | '%#'
//! offset := hexliteral | decliteral
//! ```
//!
//! Examples: `0x81000000`, `$2+0x100`, `$0-256`, `%buf+4`, `%#`.
//!
//! Parsing checks that the named variable, alias or last result exists but
//! does not compute an address. The offset is carried in the reference and
//! applied by [`crate::session::Session::resolve`], so one parsed reference
//! can be resolved again later against the current tables.

use super::literal::parse_literal;
use crate::session::errors::AddressError;
use crate::session::locals::is_valid_name;
use crate::session::Session;
use std::fmt;

/// Symbolic target of an address token, with its signed byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressReference {
    /// Literal device address
    Absolute(u64, i64),
    /// `$N`
    VariableSlot(usize, i64),
    /// `%name`
    LocalAlias(String, i64),
    /// `%#`
    LastResult(i64),
}

impl AddressReference {
    pub fn offset(&self) -> i64 {
        match self {
            AddressReference::Absolute(_, offset)
            | AddressReference::VariableSlot(_, offset)
            | AddressReference::LocalAlias(_, offset)
            | AddressReference::LastResult(offset) => *offset,
        }
    }
}

impl fmt::Display for AddressReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressReference::Absolute(address, _) => write!(f, "0x{:x}", address)?,
            AddressReference::VariableSlot(index, _) => write!(f, "${}", index)?,
            AddressReference::LocalAlias(name, _) => write!(f, "%{}", name)?,
            AddressReference::LastResult(_) => write!(f, "%#")?,
        }
        match self.offset() {
            0 => Ok(()),
            o if o < 0 => write!(f, "-0x{:x}", o.unsigned_abs()),
            o => write!(f, "+0x{:x}", o),
        }
    }
}

/// Parse an operator address token.
///
/// The session is only read, to validate that `$N`, `%name` and `%#` exist.
pub fn parse_address<D>(token: &str, session: &Session<D>) -> Result<AddressReference, AddressError> {
    let syntax = |reason| AddressError::InvalidSyntax {
        token: token.to_string(),
        reason,
    };

    if token.is_empty() {
        return Err(syntax("empty address"));
    }

    // The base never starts with a sign, so the first '+' or '-' past the
    // first character separates base from offset.
    let sign = token
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '+' || c == '-')
        .map(|(i, _)| i);

    let (base, offset) = match sign {
        Some(split) => {
            let magnitude = parse_literal(&token[split + 1..]).map_err(syntax)? as i64;
            let offset = if token[split..].starts_with('-') {
                -magnitude
            } else {
                magnitude
            };
            (&token[..split], offset)
        }
        None => (token, 0),
    };

    if let Some(index) = base.strip_prefix('$') {
        if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
            return Err(syntax("expected a variable index after '$'"));
        }
        let index: usize = index
            .parse()
            .map_err(|_| syntax("variable index too large"))?;
        let variable = session
            .variables()
            .get(index)
            .map_err(|_| AddressError::UnknownVariable { index })?;
        if !variable.is_live() {
            return Err(AddressError::FreedVariable { index });
        }
        return Ok(AddressReference::VariableSlot(index, offset));
    }

    if let Some(name) = base.strip_prefix('%') {
        if name == "#" {
            if session.last_result().is_none() {
                return Err(AddressError::NoLastResult);
            }
            return Ok(AddressReference::LastResult(offset));
        }
        if !is_valid_name(name) {
            return Err(syntax("expected a local name after '%'"));
        }
        if session.locals().get(name).is_none() {
            return Err(AddressError::UnknownLocal {
                name: name.to_string(),
            });
        }
        return Ok(AddressReference::LocalAlias(name.to_string(), offset));
    }

    let address = parse_literal(base).map_err(syntax)?;
    Ok(AddressReference::Absolute(address, offset))
}
