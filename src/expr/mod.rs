//! Operator token parsing
//!
//! This module turns the tokens an operator types into typed values:
//! - [`address`]: address expressions (`$3+0x100`, `%name`, `%#`, literals)
//!   into an [`AddressReference`]
//! - [`length`]: length tokens (`0x40`, `int`, `uint16`) into byte counts
//! - `literal`: shared hex/decimal literal handling
//!
//! # Purity
//!
//! Nothing here mutates a session. Address parsing reads the session only to
//! check that the referenced variable, alias or last result exists.

pub mod address;
pub mod length;
mod literal;

pub use address::{parse_address, AddressReference};
pub use length::{parse_length, PrimitiveType};
