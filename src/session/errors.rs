//! Error types for symbolic resolution and variable bookkeeping
//!
//! Each layer of the session gets its own enum:
//!
//! - [`AddressError`]: an address token could not be parsed or resolved
//! - [`LengthError`]: a length token or inferred length was unusable
//! - [`TableError`]: allocation lifecycle failures, including transport
//!   failures surfaced by the device during allocate/free
//!
//! None of these are fatal to the session. They are returned to the command
//! that triggered them and the tables are left exactly as they were.

use crate::device::TransportError;
use crate::session::variables::VariableKind;
use thiserror::Error;

/// Failures while turning an operator token into an address reference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Token does not match the address grammar
    #[error("invalid address '{token}': {reason}")]
    InvalidSyntax { token: String, reason: &'static str },

    /// `$N` with N past the end of the variable table
    #[error("unknown variable ${index}")]
    UnknownVariable { index: usize },

    /// `$N` naming a slot that has been freed
    #[error("variable ${index} has been freed")]
    FreedVariable { index: usize },

    /// `%name` with no such local alias
    #[error("unknown local '%{name}'")]
    UnknownLocal { name: String },

    /// `%#` before any command produced a value
    #[error("no result has been recorded yet (%#)")]
    NoLastResult,
}

/// Failures while determining how many bytes an operation covers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LengthError {
    /// Neither a number nor a known type name
    #[error("unknown length specifier '{token}'")]
    UnknownLengthSpecifier { token: String },

    /// No length given and the address has no inherent size
    #[error("a length is required unless the address is a variable")]
    LengthRequired,

    /// Explicit length runs past the end of the variable it targets
    #[error("length 0x{length:x} exceeds variable size 0x{size:x}")]
    ExceedsVariable { length: u64, size: u64 },
}

/// Failures in the variable table lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Slot exists but holds no allocation (double free or stale handle)
    #[error("variable ${index} is not allocated")]
    UnallocatedVariable { index: usize },

    /// Slot index past the end of the table
    #[error("unknown variable ${index}")]
    UnknownVariable { index: usize },

    /// Address given to free does not start any live variable
    #[error("no variable is allocated at 0x{address:x}")]
    NotAllocated { address: u64 },

    /// Zero-byte allocation request
    #[error("cannot allocate zero bytes")]
    EmptyAllocation,

    /// Device refused or failed the allocation
    #[error("failed to allocate 0x{size:x} bytes of {kind} memory: {source}")]
    AllocationFailed {
        kind: VariableKind,
        size: u64,
        #[source]
        source: TransportError,
    },

    /// Device reported an address that cannot name a variable
    #[error("device returned unusable address 0x{address:x} for 0x{size:x} bytes of {kind} memory")]
    InvalidAddress {
        kind: VariableKind,
        size: u64,
        address: u64,
    },

    /// Device refused or failed the free
    #[error("failed to free variable ${index}: {source}")]
    FreeFailed {
        index: usize,
        #[source]
        source: TransportError,
    },
}
