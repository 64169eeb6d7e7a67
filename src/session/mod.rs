//! Session context
//!
//! The [`Session`] owns every piece of state an operator builds up while
//! poking at the device:
//! - [`variables`]: `$N` allocations made on the device
//! - [`locals`]: `%name` aliases
//! - the last-result slot read by `%#`
//!
//! Command code never touches the tables directly. It parses a token with
//! [`crate::expr::parse_address`], asks the session to [`Session::resolve`]
//! it, and then goes through the session for any device access. That keeps
//! every mutation in one place and means other code only ever holds indices
//! and names, never an address that could outlive a free.
//!
//! # Address arithmetic
//!
//! The target is 32-bit. Offsets are applied modulo 2^32 (see
//! [`constants::ADDRESS_MASK`]), so `0xFFFFFFF0+0x20` is `0x10`, exactly as the
//! device would compute it.

pub mod constants;
pub mod errors;
pub mod locals;
pub mod variables;

use crate::device::{Device, TransportError};
use crate::expr::{parse_address, AddressReference};
use constants::{ADDRESS_MASK, POINTER_BYTES};
use errors::{AddressError, LengthError, TableError};
use locals::LocalTable;
use tracing::{debug, warn};
use variables::{VariableKind, VariableTable};

/// A reference after resolution, ready to hand to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub address: u64,
    /// True only when the target is known to be code memory
    pub is_code: bool,
    /// Bytes available at `address`, when the target is a variable at offset 0
    pub known_size: Option<u64>,
    /// Variable slot the target was derived from, if any
    pub slot: Option<usize>,
}

/// Apply a signed offset with 32-bit wraparound
pub fn offset_address(base: u64, offset: i64) -> u64 {
    base.wrapping_add(offset as u64) & ADDRESS_MASK
}

/// Operator session: tables, last result and the device they describe
#[derive(Debug)]
pub struct Session<D> {
    device: D,
    variables: VariableTable,
    locals: LocalTable,
    last_result: Option<u64>,
}

impl<D> Session<D> {
    pub fn new(device: D) -> Self {
        Session {
            device,
            variables: VariableTable::new(),
            locals: LocalTable::new(),
            last_result: None,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn locals(&self) -> &LocalTable {
        &self.locals
    }

    /// Value of `%#`, absent until a command records one
    pub fn last_result(&self) -> Option<u64> {
        self.last_result
    }

    /// Overwrite the last-result slot
    pub fn record_last_result(&mut self, value: u64) {
        debug!(value, "recorded last result");
        self.last_result = Some(value);
    }

    /// Define or overwrite a local alias
    pub fn set_local(&mut self, name: &str, value: u64) -> Result<(), AddressError> {
        let name = locals::normalize_name(name)?;
        self.locals.set(name, value);
        debug!(name, value, "set local");
        Ok(())
    }

    /// Turn a parsed reference into a concrete target.
    ///
    /// Only reads the tables. A `$N` freed since the reference was parsed is
    /// reported as [`AddressError::FreedVariable`].
    pub fn resolve(&self, reference: &AddressReference) -> Result<ResolvedTarget, AddressError> {
        let target = match reference {
            AddressReference::Absolute(address, offset) => {
                Self::untyped(offset_address(*address, *offset))
            }
            AddressReference::VariableSlot(index, offset) => {
                let index = *index;
                let variable = self
                    .variables
                    .get(index)
                    .map_err(|_| AddressError::UnknownVariable { index })?;
                if !variable.is_live() {
                    return Err(AddressError::FreedVariable { index });
                }
                ResolvedTarget {
                    address: offset_address(variable.address, *offset),
                    is_code: variable.is_code,
                    known_size: (*offset == 0).then_some(variable.size),
                    slot: Some(index),
                }
            }
            AddressReference::LocalAlias(name, offset) => {
                let value = self
                    .locals
                    .get(name)
                    .ok_or_else(|| AddressError::UnknownLocal { name: name.clone() })?;
                Self::untyped(offset_address(value, *offset))
            }
            AddressReference::LastResult(offset) => {
                let value = self.last_result.ok_or(AddressError::NoLastResult)?;
                Self::untyped(offset_address(value, *offset))
            }
        };
        Ok(target)
    }

    /// Parse and resolve in one step
    pub fn resolve_token(&self, token: &str) -> Result<ResolvedTarget, AddressError> {
        let reference = parse_address(token, self)?;
        self.resolve(&reference)
    }

    /// Number of bytes an access to `target` should cover.
    ///
    /// An explicit length wins but may not exceed a variable's known size;
    /// otherwise the variable's size is used.
    pub fn length_for(
        &self,
        target: &ResolvedTarget,
        explicit: Option<u64>,
    ) -> Result<u64, LengthError> {
        match (explicit, target.known_size) {
            (Some(length), Some(size)) if length > size => {
                Err(LengthError::ExceedsVariable { length, size })
            }
            (Some(length), _) => Ok(length),
            (None, Some(size)) => Ok(size),
            (None, None) => Err(LengthError::LengthRequired),
        }
    }

    fn untyped(address: u64) -> ResolvedTarget {
        ResolvedTarget {
            address,
            is_code: false,
            known_size: None,
            slot: None,
        }
    }
}

impl<D: Device> Session<D> {
    /// Allocate device memory into the lowest free `$N` slot
    pub fn allocate(&mut self, kind: VariableKind, size: u64) -> Result<usize, TableError> {
        self.variables
            .allocate(&mut self.device, kind, size)
            .inspect_err(|e| warn!(error = %e, "allocation failed"))
    }

    /// Free `$index`; the slot becomes reusable
    pub fn free(&mut self, index: usize) -> Result<(), TableError> {
        self.variables
            .free(&mut self.device, index)
            .map(|_| ())
            .inspect_err(|e| warn!(error = %e, "free failed"))
    }

    /// Free the live variable whose allocation starts at `address`
    pub fn free_address(&mut self, address: u64) -> Result<usize, TableError> {
        let index = self
            .variables
            .find_by_address(address)
            .ok_or(TableError::NotAllocated { address })?;
        self.free(index)?;
        Ok(index)
    }

    /// Read `length` bytes at the target
    pub fn read(&mut self, target: &ResolvedTarget, length: u64) -> Result<Vec<u8>, TransportError> {
        debug!(address = target.address, length, "read");
        self.device.read(target.address, length)
    }

    /// Write bytes at the target.
    ///
    /// Code targets use the device's code path. With `force_code` the code
    /// path is always used and a `$N` target is reclassified as code once the
    /// write succeeds.
    pub fn write(
        &mut self,
        target: &ResolvedTarget,
        bytes: &[u8],
        force_code: bool,
    ) -> Result<(), TransportError> {
        let as_code = force_code || target.is_code;
        debug!(address = target.address, len = bytes.len(), as_code, "write");

        if as_code {
            self.device.write_code(target.address, bytes)?;
        } else {
            self.device.write(target.address, bytes)?;
        }

        if let Some(index) = target.slot.filter(|_| force_code) {
            self.variables.mark_code(index);
        }
        Ok(())
    }

    /// Read one little-endian pointer-sized word
    pub fn read_word(&mut self, target: &ResolvedTarget) -> Result<u64, TransportError> {
        let bytes = self.read(target, POINTER_BYTES)?;
        let word: [u8; POINTER_BYTES as usize] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| TransportError::Rejected {
                    message: format!("short read: got {} bytes", bytes.len()),
                })?;
        Ok(u32::from_le_bytes(word) as u64)
    }

    /// Write one little-endian pointer-sized word
    pub fn write_word(&mut self, target: &ResolvedTarget, value: u64) -> Result<(), TransportError> {
        let word = ((value & ADDRESS_MASK) as u32).to_le_bytes();
        self.write(target, &word, false)
    }

    /// Round-trip text through the device
    pub fn echo(&mut self, text: &str) -> Result<String, TransportError> {
        debug!(len = text.len(), "echo");
        self.device.echo(text)
    }

    /// Run code at the target and record its return value as `%#`.
    ///
    /// Nothing is recorded when the device call fails.
    pub fn execute(&mut self, target: &ResolvedTarget, args: &[u64]) -> Result<u64, TransportError> {
        debug!(address = target.address, ?args, "execute");
        let value = self
            .device
            .execute(target.address, args)
            .inspect_err(|e| warn!(error = %e, "execute failed"))?;
        self.record_last_result(value);
        Ok(value)
    }
}
