//! Device facade
//!
//! The session never talks to the console hardware directly. Everything it
//! needs from the remote side goes through the [`Device`] trait: allocating
//! and freeing memory, reading and writing bytes, and running code.
//!
//! Framing, opcodes and the physical link live behind implementations of this
//! trait. The crate ships [`simulated::SimulatedDevice`], an in-process stand-in
//! used by the console binary and the test suite.
//!
//! # Retries
//!
//! A [`TransportError`] is passed through untouched. If an implementation wants
//! to retry a request it must do so internally; callers above this layer never
//! retry.

pub mod constants;
pub mod simulated;

use crate::session::variables::VariableKind;
use thiserror::Error;

/// Errors reported by a device implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Link to the device is gone
    #[error("device disconnected")]
    Disconnected,

    /// Device did not answer in time
    #[error("device timed out")]
    Timeout,

    /// Device understood the request and refused it
    #[error("device rejected request: {message}")]
    Rejected { message: String },

    /// Device has no room for the allocation
    #[error("device out of memory: requested 0x{requested:x} bytes")]
    OutOfMemory { requested: u64 },

    /// Access outside any mapped or allocated region
    #[error("memory fault at 0x{address:x} (0x{length:x} bytes)")]
    Fault { address: u64, length: u64 },
}

/// Operations the session requires from the remote side
pub trait Device {
    /// Reserve `size` bytes of code or data memory, returning its address
    fn allocate(&mut self, kind: VariableKind, size: u64) -> Result<u64, TransportError>;

    /// Release memory previously returned by [`Device::allocate`]
    fn free(&mut self, address: u64) -> Result<(), TransportError>;

    /// Read `length` bytes starting at `address`
    fn read(&mut self, address: u64, length: u64) -> Result<Vec<u8>, TransportError>;

    /// Write bytes into data memory
    fn write(&mut self, address: u64, bytes: &[u8]) -> Result<(), TransportError>;

    /// Write bytes into code memory.
    ///
    /// Targets that need a separate path for executable pages override this.
    fn write_code(&mut self, address: u64, bytes: &[u8]) -> Result<(), TransportError> {
        self.write(address, bytes)
    }

    /// Call the code at `address` with up to four arguments
    fn execute(&mut self, address: u64, args: &[u64]) -> Result<u64, TransportError>;

    /// Send text to the device and return what it sends back
    fn echo(&mut self, text: &str) -> Result<String, TransportError>;
}

impl<D: Device + ?Sized> Device for Box<D> {
    fn allocate(&mut self, kind: VariableKind, size: u64) -> Result<u64, TransportError> {
        (**self).allocate(kind, size)
    }

    fn free(&mut self, address: u64) -> Result<(), TransportError> {
        (**self).free(address)
    }

    fn read(&mut self, address: u64, length: u64) -> Result<Vec<u8>, TransportError> {
        (**self).read(address, length)
    }

    fn write(&mut self, address: u64, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).write(address, bytes)
    }

    fn write_code(&mut self, address: u64, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).write_code(address, bytes)
    }

    fn execute(&mut self, address: u64, args: &[u64]) -> Result<u64, TransportError> {
        (**self).execute(address, args)
    }

    fn echo(&mut self, text: &str) -> Result<String, TransportError> {
        (**self).echo(text)
    }
}
