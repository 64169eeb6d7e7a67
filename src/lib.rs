//! # Introduction
//!
//! Defiler is a host-side console for poking at the memory of a remote
//! 32-bit target: allocate memory on the device, read and write bytes, inject
//! and run code, and refer to everything symbolically for the rest of the
//! session.
//!
//! ## Resolution pipeline
//!
//! ```text
//! Input line → Command → address/length tokens → AddressReference → Session → Device
//! ```
//!
//! 1. [`console`]: parses a line into a [`console::Command`] and runs it.
//! 2. [`expr`]: turns tokens like `$3+0x100`, `%name`, `%#` and `uint16` into
//!    an [`expr::AddressReference`] or a byte count.
//! 3. [`session`]: owns the `$N` variable table, the `%name` alias table and
//!    the last result; resolves references to concrete addresses and performs
//!    every allocation, free and device access.
//! 4. [`device`]: the [`device::Device`] facade the session talks to, plus an
//!    in-process [`device::simulated::SimulatedDevice`].
//! 5. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Address tokens
//!
//! `0x81000000`, `4096`, `$2`, `%buf`, `%#`, each optionally followed by
//! `+num` or `-num`. Offsets wrap at 32 bits like pointer arithmetic on the
//! target.

pub mod console;
pub mod device;
pub mod expr;
pub mod session;
pub mod ui;
