// Constants for the session layer

/// Width of a device pointer in bytes
pub const POINTER_BYTES: u64 = 4;

/// Mask applied to every computed device address.
/// The target is a 32-bit machine, so offset arithmetic wraps at 2^32.
pub const ADDRESS_MASK: u64 = 0xFFFF_FFFF;

/// Maximum number of arguments accepted by a code execution request
pub const MAX_EXEC_ARGS: usize = 4;
