// Constants for the simulated device

/// Starting address for data allocations
/// Data lives at 0x81000000 to match the user memory window on the target
pub const DATA_REGION_START: u64 = 0x8100_0000;

/// Starting address for code allocations
pub const CODE_REGION_START: u64 = 0x8200_0000;

/// Default cap on bytes handed out by the simulated device (16 MiB)
pub const DEFAULT_MEMORY_LIMIT: u64 = 16 * 1024 * 1024;

/// Allocation granularity; every block starts on this boundary
pub const ALLOCATION_ALIGN: u64 = 0x10;
