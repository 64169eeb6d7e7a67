//! In-process device used for offline sessions and tests
//!
//! [`SimulatedDevice`] behaves like a small remote target:
//! - First-fit allocation in separate data and code regions; a region ends
//!   where the other begins or at the top of the 32-bit address space
//! - Tombstones for freed blocks so double frees and use-after-free fault
//!   until the space is handed out again
//! - Byte-accurate reads and writes that must stay inside one block
//! - Preloaded regions via [`SimulatedDevice::map`] for fixed addresses
//! - Scripted return values for [`Device::execute`]
//! - [`Device::echo`] replies with the text it was sent
//!
//! A single failure can be armed with [`SimulatedDevice::fail_next`]; the next
//! request of any kind returns it without touching device state.

use super::constants::{
    ALLOCATION_ALIGN, CODE_REGION_START, DATA_REGION_START, DEFAULT_MEMORY_LIMIT,
};
use super::{Device, TransportError};
use crate::session::constants::{ADDRESS_MASK, MAX_EXEC_ARGS};
use crate::session::variables::VariableKind;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use tracing::trace;

/// Layout and limits of a simulated device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedConfig {
    pub data_base: u64,
    pub code_base: u64,
    pub memory_limit: u64,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        SimulatedConfig {
            data_base: DATA_REGION_START,
            code_base: CODE_REGION_START,
            memory_limit: DEFAULT_MEMORY_LIMIT,
        }
    }
}

/// State of a block of device memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Allocated(VariableKind),
    Tombstone, // Freed; any access faults
    Mapped,    // Preloaded, never freed, readable/writable/executable
}

#[derive(Debug, Clone)]
struct Block {
    data: Vec<u8>,
    state: BlockState,
}

impl Block {
    fn is_accessible(&self) -> bool {
        !matches!(self.state, BlockState::Tombstone)
    }

    fn is_executable(&self) -> bool {
        matches!(
            self.state,
            BlockState::Allocated(VariableKind::Code) | BlockState::Mapped
        )
    }
}

/// A recorded call to [`Device::execute`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecCall {
    pub address: u64,
    pub args: Vec<u64>,
}

/// The simulated target
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    config: SimulatedConfig,
    blocks: FxHashMap<u64, Block>,
    allocated_bytes: u64,
    returns: VecDeque<u64>,
    calls: Vec<ExecCall>,
    code_writes: Vec<u64>,
    pending_failure: Option<TransportError>,
}

impl SimulatedDevice {
    pub fn new(config: SimulatedConfig) -> Self {
        SimulatedDevice {
            config,
            blocks: FxHashMap::default(),
            allocated_bytes: 0,
            returns: VecDeque::new(),
            calls: Vec::new(),
            code_writes: Vec::new(),
            pending_failure: None,
        }
    }

    /// Preload bytes at a fixed address, as if the target already had them
    pub fn map(&mut self, address: u64, bytes: &[u8]) {
        self.blocks.insert(
            address,
            Block {
                data: bytes.to_vec(),
                state: BlockState::Mapped,
            },
        );
    }

    /// Queue a value for the next [`Device::execute`] to return
    pub fn queue_return(&mut self, value: u64) {
        self.returns.push_back(value);
    }

    /// Make the next request fail with `error`
    pub fn fail_next(&mut self, error: TransportError) {
        self.pending_failure = Some(error);
    }

    /// Every execute request seen so far
    pub fn calls(&self) -> &[ExecCall] {
        &self.calls
    }

    /// Start addresses of every code-path write seen so far
    pub fn code_writes(&self) -> &[u64] {
        &self.code_writes
    }

    /// Bytes currently held by live allocations
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated_bytes
    }

    /// State of the block starting exactly at `address`
    pub fn block_state(&self, address: u64) -> Option<BlockState> {
        self.blocks.get(&address).map(|b| b.state)
    }

    fn take_failure(&mut self) -> Result<(), TransportError> {
        match self.pending_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Address range `[start, end)` available to allocations of `kind`
    fn region(&self, kind: VariableKind) -> (u64, u64) {
        let (base, other) = match kind {
            VariableKind::Data => (self.config.data_base, self.config.code_base),
            VariableKind::Code => (self.config.code_base, self.config.data_base),
        };
        let top = ADDRESS_MASK + 1;
        let end = if other > base { other.min(top) } else { top };
        (base, end)
    }

    /// Lowest aligned address in `[start, end)` where `size` bytes fit
    /// without touching a live or mapped block
    fn find_gap(&self, start: u64, end: u64, size: u64) -> Option<u64> {
        let mut occupied: Vec<(u64, u64)> = self
            .blocks
            .iter()
            .filter(|(_, block)| block.is_accessible())
            .map(|(&at, block)| (at, at + (block.data.len() as u64).max(1)))
            .filter(|&(at, block_end)| block_end > start && at < end)
            .collect();
        occupied.sort_unstable();

        let mut candidate = align_up(start)?;
        for (at, block_end) in occupied {
            if candidate.checked_add(size)? <= at {
                break;
            }
            candidate = candidate.max(align_up(block_end)?);
        }
        (candidate.checked_add(size)? <= end).then_some(candidate)
    }

    /// Find the accessible block holding `[address, address + length)`
    fn locate(&self, address: u64, length: u64) -> Result<(u64, usize), TransportError> {
        let fault = TransportError::Fault { address, length };
        let end = address.checked_add(length).ok_or(fault.clone())?;

        for (&start, block) in &self.blocks {
            let block_end = start + block.data.len() as u64;
            if address >= start && end <= block_end && block.is_accessible() {
                return Ok((start, (address - start) as usize));
            }
        }
        Err(fault)
    }

    fn store(&mut self, address: u64, bytes: &[u8]) -> Result<(), TransportError> {
        let (start, offset) = self.locate(address, bytes.len() as u64)?;
        let block = self
            .blocks
            .get_mut(&start)
            .ok_or(TransportError::Fault {
                address,
                length: bytes.len() as u64,
            })?;
        block.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

fn align_up(address: u64) -> Option<u64> {
    Some(address.checked_add(ALLOCATION_ALIGN - 1)? / ALLOCATION_ALIGN * ALLOCATION_ALIGN)
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new(SimulatedConfig::default())
    }
}

impl Device for SimulatedDevice {
    fn allocate(&mut self, kind: VariableKind, size: u64) -> Result<u64, TransportError> {
        self.take_failure()?;

        let out_of_memory = TransportError::OutOfMemory { requested: size };
        let within_limit = self
            .allocated_bytes
            .checked_add(size)
            .is_some_and(|total| total <= self.config.memory_limit);
        if size == 0 || !within_limit {
            return Err(out_of_memory);
        }

        let (start, end) = self.region(kind);
        let address = self.find_gap(start, end, size).ok_or(out_of_memory)?;

        // Reused space drops the tombstones that covered it
        let block_end = address + size;
        self.blocks.retain(|&at, block| {
            block.is_accessible() || at >= block_end || at + block.data.len() as u64 <= address
        });
        self.blocks.insert(
            address,
            Block {
                data: vec![0; size as usize],
                state: BlockState::Allocated(kind),
            },
        );
        self.allocated_bytes += size;
        trace!(address, size, %kind, "simulated allocate");
        Ok(address)
    }

    fn free(&mut self, address: u64) -> Result<(), TransportError> {
        self.take_failure()?;

        match self.blocks.get_mut(&address) {
            Some(block) => match block.state {
                BlockState::Allocated(_) => {
                    self.allocated_bytes -= block.data.len() as u64;
                    block.state = BlockState::Tombstone;
                    Ok(())
                }
                BlockState::Tombstone => Err(TransportError::Rejected {
                    message: format!("double free at 0x{:x}", address),
                }),
                BlockState::Mapped => Err(TransportError::Rejected {
                    message: format!("0x{:x} is not a heap allocation", address),
                }),
            },
            None => Err(TransportError::Rejected {
                message: format!("0x{:x} was never allocated", address),
            }),
        }
    }

    fn read(&mut self, address: u64, length: u64) -> Result<Vec<u8>, TransportError> {
        self.take_failure()?;

        let (start, offset) = self.locate(address, length)?;
        let block = &self.blocks[&start];
        Ok(block.data[offset..offset + length as usize].to_vec())
    }

    fn write(&mut self, address: u64, bytes: &[u8]) -> Result<(), TransportError> {
        self.take_failure()?;
        self.store(address, bytes)
    }

    fn write_code(&mut self, address: u64, bytes: &[u8]) -> Result<(), TransportError> {
        self.take_failure()?;
        self.store(address, bytes)?;
        self.code_writes.push(address);
        Ok(())
    }

    fn execute(&mut self, address: u64, args: &[u64]) -> Result<u64, TransportError> {
        self.take_failure()?;

        if args.len() > MAX_EXEC_ARGS {
            return Err(TransportError::Rejected {
                message: format!("at most {} arguments are supported", MAX_EXEC_ARGS),
            });
        }

        let (start, _) = self.locate(address, 1)?;
        if !self.blocks[&start].is_executable() {
            return Err(TransportError::Fault { address, length: 1 });
        }

        self.calls.push(ExecCall {
            address,
            args: args.to_vec(),
        });
        Ok(self.returns.pop_front().unwrap_or(0))
    }

    fn echo(&mut self, text: &str) -> Result<String, TransportError> {
        self.take_failure()?;
        Ok(text.to_string())
    }
}
