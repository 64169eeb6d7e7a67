//! Variable table backing `$N` tokens
//!
//! Each slot records one allocation on the device: its address, size, and
//! whether it lives in code or data memory. A slot whose address is zero is
//! free. Freed slots are reused lowest-index first, so indices stay small and
//! a handle only changes meaning after an explicit free.
//!
//! The table issues the device requests itself so that a slot is only ever
//! written after the device has confirmed the operation.

use super::constants::ADDRESS_MASK;
use super::errors::TableError;
use crate::device::Device;
use std::fmt;
use tracing::debug;

/// Segment an allocation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Code,
    Data,
}

impl VariableKind {
    /// Parse the `alloc` type argument
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "code" => Some(VariableKind::Code),
            "data" => Some(VariableKind::Data),
            _ => None,
        }
    }

    pub fn is_code(self) -> bool {
        matches!(self, VariableKind::Code)
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableKind::Code => write!(f, "code"),
            VariableKind::Data => write!(f, "data"),
        }
    }
}

/// One tracked allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Variable {
    pub address: u64, // 0 = free slot
    pub size: u64,
    pub is_code: bool,
}

impl Variable {
    /// Check if the slot currently holds an allocation
    pub fn is_live(&self) -> bool {
        self.address != 0
    }

    pub fn kind(&self) -> VariableKind {
        if self.is_code {
            VariableKind::Code
        } else {
            VariableKind::Data
        }
    }
}

/// Indexed collection of device allocations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    slots: Vec<Variable>,
}

impl VariableTable {
    pub fn new() -> Self {
        VariableTable { slots: Vec::new() }
    }

    /// Allocate device memory and record it in the lowest free slot.
    ///
    /// The slot is written only after the device returns an address, so a
    /// failed request leaves the table untouched. An address of zero or one
    /// wider than 32 bits is handed back to the device and reported as
    /// [`TableError::InvalidAddress`].
    pub fn allocate<D: Device + ?Sized>(
        &mut self,
        device: &mut D,
        kind: VariableKind,
        size: u64,
    ) -> Result<usize, TableError> {
        if size == 0 {
            return Err(TableError::EmptyAllocation);
        }

        let index = self.next_free_slot();
        let address = device
            .allocate(kind, size)
            .map_err(|source| TableError::AllocationFailed { kind, size, source })?;

        if address == 0 || address > ADDRESS_MASK {
            device
                .free(address)
                .map_err(|source| TableError::AllocationFailed { kind, size, source })?;
            return Err(TableError::InvalidAddress {
                kind,
                size,
                address,
            });
        }

        let variable = Variable {
            address,
            size,
            is_code: kind.is_code(),
        };
        if index == self.slots.len() {
            self.slots.push(variable);
        } else {
            self.slots[index] = variable;
        }

        debug!(index, address, size, %kind, "allocated variable");
        Ok(index)
    }

    /// Free the allocation in `index` and mark the slot reusable.
    ///
    /// Returns the address that was released.
    pub fn free<D: Device + ?Sized>(
        &mut self,
        device: &mut D,
        index: usize,
    ) -> Result<u64, TableError> {
        let variable = *self.get(index)?;
        if !variable.is_live() {
            return Err(TableError::UnallocatedVariable { index });
        }

        device
            .free(variable.address)
            .map_err(|source| TableError::FreeFailed { index, source })?;

        self.slots[index] = Variable::default();
        debug!(index, address = variable.address, "freed variable");
        Ok(variable.address)
    }

    /// Get a slot by index (live or free)
    pub fn get(&self, index: usize) -> Result<&Variable, TableError> {
        self.slots
            .get(index)
            .ok_or(TableError::UnknownVariable { index })
    }

    /// Reclassify a live variable as code; free or unknown slots are left alone
    pub fn mark_code(&mut self, index: usize) {
        if let Some(variable) = self.slots.get_mut(index).filter(|v| v.is_live()) {
            variable.is_code = true;
        }
    }

    /// Index of the live variable whose allocation starts at `address`
    pub fn find_by_address(&self, address: u64) -> Option<usize> {
        if address == 0 {
            return None;
        }
        self.slots.iter().position(|v| v.address == address)
    }

    /// Live variables in index order
    pub fn list(&self) -> impl Iterator<Item = (usize, &Variable)> + Clone + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_live())
    }

    /// Number of slots, including free ones
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots holding an allocation
    pub fn live_count(&self) -> usize {
        self.list().count()
    }

    fn next_free_slot(&self) -> usize {
        self.slots
            .iter()
            .position(|v| !v.is_live())
            .unwrap_or(self.slots.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::simulated::{SimulatedConfig, SimulatedDevice};
    use crate::device::TransportError;

    #[test]
    fn test_allocate_appends() {
        let mut dev = SimulatedDevice::default();
        let mut table = VariableTable::new();

        assert_eq!(table.allocate(&mut dev, VariableKind::Data, 4), Ok(0));
        assert_eq!(table.allocate(&mut dev, VariableKind::Code, 8), Ok(1));

        let code = table.get(1).unwrap();
        assert!(code.is_code);
        assert_eq!(code.size, 8);
        assert_eq!(table.live_count(), 2);
    }

    #[test]
    fn test_free_then_reuse_lowest_slot() {
        let mut dev = SimulatedDevice::default();
        let mut table = VariableTable::new();
        for _ in 0..3 {
            table.allocate(&mut dev, VariableKind::Data, 4).unwrap();
        }

        table.free(&mut dev, 1).unwrap();
        table.free(&mut dev, 0).unwrap();

        assert_eq!(table.allocate(&mut dev, VariableKind::Data, 4), Ok(0));
        assert_eq!(table.allocate(&mut dev, VariableKind::Data, 4), Ok(1));
        assert_eq!(table.allocate(&mut dev, VariableKind::Data, 4), Ok(3));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_double_free_rejected() {
        let mut dev = SimulatedDevice::default();
        let mut table = VariableTable::new();
        table.allocate(&mut dev, VariableKind::Data, 4).unwrap();
        table.free(&mut dev, 0).unwrap();

        let before = table.clone();
        assert_eq!(
            table.free(&mut dev, 0),
            Err(TableError::UnallocatedVariable { index: 0 })
        );
        assert_eq!(table, before);
        assert_eq!(
            table.free(&mut dev, 5),
            Err(TableError::UnknownVariable { index: 5 })
        );
    }

    #[test]
    fn test_failed_allocation_leaves_no_slot() {
        let mut dev = SimulatedDevice::default();
        let mut table = VariableTable::new();
        dev.fail_next(TransportError::Disconnected);

        let err = table.allocate(&mut dev, VariableKind::Data, 4).unwrap_err();
        assert!(matches!(err, TableError::AllocationFailed { .. }));
        assert!(table.is_empty());
    }

    #[test]
    fn test_failed_free_keeps_slot_live() {
        let mut dev = SimulatedDevice::default();
        let mut table = VariableTable::new();
        table.allocate(&mut dev, VariableKind::Data, 4).unwrap();
        dev.fail_next(TransportError::Timeout);

        assert!(matches!(
            table.free(&mut dev, 0),
            Err(TableError::FreeFailed { index: 0, .. })
        ));
        assert!(table.get(0).unwrap().is_live());
    }

    #[test]
    fn test_list_skips_free_slots_and_restarts() {
        let mut dev = SimulatedDevice::default();
        let mut table = VariableTable::new();
        for _ in 0..3 {
            table.allocate(&mut dev, VariableKind::Data, 4).unwrap();
        }
        table.free(&mut dev, 1).unwrap();

        let listing = table.list();
        let first: Vec<usize> = listing.clone().map(|(i, _)| i).collect();
        let second: Vec<usize> = listing.map(|(i, _)| i).collect();
        assert_eq!(first, vec![0, 2]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_mark_code_and_lookup() {
        let mut dev = SimulatedDevice::default();
        let mut table = VariableTable::new();
        table.allocate(&mut dev, VariableKind::Data, 4).unwrap();
        let address = table.get(0).unwrap().address;

        table.mark_code(0);
        assert_eq!(table.get(0).unwrap().kind(), VariableKind::Code);
        assert_eq!(table.find_by_address(address), Some(0));
        assert_eq!(table.find_by_address(0), None);

        table.free(&mut dev, 0).unwrap();
        table.mark_code(0);
        table.mark_code(9);
        assert_eq!(table.get(0).unwrap(), &Variable::default());
    }

    #[test]
    fn test_zero_address_is_not_a_variable() {
        let mut dev = SimulatedDevice::new(SimulatedConfig {
            data_base: 0,
            ..SimulatedConfig::default()
        });
        let mut table = VariableTable::new();

        assert_eq!(
            table.allocate(&mut dev, VariableKind::Data, 0x10),
            Err(TableError::InvalidAddress {
                kind: VariableKind::Data,
                size: 0x10,
                address: 0
            })
        );
        assert!(table.is_empty());
        assert_eq!(dev.allocated_bytes(), 0);
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut dev = SimulatedDevice::default();
        let mut table = VariableTable::new();
        assert_eq!(
            table.allocate(&mut dev, VariableKind::Code, 0),
            Err(TableError::EmptyAllocation)
        );
    }
}
