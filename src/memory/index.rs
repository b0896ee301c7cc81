use crate::memory::{address_space::AddressSpace, block::ProcessId};
use std::collections::HashMap;

/// Maps each process to the start address of the block it owns.
///
/// Purely derived from the address space: entries are added and removed by
/// the allocator in the same step that mutates the space.
#[derive(Debug, Clone, Default)]
pub struct AllocationIndex {
    starts: HashMap<ProcessId, usize>,
}

impl AllocationIndex {
    pub fn new() -> Self {
        AllocationIndex {
            starts: HashMap::new(),
        }
    }

    pub fn insert(&mut self, pid: ProcessId, start: usize) {
        self.starts.insert(pid, start);
    }

    pub fn remove(&mut self, pid: ProcessId) -> Option<usize> {
        self.starts.remove(&pid)
    }

    pub fn start_of(&self, pid: ProcessId) -> Option<usize> {
        self.starts.get(&pid).copied()
    }

    pub fn contains(&self, pid: ProcessId) -> bool {
        self.starts.contains_key(&pid)
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Resolve `pid` to the position of its block in `space`.
    pub fn locate(&self, space: &AddressSpace, pid: ProcessId) -> Option<usize> {
        let start = self.start_of(pid)?;
        space.position_of(start)
    }

    /// True when every entry points at a block owned by that process and
    /// every owned block has an entry.
    pub fn agrees_with(&self, space: &AddressSpace) -> bool {
        let owned = space.blocks().iter().filter(|b| !b.is_free()).count();
        owned == self.starts.len()
            && self.starts.iter().all(|(&pid, &start)| {
                space
                    .position_of(start)
                    .is_some_and(|pos| space.blocks()[pos].owner == Some(pid))
            })
    }
}
