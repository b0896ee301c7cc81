use serde::{Deserialize, Serialize};
use std::fmt;

pub type ProcessId = u32;

/// A contiguous extent of the simulated address space.
///
/// A block is free iff it has no owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBlock {
    pub start: usize,
    pub size: usize,
    pub owner: Option<ProcessId>,
}

impl MemoryBlock {
    pub fn free(start: usize, size: usize) -> Self {
        MemoryBlock {
            start,
            size,
            owner: None,
        }
    }

    pub fn owned(start: usize, size: usize, pid: ProcessId) -> Self {
        MemoryBlock {
            start,
            size,
            owner: Some(pid),
        }
    }

    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }

    /// One past the last address covered by this block.
    pub fn end(&self) -> usize {
        self.start + self.size
    }
}

impl fmt::Display for MemoryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner {
            Some(pid) => write!(f, "[{}-{}] P{} ({}KB)", self.start, self.end() - 1, pid, self.size),
            None => write!(f, "[{}-{}] FREE ({}KB)", self.start, self.end() - 1, self.size),
        }
    }
}
