use crate::error::{SimError, SimResult};
use crate::memory::{
    block::{MemoryBlock, ProcessId},
    coalescer::{self, Coalesced},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Occupancy summary of an address space. `free_blocks` is the
/// fragmentation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceStats {
    pub total: usize,
    pub used: usize,
    pub free: usize,
    pub free_blocks: usize,
    pub largest_free: usize,
}

/// Ordered, gap-free sequence of blocks covering `[0, total_size)`.
///
/// Blocks are kept sorted by start address, so a block can be located by
/// binary search on its start. Owned blocks never move or change size, which
/// makes their start address a stable identity.
#[derive(Debug, Clone)]
pub struct AddressSpace {
    total_size: usize,
    blocks: Vec<MemoryBlock>,
}

impl AddressSpace {
    /// Create a space consisting of one free block.
    pub fn new(total_size: usize) -> SimResult<Self> {
        if total_size == 0 {
            return Err(SimError::invalid("total size must be positive"));
        }
        Ok(AddressSpace {
            total_size,
            blocks: vec![MemoryBlock::free(0, total_size)],
        })
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn blocks(&self) -> &[MemoryBlock] {
        &self.blocks
    }

    /// Position of the block starting exactly at `start`.
    pub fn position_of(&self, start: usize) -> Option<usize> {
        self.blocks.binary_search_by_key(&start, |b| b.start).ok()
    }

    /// Hand the first `size` units of the free block at `pos` to `pid`.
    /// Any remainder stays free directly after the new owned block.
    /// Returns the start address of the owned block. Fails without touching
    /// the space unless `pos` is a free block of at least `size > 0` units.
    pub fn occupy(&mut self, pos: usize, size: usize, pid: ProcessId) -> SimResult<usize> {
        let Some(&block) = self.blocks.get(pos) else {
            return Err(SimError::invalid(format!("no block at position {}", pos)));
        };
        if !block.is_free() {
            return Err(SimError::invalid(format!("block at {} is not free", block.start)));
        }
        if size == 0 || size > block.size {
            return Err(SimError::invalid(format!(
                "{} units do not fit the {} unit block at {}",
                size, block.size, block.start
            )));
        }

        self.blocks[pos] = MemoryBlock::owned(block.start, size, pid);
        if block.size > size {
            let remainder = MemoryBlock::free(block.start + size, block.size - size);
            debug!(pid, at = block.start, size, remainder = remainder.size, "split block");
            self.blocks.insert(pos + 1, remainder);
        }
        Ok(block.start)
    }

    /// Turn the block at `pos` free and merge it with free neighbours.
    /// Returns the released size and where the merged free block ended up.
    pub fn release(&mut self, pos: usize) -> (usize, Coalesced) {
        let block = &mut self.blocks[pos];
        let size = block.size;
        block.owner = None;
        let merged = coalescer::coalesce(&mut self.blocks, pos);
        (size, merged)
    }

    pub fn stats(&self) -> SpaceStats {
        let mut free = 0;
        let mut free_blocks = 0;
        let mut largest_free = 0;
        for b in self.blocks.iter().filter(|b| b.is_free()) {
            free += b.size;
            free_blocks += 1;
            largest_free = largest_free.max(b.size);
        }
        SpaceStats {
            total: self.total_size,
            used: self.total_size - free,
            free,
            free_blocks,
            largest_free,
        }
    }

    /// Checks contiguity, coverage, coalescing and owner uniqueness.
    /// Returns a description of the first violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut cursor = 0;
        let mut owners: Vec<ProcessId> = Vec::new();
        for (i, b) in self.blocks.iter().enumerate() {
            if b.size == 0 {
                return Err(format!("block {} at {} has zero size", i, b.start));
            }
            if b.start != cursor {
                return Err(format!("block {} starts at {}, expected {}", i, b.start, cursor));
            }
            if i > 0 && b.is_free() && self.blocks[i - 1].is_free() {
                return Err(format!("blocks {} and {} are both free", i - 1, i));
            }
            if let Some(pid) = b.owner {
                if owners.contains(&pid) {
                    return Err(format!("process {} owns more than one block", pid));
                }
                owners.push(pid);
            }
            cursor = b.end();
        }
        if cursor != self.total_size {
            return Err(format!("blocks end at {}, expected {}", cursor, self.total_size));
        }
        Ok(())
    }
}
