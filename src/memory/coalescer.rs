use crate::memory::block::MemoryBlock;
use tracing::debug;

/// Outcome of coalescing around one freed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coalesced {
    /// Position of the surviving free block.
    pub position: usize,
    /// Number of neighbours absorbed, at most 2.
    pub merges: usize,
}

/// Merge the free block at `pos` with its free neighbours.
///
/// Only one block changed state, so at most one merge per side is possible:
/// the successor is absorbed first, then the block folds into its
/// predecessor. Afterwards neither neighbour of the result is free.
pub fn coalesce(blocks: &mut Vec<MemoryBlock>, pos: usize) -> Coalesced {
    debug_assert!(blocks[pos].is_free());
    let mut position = pos;
    let mut merges = 0;

    if position + 1 < blocks.len() && blocks[position + 1].is_free() {
        let next = blocks.remove(position + 1);
        blocks[position].size += next.size;
        merges += 1;
        debug!(at = blocks[position].start, absorbed = next.start, "merged successor");
    }

    if position > 0 && blocks[position - 1].is_free() {
        let current = blocks.remove(position);
        position -= 1;
        blocks[position].size += current.size;
        merges += 1;
        debug!(at = blocks[position].start, absorbed = current.start, "merged predecessor");
    }

    debug_assert!(position == 0 || !blocks[position - 1].is_free());
    debug_assert!(position + 1 >= blocks.len() || !blocks[position + 1].is_free());
    Coalesced { position, merges }
}
