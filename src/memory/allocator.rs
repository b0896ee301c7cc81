use crate::error::{SimError, SimResult};
use crate::memory::{
    address_space::AddressSpace,
    block::{MemoryBlock, ProcessId},
    index::AllocationIndex,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::debug;

/// Chooses which free block receives a request.
pub trait Placement {
    /// Position of the chosen free block with room for `size`, if any.
    fn choose(&self, blocks: &[MemoryBlock], size: usize) -> Option<usize>;
}

/// Take the lowest-addressed free block that is large enough.
pub struct FirstFit;

impl Placement for FirstFit {
    fn choose(&self, blocks: &[MemoryBlock], size: usize) -> Option<usize> {
        blocks.iter().position(|b| b.is_free() && b.size >= size)
    }
}

/// Take the smallest free block that is large enough; the lowest address
/// wins among equal sizes.
pub struct BestFit;

impl Placement for BestFit {
    fn choose(&self, blocks: &[MemoryBlock], size: usize) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (pos, b) in blocks.iter().enumerate() {
            if b.is_free() && b.size >= size && best.is_none_or(|(_, s)| b.size < s) {
                best = Some((pos, b.size));
            }
        }
        best.map(|(pos, _)| pos)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    FirstFit,
    BestFit,
}

impl AllocationStrategy {
    pub fn placement(self) -> &'static dyn Placement {
        match self {
            AllocationStrategy::FirstFit => &FirstFit,
            AllocationStrategy::BestFit => &BestFit,
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationStrategy::FirstFit => write!(f, "first-fit"),
            AllocationStrategy::BestFit => write!(f, "best-fit"),
        }
    }
}

impl FromStr for AllocationStrategy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ff" | "first" | "first_fit" | "first-fit" => Ok(AllocationStrategy::FirstFit),
            "bf" | "best" | "best_fit" | "best-fit" => Ok(AllocationStrategy::BestFit),
            other => Err(SimError::invalid(format!("unknown strategy '{}'", other))),
        }
    }
}

/// Place `size` units for `pid` and record it in `index`.
///
/// The caller guarantees `size > 0` and that `pid` holds no block. On
/// failure neither `space` nor `index` is touched.
pub fn allocate(
    space: &mut AddressSpace,
    index: &mut AllocationIndex,
    strategy: AllocationStrategy,
    pid: ProcessId,
    size: usize,
) -> SimResult<usize> {
    let Some(pos) = strategy.placement().choose(space.blocks(), size) else {
        return Err(SimError::InsufficientMemory {
            requested: size,
            largest_free: space.stats().largest_free,
        });
    };
    let start = space.occupy(pos, size, pid)?;
    index.insert(pid, start);
    debug!(pid, size, start, %strategy, "allocated");
    Ok(start)
}

/// Free the block owned by `pid` and coalesce around it. Returns the
/// released size.
pub fn deallocate(
    space: &mut AddressSpace,
    index: &mut AllocationIndex,
    pid: ProcessId,
) -> SimResult<usize> {
    let pos = index
        .locate(space, pid)
        .ok_or(SimError::ProcessNotFound(pid))?;
    index.remove(pid);
    let (size, merged) = space.release(pos);
    debug!(pid, size, merges = merged.merges, "deallocated");
    Ok(size)
}
