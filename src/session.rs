use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::memory::{
    address_space::{AddressSpace, SpaceStats},
    allocator::{self, AllocationStrategy},
    block::{MemoryBlock, ProcessId},
    index::AllocationIndex,
};
use crate::paging::{
    frame_table::{AccessResult, FrameTable, PageId},
    replacement::{PagingPolicy, ReplacementPolicy},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Cumulative paging counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PagingStats {
    pub hits: u64,
    pub faults: u64,
    /// `hits / (hits + faults)`, 0.0 before the first access.
    pub hit_rate: f64,
}

struct Pager {
    policy: PagingPolicy,
    replacer: Box<dyn ReplacementPolicy + Send + Sync>,
}

/// One simulation run: an address space with its allocation index, and a
/// frame table bound to a single replacement policy.
///
/// Every command either applies completely or returns an error and leaves
/// the session as it was.
pub struct SimulationSession {
    space: AddressSpace,
    index: AllocationIndex,
    frames: FrameTable,
    pager: Option<Pager>,
    hits: u64,
    faults: u64,
}

impl SimulationSession {
    /// Create a session with `total_size` units of memory and `frame_count` frames.
    pub fn new(total_size: usize, frame_count: usize) -> SimResult<Self> {
        Ok(SimulationSession {
            space: AddressSpace::new(total_size)?,
            index: AllocationIndex::new(),
            frames: FrameTable::new(frame_count)?,
            pager: None,
            hits: 0,
            faults: 0,
        })
    }

    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        Self::new(config.total_size, config.frames)
    }

    pub fn allocate(
        &mut self,
        strategy: AllocationStrategy,
        pid: ProcessId,
        size: usize,
    ) -> SimResult<usize> {
        if size == 0 {
            return Err(SimError::invalid("size must be positive"));
        }
        if self.index.contains(pid) {
            return Err(SimError::invalid(format!("process {} already holds a block", pid)));
        }
        allocator::allocate(&mut self.space, &mut self.index, strategy, pid, size)
    }

    /// Returns the size released.
    pub fn deallocate(&mut self, pid: ProcessId) -> SimResult<usize> {
        allocator::deallocate(&mut self.space, &mut self.index, pid)
    }

    pub fn snapshot(&self) -> Vec<MemoryBlock> {
        self.space.blocks().to_vec()
    }

    pub fn stats(&self) -> SpaceStats {
        self.space.stats()
    }

    pub fn total_size(&self) -> usize {
        self.space.total_size()
    }

    /// Start address of the block owned by `pid`.
    pub fn address_of(&self, pid: ProcessId) -> Option<usize> {
        self.index.start_of(pid)
    }

    /// Verify the address space invariants and that the index matches it.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.space.check_invariants()?;
        if !self.index.agrees_with(&self.space) {
            return Err("allocation index out of sync with address space".to_string());
        }
        Ok(())
    }

    /// Reference `page` under `policy`. The first access binds the frame
    /// table to its policy; naming a different policy afterwards is rejected
    /// until `reset_paging`.
    pub fn access_page(&mut self, policy: PagingPolicy, page: PageId) -> SimResult<AccessResult> {
        self.ensure_policy(policy)?;
        let capacity = self.frames.capacity();
        let pager = self.pager.get_or_insert_with(|| {
            debug!(%policy, capacity, "binding frame table");
            Pager {
                policy,
                replacer: policy.replacer(capacity),
            }
        });

        let result = self.frames.access(page, &mut *pager.replacer)?;
        if result.is_hit() {
            self.hits += 1;
        } else {
            self.faults += 1;
        }
        Ok(result)
    }

    /// Reference every page of `pages` in order.
    pub fn access_sequence(
        &mut self,
        policy: PagingPolicy,
        pages: &[PageId],
    ) -> SimResult<Vec<AccessResult>> {
        self.ensure_policy(policy)?;
        pages.iter().map(|&p| self.access_page(policy, p)).collect()
    }

    fn ensure_policy(&self, policy: PagingPolicy) -> SimResult<()> {
        match self.policy() {
            Some(bound) if bound != policy => Err(SimError::invalid(format!(
                "frame table is bound to {}, not {}",
                bound, policy
            ))),
            _ => Ok(()),
        }
    }

    pub fn paging_stats(&self) -> PagingStats {
        let total = self.hits + self.faults;
        let hit_rate = if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        };
        PagingStats {
            hits: self.hits,
            faults: self.faults,
            hit_rate,
        }
    }

    pub fn frames(&self) -> Vec<Option<PageId>> {
        self.frames.slots().to_vec()
    }

    /// Policy the frame table is bound to, if any page was accessed yet.
    pub fn policy(&self) -> Option<PagingPolicy> {
        self.pager.as_ref().map(|p| p.policy)
    }

    /// Resident pages, next victim first.
    pub fn eviction_order(&self) -> Vec<PageId> {
        self.pager
            .as_ref()
            .map(|p| p.replacer.order())
            .unwrap_or_default()
    }

    /// Empty the frame table, clear counters and the policy binding.
    /// `frame_count` resizes the table when given.
    pub fn reset_paging(&mut self, frame_count: Option<usize>) -> SimResult<()> {
        let capacity = frame_count.unwrap_or(self.frames.capacity());
        self.frames = FrameTable::new(capacity)?;
        self.pager = None;
        self.hits = 0;
        self.faults = 0;
        info!(capacity, "paging reset");
        Ok(())
    }
}
