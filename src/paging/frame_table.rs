use crate::error::{SimError, SimResult};
use crate::paging::replacement::ReplacementPolicy;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub type PageId = u32;

/// Result of a single page reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AccessResult {
    Hit {
        page: PageId,
        slot: usize,
    },
    Fault {
        page: PageId,
        evicted: Option<PageId>,
        slot: usize,
    },
}

impl AccessResult {
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessResult::Hit { .. })
    }

    pub fn evicted(&self) -> Option<PageId> {
        match self {
            AccessResult::Fault { evicted, .. } => *evicted,
            AccessResult::Hit { .. } => None,
        }
    }
}

/// Fixed number of frames, each empty or holding one page.
#[derive(Debug, Clone)]
pub struct FrameTable {
    slots: Vec<Option<PageId>>,
}

impl FrameTable {
    pub fn new(capacity: usize) -> SimResult<Self> {
        if capacity == 0 {
            return Err(SimError::invalid("frame count must be positive"));
        }
        Ok(FrameTable {
            slots: vec![None; capacity],
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<PageId>] {
        &self.slots
    }

    pub fn slot_of(&self, page: PageId) -> Option<usize> {
        self.slots.iter().position(|&s| s == Some(page))
    }

    pub fn resident(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Reference `page`, loading it on a fault and asking `policy` for a
    /// victim when every frame is taken.
    ///
    /// The policy must track exactly the resident pages. A victim that is not
    /// resident is reported as an error and the table is left unchanged.
    pub fn access(
        &mut self,
        page: PageId,
        policy: &mut dyn ReplacementPolicy,
    ) -> SimResult<AccessResult> {
        if let Some(slot) = self.slot_of(page) {
            policy.record_hit(page);
            return Ok(AccessResult::Hit { page, slot });
        }

        if let Some(slot) = self.slots.iter().position(|s| s.is_none()) {
            self.slots[slot] = Some(page);
            policy.record_load(page);
            debug!(page, slot, "loaded into empty frame");
            return Ok(AccessResult::Fault {
                page,
                evicted: None,
                slot,
            });
        }

        let victim = policy
            .evict()
            .ok_or_else(|| SimError::invalid("replacement policy has no victim for a full table"))?;
        let slot = self.slot_of(victim).ok_or_else(|| {
            SimError::invalid(format!("replacement policy chose page {} which is not resident", victim))
        })?;
        self.slots[slot] = Some(page);
        policy.record_load(page);
        debug!(page, slot, victim, "replaced page");
        Ok(AccessResult::Fault {
            page,
            evicted: Some(victim),
            slot,
        })
    }
}
