use crate::error::SimError;
use crate::paging::frame_table::PageId;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt, str::FromStr};

/// Victim selection for a full frame table.
///
/// Implementations only track resident pages; which slot a page sits in is
/// the frame table's business.
pub trait ReplacementPolicy {
    /// A page was loaded into a frame.
    fn record_load(&mut self, page: PageId);

    /// A resident page was referenced again.
    fn record_hit(&mut self, page: PageId);

    /// Remove and return the page to evict, or `None` if nothing is resident.
    fn evict(&mut self) -> Option<PageId>;

    /// Resident pages, next victim first.
    fn order(&self) -> Vec<PageId>;
}

/// Evicts the page that arrived first. References do not change the order.
#[derive(Debug, Default)]
pub struct FifoReplacer {
    arrivals: VecDeque<PageId>,
}

impl FifoReplacer {
    pub fn new(capacity: usize) -> Self {
        FifoReplacer {
            arrivals: VecDeque::with_capacity(capacity),
        }
    }
}

impl ReplacementPolicy for FifoReplacer {
    fn record_load(&mut self, page: PageId) {
        self.arrivals.push_back(page);
    }

    fn record_hit(&mut self, _page: PageId) {}

    fn evict(&mut self) -> Option<PageId> {
        self.arrivals.pop_front()
    }

    fn order(&self) -> Vec<PageId> {
        self.arrivals.iter().copied().collect()
    }
}

/// Evicts the page that has gone unreferenced the longest.
/// Most recently used sits at the back.
#[derive(Debug, Default)]
pub struct LruReplacer {
    recency: VecDeque<PageId>,
}

impl LruReplacer {
    pub fn new(capacity: usize) -> Self {
        LruReplacer {
            recency: VecDeque::with_capacity(capacity),
        }
    }
}

impl ReplacementPolicy for LruReplacer {
    fn record_load(&mut self, page: PageId) {
        self.recency.push_back(page);
    }

    fn record_hit(&mut self, page: PageId) {
        if let Some(pos) = self.recency.iter().position(|&p| p == page) {
            self.recency.remove(pos);
        }
        self.recency.push_back(page);
    }

    fn evict(&mut self) -> Option<PageId> {
        self.recency.pop_front()
    }

    fn order(&self) -> Vec<PageId> {
        self.recency.iter().copied().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagingPolicy {
    Fifo,
    Lru,
}

impl PagingPolicy {
    pub fn replacer(self, capacity: usize) -> Box<dyn ReplacementPolicy + Send + Sync> {
        match self {
            PagingPolicy::Fifo => Box::new(FifoReplacer::new(capacity)),
            PagingPolicy::Lru => Box::new(LruReplacer::new(capacity)),
        }
    }
}

impl fmt::Display for PagingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PagingPolicy::Fifo => write!(f, "FIFO"),
            PagingPolicy::Lru => write!(f, "LRU"),
        }
    }
}

impl FromStr for PagingPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Ok(PagingPolicy::Fifo),
            "lru" => Ok(PagingPolicy::Lru),
            other => Err(SimError::invalid(format!("unknown policy '{}'", other))),
        }
    }
}
