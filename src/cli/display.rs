use crate::memory::{address_space::SpaceStats, block::MemoryBlock};
use crate::paging::frame_table::{AccessResult, PageId};
use crate::session::PagingStats;
use std::fmt::Write;

const BAR_WIDTH: usize = 40;

fn owner_label(block: &MemoryBlock) -> String {
    match block.owner {
        Some(pid) => format!("P{}", pid),
        None => "FREE".to_string(),
    }
}

/// Text memory map: one row per block with a bar proportional to its size.
pub fn render_memory_map(blocks: &[MemoryBlock], stats: &SpaceStats) -> String {
    let mut out = String::from("--- Memory Map ---\n");
    for b in blocks {
        // widened so sizes near usize::MAX cannot overflow
        let bar_len = if stats.total == 0 {
            0
        } else {
            (b.size as u128 * BAR_WIDTH as u128 / stats.total as u128) as usize
        };
        let _ = writeln!(
            out,
            "{:4}-{:4} {:6} |{}",
            b.start,
            b.end(),
            owner_label(b),
            "█".repeat(bar_len)
        );
    }
    let _ = writeln!(
        out,
        "\nUsed: {}KB / Free: {}KB / Total: {}KB",
        stats.used, stats.free, stats.total
    );
    let _ = writeln!(out, "Fragmentation: {} free blocks", stats.free_blocks);
    out
}

pub fn render_frames(frames: &[Option<PageId>]) -> String {
    let cells: Vec<String> = frames
        .iter()
        .map(|f| match f {
            Some(p) => p.to_string(),
            None => "-".to_string(),
        })
        .collect();
    format!("[{}]", cells.join(", "))
}

pub fn render_paging(stats: &PagingStats, frames: &[Option<PageId>]) -> String {
    let mut out = String::from("--- Page Table Statistics ---\n");
    let _ = writeln!(out, "Frames: {}", render_frames(frames));
    let _ = writeln!(out, "Page Hits: {}", stats.hits);
    let _ = writeln!(out, "Page Faults: {}", stats.faults);
    let _ = writeln!(out, "Hit Rate: {:.1}%", stats.hit_rate * 100.0);
    out
}

pub fn render_access(result: &AccessResult) -> String {
    match *result {
        AccessResult::Hit { page, slot } => format!("Page {}: HIT (frame {})", page, slot),
        AccessResult::Fault {
            page,
            evicted: None,
            slot,
        } => format!("Page {}: FAULT (loaded into frame {})", page, slot),
        AccessResult::Fault {
            page,
            evicted: Some(victim),
            slot,
        } => format!("Page {}: FAULT (replaced page {} in frame {})", page, victim, slot),
    }
}
