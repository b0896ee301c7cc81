use crate::cli::{
    command::Command,
    display,
    utils::execute,
};
use crate::memory::allocator::AllocationStrategy;
use crate::paging::replacement::PagingPolicy;
use crate::session::SimulationSession;
use anyhow::Result;

/// Reference string showing Belady's anomaly under FIFO.
pub const BELADY_STRING: [u32; 12] = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];

fn run(session: &mut SimulationSession, cmds: &[Command], out: &mut Vec<String>) {
    for cmd in cmds {
        match execute(session, cmd) {
            Ok(text) => out.push(text),
            Err(e) => out.push(format!("✗ {}", e)),
        }
    }
}

fn alloc(strategy: AllocationStrategy, pid: u32, size: usize) -> Command {
    Command::Alloc {
        strategy,
        pid,
        size,
    }
}

/// The walkthrough printed by `memsim demo`.
pub fn run_demo() -> Result<String> {
    let mut out = Vec::new();
    let ff = AllocationStrategy::FirstFit;
    let bf = AllocationStrategy::BestFit;

    out.push("=== MEMORY ALLOCATION (First-Fit) ===".to_string());
    let mut s = SimulationSession::new(512, 3)?;
    run(
        &mut s,
        &[alloc(ff, 1, 100), alloc(ff, 2, 50), alloc(ff, 3, 200), Command::Map],
        &mut out,
    );
    out.push("--- Deallocating Process 2 ---".to_string());
    run(&mut s, &[Command::Free { pid: 2 }, Command::Map], &mut out);
    out.push("--- Attempting to allocate 150KB ---".to_string());
    run(&mut s, &[alloc(ff, 4, 150), Command::Map], &mut out);

    out.push("\n=== MEMORY ALLOCATION (Best-Fit) ===".to_string());
    let mut s = SimulationSession::new(512, 3)?;
    run(
        &mut s,
        &[
            alloc(bf, 1, 100),
            alloc(bf, 2, 50),
            alloc(bf, 3, 200),
            Command::Free { pid: 2 },
            alloc(bf, 4, 40),
            Command::Map,
        ],
        &mut out,
    );

    for policy in [PagingPolicy::Fifo, PagingPolicy::Lru] {
        out.push(format!("\n=== PAGING ({}) ===", policy));
        let mut s = SimulationSession::new(512, 3)?;
        for result in s.access_sequence(policy, &BELADY_STRING)? {
            out.push(display::render_access(&result));
        }
        out.push(display::render_paging(&s.paging_stats(), &s.frames()));
    }

    Ok(out.join("\n"))
}
