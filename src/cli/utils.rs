use crate::cli::{
    command::{Command, parse_command},
    display,
};
use crate::error::{SimError, SimResult};
use crate::memory::block::MemoryBlock;
use crate::session::SimulationSession;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;
use tracing::warn;

/// Run one command against a local session and describe the outcome.
pub fn execute(session: &mut SimulationSession, cmd: &Command) -> SimResult<String> {
    let out = match cmd {
        Command::Alloc {
            strategy,
            pid,
            size,
        } => {
            let start = session.allocate(*strategy, *pid, *size)?;
            format!("✓ Allocated {}KB to Process {} at address {}", size, pid, start)
        }
        Command::Free { pid } => {
            let size = session.deallocate(*pid)?;
            format!("✓ Deallocated Process {} ({}KB)", pid, size)
        }
        Command::Map => display::render_memory_map(&session.snapshot(), &session.stats()),
        Command::Stats => {
            let s = session.stats();
            format!(
                "used={} free={} total={} free_blocks={} largest_free={}",
                s.used, s.free, s.total, s.free_blocks, s.largest_free
            )
        }
        Command::Access { policy, pages } => session
            .access_sequence(*policy, pages)?
            .iter()
            .map(display::render_access)
            .collect::<Vec<_>>()
            .join("\n"),
        Command::Paging => display::render_paging(&session.paging_stats(), &session.frames()),
        Command::Reset { frames } => {
            session.reset_paging(*frames)?;
            "Paging reset".to_string()
        }
        Command::Exit => String::new(),
    };
    Ok(out)
}

/// Outcome of replaying a script. Rejected commands do not stop the replay.
#[derive(Debug, Default)]
pub struct ScriptReport {
    pub applied: usize,
    pub rejected: Vec<(u64, SimError)>,
    pub output: Vec<String>,
}

/// Replay a headerless CSV of `op,arg1,arg2,...` rows against `session`.
/// Rejected commands are reported by their line number in the file.
pub fn run_script<P: AsRef<Path>>(session: &mut SimulationSession, path: P) -> Result<ScriptReport> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open script {}", path.display()))?;

    let mut report = ScriptReport::default();
    for result in rdr.records() {
        let record = result?;
        let line_no = record.position().map_or(0, |p| p.line());
        let line: Vec<&str> = record.iter().filter(|f| !f.is_empty()).collect();
        if line.is_empty() || line[0].starts_with('#') {
            continue;
        }
        let outcome = parse_command(&line.join(" ")).and_then(|cmd| match cmd {
            Command::Exit => Ok(None),
            cmd => execute(session, &cmd).map(Some),
        });
        match outcome {
            Ok(Some(text)) => {
                report.applied += 1;
                report.output.push(text);
            }
            Ok(None) => break,
            Err(e) => {
                warn!(line = line_no, error = %e, "script command rejected");
                report.output.push(format!("✗ line {}: {}", line_no, e));
                report.rejected.push((line_no, e));
            }
        }
    }
    Ok(report)
}

/// Write `blocks` as CSV with a `start,size,owner` header; free blocks have
/// an empty owner.
pub fn export_snapshot<P: AsRef<Path>>(blocks: &[MemoryBlock], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["start", "size", "owner"])?;
    for b in blocks {
        let owner = b.owner.map(|p| p.to_string()).unwrap_or_default();
        wtr.write_record([b.start.to_string(), b.size.to_string(), owner])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a snapshot written by [`export_snapshot`].
pub fn import_snapshot<P: AsRef<Path>>(path: P) -> Result<Vec<MemoryBlock>> {
    let mut rdr = ReaderBuilder::new().from_path(path)?;
    let mut blocks = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let start = record.get(0).unwrap_or_default().parse()?;
        let size = record.get(1).unwrap_or_default().parse()?;
        let owner = match record.get(2).unwrap_or_default() {
            "" => None,
            pid => Some(pid.parse()?),
        };
        blocks.push(MemoryBlock { start, size, owner });
    }
    Ok(blocks)
}
