use crate::error::{SimError, SimResult};
use crate::memory::{allocator::AllocationStrategy, block::ProcessId};
use crate::paging::{frame_table::PageId, replacement::PagingPolicy};

/// One line of the shell / script grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Alloc {
        strategy: AllocationStrategy,
        pid: ProcessId,
        size: usize,
    },
    Free {
        pid: ProcessId,
    },
    Map,
    Stats,
    Access {
        policy: PagingPolicy,
        pages: Vec<PageId>,
    },
    Paging,
    Reset {
        frames: Option<usize>,
    },
    Exit,
}

fn number<T: std::str::FromStr>(word: Option<&&str>, what: &str) -> SimResult<T> {
    let word = word.ok_or_else(|| SimError::invalid(format!("missing {}", what)))?;
    word.parse()
        .map_err(|_| SimError::invalid(format!("{} '{}' is not a number", what, word)))
}

/// Parse a whitespace-separated command. Keywords are case-insensitive.
pub fn parse_command(line: &str) -> SimResult<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some(head) = words.first() else {
        return Err(SimError::invalid("empty command"));
    };
    let cmd = match head.to_ascii_lowercase().as_str() {
        "alloc" | "allocate" => {
            let strategy = words
                .get(1)
                .ok_or_else(|| SimError::invalid("missing strategy"))?
                .parse()?;
            Command::Alloc {
                strategy,
                pid: number(words.get(2), "pid")?,
                size: number(words.get(3), "size")?,
            }
        }
        "free" | "dealloc" | "deallocate" => Command::Free {
            pid: number(words.get(1), "pid")?,
        },
        "map" | "snapshot" => Command::Map,
        "stats" => Command::Stats,
        "access" => {
            let policy = words
                .get(1)
                .ok_or_else(|| SimError::invalid("missing policy"))?
                .parse()?;
            let pages = words[2..]
                .iter()
                .map(|w| number(Some(w), "page"))
                .collect::<SimResult<Vec<PageId>>>()?;
            if pages.is_empty() {
                return Err(SimError::invalid("missing page"));
            }
            Command::Access { policy, pages }
        }
        "paging" => Command::Paging,
        "reset" => Command::Reset {
            frames: match words.get(1) {
                Some(_) => Some(number(words.get(1), "frames")?),
                None => None,
            },
        },
        "exit" | "quit" => Command::Exit,
        other => return Err(SimError::invalid(format!("unknown command '{}'", other))),
    };
    Ok(cmd)
}
