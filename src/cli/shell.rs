use crate::cli::{
    command::{Command, parse_command},
    display,
};
use crate::net::client::SimClient;
use anyhow::Result;
use rustyline::{Editor, error::ReadlineError};

async fn dispatch(client: &SimClient, cmd: Command) -> Result<String> {
    let out = match cmd {
        Command::Alloc {
            strategy,
            pid,
            size,
        } => {
            let start = client.allocate(strategy, pid, size).await?;
            format!("✓ Allocated {}KB to Process {} at address {}", size, pid, start)
        }
        Command::Free { pid } => {
            let size = client.deallocate(pid).await?;
            format!("✓ Deallocated Process {} ({}KB)", pid, size)
        }
        Command::Map => {
            let blocks = client.snapshot().await?;
            let stats = client.stats().await?;
            display::render_memory_map(&blocks, &stats)
        }
        Command::Stats => {
            let s = client.stats().await?;
            format!(
                "used={} free={} total={} free_blocks={} largest_free={}",
                s.used, s.free, s.total, s.free_blocks, s.largest_free
            )
        }
        Command::Access { policy, pages } => {
            let mut lines = Vec::with_capacity(pages.len());
            for page in pages {
                let result = client.access_page(policy, page).await?;
                lines.push(display::render_access(&result));
            }
            lines.join("\n")
        }
        Command::Paging => {
            let stats = client.paging_stats().await?;
            let frames = client.frames().await?;
            display::render_paging(&stats, &frames)
        }
        Command::Reset { frames } => {
            let frames = client.reset_paging(frames).await?;
            format!("Paging reset, {} frames", frames.len())
        }
        Command::Exit => String::new(),
    };
    Ok(out)
}

pub async fn run_shell(base_url: &str) -> Result<()> {
    let client = SimClient::new(base_url);
    let mut rl = Editor::<()>::new()?;

    println!("Connected to {}. Commands: alloc <ff|bf> <pid> <size>, free <pid>, map, stats,", base_url);
    println!("access <fifo|lru> <page>..., paging, reset [frames], exit");
    loop {
        match rl.readline("mem> ") {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => {
                rl.add_history_entry(line.as_str());
                match parse_command(&line) {
                    Ok(Command::Exit) => break,
                    Ok(cmd) => match dispatch(&client, cmd).await {
                        Ok(out) => println!("{}", out),
                        Err(e) => println!("✗ {}", e),
                    },
                    Err(e) => println!("✗ {}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
