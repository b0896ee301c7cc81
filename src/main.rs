use anyhow::{Context, bail};
use memsim::{
    cli::{demo::run_demo, shell::run_shell, utils},
    config::SimConfig,
    net::server::run_server,
    session::SimulationSession,
};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <demo|server [--config file]|shell [url]|script <file.csv> [--export out.csv]>",
        program
    )
}

/// Value following `flag` in `args`, if present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("memsim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", usage(&args[0]));
        std::process::exit(1);
    }
    let config = SimConfig::load(flag_value(&args, "--config"))?;

    match args[1].as_str() {
        "demo" => {
            println!("OPERATING SYSTEMS - MEMORY MANAGEMENT SIMULATION");
            println!("{}\n", "=".repeat(60));
            println!("{}", run_demo()?);
        }
        "server" => {
            let rt = Runtime::new().context("Failed to start runtime")?;
            rt.block_on(run_server(&config))?;
        }
        "shell" => {
            let url = match args.get(2) {
                Some(u) if !u.starts_with("--") => u.clone(),
                _ => format!("http://{}", config.addr),
            };
            let rt = Runtime::new().context("Failed to start runtime")?;
            rt.block_on(run_shell(&url))?;
        }
        "script" => {
            let Some(path) = args.get(2) else {
                bail!(usage(&args[0]));
            };
            let mut session = SimulationSession::from_config(&config)?;
            let report = utils::run_script(&mut session, path)?;
            for line in &report.output {
                println!("{}", line);
            }
            println!(
                "\n{} commands applied, {} rejected",
                report.applied,
                report.rejected.len()
            );
            if let Some(out) = flag_value(&args, "--export") {
                utils::export_snapshot(&session.snapshot(), out)?;
                println!("Snapshot written to {}", out);
            }
        }
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("{}", usage(&args[0]));
            std::process::exit(1);
        }
    }
    Ok(())
}
