//! vfsh entry point.
//!
//! ```bash
//! cargo run -p vfstree-repl -- --url http://192.168.4.1
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vfstree_client::{ClientConfig, HttpVfsApi};
use vfstree_repl::{ConsoleConfig, Repl};

/// Used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "warn,vfsh=info";

#[derive(Debug, Parser)]
#[command(name = "vfsh", version, about = "Browse and edit a device's virtual filesystem")]
struct Args {
    /// Device base URL (default from config, else http://192.168.4.1)
    #[arg(long)]
    url: Option<String>,

    /// Config file (default: $XDG_CONFIG_HOME/vfstree/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .init();

    let args = Args::parse();

    let mut config =
        ConsoleConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = args.url {
        config.url = url;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }

    run(config)
}

fn run(config: ConsoleConfig) -> Result<()> {
    let client = ClientConfig::new(&config.url)
        .context("Invalid device url")?
        .with_timeout(config.timeout());
    let api = HttpVfsApi::new(client).context("Failed to create HTTP client")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    println!("vfsh v{} connected to {}", env!("CARGO_PKG_VERSION"), api.base_url());
    println!("Type `help` for commands, `quit` to exit.\n");

    let mut rl: Editor<(), DefaultHistory> = Editor::new().context("Failed to create editor")?;

    let history_path = config.history_path();
    if let Some(ref path) = history_path {
        // Missing history on first run is expected
        let _ = rl.load_history(path);
    }

    let mut repl = Repl::new(api);

    match runtime.block_on(repl.process_line("volumes")) {
        Ok(Some(output)) => println!("{output}"),
        Ok(None) => {}
        Err(e) => eprintln!("Error: {e}"),
    }

    while !repl.is_done() {
        match rl.readline("vfsh> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                match runtime.block_on(repl.process_line(&line)) {
                    Ok(Some(output)) => println!("{output}"),
                    Ok(None) => {}
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = rl.save_history(path) {
            tracing::warn!("failed to save history to {}: {}", path.display(), e);
        }
    }

    Ok(())
}
