//! India Weather CLI - current weather and tomorrow's forecast
//!
//! An interactive terminal tool that looks up Indian cities or pincodes on
//! OpenWeatherMap, caching results for a few minutes per location.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use indweather::cli::{Cli, StartupConfig};
use indweather::session::{self, Console};

/// Sets up logging to stderr, quiet by default so prompts stay readable.
/// `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Exit status conventionally used after SIGINT
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Prints the interrupt message and exits when Ctrl-C arrives.
///
/// The session blocks its thread while reading stdin, so this task runs on
/// the runtime's worker thread instead.
fn spawn_interrupt_watcher() {
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = session::report_interrupt(&mut io::stdout());
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}

// One worker for the interrupt watcher; the session itself runs sequentially
// on the main thread.
#[tokio::main(flavor = "multi_thread", worker_threads = 1)]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    init_tracing();
    spawn_interrupt_watcher();

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());
    session::run(&config, &mut console).await?;

    Ok(ExitCode::SUCCESS)
}
