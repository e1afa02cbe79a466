use std::io;

use clap::Parser;
use tasktree::cli::commands::Cli;
use tasktree::cli::shell::Shell;
use tasktree::io::config_io;
use tasktree::ops::session::Session;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Quiet by default; -v/-vv raise the level, RUST_LOG overrides both
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::load_config(cli.config.as_deref())?;
    tracing::info!(history_limit = config.history.limit, "starting session");

    let mut session = Session::new(&config);
    let today = chrono::Local::now().date_naive();
    let stdin = io::stdin();
    let stdout = io::stdout();
    Shell::new(&mut session, stdin.lock(), stdout.lock(), today)
        .with_json(cli.json)
        .run()?;
    Ok(())
}
