use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "tasktree",
    about = concat!("tasktree v", env!("CARGO_PKG_VERSION"), " - tasks with undo, an urgent queue and categories"),
    version
)]
pub struct Cli {
    /// Config file (TOML)
    #[arg(short, long, env = "TASKTREE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print listings and undo/redo results as JSON
    #[arg(long)]
    pub json: bool,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter directive implied by `-v` flags
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}
