//! memory_tree — interactive entry point.

use std::path::PathBuf;

use clap::Parser;
use log::error;
use tree_shell::app::{run, RunOptions};
use tree_shell::config::ShellConfig;
use tree_shell::uploads::UploadFile;

#[derive(Debug, Parser)]
#[command(name = "memory_tree", version, about = "Gesture-driven photo tree", long_about = None)]
struct Cli {
    /// JSON config file (every field optional)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Skip the start screen with gesture control
    #[arg(long, conflicts_with = "mouse")]
    gestures: bool,
    /// Skip the start screen with mouse control
    #[arg(long)]
    mouse: bool,
    /// Photos to place on the tree before the first frame
    #[arg(long, num_args = 1..)]
    upload: Vec<PathBuf>,
    /// Do not open a MIDI port
    #[arg(long)]
    silent: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Memory Tree — photos & lights                ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let cfg = match &cli.config {
        Some(path) => match ShellConfig::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        None => ShellConfig::default(),
    };

    let start = match (cli.gestures, cli.mouse) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _         => None,
    };
    let opts = RunOptions {
        start,
        uploads: cli.upload.into_iter().map(UploadFile::new).collect(),
        silent:  cli.silent,
    };

    println!("  {} photo slots — opening preview window…", cfg.slot_count);
    println!();

    if let Err(e) = run(cfg, opts) {
        error!("{}", e);
        std::process::exit(1);
    }
}
