use std::path::PathBuf;

use clap::Parser;
use env_logger::{Builder, Env};

use dotstore_cli::Command;

/// dotstore - read and edit nested JSON state files by dotted key
#[derive(Parser, Debug)]
#[command(name = "dotstore")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// State file to operate on
    #[arg(short, long, env = "DOTSTORE_FILE", default_value = "dotstore.json")]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

fn init_logger() {
    // RUST_LOG overrides; warnings by default so skipped ingest items show up.
    Builder::from_env(Env::default().default_filter_or("warn")).init();
}

fn main() {
    init_logger();
    let args = Args::parse();

    match dotstore_cli::execute(&args.command, &args.file) {
        Ok(Some(output)) => println!("{}", output),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
