use std::process;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use ticket_check::cli::Args;
use ticket_check::{app, Error};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.debug);

    if let Err(err) = app::run(args).await {
        if !matches!(err, Error::Cancelled) {
            eprintln!("{} {}", "x".red(), err);
            if let Some(hint) = err.hint() {
                eprintln!("  {}", hint.bright_yellow());
            }
        }
        process::exit(1);
    }
}

/// Narration goes to stderr; `RUST_LOG` overrides the level picked from `--debug`
fn init_tracing(debug: bool) {
    let default = if debug {
        "ticket_check=debug"
    } else {
        "ticket_check=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
