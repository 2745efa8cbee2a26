use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Print both raw ticket sets before intersecting them
    #[clap(short, long, value_parser, default_value_t = false)]
    pub debug: bool,

    /// Configuration file [default: ~/.config/ticket-check/config.yaml]
    #[clap(short, long, value_parser)]
    pub config: Option<PathBuf>,

    /// Tracker username; prompted for when absent
    #[clap(short, long, value_parser, env = "TICKET_CHECK_USER")]
    pub username: Option<String>,

    /// Run a single pass without asking to check again
    #[clap(long, value_parser, default_value_t = false)]
    pub once: bool,
}
