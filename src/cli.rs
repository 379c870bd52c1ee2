use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// rkey-rewrite: refresh media rkeys in relayed chat payloads
#[derive(Parser)]
#[command(name = "rkey-rewrite", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite media URLs in a message payload and print the result
    Apply {
        /// Message payload JSON (reads stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Token payload JSON file (`private_rkey`, `group_rkey`, `expired_time`)
        #[arg(short, long)]
        payload: Option<PathBuf>,
        /// Private-chat rkey (overrides --payload and RKEY_PRIVATE)
        #[arg(long)]
        private_rkey: Option<String>,
        /// Group-chat rkey (overrides --payload and RKEY_GROUP)
        #[arg(long)]
        group_rkey: Option<String>,
        /// Skip the cheap pre-filter and always parse the payload
        #[arg(long)]
        force: bool,
    },

    /// Report whether a payload looks worth rewriting (exit 1 if not)
    Check {
        /// Message payload JSON (reads stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}
