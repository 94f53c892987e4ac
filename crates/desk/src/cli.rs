use clap::{Parser, Subcommand};
use common::models::Filter;

#[derive(Debug, Parser)]
#[command(name = "desk", version, about = "Review and act on trading signals")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Exchange credentials for a token and store it
    Login {
        #[arg(long, short)]
        username: String,
        #[arg(long, env = "SIGNAL_DESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Print one table of signals
    List {
        #[arg(long, short, default_value = "pending")]
        filter: Filter,
    },
    /// Show one signal with its context
    Show { id: i64 },
    Approve {
        id: i64,
        #[arg(long, short)]
        reason: Option<String>,
        /// Ask the backend to place the order right away
        #[arg(long)]
        execute: bool,
    },
    Reject {
        id: i64,
        #[arg(long, short)]
        reason: Option<String>,
    },
    /// Poll and redraw until Ctrl-C
    Watch {
        #[arg(long, short, default_value = "pending")]
        filter: Filter,
        /// Overrides SIGNAL_DESK_POLL_SECS
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: Option<u64>,
    },
    /// Ask the backend to rebuild its active signals
    RefreshActive,
    Health,
}
