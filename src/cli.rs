//! CLI argument parsing for the dispatch-sim binary.
//!
//! Loaders, sinks, and full service wiring are out-of-scope external
//! collaborators (§1); the binary is a thin demonstration harness for the
//! engine, not the subject of this specification.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dispatch-sim", about = "Field-service dispatch and routing simulation engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the Day Simulator over an in-process fixture, optionally for
    /// several consecutive days carrying the residual backlog forward.
    Simulate {
        /// Number of consecutive days to simulate, each starting from the
        /// previous day's residual backlog.
        #[arg(long, default_value_t = 1)]
        days: u32,

        /// Use the grouped multi-vehicle variant (Variant B) instead of the
        /// default per-crew round variant (Variant A).
        #[arg(long)]
        grouped: bool,
    },
}
