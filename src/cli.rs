//! Command-line surface (spec §6): a single entry point taking a
//! trace-file path, plus config overrides.

use std::path::PathBuf;

use clap::Parser;

/// Cycle-accurate multi-core MOESI cache simulator.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the memory access trace file.
    pub trace: PathBuf,

    /// Optional TOML file overriding cache geometry and bus latencies.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override set associativity (must be a power of two).
    #[arg(long)]
    pub assoc: Option<usize>,

    /// Override number of sets (must be a power of two).
    #[arg(long)]
    pub nsets: Option<usize>,

    /// Override the memory-access latency, in cycles.
    #[arg(long)]
    pub mem_latency: Option<u64>,

    /// Override the peer-supplied (snoop hit) latency, in cycles.
    #[arg(long)]
    pub snoop_hit_latency: Option<u64>,

    /// Increase logging verbosity (repeatable: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
