//! Cycle-accurate multi-core data cache simulator: private 8-way
//! set-associative write-back caches behind a single MOESI snoopy bus.
//!
//! The whole run happens on a single thread, driven by a deterministic
//! [`clock::Scheduler`] that always advances the processor with the
//! lowest accumulated cycle count next. This is deliberate: it is what
//! makes two runs of the same trace produce byte-identical stats
//! (spec §5 "Determinism", T4) — nothing about the outcome depends on
//! real-time OS thread scheduling.

use std::sync::Arc;

pub mod address;
pub mod bus;
pub mod cache;
pub mod clock;
pub mod cli;
pub mod coherence;
pub mod config;
pub mod controller;
pub mod error;
pub mod processor;
pub mod stats;
pub mod trace;

pub use cli::Cli;
pub use config::SimConfig;
pub use error::SimError;
pub use stats::Stats;

/// A processor/cache identifier, `0..N-1`.
pub type Pid = u8;

use bus::BusArbiter;
use clock::Scheduler;
use controller::CacheController;
use trace::{FileTraceSource, TraceSource};

/// Run the simulation described by `cli` to completion and return the
/// accumulated statistics (spec §6).
pub fn run(cli: Cli) -> Result<Arc<Stats>, SimError> {
    let cfg = SimConfig::load(&cli)?;
    let trace: Arc<dyn TraceSource> = Arc::new(FileTraceSource::load(&cli.trace)?);
    let (stats, _controllers) = run_with_trace(cfg, trace)?;
    Ok(stats)
}

/// Run a simulation directly against an in-memory [`TraceSource`],
/// bypassing the CLI/file layer, and return the per-cache controllers
/// alongside the stats so callers can inspect final line states. Used
/// by integration tests that need to construct a trace programmatically
/// and check post-simulation coherence state (spec §8 scenarios).
pub fn run_with_trace(
    cfg: SimConfig,
    trace: Arc<dyn TraceSource>,
) -> Result<(Arc<Stats>, Vec<Arc<CacheController>>), SimError> {
    let n = trace.proc_count();
    if n == 0 {
        return Err(SimError::ZeroProcessors);
    }

    log::info!("starting simulation: {n} processors");

    let stats = Arc::new(Stats::new(n));
    let bus = BusArbiter::new(cfg.clone(), stats.clone());
    let controllers: Vec<Arc<CacheController>> = (0..n)
        .map(|pid| Arc::new(CacheController::new(pid as Pid, cfg.clone(), stats.clone())))
        .collect();

    let mut scheduler = Scheduler::new(n);
    while !scheduler.is_finished() {
        let pid = scheduler
            .next_pid()
            .expect("scheduler reports unfinished but no runnable processor");
        processor::step(pid, trace.as_ref(), &controllers, &bus, &mut scheduler);
    }

    let total_runtime = scheduler.total_runtime();
    log::info!("simulation complete: runtime={total_runtime} cycles");
    stats.set_runtime(total_runtime);
    Ok((stats, controllers))
}
