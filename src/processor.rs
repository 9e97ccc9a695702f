//! Processor front-end (spec §4.6): drives one [`CacheController`]
//! from a [`TraceSource`], one record at a time, at the cycle the
//! simulation's [`Scheduler`] says it's this processor's turn.

use std::sync::Arc;

use crate::bus::BusArbiter;
use crate::clock::Scheduler;
use crate::coherence::ProcOp;
use crate::controller::CacheController;
use crate::trace::{RecordKind, TraceSource};
use crate::Pid;

/// Advance `pid` by exactly one trace record (or mark it done at
/// end-of-trace). Returns `true` if there was a record to process.
pub fn step(
    pid: Pid,
    trace: &dyn TraceSource,
    controllers: &[Arc<CacheController>],
    bus: &BusArbiter,
    scheduler: &mut Scheduler,
) -> bool {
    let now = scheduler.clock_mut(pid).now();

    let record = match trace.next(pid) {
        Some(record) => record,
        None => {
            log::trace!("core{pid}: end of trace at cycle {now}");
            scheduler.mark_done(pid);
            return false;
        }
    };

    let advance = match record.kind {
        RecordKind::Nop => 1,
        RecordKind::Read => {
            controllers[pid as usize].request(ProcOp::Read, record.addr, now, bus, controllers) + 1
        }
        RecordKind::Write => {
            controllers[pid as usize].request(ProcOp::Write, record.addr, now, bus, controllers) + 1
        }
    };

    scheduler.clock_mut(pid).advance(advance);
    true
}
