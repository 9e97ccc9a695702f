//! The snoopy bus arbiter (spec §4.5): serializes transactions and
//! broadcasts them to every other cache synchronously, in the order a
//! deterministic scheduler (`crate::clock::Scheduler`) hands them to
//! it. There is no thread or channel involved: the bus is just a
//! method call that walks the other caches' [`CacheController::snoop`]
//! directly. That is what makes replaying a trace byte-identical
//! (spec §5 "Determinism", T4) — the outcome depends only on trace
//! content and the cycle costs the protocol assigns, never on which
//! OS thread happened to reach a lock first.

use std::cell::Cell;
use std::sync::Arc;

use crate::address::Address;
use crate::coherence::BusEvent;
use crate::config::SimConfig;
use crate::controller::CacheController;
use crate::stats::Stats;
use crate::Pid;

pub struct BusArbiter {
    cfg: SimConfig,
    stats: Arc<Stats>,
    /// The cycle at which the bus is next free. Lets two transactions
    /// that land on the same trace cycle be charged a deterministic
    /// `Waits` penalty, derived purely from cycle bookkeeping rather
    /// than real contention on a lock.
    busy_until: Cell<u64>,
}

impl BusArbiter {
    pub fn new(cfg: SimConfig, stats: Arc<Stats>) -> Self {
        BusArbiter {
            cfg,
            stats,
            busy_until: Cell::new(0),
        }
    }

    /// Issue a `BusRd` at cycle `now`. Returns `(shared, latency_cycles)`.
    pub fn rd(&self, pid: Pid, addr: Address, now: u64, controllers: &[Arc<CacheController>]) -> (bool, u64) {
        let shared = self.transact(pid, addr, BusEvent::BusRd, controllers);
        self.stats.record_bus_rd(pid);
        self.stats.record_snoop(shared);
        (shared, self.charge(now, self.read_latency(shared)))
    }

    /// Issue a `BusRdX` at cycle `now`. Returns `(shared, latency_cycles)`.
    pub fn rdx(&self, pid: Pid, addr: Address, now: u64, controllers: &[Arc<CacheController>]) -> (bool, u64) {
        let shared = self.transact(pid, addr, BusEvent::BusRdX, controllers);
        self.stats.record_bus_rdx(pid);
        self.stats.record_snoop(shared);
        (shared, self.charge(now, self.read_latency(shared)))
    }

    /// Issue a `BusUpgr` at cycle `now`. Always charges
    /// `SNOOP_HIT_LATENCY`; excluded from snoop hit/miss counting
    /// (spec T5).
    pub fn upgr(&self, pid: Pid, addr: Address, now: u64, controllers: &[Arc<CacheController>]) -> (bool, u64) {
        let shared = self.transact(pid, addr, BusEvent::BusUpgr, controllers);
        self.stats.record_bus_upgr(pid);
        (shared, self.charge(now, self.cfg.snoop_hit_latency))
    }

    fn read_latency(&self, shared: bool) -> u64 {
        if shared {
            self.cfg.snoop_hit_latency
        } else {
            self.cfg.mem_latency
        }
    }

    /// Charge `latency` cycles starting no earlier than `now` or the
    /// cycle the bus is already committed through, whichever is
    /// later; the gap, if any, is a `Waits` cycle. Returns the total
    /// extra cycles the caller's clock must advance by.
    fn charge(&self, now: u64, latency: u64) -> u64 {
        let start = now.max(self.busy_until.get());
        if start > now {
            log::debug!("bus: wait {} cycles (now={now}, busy_until={})", start - now, self.busy_until.get());
            self.stats.record_wait();
        }
        self.busy_until.set(start + latency);
        (start - now) + latency
    }

    fn transact(&self, pid: Pid, addr: Address, kind: BusEvent, controllers: &[Arc<CacheController>]) -> bool {
        log::trace!("bus: pid={pid} {kind:?} addr={addr:?}");
        let mut shared = false;
        for (other_pid, controller) in controllers.iter().enumerate() {
            if other_pid as Pid == pid {
                continue;
            }
            if controller.snoop(addr, kind) {
                shared = true;
            }
        }
        log::trace!("bus: pid={pid} {kind:?} addr={addr:?} shared={shared}");
        shared
    }
}
