//! The cache controller (spec §4.4): owns a [`CacheArray`] and exposes
//! both the processor-facing port (the request path) and the
//! bus-facing port (`snoop`), invoked synchronously by
//! [`crate::bus::BusArbiter`] for every cache but the one that issued
//! the transaction. Both ports share the array's lock.

use std::sync::{Arc, Mutex};

use crate::address::Address;
use crate::bus::BusArbiter;
use crate::cache::array::CacheArray;
use crate::coherence::{self, BusAction, BusEvent, MoesiState, ProcOp};
use crate::config::SimConfig;
use crate::stats::Stats;
use crate::Pid;

pub struct CacheController {
    id: Pid,
    cfg: SimConfig,
    array: Mutex<CacheArray>,
    stats: Arc<Stats>,
}

impl CacheController {
    pub fn new(id: Pid, cfg: SimConfig, stats: Arc<Stats>) -> Self {
        CacheController {
            id,
            array: Mutex::new(CacheArray::new(&cfg)),
            cfg,
            stats,
        }
    }

    /// Serve a local processor request issued at cycle `now`. Returns
    /// the number of extra cycles the caller must wait beyond the
    /// uniform one-cycle clock advance every instruction takes (spec
    /// §4.6).
    pub fn request(
        &self,
        op: ProcOp,
        addr: Address,
        now: u64,
        bus: &BusArbiter,
        controllers: &[Arc<CacheController>],
    ) -> u64 {
        let (tag, index, _offset) = addr.decode(&self.cfg);

        let hit_action = {
            let mut array = self.array.lock().unwrap();
            let set = array.set_mut(index);
            set.lookup(tag).map(|pos| {
                let state = set.state_at(pos);
                let (next_state, bus_action) = coherence::on_local_hit(state, op);
                set.set_state(pos, next_state);
                set.promote_hit(pos);
                bus_action
            })
        };

        if let Some(bus_action) = hit_action {
            log::debug!("core{}: {op:?} {addr:?} -> hit", self.id);
            self.stats.record_hit(self.id, op);
            return match bus_action {
                BusAction::BusUpgr => {
                    let (_shared, cycles) = bus.upgr(self.id, addr, now, controllers);
                    self.stats.record_access_cycles(cycles);
                    cycles
                }
                BusAction::None => {
                    self.stats.record_access_cycles(0);
                    0
                }
                BusAction::BusRd | BusAction::BusRdX => {
                    unreachable!("a local hit never issues BusRd/BusRdX")
                }
            };
        }

        // Miss: the array lock is already released (we never took it
        // for the miss path above).
        log::debug!("core{}: {op:?} {addr:?} -> miss", self.id);
        self.stats.record_miss(self.id, op);
        let (shared, mut cycles) = match coherence::bus_action_for_miss(op) {
            BusAction::BusRd => bus.rd(self.id, addr, now, controllers),
            BusAction::BusRdX => bus.rdx(self.id, addr, now, controllers),
            BusAction::None | BusAction::BusUpgr => unreachable!("a miss always issues BusRd/BusRdX"),
        };

        let new_state = coherence::initial_state_on_miss(op, shared);
        let evicted = {
            let mut array = self.array.lock().unwrap();
            array.set_mut(index).install_miss(tag, new_state)
        };

        if let Some(evicted) = evicted {
            if matches!(evicted.state, MoesiState::Modified | MoesiState::Owner) {
                log::trace!(
                    "core{}: writeback of evicted tag {} ({:?})",
                    self.id,
                    evicted.tag,
                    evicted.state
                );
                cycles += self.cfg.mem_latency;
            }
        }

        self.stats.record_access_cycles(cycles);
        cycles
    }

    /// The coherence state this cache currently holds `addr` in, or
    /// `None` if the line was never installed. Used for introspection
    /// (tests, waveform/log output) — not on the request/snoop path.
    pub fn line_state(&self, addr: Address) -> Option<MoesiState> {
        let (tag, index, _offset) = addr.decode(&self.cfg);
        let mut array = self.array.lock().unwrap();
        array.set_mut(index).state_of(tag)
    }

    /// Snoop-side reaction to a peer's bus transaction (spec §4.4 step
    /// 2-4). Returns whether this cache holds the line.
    pub(crate) fn snoop(&self, addr: Address, kind: BusEvent) -> bool {
        let (tag, index, _offset) = addr.decode(&self.cfg);
        let mut array = self.array.lock().unwrap();
        let set = array.set_mut(index);

        match set.lookup(tag) {
            None => false,
            Some(pos) => {
                let state = set.state_at(pos);
                let (next_state, has_line, _must_flush) = coherence::on_snoop(state, kind);
                set.set_state(pos, next_state);
                log::trace!("core{}: snoop {kind:?} {addr:?}: {state:?} -> {next_state:?}", self.id);
                has_line
            }
        }
    }
}
