//! The MOESI coherence state machine (spec §4.3): pure functions from
//! `(current_state, event)` to `(next_state, side effect)`. No actor
//! owns a `MoesiState` directly; [`crate::cache::set::LruSet`] stores
//! them per line and the controller drives the transitions.

/// Per-line coherence state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoesiState {
    /// Dirty, sole owner. Must write back on eviction.
    Modified,
    /// Dirty, shared; this cache must supply reads.
    Owner,
    /// Clean, sole owner. Silently upgradable to Modified.
    Exclusive,
    /// Clean, may exist elsewhere.
    Shared,
    /// Not present.
    Invalid,
}

/// The kind of local processor access driving a hit/miss decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcOp {
    Read,
    Write,
}

/// A transaction a cache controller may need to issue on the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusAction {
    None,
    BusRd,
    BusRdX,
    BusUpgr,
}

/// The bus transaction kind a snooper observes (always someone else's).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusEvent {
    BusRd,
    BusRdX,
    BusUpgr,
}

/// Local-hit transition table (spec §4.3, processor-event rows).
///
/// `state` must not be `Invalid` — a hit is only possible on a valid
/// line; the caller (the cache controller) is responsible for routing
/// `Invalid`/absent lookups through the miss path instead.
pub fn on_local_hit(state: MoesiState, op: ProcOp) -> (MoesiState, BusAction) {
    use BusAction::*;
    use MoesiState::*;
    use ProcOp::*;

    match (state, op) {
        (Shared, Read) => (Shared, None),
        (Shared, Write) => (Modified, BusUpgr),
        (Exclusive, Read) => (Exclusive, None),
        (Exclusive, Write) => (Modified, None),
        (Owner, Read) => (Owner, None),
        (Owner, Write) => (Modified, BusUpgr),
        (Modified, Read) => (Modified, None),
        (Modified, Write) => (Modified, None),
        (Invalid, _) => unreachable!("on_local_hit called on an Invalid line"),
    }
}

/// The bus transaction a local miss must issue (spec §4.3, `I` rows).
pub fn bus_action_for_miss(op: ProcOp) -> BusAction {
    match op {
        ProcOp::Read => BusAction::BusRd,
        ProcOp::Write => BusAction::BusRdX,
    }
}

/// The state a freshly-installed line takes after a miss, given
/// whether any peer reported `HasLine` on the snoop response.
pub fn initial_state_on_miss(op: ProcOp, peer_has_line: bool) -> MoesiState {
    match op {
        ProcOp::Read => {
            if peer_has_line {
                MoesiState::Shared
            } else {
                MoesiState::Exclusive
            }
        }
        ProcOp::Write => MoesiState::Modified,
    }
}

/// Snoop-side transition table (spec §4.3, `snoop ...` rows). Returns
/// the line's next state, whether it reports `HasLine`, and whether
/// supplying the data requires a flush (modeled only as a fact the
/// caller may use for bookkeeping; no payload is moved).
pub fn on_snoop(state: MoesiState, event: BusEvent) -> (MoesiState, bool /* has_line */, bool /* must_flush */) {
    use BusEvent::*;
    use MoesiState::*;

    match (state, event) {
        (Modified, BusRd) => (Owner, true, true),
        (Modified, BusRdX) => (Invalid, true, true),
        (Owner, BusRd) => (Owner, true, true),
        (Owner, BusRdX) => (Invalid, true, true),
        (Owner, BusUpgr) => (Invalid, true, false),
        (Exclusive, BusRd) => (Shared, true, true),
        (Exclusive, BusRdX) => (Invalid, true, true),
        (Shared, BusRd) => (Shared, true, false),
        (Shared, BusRdX) => (Invalid, true, false),
        (Shared, BusUpgr) => (Invalid, true, false),
        (Invalid, BusRd) | (Invalid, BusRdX) | (Invalid, BusUpgr) => (Invalid, false, false),
        (Modified, BusUpgr) | (Exclusive, BusUpgr) => {
            unreachable!("BusUpgr is only ever issued by a cache already holding the line Shared or Owner (I1)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BusAction::*;
    use MoesiState::*;
    use ProcOp::*;

    #[test]
    fn local_hit_table_matches_spec() {
        assert_eq!(on_local_hit(Shared, Read), (Shared, None));
        assert_eq!(on_local_hit(Shared, Write), (Modified, BusUpgr));
        assert_eq!(on_local_hit(Exclusive, Read), (Exclusive, None));
        assert_eq!(on_local_hit(Exclusive, Write), (Modified, None));
        assert_eq!(on_local_hit(Owner, Read), (Owner, None));
        assert_eq!(on_local_hit(Owner, Write), (Modified, BusUpgr));
        assert_eq!(on_local_hit(Modified, Read), (Modified, None));
        assert_eq!(on_local_hit(Modified, Write), (Modified, None));
    }

    #[test]
    #[should_panic]
    fn local_hit_on_invalid_panics() {
        on_local_hit(Invalid, Read);
    }

    #[test]
    fn miss_initial_state_depends_on_peer() {
        assert_eq!(initial_state_on_miss(Read, false), Exclusive);
        assert_eq!(initial_state_on_miss(Read, true), Shared);
        assert_eq!(initial_state_on_miss(Write, false), Modified);
        assert_eq!(initial_state_on_miss(Write, true), Modified);
    }

    #[test]
    fn snoop_table_matches_spec() {
        assert_eq!(on_snoop(Modified, BusEvent::BusRd), (Owner, true, true));
        assert_eq!(on_snoop(Modified, BusEvent::BusRdX), (Invalid, true, true));
        assert_eq!(on_snoop(Owner, BusEvent::BusRd), (Owner, true, true));
        assert_eq!(on_snoop(Owner, BusEvent::BusRdX), (Invalid, true, true));
        assert_eq!(on_snoop(Owner, BusEvent::BusUpgr), (Invalid, true, false));
        assert_eq!(on_snoop(Exclusive, BusEvent::BusRd), (Shared, true, true));
        assert_eq!(on_snoop(Exclusive, BusEvent::BusRdX), (Invalid, true, true));
        assert_eq!(on_snoop(Shared, BusEvent::BusRd), (Shared, true, false));
        assert_eq!(on_snoop(Shared, BusEvent::BusRdX), (Invalid, true, false));
        assert_eq!(on_snoop(Shared, BusEvent::BusUpgr), (Invalid, true, false));
        assert_eq!(on_snoop(Invalid, BusEvent::BusRd), (Invalid, false, false));
    }

    #[test]
    #[should_panic]
    fn snoop_modified_busupgr_is_unreachable() {
        on_snoop(Modified, BusEvent::BusUpgr);
    }

    #[test]
    #[should_panic]
    fn snoop_exclusive_busupgr_is_unreachable() {
        on_snoop(Exclusive, BusEvent::BusUpgr);
    }
}
