//! One associative set: tag + coherence state + recency storage.
//!
//! Recency is implicit in array position (position 0 is MRU); there is
//! no timestamp or aging counter. A slot's tag is preserved once
//! assigned, even after the line there has gone `Invalid` via a
//! snooped transaction — `lookup` simply ignores `Invalid` slots, and
//! a later [`LruSet::install_miss`] is free to overwrite whichever
//! slot is currently the LRU.

use crate::address::Tag;
use crate::coherence::MoesiState;

#[derive(Clone, Copy, Debug)]
struct Slot {
    tag: Tag,
    state: MoesiState,
}

/// A line evicted by [`LruSet::install_miss`], for the controller to
/// decide whether a writeback is owed.
#[derive(Clone, Copy, Debug)]
pub struct EvictedLine {
    pub tag: Tag,
    pub state: MoesiState,
}

/// A set-associative LRU set of `assoc` lines, position 0 = MRU.
pub struct LruSet {
    slots: Vec<Option<Slot>>,
    /// Number of positions that have ever held a tag. Distinct from
    /// how many of those are currently valid (non-`Invalid`).
    len: usize,
}

impl LruSet {
    pub fn new(assoc: usize) -> Self {
        LruSet {
            slots: vec![None; assoc],
            len: 0,
        }
    }

    fn assoc(&self) -> usize {
        self.slots.len()
    }

    /// Position of the valid line matching `tag`, or `None` if absent
    /// or present-but-invalid. First match in iteration order wins
    /// (at most one can exist among valid lines, per I1).
    pub fn lookup(&self, tag: Tag) -> Option<usize> {
        self.slots[..self.len].iter().position(|slot| match slot {
            Some(s) => s.tag == tag && s.state != MoesiState::Invalid,
            None => false,
        })
    }

    /// The state `tag` is currently in, including `Invalid` for a
    /// preserved-but-invalidated slot. `None` only if `tag` was never
    /// installed in this set. Unlike [`Self::lookup`], this does not
    /// filter out invalid lines — it's for introspection, not the
    /// hit/miss path.
    pub fn state_of(&self, tag: Tag) -> Option<MoesiState> {
        self.slots[..self.len]
            .iter()
            .find_map(|slot| slot.filter(|s| s.tag == tag).map(|s| s.state))
    }

    /// Coherence state at `position`. Panics if unoccupied.
    pub fn state_at(&self, position: usize) -> MoesiState {
        self.slots[position].expect("state_at on an unoccupied slot").state
    }

    /// Overwrite the state at `position` in place, without touching
    /// recency. Used by snoop transitions, which never reorder lines.
    pub fn set_state(&mut self, position: usize, state: MoesiState) {
        let slot = self.slots[position]
            .as_mut()
            .expect("set_state on an unoccupied slot");
        slot.state = state;
    }

    /// Move the line at `position` to MRU. Lines between it and the
    /// front shift back by one; everything else is untouched.
    pub fn promote_hit(&mut self, position: usize) {
        if position == 0 {
            return;
        }
        let moved = self.slots[position].take();
        self.slots.copy_within(0..position, 1);
        self.slots[0] = moved;
    }

    /// Install a freshly-fetched line at MRU. If the set is full, the
    /// current LRU line is discarded and returned for the caller to
    /// consider writing back.
    pub fn install_miss(&mut self, tag: Tag, initial_state: MoesiState) -> Option<EvictedLine> {
        debug_assert!(
            self.lookup(tag).is_none(),
            "install_miss for a tag that is already valid in this set"
        );

        let evicted = if self.len < self.assoc() {
            self.slots.copy_within(0..self.len, 1);
            self.len += 1;
            None
        } else {
            let evicted = self.slots[self.assoc() - 1].take();
            self.slots.copy_within(0..self.assoc() - 1, 1);
            evicted.map(|s| EvictedLine {
                tag: s.tag,
                state: s.state,
            })
        };

        self.slots[0] = Some(Slot {
            tag,
            state: initial_state,
        });

        evicted
    }

    /// If `tag` is present and valid, mark it `Invalid` in place.
    /// Leaves recency untouched; the slot stays occupied until a
    /// future miss overwrites it.
    pub fn invalidate_by_tag(&mut self, tag: Tag) {
        if let Some(pos) = self.lookup(tag) {
            self.set_state(pos, MoesiState::Invalid);
        }
    }
}
