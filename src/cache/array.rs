//! A full cache: `nsets` [`LruSet`]s, indexed by address middle bits.
//! Owned exclusively by one [`crate::controller::CacheController`].

use crate::cache::set::LruSet;
use crate::config::SimConfig;

pub struct CacheArray {
    sets: Vec<LruSet>,
}

impl CacheArray {
    pub fn new(cfg: &SimConfig) -> Self {
        CacheArray {
            sets: (0..cfg.nsets).map(|_| LruSet::new(cfg.assoc)).collect(),
        }
    }

    pub fn set_mut(&mut self, index: usize) -> &mut LruSet {
        &mut self.sets[index]
    }
}
