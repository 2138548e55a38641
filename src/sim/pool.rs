//! Category-keyed recycling store for spawn objects
//!
//! One dense `Vec<Spawn>` per category. Requests reuse the first inactive slot
//! and only grow the collection when every slot is live, so each collection's
//! length is the peak number of concurrent entities of that category.

use super::entity::{Category, Spawn, SpawnRequest};

/// Stable reference to a pooled slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpawnHandle {
    pub category: Category,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct EntityPool {
    slots: [Vec<Spawn>; Category::COUNT],
}

impl Default for EntityPool {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityPool {
    pub fn new() -> Self {
        Self {
            slots: Default::default(),
        }
    }

    /// Handle to an inactive slot of `category`, allocating one if none is free
    pub fn get_from_pool(&mut self, category: Category) -> SpawnHandle {
        let slots = &mut self.slots[category.index()];
        let index = match slots.iter().position(|s| !s.is_active()) {
            Some(index) => index,
            None => {
                slots.push(Spawn::new(category));
                log::debug!("{:?} pool grew to {}", category, slots.len());
                slots.len() - 1
            }
        };
        SpawnHandle { category, index }
    }

    /// Take a slot for the request's category and initialize it
    pub fn spawn(&mut self, request: &SpawnRequest) -> SpawnHandle {
        let handle = self.get_from_pool(request.category());
        self.slots[handle.category.index()][handle.index].initialize(request);
        handle
    }

    /// Deactivate a slot; returns false if it was already inactive
    pub fn kill(&mut self, handle: SpawnHandle) -> bool {
        self.get_mut(handle).is_some_and(Spawn::kill)
    }

    pub fn get(&self, handle: SpawnHandle) -> Option<&Spawn> {
        self.slots[handle.category.index()].get(handle.index)
    }

    pub fn get_mut(&mut self, handle: SpawnHandle) -> Option<&mut Spawn> {
        self.slots[handle.category.index()].get_mut(handle.index)
    }

    /// Every slot of a category, live or not
    pub fn slots(&self, category: Category) -> &[Spawn] {
        &self.slots[category.index()]
    }

    pub fn slots_mut(&mut self, category: Category) -> &mut [Spawn] {
        &mut self.slots[category.index()]
    }

    /// Live entities of a category
    pub fn active(&self, category: Category) -> impl Iterator<Item = &Spawn> {
        self.slots(category).iter().filter(|s| s.is_active())
    }

    pub fn active_count(&self, category: Category) -> usize {
        self.active(category).count()
    }

    /// Slots ever allocated for a category
    pub fn capacity(&self, category: Category) -> usize {
        self.slots[category.index()].len()
    }

    /// Two categories mutably at once (they must differ)
    pub fn pair_mut(&mut self, a: Category, b: Category) -> (&mut [Spawn], &mut [Spawn]) {
        assert_ne!(a, b, "pair_mut needs two distinct categories");
        let (ia, ib) = (a.index(), b.index());
        if ia < ib {
            let (lo, hi) = self.slots.split_at_mut(ib);
            (lo[ia].as_mut_slice(), hi[0].as_mut_slice())
        } else {
            let (lo, hi) = self.slots.split_at_mut(ia);
            (hi[0].as_mut_slice(), lo[ib].as_mut_slice())
        }
    }

    /// Advance every live entity; boosted categories run on `dt * boost`
    pub fn update_all(&mut self, dt: f32, boost: f32, out: &mut Vec<SpawnRequest>) {
        for category in Category::ALL {
            let step = if category.follows_boost() { dt * boost } else { dt };
            for spawn in self.slots_mut(category) {
                if spawn.is_active() {
                    spawn.update(step, out);
                }
            }
        }
    }

    /// Drop every slot (run restart)
    pub fn clear(&mut self) {
        for slots in &mut self.slots {
            slots.clear();
        }
    }
}
