//! Entity pool with recycling
//!
//! Entities live in stable storage slots. `used` holds the live slots in
//! insertion order, `unused` holds stripped carcasses waiting to be recycled.
//! A slot is in exactly one of the two lists at a time.

use std::collections::HashMap;

use super::components::Capability;
use super::entity::{Entity, EntityId, Label};

/// Store of all live and recycled entities
#[derive(Debug, Default)]
pub struct Pool {
    slots: Vec<Option<Entity>>,
    used: Vec<usize>,
    unused: Vec<usize>,
    /// Storage freed by `clean`, reusable by `add`
    vacant: Vec<usize>,
    /// Live id -> slot
    index: HashMap<EntityId, usize>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly allocated entity to the live set
    pub fn add(&mut self, entity: Entity) -> &mut Entity {
        let id = entity.id;
        let slot = match self.vacant.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        };
        self.used.push(slot);
        self.index.insert(id, slot);
        self.slots[slot].insert(entity)
    }

    /// Revive a recycled entity under a new identity
    ///
    /// Returns `None` when nothing is left to recycle; the caller must then
    /// allocate with [`Pool::add`].
    pub fn recycle(&mut self, id: EntityId, label: Label) -> Option<&mut Entity> {
        let slot = self.unused.pop()?;
        self.used.push(slot);
        self.index.insert(id, slot);
        let entity = self.slots[slot].as_mut()?;
        entity.revive(id, label);
        Some(entity)
    }

    /// Move a live entity to the recycle list. No-op when `id` is not live.
    pub fn free(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.index.remove(&id) else {
            return false;
        };
        if let Some(pos) = self.used.iter().position(|s| *s == slot) {
            self.used.remove(pos);
        }
        self.unused.push(slot);
        true
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_mut()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Live entities in insertion order
    pub fn all(&self) -> impl Iterator<Item = &Entity> {
        self.used.iter().filter_map(|slot| self.slots[*slot].as_ref())
    }

    /// First live entity matching `predicate`
    pub fn first(&self, predicate: impl Fn(&Entity) -> bool) -> Option<&Entity> {
        self.all().find(|e| predicate(e))
    }

    /// First live entity with the given label
    pub fn first_labelled(&self, label: Label) -> Option<&Entity> {
        self.first(|e| e.is(label))
    }

    /// Any live entity with the given label
    pub fn any_labelled(&self, label: Label) -> bool {
        self.first_labelled(label).is_some()
    }

    /// Ids of live entities with the given label, in insertion order
    pub fn ids_labelled(&self, label: Label) -> Vec<EntityId> {
        self.all().filter(|e| e.is(label)).map(|e| e.id).collect()
    }

    /// Ids of live entities holding every capability, in insertion order
    pub fn filter_components(&self, capabilities: &[Capability]) -> Vec<EntityId> {
        self.all()
            .filter(|e| e.has_components(capabilities))
            .map(|e| e.id)
            .collect()
    }

    /// Drop recycled carcasses permanently
    pub fn clean(&mut self) {
        for slot in self.unused.drain(..) {
            self.slots[slot] = None;
            self.vacant.push(slot);
        }
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Number of entities waiting to be recycled
    pub fn recyclable(&self) -> usize {
        self.unused.len()
    }

    /// Carcasses waiting to be recycled
    pub fn recycled(&self) -> impl Iterator<Item = &Entity> {
        self.unused.iter().filter_map(|slot| self.slots[*slot].as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::components::Position;
    use proptest::prelude::*;

    fn entity(id: u64) -> Entity {
        Entity::new(EntityId(id), Label::Ball)
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut pool = Pool::new();
        pool.add(entity(1));
        pool.add(entity(2));
        pool.add(entity(3));

        let ids: Vec<_> = pool.all().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_recycle_underflow() {
        let mut pool = Pool::new();
        assert!(pool.recycle(EntityId(1), Label::Ball).is_none());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_free_then_recycle() {
        let mut pool = Pool::new();
        pool.add(entity(1)).add(Position::new(1.0, 1.0));
        pool.add(entity(2));

        assert!(pool.free(EntityId(1)));
        assert!(!pool.free(EntityId(1)), "second free is a no-op");
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.recyclable(), 1);
        assert!(pool.get(EntityId(1)).is_none());

        let revived = pool.recycle(EntityId(3), Label::Block).expect("carcass available");
        assert_eq!(revived.id, EntityId(3));
        assert_eq!(revived.label, Label::Block);
        assert!(revived.is_stripped());

        // Recycled entity goes to the back of the insertion order
        let ids: Vec<_> = pool.all().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(pool.recycle(EntityId(4), Label::Ball).is_none());
    }

    #[test]
    fn test_filter_components() {
        let mut pool = Pool::new();
        pool.add(entity(1)).add(Position::default());
        pool.add(entity(2));
        pool.add(entity(3)).add(Position::default());

        let ids = pool.filter_components(&[Capability::Position]);
        assert_eq!(ids, vec![EntityId(1), EntityId(3)]);
        assert!(pool.filter_components(&[Capability::Position, Capability::Size]).is_empty());
    }

    #[test]
    fn test_first() {
        let mut pool = Pool::new();
        pool.add(Entity::new(EntityId(1), Label::Block));
        pool.add(Entity::new(EntityId(2), Label::Palette));
        pool.add(Entity::new(EntityId(3), Label::Palette));

        assert_eq!(pool.first_labelled(Label::Palette).map(|e| e.id), Some(EntityId(2)));
        assert!(pool.first_labelled(Label::Gun).is_none());
    }

    #[test]
    fn test_clean_drops_carcasses() {
        let mut pool = Pool::new();
        pool.add(entity(1));
        pool.add(entity(2));
        pool.free(EntityId(1));
        pool.clean();

        assert_eq!(pool.recyclable(), 0);
        assert!(pool.recycle(EntityId(3), Label::Ball).is_none());

        // Storage is reused by add, not by recycle
        pool.add(entity(4));
        let ids: Vec<_> = pool.all().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        Recycle,
        Free(usize),
        Clean,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Add),
            Just(Op::Recycle),
            (0usize..32).prop_map(Op::Free),
            Just(Op::Clean),
        ]
    }

    proptest! {
        #[test]
        fn prop_every_slot_in_exactly_one_set(ops in proptest::collection::vec(op(), 0..64)) {
            let mut pool = Pool::new();
            let mut next = 1u64;
            let mut live: Vec<EntityId> = Vec::new();

            for op in ops {
                match op {
                    Op::Add => {
                        pool.add(entity(next));
                        live.push(EntityId(next));
                        next += 1;
                    }
                    Op::Recycle => {
                        let waiting = pool.recyclable();
                        if pool.recycle(EntityId(next), Label::Ball).is_some() {
                            prop_assert_eq!(pool.recyclable(), waiting - 1);
                            live.push(EntityId(next));
                            next += 1;
                        } else {
                            prop_assert_eq!(waiting, 0);
                        }
                    }
                    Op::Free(i) => {
                        if !live.is_empty() {
                            let id = live.remove(i % live.len());
                            prop_assert!(pool.free(id));
                        }
                    }
                    Op::Clean => pool.clean(),
                }

                let mut seen: Vec<usize> = pool.used.iter().chain(pool.unused.iter()).copied().collect();
                let total = seen.len();
                seen.sort_unstable();
                seen.dedup();
                prop_assert_eq!(seen.len(), total, "slot listed twice");
                prop_assert_eq!(pool.len(), live.len());
            }
        }
    }
}
