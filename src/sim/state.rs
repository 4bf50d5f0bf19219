//! Simulation context
//!
//! Everything a system touches lives in [`GameState`]: the entity pool, the
//! broadcaster, the seeded RNG and the id counter. Systems receive it
//! explicitly, so several simulations can run side by side.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::broadcaster::{self, Broadcaster, Bus, Deferred, ListenerId};
use super::components::Size;
use super::entity::{Entity, EntityId, Label};
use super::message::Message;
use super::pool::Pool;

/// Deferred handlers registered against the game context
pub type Deferral = Deferred<GameState, Message>;

/// Complete simulation state
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Every random draw of the simulation goes through this
    pub rng: Pcg32,
    /// All live and recycled entities
    pub pool: Pool,
    /// Simulation tick counter
    pub time_ticks: u64,
    bus: Broadcaster<GameState, Message>,
    /// Next entity ID
    next_id: u64,
}

impl Bus for GameState {
    type Message = Message;

    fn broadcaster(&mut self) -> &mut Broadcaster<Self, Message> {
        &mut self.bus
    }
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("seed", &self.seed)
            .field("time_ticks", &self.time_ticks)
            .field("entities", &self.pool.len())
            .field("bus", &self.bus)
            .finish()
    }
}

impl GameState {
    /// Create an empty simulation with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            pool: Pool::new(),
            time_ticks: 0,
            bus: Broadcaster::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Uniform draw in `[0, 1)`
    pub fn random(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    // === Broadcaster surface ===

    pub fn publish(&mut self, message: Message) -> Message {
        broadcaster::publish(self, message)
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&mut GameState, &Message, &mut Deferral) + 'static,
    ) -> ListenerId {
        self.bus.subscribe(listener)
    }

    pub fn subscribe_on_message(
        &mut self,
        name: &'static str,
        listener: impl FnMut(&mut GameState, &Message, &mut Deferral) + 'static,
    ) -> ListenerId {
        self.bus.subscribe_on_message(name, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.bus.listener_count()
    }

    // === Entity lifecycle ===

    /// Create (or recycle) an entity, run `init` on it, then announce it
    pub fn create_entity(&mut self, label: Label, init: impl FnOnce(&mut Entity)) -> EntityId {
        let id = self.next_entity_id();
        if self.pool.recycle(id, label).is_none() {
            self.pool.add(Entity::new(id, label));
        }
        if let Some(entity) = self.pool.get_mut(id) {
            init(entity);
        }

        self.publish(Message::EntityCreated { entity: id });
        id
    }

    /// Create an entity with the label and attributes of `source`
    ///
    /// Returns `None` when `source` is not a live entity.
    pub fn clone_entity(
        &mut self,
        source: EntityId,
        init: impl FnOnce(&mut Entity),
    ) -> Option<EntityId> {
        let template = self.pool.get(source)?.clone();
        Some(self.create_entity(template.label, |entity| {
            entity.copy_attributes_from(&template);
            init(entity);
        }))
    }

    /// Announce, strip and free an entity. No-op for ids that are not live.
    ///
    /// Called outside a dispatch, `EntityDispose` subscribers can still look
    /// the entity up. Called from a listener or deferred handler, the message
    /// is only queued and the entity is already freed when it is delivered,
    /// so subscribers must not rely on `entity(id)` returning it.
    pub fn dispose(&mut self, id: EntityId) -> bool {
        if !self.pool.contains(id) {
            return false;
        }

        self.publish(Message::EntityDispose { entity: id });

        if let Some(entity) = self.pool.get_mut(id) {
            entity.strip();
        }
        self.pool.free(id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.pool.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.pool.get_mut(id)
    }

    /// Label of a live entity
    pub fn label_of(&self, id: EntityId) -> Option<Label> {
        self.pool.get(id).map(|e| e.label)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.pool.contains(id)
    }

    /// The World entity, if one was created
    pub fn world(&self) -> Option<&Entity> {
        self.pool.first_labelled(Label::World)
    }

    pub fn world_size(&self) -> Option<Size> {
        self.world().and_then(|w| w.size)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;
    use crate::sim::components::{Capability, Gravity, Position, Size, Velocity};
    use crate::sim::entity::{BlockData, EntityData};

    #[test]
    fn test_ids_strictly_increase_across_recycling() {
        let mut state = GameState::new(1);
        let mut ids = Vec::new();
        for round in 0..5 {
            let a = state.create_entity(Label::Ball, |_| {});
            let b = state.create_entity(Label::Block, |_| {});
            ids.push(a);
            ids.push(b);
            if round % 2 == 0 {
                state.dispose(a);
            }
        }

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(state.pool.len(), 7);
    }

    #[test]
    fn test_create_publishes_after_init() {
        let mut state = GameState::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        state.subscribe(move |ctx: &mut GameState, message: &Message, _| {
            if let Message::EntityCreated { entity } = message {
                let has_position = ctx.entity(*entity).is_some_and(|e| e.has::<Position>());
                sink.borrow_mut().push(has_position);
            }
        });

        state.create_entity(Label::Ball, |e| {
            e.add(Position::new(1.0, 2.0));
        });
        assert_eq!(*seen.borrow(), vec![true]);
    }

    #[test]
    fn test_dispose_announces_before_strip() {
        let mut state = GameState::new(1);
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        state.subscribe_on_message(Message::ENTITY_DISPOSE, move |ctx: &mut GameState, message: &Message, _| {
            *sink.borrow_mut() = ctx.entity(message.entity()).and_then(|e| e.position);
        });

        let id = state.create_entity(Label::Ball, |e| {
            e.add(Position::new(4.0, 5.0));
        });
        assert!(state.dispose(id));
        assert_eq!(*seen.borrow(), Some(Position::new(4.0, 5.0)));
        assert!(!state.is_alive(id));
        assert!(!state.dispose(id), "dispose twice is a no-op");
    }

    #[test]
    fn test_dispose_inside_dispatch_is_announced_late() {
        let mut state = GameState::new(1);
        let target = state.create_entity(Label::Bullet, |e| {
            e.add(Position::new(4.0, 5.0));
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        state.subscribe(move |ctx: &mut GameState, message: &Message, _| match message {
            Message::Collision(_) => {
                ctx.dispose(target);
            }
            Message::EntityDispose { entity } => {
                sink.borrow_mut().push(ctx.is_alive(*entity));
            }
            Message::EntityCreated { .. } => {}
        });

        state.publish(Message::Collision(crate::sim::message::Collision {
            entity: target,
            collided_with: target,
            side: crate::sim::message::Side::Top,
            collision_velocity_x: 0.0,
            collision_velocity_y: 1.0,
        }));

        assert_eq!(*seen.borrow(), vec![false], "entity is freed before delivery");
        assert!(!state.is_alive(target));
    }

    #[test]
    fn test_recycled_entity_starts_clean() {
        let mut state = GameState::new(1);
        let block = state.create_entity(Label::Block, |e| {
            e.add_components(&Capability::ALL);
            e.data = EntityData::Block(BlockData {
                strength: 3,
                effect: None,
                fill_color: "#080".into(),
            });
        });
        state.dispose(block);
        assert!(state.pool.recycled().all(Entity::is_stripped));

        let ball = state.create_entity(Label::Ball, |e| {
            e.add(Velocity::new(1.0, -1.0));
        });
        assert_eq!(state.pool.recyclable(), 0, "carcass was reused");

        let entity = state.entity(ball).expect("ball is live");
        assert_eq!(entity.capabilities(), vec![Capability::Velocity]);
        assert_eq!(entity.data, EntityData::None);
        assert_eq!(entity.label, Label::Ball);
        assert!(entity.id > block);
    }

    #[test]
    fn test_clone_entity_copies_attributes() {
        let mut state = GameState::new(1);
        let source = state.create_entity(Label::Ball, |e| {
            e.add(Position::new(10.0, 20.0));
            e.add(Size::new(5.0, 5.0));
        });

        let copy = state
            .clone_entity(source, |e| {
                e.add_default::<Gravity>();
            })
            .expect("source is live");

        let copy = state.entity(copy).expect("copy is live");
        assert_ne!(copy.id, source);
        assert_eq!(copy.label, Label::Ball);
        assert_eq!(copy.position, Some(Position::new(10.0, 20.0)));
        assert!(copy.has::<Gravity>());
        assert!(!state.entity(source).is_some_and(|e| e.has::<Gravity>()));
    }

    proptest! {
        #[test]
        fn prop_ids_never_repeat(disposals in proptest::collection::vec(any::<bool>(), 1..64)) {
            let mut state = GameState::new(1);
            let mut last = EntityId(0);
            for dispose in disposals {
                let id = state.create_entity(Label::Particle, |e| {
                    e.add_default::<Position>();
                });
                prop_assert!(id > last);
                last = id;
                if dispose {
                    state.dispose(id);
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = GameState::new(42);
        let mut b = GameState::new(42);
        for _ in 0..8 {
            assert_eq!(a.random(), b.random());
        }
    }
}
