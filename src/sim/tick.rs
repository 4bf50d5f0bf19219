//! Fixed timestep simulation tick
//!
//! [`Game`] owns the context, every system and their subscriptions, and runs
//! the systems in a fixed order once per tick:
//! palette input, velocity, collision, ball ramp, render hook, cleanup.

use crate::consts::{FIRE_INTERVAL_TICKS, WORLD_HEIGHT, WORLD_WIDTH};
use crate::level::{LevelConfig, fill_world};

use super::ball::BallSystem;
use super::block::BlockSystem;
use super::broadcaster::Subscription;
use super::cleanup::CleanUpSystem;
use super::collision::CollisionSystem;
use super::components::Size;
use super::entity::{EntityId, Label};
use super::gun::GunSystem;
use super::palette::{PaletteDirection, PaletteSystem};
use super::spawn::{create_palette, create_world};
use super::state::GameState;
use super::velocity::VelocitySystem;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Direction the palette is pushed in
    pub direction: PaletteDirection,
    /// Fire button held
    pub trigger: bool,
}

/// A running level
pub struct Game {
    pub state: GameState,
    pub level: LevelConfig,
    palette: EntityId,
    velocity: VelocitySystem,
    collision: CollisionSystem,
    ball: BallSystem,
    cleanup: CleanUpSystem,
    palette_system: PaletteSystem,
    gun: GunSystem,
    subscriptions: Vec<Subscription>,
    trigger_held: bool,
    held_ticks: u32,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("state", &self.state)
            .field("palette", &self.palette)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl Game {
    /// Start `level` in the default 800 x 400 world
    pub fn new(level: LevelConfig, seed: u64) -> Self {
        Self::with_world_size(level, seed, Size::new(WORLD_WIDTH, WORLD_HEIGHT))
    }

    pub fn with_world_size(level: LevelConfig, seed: u64, world: Size) -> Self {
        let mut state = GameState::new(seed);
        create_world(&mut state, world.width, world.height);
        let palette = create_palette(&mut state, world);

        let mut palette_system = PaletteSystem::new();
        let mut gun = GunSystem::new();
        let subscriptions = vec![
            palette_system.start(&mut state),
            BlockSystem::new().start(&mut state),
            gun.start(&mut state),
        ];

        fill_world(&mut state, &level);
        log::info!(
            "Game started: seed {}, {} blocks, {}x{} world",
            seed,
            level.blocks.len(),
            world.width,
            world.height
        );

        Self {
            state,
            level,
            palette,
            velocity: VelocitySystem::new(),
            collision: CollisionSystem::new(),
            ball: BallSystem::new(),
            cleanup: CleanUpSystem::new(),
            palette_system,
            gun,
            subscriptions,
            trigger_held: false,
            held_ticks: 0,
        }
    }

    pub fn palette(&self) -> EntityId {
        self.palette
    }

    /// No block is left
    pub fn is_level_completed(&self) -> bool {
        !self.state.pool.any_labelled(Label::Block)
    }

    /// Advance one tick
    pub fn tick(&mut self, input: &TickInput) {
        self.tick_with(input, |_| {});
    }

    /// Advance one tick, calling `render` after the simulation step and
    /// before off-screen entities are cleaned up
    pub fn tick_with(&mut self, input: &TickInput, render: impl FnOnce(&GameState)) {
        self.palette_system.set_direction(input.direction);
        self.palette_system.update(&mut self.state, self.palette);
        self.handle_trigger(input.trigger);

        self.velocity.update(&mut self.state);
        self.collision.update(&mut self.state);
        self.ball.update(&mut self.state, &self.level);
        render(&self.state);
        self.cleanup.update(&mut self.state, &self.level);

        self.state.time_ticks += 1;
    }

    /// Turn the held/released trigger into gun presses and fire intervals
    fn handle_trigger(&mut self, held: bool) {
        match (self.trigger_held, held) {
            (false, true) => {
                self.held_ticks = 0;
                self.gun.press_trigger(&mut self.state);
            }
            (true, true) => {
                self.held_ticks += 1;
                if self.held_ticks.is_multiple_of(FIRE_INTERVAL_TICKS) {
                    self.gun.interval_elapsed(&mut self.state);
                }
            }
            (true, false) => self.gun.release_trigger(),
            (false, false) => {}
        }
        self.trigger_held = held;
    }

    /// Unsubscribe every system, most recently started first
    pub fn shutdown(&mut self) {
        while let Some(subscription) = self.subscriptions.pop() {
            subscription.cancel(&mut self.state);
        }
        log::info!("Game stopped after {} ticks", self.state.time_ticks);
    }
}
