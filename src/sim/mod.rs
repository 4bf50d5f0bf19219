//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One explicit Euler step per tick
//! - Seeded RNG only
//! - Stable iteration order (pool insertion order)
//! - No rendering or platform dependencies

pub mod ball;
pub mod block;
pub mod broadcaster;
pub mod cleanup;
pub mod collision;
pub mod components;
pub mod entity;
pub mod gun;
pub mod message;
pub mod palette;
pub mod pool;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod velocity;

pub use ball::BallSystem;
pub use block::BlockSystem;
pub use broadcaster::{Broadcaster, Bus, Deferred, ListenerId, Named, Subscription, publish};
pub use cleanup::CleanUpSystem;
pub use collision::{CollisionSystem, Rect, bounce_factor};
pub use components::{
    Capability, Collide, CollidesWith, Component, Gravity, Position, Power, Renderable, Size,
    Velocity,
};
pub use entity::{BlockData, BlockEffect, Entity, EntityData, EntityId, Label, TextData};
pub use gun::GunSystem;
pub use message::{Collision, Message, Side};
pub use palette::{PaletteDirection, PaletteSystem};
pub use pool::Pool;
pub use spawn::{
    create_ball, create_block, create_bullet, create_default_ball, create_gun, create_palette,
    create_particle, create_text, create_world,
};
pub use state::{Deferral, GameState};
pub use tick::{Game, TickInput};
pub use velocity::VelocitySystem;
