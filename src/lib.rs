//! Breakout Sim - simulation core of a breakout-style arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity pool, broadcaster, systems)
//! - `level`: Level configuration and world fill
//! - `error`: Errors surfaced while loading levels
//!
//! Rendering, input capture and frame scheduling live outside this crate. A
//! driver calls [`sim::Game::tick`] once per frame and a renderer observes the
//! broadcaster.

pub mod error;
pub mod level;
pub mod sim;

pub use error::LevelError;
pub use level::{BlockConfig, LevelConfig};

/// Game configuration constants
pub mod consts {
    /// World dimensions
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 400.0;

    /// Ball sizes (square)
    pub const BALL_SIZE: f32 = 5.0;
    pub const POWER_BALL_SIZE: f32 = 6.0;

    /// Palette defaults
    pub const PALETTE_WIDTH: f32 = 50.0;
    pub const PALETTE_HEIGHT: f32 = 14.0;
    /// Distance between the palette top and the world bottom
    pub const PALETTE_FLOAT: f32 = 20.0;

    /// Downward acceleration per tick added by the Gravity component
    pub const DEFAULT_GRAVITY: f32 = 0.05;
    /// Default Collide bounce factor (perfect reflection)
    pub const DEFAULT_BOUNCE: f32 = -1.0;
    /// Palette hitting anything but a ball loses most of its speed
    pub const PALETTE_BOUNCE: f32 = -0.4;
    /// Bounce factor of the world bounds
    pub const WORLD_BOUNCE: f32 = -1.0;
    /// Bounce factor used when the mover passes through
    pub const PASS_THROUGH: f32 = 1.0;

    /// Ball speed ramp: multiplier applied while below the start velocity
    pub const BALL_FLOOR_RAMP: f32 = 1.01;

    /// Debris grid cap per axis
    pub const PARTICLE_GRID_MAX: usize = 25;
    /// Total random spread applied to debris velocity (centered on zero)
    pub const PARTICLE_JITTER: f32 = 0.8;
    /// Share of the impact velocity inherited by debris
    pub const PARTICLE_INHERIT: f32 = 0.5;

    /// Bullets granted by a gun pickup
    pub const GUN_PICKUP_BULLETS: u32 = 10;
    /// Ticks between two fire-loop intervals (~50 ms at 60 Hz)
    pub const FIRE_INTERVAL_TICKS: u32 = 3;
    /// Intervals to wait before auto-fire kicks in, so a tap fires a single shot
    pub const FIRE_WARMUP_INTERVALS: u32 = 3;

    /// Vertical space below the block grid
    pub const LEVEL_FOOTER: f32 = 50.0;
}
