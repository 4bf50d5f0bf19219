//! Entity factories
//!
//! Each factory creates an entity through [`GameState::create_entity`] with
//! the capability set and default values of its kind, and returns its id.

use crate::consts::{BALL_SIZE, PALETTE_FLOAT, PALETTE_HEIGHT, PALETTE_WIDTH};

use super::components::{Collide, Gravity, Position, Renderable, Size, Velocity};
use super::entity::{BlockData, EntityData, EntityId, Label, TextData};
use super::state::GameState;

pub const BLOCK_COLOR: &str = "#f00";
pub const PARTICLE_COLOR: &str = "#888";
pub const TEXT_COLOR: &str = "#000";
pub const TEXT_FONT_SIZE: f32 = 20.0;

const GUN_SIZE: f32 = 5.0;
const BULLET_WIDTH: f32 = 3.0;
const BULLET_HEIGHT: f32 = 8.0;
const BULLET_SPEED: f32 = 4.0;

/// Ball of `size` whose bottom edge sits on `bottom_y`, horizontally centred
pub fn create_ball(state: &mut GameState, center_x: f32, bottom_y: f32, size: f32) -> EntityId {
    state.create_entity(Label::Ball, |e| {
        e.add(Size::new(size, size));
        e.add(Position::new((center_x - size / 2.0).round(), bottom_y - size));
        e.add_default::<Velocity>();
        e.add_default::<Renderable>();
        e.add(Collide::default().with([Label::World, Label::Palette, Label::Block]));
    })
}

/// Ball with the default size
pub fn create_default_ball(state: &mut GameState, center_x: f32, bottom_y: f32) -> EntityId {
    create_ball(state, center_x, bottom_y, BALL_SIZE)
}

pub fn create_block(
    state: &mut GameState,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    color: &str,
    strength: i32,
) -> EntityId {
    state.create_entity(Label::Block, |e| {
        e.add(Position::new(x, y));
        e.add(Size::new(width, height));
        e.add_default::<Renderable>();
        e.add_default::<Collide>();
        e.data = EntityData::Block(BlockData {
            strength,
            effect: None,
            fill_color: color.to_string(),
        });
    })
}

/// Player palette, floating above the bottom of a world of size `world`
pub fn create_palette(state: &mut GameState, world: Size) -> EntityId {
    state.create_entity(Label::Palette, |e| {
        e.add(Size::new(PALETTE_WIDTH, PALETTE_HEIGHT));
        e.add(Position::new(
            (world.width / 2.0 - PALETTE_WIDTH / 2.0).round(),
            world.height - PALETTE_FLOAT,
        ));
        e.add_default::<Velocity>();
        e.add_default::<Renderable>();
        e.add(Collide::default().with(Label::World));
        e.data = EntityData::Palette { bullets: 0 };
    })
}

/// The play field; only its size matters
pub fn create_world(state: &mut GameState, width: f32, height: f32) -> EntityId {
    state.create_entity(Label::World, |e| {
        e.add(Size::new(width, height));
        e.add_default::<Renderable>();
    })
}

pub fn create_bullet(state: &mut GameState, center_x: f32, bottom_y: f32) -> EntityId {
    state.create_entity(Label::Bullet, |e| {
        e.add(Size::new(BULLET_WIDTH, BULLET_HEIGHT));
        e.add(Position::new(center_x - 1.0, bottom_y));
        e.add(Velocity::new(0.0, -BULLET_SPEED));
        e.add_default::<Renderable>();
        e.add(Collide::default().with(Label::Block));
    })
}

/// Falling gun pickup, caught by the palette
pub fn create_gun(state: &mut GameState, center_x: f32, center_y: f32) -> EntityId {
    state.create_entity(Label::Gun, |e| {
        e.add(Size::new(GUN_SIZE, GUN_SIZE));
        e.add(Position::new(center_x - GUN_SIZE / 2.0, center_y - GUN_SIZE / 2.0));
        e.add_default::<Renderable>();
        e.add_default::<Gravity>();
        e.add_default::<Velocity>();
        e.add(Collide::default().with(Label::Palette));
    })
}

/// Debris. Falls and never collides.
pub fn create_particle(
    state: &mut GameState,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    color: &str,
) -> EntityId {
    state.create_entity(Label::Particle, |e| {
        e.add(Position::new(x, y));
        e.add(Size::new(width, height));
        e.add_default::<Renderable>();
        e.add_default::<Gravity>();
        e.add_default::<Velocity>();
        e.data = EntityData::Particle {
            fill_color: color.to_string(),
        };
    })
}

/// Text anchored at its centre
pub fn create_text(
    state: &mut GameState,
    center_x: f32,
    center_y: f32,
    text: &str,
    color: &str,
) -> EntityId {
    state.create_entity(Label::Text, |e| {
        e.add(Position::new(center_x, center_y));
        e.add_default::<Renderable>();
        e.data = EntityData::Text(TextData {
            text: text.to_string(),
            fill_color: color.to_string(),
            font_size: TEXT_FONT_SIZE,
        });
    })
}
