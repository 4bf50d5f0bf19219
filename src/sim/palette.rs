//! Palette steering and ball deflection

use super::broadcaster::Subscription;
use super::components::{Gravity, Velocity};
use super::entity::{EntityId, Label};
use super::message::{Message, Side};
use super::state::GameState;

const ACCELERATION: f32 = 0.2;
const DECELERATION: f32 = 0.7;
const MAX_SPEED: f32 = 6.0;
/// Below this the palette stops dead
const REST_SPEED: f32 = 0.1;
/// Share of the palette's speed passed on to a ball it deflects
const CARRY: f32 = 0.3;
const MAX_BALL_DX: f32 = 3.0;

/// Direction the player is pushing the palette in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaletteDirection {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Default, Clone)]
pub struct PaletteSystem {
    direction: PaletteDirection,
}

impl PaletteSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self) -> PaletteDirection {
        self.direction
    }

    /// Set by the input layer
    pub fn set_direction(&mut self, direction: PaletteDirection) {
        self.direction = direction;
    }

    pub fn start(&mut self, state: &mut GameState) -> Subscription {
        let id = state.subscribe_on_message(Message::COLLISION, |ctx, message, _| {
            let Some(collision) = message.as_collision().copied() else {
                return;
            };
            let Some(ball) = ctx.entity_mut(collision.entity) else {
                return;
            };
            if !ball.is(Label::Ball) || !ball.has::<Velocity>() {
                return;
            }

            // Balls spawned by blocks fall until they touch something
            ball.remove::<Gravity>();

            if collision.side == Side::Top
                && ctx.label_of(collision.collided_with) == Some(Label::Palette)
            {
                deflect(ctx, collision.collided_with, collision.entity);
            }
        });
        Subscription::single(id)
    }

    /// Accelerate or brake the palette according to the current direction
    pub fn update(&mut self, state: &mut GameState, palette: EntityId) {
        let Some(vel) = state.entity_mut(palette).and_then(|p| p.velocity.as_mut()) else {
            return;
        };

        match self.direction {
            PaletteDirection::None => {
                if vel.dx.abs() < REST_SPEED {
                    vel.dx = 0.0;
                } else {
                    vel.dx *= DECELERATION;
                }
            }
            PaletteDirection::Left => vel.dx = (vel.dx - ACCELERATION).max(-MAX_SPEED),
            PaletteDirection::Right => vel.dx = (vel.dx + ACCELERATION).min(MAX_SPEED),
        }
    }
}

/// Steer a ball bouncing off the palette: the further out it lands, the
/// harder it is pushed to that side
fn deflect(state: &mut GameState, palette: EntityId, ball: EntityId) {
    let Some(palette) = state.entity(palette) else {
        return;
    };
    let (Some(pos), Some(size)) = (palette.position, palette.size) else {
        return;
    };
    let palette_dx = palette.velocity.map_or(0.0, |v| v.dx);
    let jitter = state.random() * 0.1 + 0.05;

    let Some(ball) = state.entity_mut(ball) else {
        return;
    };
    let (Some(ball_pos), Some(ball_size)) = (ball.position, ball.size) else {
        return;
    };
    let Some(vel) = ball.velocity.as_mut() else {
        return;
    };

    let start = pos.x - ball_size.width;
    let end = pos.x + size.width;
    let ratio = (ball_pos.x - start) / (end - start);

    vel.dx += ratio * 2.0 - 1.0;
    vel.dx += palette_dx * CARRY;
    vel.dx += jitter;
    vel.dx = vel.dx.clamp(-MAX_BALL_DX, MAX_BALL_DX);
}
