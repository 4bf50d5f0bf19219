//! Ball speed ramp

use crate::consts::BALL_FLOOR_RAMP;
use crate::level::LevelConfig;

use super::components::Capability;
use super::entity::Label;
use super::state::GameState;

/// Pushes the vertical ball speed up to the level's start velocity, then
/// slowly towards its maximum
#[derive(Debug, Default, Clone, Copy)]
pub struct BallSystem;

impl BallSystem {
    pub fn new() -> Self {
        Self
    }

    pub fn update(&mut self, state: &mut GameState, level: &LevelConfig) {
        for id in state.pool.ids_labelled(Label::Ball) {
            let Some(ball) = state.entity_mut(id) else {
                continue;
            };
            if !ball.has_components(&[Capability::Position, Capability::Velocity]) {
                continue;
            }
            let Some(vel) = ball.velocity.as_mut() else {
                continue;
            };

            vel.dy = if vel.dy < level.start_ball_velocity {
                vel.dy * BALL_FLOOR_RAMP
            } else if vel.dy < level.max_ball_velocity {
                vel.dy * level.ball_velocity_acceleration
            } else {
                level.max_ball_velocity
            };
        }
    }
}
