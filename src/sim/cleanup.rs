//! Off-screen disposal, ball respawn and end-of-level fall

use crate::level::LevelConfig;

use super::components::{Capability, Collide, Gravity, Position, Velocity};
use super::entity::Label;
use super::spawn::create_default_ball;
use super::state::GameState;

/// Runs last in every tick
#[derive(Debug, Default, Clone, Copy)]
pub struct CleanUpSystem;

impl CleanUpSystem {
    pub fn new() -> Self {
        Self
    }

    pub fn update(&mut self, state: &mut GameState, level: &LevelConfig) {
        let Some(world) = state.world_size() else {
            return;
        };
        let has_blocks = state.pool.any_labelled(Label::Block);

        for id in state.pool.filter_components(&[Capability::Position]) {
            let Some(entity) = state.entity(id) else {
                continue;
            };
            let (Some(pos), Some(right)) = (entity.position, entity.right()) else {
                continue;
            };
            // The top is open so debris can fall back in
            if right >= 0.0 && pos.x <= world.width && pos.y <= world.height {
                continue;
            }

            let was_ball = entity.is(Label::Ball);
            state.dispose(id);

            if has_blocks && was_ball && !state.pool.any_labelled(Label::Ball) {
                respawn_ball(state, level);
            }
        }

        if !has_blocks {
            for id in state.pool.ids_labelled(Label::Ball) {
                if let Some(ball) = state.entity_mut(id) {
                    ball.remove::<Collide>();
                    ball.add_default::<Gravity>();
                }
            }
        }
    }
}

/// New ball resting on the palette, heading up with a slight drift
fn respawn_ball(state: &mut GameState, level: &LevelConfig) {
    let Some(palette) = state.pool.first_labelled(Label::Palette) else {
        log::error!("Palette not found to respawn ball");
        return;
    };
    let (Some(pos), Some(size)) = (palette.position, palette.size) else {
        log::error!("Palette#{} has no bounds to respawn ball on", palette.id);
        return;
    };

    let drift = state.random() * -0.4 + 0.2;
    let ball = create_default_ball(state, 0.0, 0.0);
    if let Some(entity) = state.entity_mut(ball) {
        let ball_size = entity.size.unwrap_or_default();
        entity.add(Velocity::new(drift, -level.start_ball_velocity));
        entity.add(Position::new(
            pos.x + size.width / 2.0 - ball_size.width / 2.0,
            pos.y - ball_size.height + 1.0,
        ));
    }
    log::debug!("Respawned ball#{}", ball);
}
