//! Explicit Euler integration, one step per tick

use super::components::Capability;
use super::state::GameState;

/// Moves every entity holding Position and Velocity
#[derive(Debug, Default, Clone, Copy)]
pub struct VelocitySystem;

impl VelocitySystem {
    pub fn new() -> Self {
        Self
    }

    pub fn update(&mut self, state: &mut GameState) {
        for id in state
            .pool
            .filter_components(&[Capability::Position, Capability::Velocity])
        {
            let Some(entity) = state.pool.get_mut(id) else {
                continue;
            };
            let gravity = entity.gravity.map(|g| g.gravity_y);
            let (Some(pos), Some(vel)) = (entity.position.as_mut(), entity.velocity.as_mut())
            else {
                continue;
            };

            if let Some(gravity_y) = gravity {
                vel.dy += gravity_y;
            }
            pos.y += vel.dy;
            pos.x += vel.dx;
        }
    }
}
