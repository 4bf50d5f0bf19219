//! Rectangle collision detection and bounce response
//!
//! Movers are tested against the world bounds and then against every
//! obstacle in pool order. The test is swept on each axis: the previous
//! position is `current - velocity`, and a side is hit when the mover's
//! leading edge crossed the obstacle edge during the last step.
//!
//! At most one obstacle is resolved per mover per tick. The first hit ends
//! the sweep; a second overlapping obstacle is only seen next tick.

use glam::Vec2;

use crate::consts::{DEFAULT_BOUNCE, PALETTE_BOUNCE, PASS_THROUGH, WORLD_BOUNCE};

use super::components::{Capability, Velocity};
use super::entity::{Entity, EntityId, Label};
use super::message::{Collision, Message, Side};
use super::state::GameState;

/// Axis aligned rectangle, `pos` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Bounds of an entity holding Position and Size
    pub fn of(entity: &Entity) -> Option<Self> {
        let pos = entity.position?;
        let size = entity.size?;
        Some(Self::new(
            Vec2::new(pos.x, pos.y),
            Vec2::new(size.width, size.height),
        ))
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap on the x axis
    fn spans_x(&self, other: &Rect) -> bool {
        self.right() > other.left() && self.left() < other.right()
    }

    /// Strict overlap on the y axis
    fn spans_y(&self, other: &Rect) -> bool {
        self.bottom() > other.top() && self.top() < other.bottom()
    }
}

/// Signed factor applied to the mover's velocity on impact
///
/// Negative values reflect, positive values let the mover pass through.
pub fn bounce_factor(mover: &Entity, obstacle: &Entity) -> f32 {
    if mover.is(Label::Palette) && !obstacle.is(Label::Ball) {
        return PALETTE_BOUNCE;
    }
    if obstacle.is(Label::World) {
        return WORLD_BOUNCE;
    }
    if mover.is(Label::Ball) && obstacle.is(Label::Ball) {
        return PASS_THROUGH;
    }
    if mover.is(Label::Ball) && obstacle.is(Label::Block) && mover.has_capability(Capability::Power) {
        return PASS_THROUGH;
    }
    obstacle
        .collide
        .as_ref()
        .map_or(DEFAULT_BOUNCE, |c| c.bounce_factor)
}

/// Bounds and velocity of a mover
fn kinematics(state: &GameState, id: EntityId) -> Option<(Rect, Velocity)> {
    let entity = state.entity(id)?;
    Some((Rect::of(entity)?, entity.velocity?))
}

/// Does `mover`'s policy accept `target`
fn accepts(state: &GameState, mover: EntityId, target: EntityId) -> bool {
    match (state.entity(mover), state.entity(target)) {
        (Some(mover), Some(target)) => mover
            .collide
            .as_ref()
            .is_some_and(|c| c.collides_with.accepts(target)),
        _ => false,
    }
}

/// Apply the bounce on the axis of `side` and publish the collision
///
/// `overlap` is the signed distance the mover is pushed by, before scaling
/// with the bounce factor.
fn resolve(
    state: &mut GameState,
    mover: EntityId,
    obstacle: EntityId,
    side: Side,
    overlap: f32,
) -> bool {
    let bounce = match (state.entity(mover), state.entity(obstacle)) {
        (Some(m), Some(o)) => bounce_factor(m, o),
        _ => return false,
    };
    let Some(entity) = state.entity_mut(mover) else {
        return false;
    };
    let (Some(pos), Some(vel)) = (entity.position.as_mut(), entity.velocity.as_mut()) else {
        return false;
    };

    let collision = match side {
        Side::Top | Side::Bottom => {
            let before = vel.dy;
            vel.dy *= bounce;
            pos.y += overlap * bounce;
            Collision {
                entity: mover,
                collided_with: obstacle,
                side,
                collision_velocity_x: vel.dx,
                collision_velocity_y: before,
            }
        }
        Side::Left | Side::Right => {
            let before = vel.dx;
            vel.dx *= bounce;
            pos.x += overlap * bounce;
            Collision {
                entity: mover,
                collided_with: obstacle,
                side,
                collision_velocity_x: before,
                collision_velocity_y: vel.dy,
            }
        }
    };

    log::debug!(
        "{}#{} collided at the {} of {}",
        entity.label,
        mover,
        side,
        obstacle
    );
    state.publish(Message::Collision(collision));
    true
}

/// Detects and resolves collisions of movers once per tick
#[derive(Debug, Default, Clone, Copy)]
pub struct CollisionSystem;

impl CollisionSystem {
    pub fn new() -> Self {
        Self
    }

    pub fn update(&mut self, state: &mut GameState) {
        let obstacles = state.pool.filter_components(&[
            Capability::Position,
            Capability::Size,
            Capability::Collide,
        ]);
        let movers = state.pool.filter_components(&[
            Capability::Position,
            Capability::Size,
            Capability::Velocity,
            Capability::Collide,
        ]);
        let world = state.world().and_then(|w| Some((w.id, w.size?.width)));

        for mover in movers {
            if let Some((world, width)) = world
                && accepts(state, mover, world)
            {
                self.world_collision(state, mover, world, width);
            }

            for &obstacle in &obstacles {
                if !state.is_alive(mover) {
                    break;
                }
                if obstacle == mover || !accepts(state, mover, obstacle) {
                    continue;
                }
                if self.rect_collision(state, mover, obstacle) {
                    break;
                }
            }
        }
    }

    /// Swept rectangle test of `mover` against `obstacle`
    fn rect_collision(&mut self, state: &mut GameState, mover: EntityId, obstacle: EntityId) -> bool {
        let Some(target) = state.entity(obstacle).and_then(Rect::of) else {
            return false;
        };
        let Some((rect, vel)) = kinematics(state, mover) else {
            return false;
        };
        let prev = rect.pos - Vec2::new(vel.dx, vel.dy);
        let mut hit = false;

        if rect.spans_x(&target) {
            if rect.bottom() >= target.top() && prev.y + rect.size.y < target.top() && vel.dy > 0.0 {
                hit |= resolve(state, mover, obstacle, Side::Top, rect.bottom() - target.top());
            } else if rect.top() <= target.bottom() && prev.y > target.bottom() && vel.dy < 0.0 {
                hit |= resolve(state, mover, obstacle, Side::Bottom, rect.top() - target.bottom());
            }
        }

        // Listeners may have moved, steered or disposed the mover
        let Some((rect, vel)) = kinematics(state, mover) else {
            return hit;
        };
        let Some(target) = state.entity(obstacle).and_then(Rect::of) else {
            return hit;
        };

        if rect.spans_y(&target) {
            if rect.right() >= target.left() && prev.x + rect.size.x < target.left() && vel.dx > 0.0 {
                hit |= resolve(state, mover, obstacle, Side::Left, rect.right() - target.left());
            } else if rect.left() <= target.right() && prev.x > target.right() && vel.dx < 0.0 {
                hit |= resolve(state, mover, obstacle, Side::Right, rect.left() - target.right());
            }
        }

        hit
    }

    /// Reflect off the top, left and right bounds. The bottom is open.
    fn world_collision(&mut self, state: &mut GameState, mover: EntityId, world: EntityId, width: f32) {
        if let Some((rect, _)) = kinematics(state, mover)
            && rect.top() < 0.0
        {
            resolve(state, mover, world, Side::Top, rect.top());
        }

        let Some((rect, _)) = kinematics(state, mover) else {
            return;
        };
        // Only one horizontal bound per tick, left wins
        if rect.left() < 0.0 {
            resolve(state, mover, world, Side::Left, rect.left());
        } else if rect.right() > width {
            resolve(state, mover, world, Side::Right, rect.right() - width);
        }
    }
}
