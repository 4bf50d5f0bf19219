//! Messages published by the simulation
//!
//! Messages are immutable records that refer to entities by id. Subscribers
//! look the entity up in the pool when they need more than its identity.

use std::fmt;

use super::broadcaster::Named;
use super::entity::EntityId;

/// Side of the obstacle that was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

/// A mover hit an obstacle (or the world bounds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// The mover
    pub entity: EntityId,
    /// The obstacle, or the World entity for bound hits
    pub collided_with: EntityId,
    pub side: Side,
    /// Mover velocity before the bounce was applied
    pub collision_velocity_x: f32,
    pub collision_velocity_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    EntityCreated { entity: EntityId },
    /// Published before the entity is stripped
    EntityDispose { entity: EntityId },
    Collision(Collision),
}

impl Message {
    pub const ENTITY_CREATED: &'static str = "EntityCreated";
    pub const ENTITY_DISPOSE: &'static str = "EntityDispose";
    pub const COLLISION: &'static str = "Collision";

    /// The entity the message is about
    pub fn entity(&self) -> EntityId {
        match self {
            Message::EntityCreated { entity } | Message::EntityDispose { entity } => *entity,
            Message::Collision(collision) => collision.entity,
        }
    }

    pub fn as_collision(&self) -> Option<&Collision> {
        match self {
            Message::Collision(collision) => Some(collision),
            Message::EntityCreated { .. } | Message::EntityDispose { .. } => None,
        }
    }
}

impl Named for Message {
    fn name(&self) -> &'static str {
        match self {
            Message::EntityCreated { .. } => Message::ENTITY_CREATED,
            Message::EntityDispose { .. } => Message::ENTITY_DISPOSE,
            Message::Collision(_) => Message::COLLISION,
        }
    }
}
