//! Components: optional attribute bundles attached to entities
//!
//! Each component owns a slot on [`Entity`]. The [`Component`] trait maps a
//! type to its slot so generic code can attach, query and detach it; the
//! [`Capability`] tag does the same at runtime for pool queries.

use std::fmt;
use std::rc::Rc;

use crate::consts::{DEFAULT_BOUNCE, DEFAULT_GRAVITY};

use super::entity::{Entity, Label};

/// Runtime tag for each component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Position,
    Size,
    Velocity,
    Gravity,
    Collide,
    Power,
    Renderable,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::Position,
        Capability::Size,
        Capability::Velocity,
        Capability::Gravity,
        Capability::Collide,
        Capability::Power,
        Capability::Renderable,
    ];
}

/// A typed component living in a fixed slot of [`Entity`]
pub trait Component: Clone + Default + 'static {
    const CAPABILITY: Capability;

    fn slot(entity: &Entity) -> &Option<Self>;
    fn slot_mut(entity: &mut Entity) -> &mut Option<Self>;
}

macro_rules! component_slot {
    ($ty:ty, $field:ident, $cap:ident) => {
        impl Component for $ty {
            const CAPABILITY: Capability = Capability::$cap;

            #[inline]
            fn slot(entity: &Entity) -> &Option<Self> {
                &entity.$field
            }

            #[inline]
            fn slot_mut(entity: &mut Entity) -> &mut Option<Self> {
                &mut entity.$field
            }
        }
    };
}

/// Top-left corner in world pixels (y grows downward)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(100.0, 100.0)
    }
}

/// Position delta per tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

impl Velocity {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// Added to `dy` every tick: the entity falls down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub gravity_y: f32,
}

impl Default for Gravity {
    fn default() -> Self {
        Self {
            gravity_y: DEFAULT_GRAVITY,
        }
    }
}

/// Which obstacles a mover reacts to
#[derive(Clone)]
pub enum CollidesWith {
    /// Exactly one label
    Label(Label),
    /// Any of these labels; empty means nothing
    AnyOf(Vec<Label>),
    /// Arbitrary test over the candidate obstacle
    Matches(Rc<dyn Fn(&Entity) -> bool>),
}

impl CollidesWith {
    pub fn matches<F>(predicate: F) -> Self
    where
        F: Fn(&Entity) -> bool + 'static,
    {
        CollidesWith::Matches(Rc::new(predicate))
    }

    /// Does this policy accept `target` as an obstacle
    pub fn accepts(&self, target: &Entity) -> bool {
        match self {
            CollidesWith::Label(label) => *label == target.label,
            CollidesWith::AnyOf(labels) => labels.contains(&target.label),
            CollidesWith::Matches(predicate) => predicate(target),
        }
    }
}

impl Default for CollidesWith {
    fn default() -> Self {
        CollidesWith::AnyOf(Vec::new())
    }
}

impl fmt::Debug for CollidesWith {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollidesWith::Label(label) => f.debug_tuple("Label").field(label).finish(),
            CollidesWith::AnyOf(labels) => f.debug_tuple("AnyOf").field(labels).finish(),
            CollidesWith::Matches(_) => f.write_str("Matches(<fn>)"),
        }
    }
}

impl From<Label> for CollidesWith {
    fn from(label: Label) -> Self {
        CollidesWith::Label(label)
    }
}

impl<const N: usize> From<[Label; N]> for CollidesWith {
    fn from(labels: [Label; N]) -> Self {
        CollidesWith::AnyOf(labels.to_vec())
    }
}

/// Takes part in collision detection, as obstacle and (with velocity) as mover
#[derive(Debug, Clone)]
pub struct Collide {
    /// Signed multiplier applied on impact: negative reflects, positive passes through
    pub bounce_factor: f32,
    pub collides_with: CollidesWith,
}

impl Collide {
    pub fn new(bounce_factor: f32) -> Self {
        Self {
            bounce_factor,
            collides_with: CollidesWith::default(),
        }
    }

    pub fn with(mut self, collides_with: impl Into<CollidesWith>) -> Self {
        self.collides_with = collides_with.into();
        self
    }
}

impl Default for Collide {
    fn default() -> Self {
        Self::new(DEFAULT_BOUNCE)
    }
}

/// Power ball: tunnels through blocks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Power {
    pub has_power: bool,
}

impl Default for Power {
    fn default() -> Self {
        Self { has_power: true }
    }
}

/// Marks entities the renderer should draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    pub can_render: bool,
}

impl Default for Renderable {
    fn default() -> Self {
        Self { can_render: true }
    }
}

component_slot!(Position, position, Position);
component_slot!(Size, size, Size);
component_slot!(Velocity, velocity, Velocity);
component_slot!(Gravity, gravity, Gravity);
component_slot!(Collide, collide, Collide);
component_slot!(Power, power, Power);
component_slot!(Renderable, renderable, Renderable);
