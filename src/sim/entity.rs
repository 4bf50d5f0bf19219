//! Entities: an identity plus optional component slots
//!
//! An entity is a fixed-schema record. Every capability is an `Option` slot,
//! so presence checks are just "is the slot populated". Kind-specific data
//! (block strength, palette ammo, text) lives in [`EntityData`] and is
//! stripped together with the components when the entity is disposed.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::components::{
    Capability, Collide, Component, Gravity, Position, Power, Renderable, Size, Velocity,
};

/// Globally unique entity identifier. Never reused, even for recycled slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// Free label used to filter entities and to match collision policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Ball,
    Block,
    Palette,
    World,
    Bullet,
    Gun,
    Particle,
    Text,
    /// Anything a driver wants to spawn without a dedicated kind
    Custom(&'static str),
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Ball => "Ball",
            Label::Block => "Block",
            Label::Palette => "Palette",
            Label::World => "World",
            Label::Bullet => "Bullet",
            Label::Gun => "Gun",
            Label::Particle => "Particle",
            Label::Text => "Text",
            Label::Custom(name) => name,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a destroyed block leaves behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockEffect {
    #[serde(rename = "extraBall")]
    ExtraBall,
    #[serde(rename = "gun")]
    Gun,
    #[serde(rename = "powerball")]
    PowerBall,
}

/// Block attributes
#[derive(Debug, Clone, PartialEq)]
pub struct BlockData {
    /// Hits left before the block breaks
    pub strength: i32,
    pub effect: Option<BlockEffect>,
    pub fill_color: String,
}

/// Text attributes
#[derive(Debug, Clone, PartialEq)]
pub struct TextData {
    pub text: String,
    pub fill_color: String,
    pub font_size: f32,
}

/// Kind-specific attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EntityData {
    #[default]
    None,
    Block(BlockData),
    Palette {
        bullets: u32,
    },
    Particle {
        fill_color: String,
    },
    Text(TextData),
}

/// A simulation entity
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub label: Label,
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub velocity: Option<Velocity>,
    pub gravity: Option<Gravity>,
    pub collide: Option<Collide>,
    pub power: Option<Power>,
    pub renderable: Option<Renderable>,
    pub data: EntityData,
}

impl Entity {
    /// A bare entity with no components
    pub fn new(id: EntityId, label: Label) -> Self {
        Self {
            id,
            label,
            position: None,
            size: None,
            velocity: None,
            gravity: None,
            collide: None,
            power: None,
            renderable: None,
            data: EntityData::None,
        }
    }

    #[inline]
    pub fn is(&self, label: Label) -> bool {
        self.label == label
    }

    /// Attach a component, replacing any previous value
    pub fn add<T: Component>(&mut self, component: T) -> &mut T {
        T::slot_mut(self).insert(component)
    }

    /// Attach a component with its default values
    pub fn add_default<T: Component>(&mut self) -> &mut T {
        self.add(T::default())
    }

    pub fn get<T: Component>(&self) -> Option<&T> {
        T::slot(self).as_ref()
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        T::slot_mut(self).as_mut()
    }

    pub fn has<T: Component>(&self) -> bool {
        T::slot(self).is_some()
    }

    /// Detach a component, returning its last value
    pub fn remove<T: Component>(&mut self) -> Option<T> {
        T::slot_mut(self).take()
    }

    /// Check a capability by runtime tag
    pub fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Position => self.position.is_some(),
            Capability::Size => self.size.is_some(),
            Capability::Velocity => self.velocity.is_some(),
            Capability::Gravity => self.gravity.is_some(),
            Capability::Collide => self.collide.is_some(),
            Capability::Power => self.power.is_some(),
            Capability::Renderable => self.renderable.is_some(),
        }
    }

    /// True when every listed capability is attached
    pub fn has_components(&self, capabilities: &[Capability]) -> bool {
        capabilities.iter().all(|c| self.has_capability(*c))
    }

    /// Attach capabilities with default values
    pub fn add_components(&mut self, capabilities: &[Capability]) {
        for capability in capabilities {
            match capability {
                Capability::Position => {
                    self.add_default::<Position>();
                }
                Capability::Size => {
                    self.add_default::<Size>();
                }
                Capability::Velocity => {
                    self.add_default::<Velocity>();
                }
                Capability::Gravity => {
                    self.add_default::<Gravity>();
                }
                Capability::Collide => {
                    self.add_default::<Collide>();
                }
                Capability::Power => {
                    self.add_default::<Power>();
                }
                Capability::Renderable => {
                    self.add_default::<Renderable>();
                }
            }
        }
    }

    pub fn remove_components(&mut self, capabilities: &[Capability]) {
        for capability in capabilities {
            match capability {
                Capability::Position => self.position = None,
                Capability::Size => self.size = None,
                Capability::Velocity => self.velocity = None,
                Capability::Gravity => self.gravity = None,
                Capability::Collide => self.collide = None,
                Capability::Power => self.power = None,
                Capability::Renderable => self.renderable = None,
            }
        }
    }

    /// Capabilities currently attached, in `Capability::ALL` order
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .iter()
            .copied()
            .filter(|c| self.has_capability(*c))
            .collect()
    }

    /// Remove every component and all kind data; identity is left untouched
    pub fn strip(&mut self) {
        self.remove_components(&Capability::ALL);
        self.data = EntityData::None;
    }

    /// True when nothing but the identity remains
    pub fn is_stripped(&self) -> bool {
        self.capabilities().is_empty() && self.data == EntityData::None
    }

    /// Give a stripped entity a new identity
    pub(crate) fn revive(&mut self, id: EntityId, label: Label) {
        self.strip();
        self.id = id;
        self.label = label;
    }

    /// Shallow-copy every attribute of `source`, keeping our own identity
    pub fn copy_attributes_from(&mut self, source: &Entity) {
        self.position = source.position;
        self.size = source.size;
        self.velocity = source.velocity;
        self.gravity = source.gravity;
        self.collide = source.collide.clone();
        self.power = source.power;
        self.renderable = source.renderable;
        self.data = source.data.clone();
    }

    /// Right edge, falling back to x for entities without a size
    pub fn right(&self) -> Option<f32> {
        let pos = self.position?;
        Some(pos.x + self.size.map_or(0.0, |s| s.width))
    }

    // === Kind data accessors ===

    pub fn block(&self) -> Option<&BlockData> {
        match &self.data {
            EntityData::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn block_mut(&mut self) -> Option<&mut BlockData> {
        match &mut self.data {
            EntityData::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Bullets held by a palette
    pub fn bullets(&self) -> Option<u32> {
        match self.data {
            EntityData::Palette { bullets } => Some(bullets),
            _ => None,
        }
    }

    pub fn bullets_mut(&mut self) -> Option<&mut u32> {
        match &mut self.data {
            EntityData::Palette { bullets } => Some(bullets),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&TextData> {
        match &self.data {
            EntityData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Fill colour of blocks, particles and text
    pub fn fill_color(&self) -> Option<&str> {
        match &self.data {
            EntityData::Block(block) => Some(&block.fill_color),
            EntityData::Particle { fill_color } => Some(fill_color),
            EntityData::Text(text) => Some(&text.fill_color),
            EntityData::Palette { .. } | EntityData::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_components() {
        let mut entity = Entity::new(EntityId(1), Label::Ball);
        assert!(entity.capabilities().is_empty());

        entity.add(Position::new(3.0, 4.0));
        entity.add_default::<Velocity>();
        assert!(entity.has_components(&[Capability::Position, Capability::Velocity]));
        assert!(!entity.has::<Gravity>());
        assert_eq!(entity.get::<Position>(), Some(&Position::new(3.0, 4.0)));

        let removed = entity.remove::<Position>();
        assert_eq!(removed, Some(Position::new(3.0, 4.0)));
        assert!(!entity.has_capability(Capability::Position));
    }

    #[test]
    fn test_add_components_uses_defaults() {
        let mut entity = Entity::new(EntityId(1), Label::Block);
        entity.add_components(&[Capability::Size, Capability::Gravity, Capability::Collide]);

        assert_eq!(entity.size, Some(Size::new(100.0, 100.0)));
        assert_eq!(entity.gravity.map(|g| g.gravity_y), Some(0.05));
        assert_eq!(entity.collide.as_ref().map(|c| c.bounce_factor), Some(-1.0));
    }

    #[test]
    fn test_strip_removes_everything_but_identity() {
        let mut entity = Entity::new(EntityId(7), Label::Block);
        entity.add_components(&Capability::ALL);
        entity.data = EntityData::Block(BlockData {
            strength: 2,
            effect: Some(BlockEffect::Gun),
            fill_color: "#f00".into(),
        });

        entity.strip();
        assert!(entity.is_stripped());
        for capability in Capability::ALL {
            assert!(!entity.has_capability(capability));
        }
        assert_eq!(entity.id, EntityId(7));
    }

    #[test]
    fn test_right_edge() {
        let mut entity = Entity::new(EntityId(1), Label::Text);
        assert_eq!(entity.right(), None);
        entity.add(Position::new(10.0, 0.0));
        assert_eq!(entity.right(), Some(10.0));
        entity.add(Size::new(5.0, 5.0));
        assert_eq!(entity.right(), Some(15.0));
    }

    #[test]
    fn test_id_display_is_hex() {
        assert_eq!(EntityId(255).to_string(), "ff");
    }
}
