//! Gun pickups and the palette's fire loop
//!
//! The fire loop is driven from outside: the input layer reports trigger
//! presses and releases and the driver reports elapsed fire intervals while
//! the trigger is held. A press fires one shot right away; auto-fire only
//! starts after a few intervals so a tap stays a single shot.

use crate::consts::{FIRE_WARMUP_INTERVALS, GUN_PICKUP_BULLETS};

use super::broadcaster::Subscription;
use super::entity::Label;
use super::message::Message;
use super::spawn::create_bullet;
use super::state::GameState;

/// Horizontal distance of both muzzles from the palette edges
const MUZZLE_INSET: f32 = 3.0;
/// Bullets spawn this far above the palette top
const MUZZLE_RISE: f32 = 10.0;

#[derive(Debug, Default, Clone)]
pub struct GunSystem {
    firing: bool,
    /// Intervals elapsed since the trigger was pressed
    shot_count: u32,
}

impl GunSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, state: &mut GameState) -> Subscription {
        let id = state.subscribe_on_message(Message::COLLISION, |ctx, message, _| {
            let Some(collision) = message.as_collision() else {
                return;
            };
            if ctx.label_of(collision.entity) != Some(Label::Gun)
                || ctx.label_of(collision.collided_with) != Some(Label::Palette)
            {
                return;
            }

            ctx.dispose(collision.entity);
            if let Some(bullets) = ctx
                .entity_mut(collision.collided_with)
                .and_then(|p| p.bullets_mut())
            {
                *bullets += GUN_PICKUP_BULLETS;
                log::debug!(
                    "Palette#{} picked up a gun, {} bullets",
                    collision.collided_with,
                    bullets
                );
            }
        });
        Subscription::single(id)
    }

    pub fn is_firing(&self) -> bool {
        self.firing
    }

    /// Fire once and start the loop. Repeated presses while held are ignored.
    pub fn press_trigger(&mut self, state: &mut GameState) {
        if self.firing {
            return;
        }
        self.firing = true;
        self.shot_count = 0;
        self.fire(state);
    }

    /// One fire interval elapsed while the trigger is held
    pub fn interval_elapsed(&mut self, state: &mut GameState) {
        if !self.firing {
            return;
        }
        if self.shot_count > FIRE_WARMUP_INTERVALS {
            self.fire(state);
        }
        self.shot_count += 1;
    }

    pub fn release_trigger(&mut self) {
        self.firing = false;
        self.shot_count = 0;
    }

    /// Every palette with ammo shoots one bullet, alternating muzzles
    pub fn fire(&mut self, state: &mut GameState) {
        for id in state.pool.ids_labelled(Label::Palette) {
            let Some(palette) = state.entity_mut(id) else {
                continue;
            };
            let (Some(pos), Some(size)) = (palette.position, palette.size) else {
                continue;
            };
            let Some(bullets) = palette.bullets_mut() else {
                continue;
            };
            if *bullets == 0 {
                continue;
            }

            *bullets -= 1;
            let x = if *bullets % 2 == 1 {
                pos.x + MUZZLE_INSET
            } else {
                pos.x + size.width - MUZZLE_INSET
            };
            create_bullet(state, x, pos.y - MUZZLE_RISE);
        }
    }
}
