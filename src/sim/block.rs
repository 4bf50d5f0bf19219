//! Block damage, destruction effects and level completion

use crate::consts::{
    BALL_SIZE, PARTICLE_GRID_MAX, PARTICLE_INHERIT, PARTICLE_JITTER, POWER_BALL_SIZE,
};

use super::broadcaster::Subscription;
use super::collision::Rect;
use super::components::{Gravity, Power, Velocity};
use super::entity::{BlockEffect, EntityId, Label};
use super::message::{Collision, Message};
use super::spawn::{TEXT_COLOR, create_ball, create_gun, create_particle, create_text};
use super::state::GameState;

pub const LEVEL_COMPLETED: &str = "Level completed";

/// Reacts to balls and bullets hitting blocks
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockSystem;

impl BlockSystem {
    pub fn new() -> Self {
        Self
    }

    pub fn start(&mut self, state: &mut GameState) -> Subscription {
        let id = state.subscribe_on_message(Message::COLLISION, |ctx, message, deferred| {
            let Some(collision) = message.as_collision().copied() else {
                return;
            };
            if ctx.label_of(collision.collided_with) != Some(Label::Block) {
                return;
            }

            match ctx.label_of(collision.entity) {
                Some(Label::Ball) => block_hit(ctx, collision.collided_with, &collision),
                Some(Label::Bullet) => {
                    block_hit(ctx, collision.collided_with, &collision);
                    // Later listeners of this collision still see the bullet
                    let bullet = collision.entity;
                    deferred.defer(move |ctx: &mut GameState, _: &Message| {
                        ctx.dispose(bullet);
                    });
                }
                _ => return,
            }

            if !ctx.pool.any_labelled(Label::Block) {
                level_completed(ctx);
            }
        });
        Subscription::single(id)
    }
}

/// Take one point of strength off `block`, destroying it at zero
pub fn block_hit(state: &mut GameState, block: EntityId, collision: &Collision) {
    let Some(entity) = state.entity_mut(block) else {
        return;
    };
    let Some(rect) = Rect::of(entity) else {
        return;
    };
    let Some(data) = entity.block_mut() else {
        return;
    };

    data.strength -= 1;
    if data.strength > 0 {
        log::debug!("Block#{} hit, {} left", block, data.strength);
        return;
    }

    let effect = data.effect;
    let color = data.fill_color.clone();
    let center = rect.center();

    match effect {
        None => {}
        Some(BlockEffect::ExtraBall) => {
            let ball = create_ball(state, center.x, center.y, BALL_SIZE);
            if let Some(ball) = state.entity_mut(ball) {
                ball.add_default::<Gravity>();
            }
        }
        Some(BlockEffect::Gun) => {
            create_gun(state, center.x, center.y + 2.0);
        }
        Some(BlockEffect::PowerBall) => {
            let ball = create_ball(state, center.x, center.y, POWER_BALL_SIZE);
            if let Some(ball) = state.entity_mut(ball) {
                ball.add_default::<Gravity>();
                ball.add_default::<Power>();
            }
        }
    }

    spawn_debris(state, rect, &color, collision);
    log::debug!("Block#{} destroyed ({:?})", block, effect);
    state.dispose(block);
}

/// Tile the block footprint with particles flying off with the impact
fn spawn_debris(state: &mut GameState, rect: Rect, color: &str, collision: &Collision) {
    let parts_x = ((rect.size.x / 2.0).floor() as usize).min(PARTICLE_GRID_MAX);
    let parts_y = ((rect.size.y / 2.0).floor() as usize).min(PARTICLE_GRID_MAX);
    if parts_x == 0 || parts_y == 0 {
        return;
    }

    let width = rect.size.x / parts_x as f32;
    let height = rect.size.y / parts_y as f32;
    let base_dx = collision.collision_velocity_x * PARTICLE_INHERIT;
    let base_dy = collision.collision_velocity_y * PARTICLE_INHERIT;

    for x in 0..parts_x {
        for y in 0..parts_y {
            let dx = base_dx + PARTICLE_JITTER / 2.0 - state.random() * PARTICLE_JITTER;
            let dy = base_dy + PARTICLE_JITTER / 2.0 - state.random() * PARTICLE_JITTER;
            let particle = create_particle(
                state,
                rect.pos.x + width * x as f32,
                rect.pos.y + height * y as f32,
                width,
                height,
                color,
            );
            if let Some(particle) = state.entity_mut(particle) {
                particle.add(Velocity::new(dx, dy));
            }
        }
    }
}

fn level_completed(state: &mut GameState) {
    let Some(world) = state.world_size() else {
        log::warn!("Level completed without a world to show it in");
        return;
    };
    log::info!("Level completed");
    create_text(
        state,
        world.width / 2.0,
        world.height / 2.0,
        LEVEL_COMPLETED,
        TEXT_COLOR,
    );
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::sim::components::Size;
    use crate::sim::message::Side;
    use crate::sim::spawn::{create_block, create_bullet, create_world};

    fn hit(state: &mut GameState, entity: EntityId, block: EntityId, dx: f32, dy: f32) {
        state.publish(Message::Collision(Collision {
            entity,
            collided_with: block,
            side: Side::Top,
            collision_velocity_x: dx,
            collision_velocity_y: dy,
        }));
    }

    fn setup() -> (GameState, Subscription) {
        let mut state = GameState::new(7);
        create_world(&mut state, 800.0, 400.0);
        let subscription = BlockSystem::new().start(&mut state);
        (state, subscription)
    }

    fn count(state: &GameState, label: Label) -> usize {
        state.pool.ids_labelled(label).len()
    }

    #[test]
    fn test_hit_decrements_strength() {
        let (mut state, _sub) = setup();
        let block = create_block(&mut state, 0.0, 0.0, 20.0, 10.0, "#f00", 2);
        let ball = create_ball(&mut state, 0.0, 0.0, 5.0);

        hit(&mut state, ball, block, 0.0, 2.0);

        let data = state.entity(block).and_then(|e| e.block()).expect("block survives");
        assert_eq!(data.strength, 1);
        assert_eq!(count(&state, Label::Particle), 0);
        assert_eq!(count(&state, Label::Text), 0);
    }

    #[test]
    fn test_destroyed_block_leaves_debris_and_completes_level() {
        let (mut state, _sub) = setup();
        let block = create_block(&mut state, 100.0, 40.0, 20.0, 10.0, "#0f0", 1);
        let ball = create_ball(&mut state, 0.0, 0.0, 5.0);

        hit(&mut state, ball, block, 0.0, 2.0);

        assert!(!state.is_alive(block));
        // 10 x 5 grid of 2 x 2 particles
        let particles = state.pool.ids_labelled(Label::Particle);
        assert_eq!(particles.len(), 50);

        let first = state.entity(particles[0]).expect("particle");
        assert_eq!(first.position.map(|p| (p.x, p.y)), Some((100.0, 40.0)));
        assert_eq!(first.size, Some(Size::new(2.0, 2.0)));
        assert_eq!(first.fill_color(), Some("#0f0"));

        for id in &particles {
            let vel = state.entity(*id).and_then(|e| e.velocity).expect("velocity");
            assert!((-0.4..=0.4).contains(&vel.dx), "dx {}", vel.dx);
            assert!((0.6..=1.4).contains(&vel.dy), "dy {}", vel.dy);
        }

        let texts = state.pool.ids_labelled(Label::Text);
        assert_eq!(texts.len(), 1);
        let text = state.entity(texts[0]).expect("text");
        assert_eq!(text.text().map(|t| t.text.as_str()), Some(LEVEL_COMPLETED));
        assert_eq!(text.position.map(|p| (p.x, p.y)), Some((400.0, 200.0)));
    }

    #[test]
    fn test_no_text_while_blocks_remain() {
        let (mut state, _sub) = setup();
        let block = create_block(&mut state, 0.0, 0.0, 20.0, 10.0, "#f00", 1);
        create_block(&mut state, 40.0, 0.0, 20.0, 10.0, "#f00", 1);
        let ball = create_ball(&mut state, 0.0, 0.0, 5.0);

        hit(&mut state, ball, block, 0.0, 2.0);
        assert_eq!(count(&state, Label::Block), 1);
        assert_eq!(count(&state, Label::Text), 0);
    }

    #[test]
    fn test_other_movers_are_ignored() {
        let (mut state, _sub) = setup();
        let block = create_block(&mut state, 0.0, 0.0, 20.0, 10.0, "#f00", 1);
        let other = create_block(&mut state, 40.0, 0.0, 20.0, 10.0, "#f00", 1);

        hit(&mut state, other, block, 0.0, 2.0);
        assert!(state.is_alive(block));
    }

    #[test]
    fn test_bullet_outlives_the_collision() {
        let (mut state, _sub) = setup();
        let block = create_block(&mut state, 0.0, 0.0, 20.0, 10.0, "#f00", 3);
        let bullet = create_bullet(&mut state, 5.0, 12.0);

        let seen_alive = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen_alive);
        state.subscribe_on_message(Message::COLLISION, move |ctx: &mut GameState, message: &Message, _| {
            *sink.borrow_mut() = Some(ctx.is_alive(message.entity()));
        });

        hit(&mut state, bullet, block, 0.0, -4.0);

        assert_eq!(*seen_alive.borrow(), Some(true));
        assert!(!state.is_alive(bullet));
        assert_eq!(state.entity(block).and_then(|e| e.block()).map(|b| b.strength), Some(2));
    }

    fn block_with(state: &mut GameState, effect: BlockEffect) -> EntityId {
        let id = create_block(state, 100.0, 100.0, 20.0, 10.0, "#f00", 1);
        if let Some(data) = state.entity_mut(id).and_then(|e| e.block_mut()) {
            data.effect = Some(effect);
        }
        id
    }

    #[test]
    fn test_effects() {
        let (mut state, _sub) = setup();
        create_block(&mut state, 500.0, 300.0, 10.0, 10.0, "#f00", 1);
        let ball = create_ball(&mut state, 0.0, 0.0, 5.0);

        let extra = block_with(&mut state, BlockEffect::ExtraBall);
        hit(&mut state, ball, extra, 0.0, 2.0);
        let spawned = *state.pool.ids_labelled(Label::Ball).last().expect("extra ball");
        let spawned = state.entity(spawned).expect("extra ball");
        assert_eq!(spawned.size, Some(Size::new(BALL_SIZE, BALL_SIZE)));
        // Centre (110, 105): x = round(110 - 2.5), y = 105 - 5
        assert_eq!(spawned.position.map(|p| (p.x, p.y)), Some((108.0, 100.0)));
        assert!(spawned.has::<Gravity>());
        assert!(!spawned.has::<Power>());

        let power = block_with(&mut state, BlockEffect::PowerBall);
        hit(&mut state, ball, power, 0.0, 2.0);
        let spawned = *state.pool.ids_labelled(Label::Ball).last().expect("power ball");
        let spawned = state.entity(spawned).expect("power ball");
        assert_eq!(spawned.size, Some(Size::new(POWER_BALL_SIZE, POWER_BALL_SIZE)));
        assert!(spawned.has::<Gravity>());
        assert!(spawned.has::<Power>());

        let gun = block_with(&mut state, BlockEffect::Gun);
        hit(&mut state, ball, gun, 0.0, 2.0);
        let gun = state.pool.first_labelled(Label::Gun).expect("gun pickup");
        assert_eq!(gun.position.map(|p| (p.x, p.y)), Some((107.5, 104.5)));
    }

    #[test]
    fn test_cancelled_system_stops_reacting() {
        let (mut state, subscription) = setup();
        subscription.cancel(&mut state);
        let block = create_block(&mut state, 0.0, 0.0, 20.0, 10.0, "#f00", 1);
        let ball = create_ball(&mut state, 0.0, 0.0, 5.0);

        hit(&mut state, ball, block, 0.0, 2.0);
        assert!(state.is_alive(block));
    }
}
