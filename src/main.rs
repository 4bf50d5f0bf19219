//! Breakout Sim entry point
//!
//! Headless driver: loads a level, plays it with a simple autopilot that
//! keeps the palette under the lowest ball, and logs how it went.
//!
//! Usage: `breakout-sim [level.json] [ticks] [seed]`

use breakout_sim::LevelConfig;
use breakout_sim::sim::{Game, GameState, Label, PaletteDirection, Rect, TickInput};

const DEFAULT_TICKS: u64 = 60 * 60 * 5;
const DEFAULT_SEED: u64 = 42;
/// Palette centre may drift this far from the ball before steering
const DEAD_ZONE: f32 = 8.0;

/// Steer towards the ball closest to the bottom, fire whenever armed
fn autopilot(state: &GameState) -> TickInput {
    let Some(palette) = state.pool.first_labelled(Label::Palette) else {
        return TickInput::default();
    };
    let Some(center) = Rect::of(palette).map(|r| r.center()) else {
        return TickInput::default();
    };

    let target = state
        .pool
        .all()
        .filter(|e| e.is(Label::Ball))
        .filter_map(Rect::of)
        .map(|r| (r.top(), r.center().x))
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, x)| x);

    let direction = match target {
        Some(x) if x < center.x - DEAD_ZONE => PaletteDirection::Left,
        Some(x) if x > center.x + DEAD_ZONE => PaletteDirection::Right,
        _ => PaletteDirection::None,
    };
    TickInput {
        direction,
        trigger: palette.bullets().is_some_and(|b| b > 0),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let level = match args.next() {
        Some(path) => match LevelConfig::load(&path) {
            Ok(level) => level,
            Err(e) => {
                log::error!("Failed to load level {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => LevelConfig::filled(5),
    };
    let ticks = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TICKS);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    let blocks = level.blocks.len();
    let mut game = Game::new(level, seed);
    let mut input = TickInput::default();
    let mut lost_balls = 0u32;

    for _ in 0..ticks {
        let balls_before = game.state.pool.ids_labelled(Label::Ball);
        game.tick(&input);
        lost_balls += balls_before
            .iter()
            .filter(|id| !game.state.is_alive(**id))
            .count() as u32;

        if game.is_level_completed() {
            log::info!("Level completed after {} ticks", game.state.time_ticks);
            break;
        }
        input = autopilot(&game.state);
    }

    let remaining = game.state.pool.ids_labelled(Label::Block).len();
    log::info!(
        "{} of {} blocks broken, {} balls lost, {} entities live, {} recyclable",
        blocks - remaining,
        blocks,
        lost_balls,
        game.state.pool.len(),
        game.state.pool.recyclable()
    );
    game.shutdown();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts drive `Game::tick` from their own frame callback
}
