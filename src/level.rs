//! Level configuration
//!
//! A level is a grid of block slots plus the ball speed ramp. Levels are plain
//! JSON documents so a layout generator or editor can produce them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_FOOTER;
use crate::error::LevelError;
use crate::sim::{
    BlockEffect, GameState, Label, Position, Size, Velocity, create_block, create_default_ball,
};

fn default_strength() -> i32 {
    1
}

fn default_color() -> String {
    crate::sim::spawn::BLOCK_COLOR.to_string()
}

/// One block of the layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    pub row: u32,
    pub col: u32,
    /// Hits needed to break the block; zero or less counts as one
    #[serde(default = "default_strength")]
    pub strength: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<BlockEffect>,
    #[serde(default = "default_color")]
    pub color: String,
}

impl BlockConfig {
    pub fn new(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            strength: default_strength(),
            effect: None,
            color: default_color(),
        }
    }
}

/// Level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LevelConfig {
    /// Vertical ball speed the ramp climbs to quickly
    pub start_ball_velocity: f32,
    /// Vertical ball speed cap
    pub max_ball_velocity: f32,
    /// Per-tick multiplier between start and max
    pub ball_velocity_acceleration: f32,
    pub row_count: u32,
    pub column_count: u32,
    pub blocks: Vec<BlockConfig>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            start_ball_velocity: 2.0,
            max_ball_velocity: 3.0,
            ball_velocity_acceleration: 1.0005,
            row_count: 15,
            column_count: 20,
            blocks: Vec::new(),
        }
    }
}

impl LevelConfig {
    /// Default level with the top `rows` rows fully populated
    pub fn filled(rows: u32) -> Self {
        let mut level = Self::default();
        let rows = rows.min(level.row_count);
        level.blocks = (0..rows)
            .flat_map(|row| (0..level.column_count).map(move |col| BlockConfig::new(row, col)))
            .collect();
        level
    }

    /// Parse and validate a level document
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a level document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let level = Self::from_json(&json)?;
        log::info!(
            "Loaded level {} ({} blocks)",
            path.display(),
            level.blocks.len()
        );
        Ok(level)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.row_count == 0 || self.column_count == 0 {
            return Err(LevelError::Invalid(format!(
                "grid must not be empty ({} x {})",
                self.row_count, self.column_count
            )));
        }
        if self.start_ball_velocity <= 0.0 || self.max_ball_velocity <= 0.0 {
            return Err(LevelError::Invalid(
                "ball velocities must be positive".to_string(),
            ));
        }
        if self.max_ball_velocity < self.start_ball_velocity {
            return Err(LevelError::Invalid(format!(
                "max ball velocity {} is below start velocity {}",
                self.max_ball_velocity, self.start_ball_velocity
            )));
        }
        if let Some(block) = self
            .blocks
            .iter()
            .find(|b| b.row >= self.row_count || b.col >= self.column_count)
        {
            return Err(LevelError::Invalid(format!(
                "block at row {} col {} is outside the {} x {} grid",
                block.row, block.col, self.row_count, self.column_count
            )));
        }
        Ok(())
    }

    /// Size of one grid cell in a world of size `world`
    ///
    /// The bottom of the world is kept free for the palette.
    pub fn block_size(&self, world: Size) -> Size {
        Size::new(
            world.width / self.column_count as f32,
            (world.height - LEVEL_FOOTER) / self.row_count as f32,
        )
    }
}

/// Populate the world with the level's blocks and serve the first ball
///
/// Expects the World and the Palette to exist already.
pub fn fill_world(state: &mut GameState, level: &LevelConfig) {
    let Some(world) = state.world_size() else {
        log::error!("Cannot fill a level without a world");
        return;
    };
    let cell = level.block_size(world);

    for block in &level.blocks {
        let id = create_block(
            state,
            block.col as f32 * cell.width,
            block.row as f32 * cell.height,
            cell.width,
            cell.height,
            &block.color,
            block.strength.max(1),
        );
        if let Some(data) = state.entity_mut(id).and_then(|e| e.block_mut()) {
            data.effect = block.effect;
        }
    }

    let Some(palette) = state.pool.first_labelled(Label::Palette) else {
        log::error!("Cannot serve a ball without a palette");
        return;
    };
    let (Some(Position { x, y }), Some(size)) = (palette.position, palette.size) else {
        log::error!("Palette#{} has no bounds", palette.id);
        return;
    };

    let ball = create_default_ball(state, x + size.width / 2.0, y);
    let dx = 1.0 - state.random() * 2.0;
    if let Some(ball) = state.entity_mut(ball) {
        ball.add(Velocity::new(dx, -level.start_ball_velocity));
    }
    log::info!("Level filled with {} blocks", level.blocks.len());
}
