//! Errors surfaced to the driver
//!
//! The simulation itself never fails at runtime; only level data coming from
//! outside the type system can be rejected.

/// Level loading errors
#[derive(thiserror::Error, Debug)]
pub enum LevelError {
    /// Reading the level file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The level JSON is malformed or names an unknown block effect
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The level parsed but describes an impossible layout
    #[error("Invalid level: {0}")]
    Invalid(String),
}
