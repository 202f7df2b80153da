//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - `advance` maps a state and elapsed time to a new state
//! - Randomness only through an explicit, seedable source
//! - Stable iteration order (platform list order matters for collisions)
//! - No rendering, input or session flags

pub mod collision;
pub mod history;
pub mod level;
pub mod state;
pub mod tick;

pub use collision::{overlaps, reached_goal};
pub use history::{TimeHistory, TimeSnapshot, TrailPoint, rewind_speed, rewind_step};
pub use level::{LevelLayout, MAX_LEVEL, generate, new_game_state, resize_state};
pub use state::{
    Enemy, EnemyKind, Entity, Facing, GameState, Platform, PlatformKind, Player, RewindState,
};
pub use tick::{MoveIntent, TickInput, advance, apply_input, tick};
