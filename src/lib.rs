//! Rewind Runner - A 2D platformer with a time-rewind mechanic
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, rewind, level generation)
//! - `tuning`: Data-driven engine defaults
//! - `game`: Session orchestration (start/pause flags, intent gating, level flow)

pub mod game;
pub mod sim;
pub mod tuning;

pub use game::{Game, GamePhase};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Engine constants that are not data-driven
pub mod consts {
    /// Largest timestep a single `advance` call will integrate (seconds)
    pub const MAX_DT: f32 = 0.016;

    /// Shrink applied to every side of both boxes in overlap tests
    pub const COLLISION_BUFFER: f32 = 5.0;
    /// Fraction of a tick's velocity used to look back at the previous edge position
    pub const EDGE_LOOKBACK: f32 = 0.1;

    /// Maximum falling speed (units/s)
    pub const TERMINAL_VELOCITY: f32 = 600.0;
    /// Horizontal velocity kept per tick while grounded
    pub const GROUND_RESISTANCE: f32 = 0.90;
    /// Horizontal velocity kept per tick while airborne (more air control)
    pub const AIR_RESISTANCE: f32 = 0.95;
    /// Side contact halves horizontal speed
    pub const SIDE_BOUNCE_DAMPING: f32 = 0.5;

    /// Health lost per tick while standing on a hazard platform
    pub const HAZARD_DAMAGE: f32 = 25.0;
    /// Horizontal knockback speed away from an enemy
    pub const KNOCKBACK_X: f32 = 150.0;
    /// Vertical knockback speed (negative is up)
    pub const KNOCKBACK_Y: f32 = -150.0;

    /// Goal counts as reached when the feet are closer than this to its top
    pub const GOAL_VERTICAL_TOLERANCE: f32 = 2.0 * COLLISION_BUFFER;

    /// Flying enemy bob amplitude and angular frequency
    pub const FLYER_BOB_AMPLITUDE: f32 = 30.0;
    pub const FLYER_BOB_FREQUENCY: f32 = 2.0;

    /// Rewind speed bounds and the energy divisor that maps energy to speed
    pub const REWIND_MIN_SPEED: f32 = 1.0;
    pub const REWIND_MAX_SPEED: f32 = 3.0;
    pub const REWIND_ENERGY_PER_SPEED: f32 = 20.0;
    /// Energy drained per second of rewind at 1x speed
    pub const REWIND_COST_PER_SECOND: f32 = 40.0;
}

/// Clamp a box's top-left corner so the whole box stays inside a `width` x `height` viewport
#[inline]
pub fn clamp_to_viewport(pos: Vec2, size: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        pos.x.min(width - size.x).max(0.0),
        pos.y.min(height - size.y).max(0.0),
    )
}
