//! Game state and core simulation types
//!
//! Every frame produces a whole new `GameState`; entities are plain values and
//! are never shared between two states.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::history::TimeHistory;
use crate::tuning::Tuning;

/// Render colors (0xRRGGBB)
pub const PLAYER_COLOR: u32 = 0x4ade80;
pub const PLATFORM_COLOR: u32 = 0x475569;
pub const HAZARD_COLOR: u32 = 0xef4444;
pub const GOAL_COLOR: u32 = 0x10b981;
pub const PATROL_COLOR: u32 = 0x7e22ce;
pub const FLYING_COLOR: u32 = 0x9333ea;

/// Horizontal facing / travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1.0 for left, 1.0 for right
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Shared shape of every physical actor: an axis-aligned box with a velocity
pub trait Entity {
    /// Top-left corner
    fn pos(&self) -> Vec2;
    fn vel(&self) -> Vec2;
    /// Width and height
    fn size(&self) -> Vec2;
    fn color(&self) -> u32;

    #[inline]
    fn left(&self) -> f32 {
        self.pos().x
    }

    #[inline]
    fn right(&self) -> f32 {
        self.pos().x + self.size().x
    }

    #[inline]
    fn top(&self) -> f32 {
        self.pos().y
    }

    #[inline]
    fn bottom(&self) -> f32 {
        self.pos().y + self.size().y
    }
}

macro_rules! impl_entity {
    ($($ty:ty),*) => {
        $(impl Entity for $ty {
            fn pos(&self) -> Vec2 {
                self.pos
            }

            fn vel(&self) -> Vec2 {
                self.vel
            }

            fn size(&self) -> Vec2 {
                self.size
            }

            fn color(&self) -> u32 {
                self.color
            }
        })*
    };
}

impl_entity!(Player, Platform, Enemy);

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub color: u32,
    /// Horizontal speed applied by a move intent
    pub speed: f32,
    /// Upward speed applied by a jump
    pub jump_force: f32,
    pub is_jumping: bool,
    pub on_ground: bool,
    pub facing: Facing,
    /// May dip below zero for a tick; game over at `<= 0`
    pub health: f32,
    /// One extra jump, restored on every ground contact
    pub can_double_jump: bool,
}

impl Player {
    /// A fresh player from the engine defaults
    pub fn new(tuning: &Tuning, pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: tuning.player_size(),
            color: PLAYER_COLOR,
            speed: tuning.player_speed,
            jump_force: tuning.jump_force,
            is_jumping: false,
            on_ground: false,
            facing: Facing::Right,
            health: tuning.player_health,
            can_double_jump: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Nonzero velocity on either axis
    pub fn is_moving(&self) -> bool {
        self.vel.x != 0.0 || self.vel.y != 0.0
    }
}

/// Platform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    #[default]
    Normal,
    /// Damages the player on every tick of landing contact
    Hazard,
    /// Reaching its top completes the level (exactly one per level)
    Goal,
}

/// A static platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub color: u32,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn new(kind: PlatformKind, pos: Vec2, size: Vec2) -> Self {
        let color = match kind {
            PlatformKind::Normal => PLATFORM_COLOR,
            PlatformKind::Hazard => HAZARD_COLOR,
            PlatformKind::Goal => GOAL_COLOR,
        };
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            color,
            kind,
        }
    }
}

/// Enemy movement patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Walks back and forth along a platform
    Patrol,
    /// Drifts across the viewport while bobbing vertically
    Flying,
}

/// An enemy entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub color: u32,
    pub kind: EnemyKind,
    /// Horizontal speed (units/s)
    pub speed: f32,
    /// Patrol enemies turn around this far from `start_pos.x`
    pub patrol_distance: f32,
    pub start_pos: Vec2,
    pub facing: Facing,
    /// Health removed per tick of contact
    pub damage: f32,
}

/// Rewind state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RewindState {
    /// Forward simulation
    #[default]
    Idle,
    /// Consuming history and energy each tick
    Rewinding,
}

/// Complete simulation state, replaced wholesale each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Viewport width
    pub width: f32,
    /// Viewport height
    pub height: f32,
    pub player: Player,
    /// Ground first, goal last
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    /// Current level (1-based)
    pub level: u32,
    pub level_complete: bool,
    pub gravity: f32,
    /// Always within `[0, max_rewind_energy]`
    pub rewind_energy: f32,
    pub max_rewind_energy: f32,
    pub rewind_recharge_rate: f32,
    pub rewind: RewindState,
    pub time_history: TimeHistory,
    /// Simulated seconds since the level was generated
    pub elapsed: f32,
}

impl GameState {
    pub fn is_rewinding(&self) -> bool {
        self.rewind == RewindState::Rewinding
    }

    pub fn is_game_over(&self) -> bool {
        !self.player.is_alive()
    }

    pub fn can_rewind(&self) -> bool {
        self.rewind_energy > 0.0
    }

    /// The level's goal platform
    pub fn goal(&self) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.kind == PlatformKind::Goal)
    }

    /// Halt rewinding and drop whatever history is left
    pub fn stop_rewind(&mut self) {
        if self.is_rewinding() {
            log::debug!(
                "Rewind stopped with {} snapshots and {:.1} energy left",
                self.time_history.len(),
                self.rewind_energy
            );
        }
        self.rewind = RewindState::Idle;
        self.time_history.clear();
    }
}
