//! Per-frame simulation step
//!
//! `advance` is a pure function from the previous state and an elapsed time to
//! the next state. `tick` first applies the frame's intents, then advances.

use glam::Vec2;

use super::collision::{level_complete, resolve_collisions};
use super::history::{TimeSnapshot, rewind_step};
use super::state::{EnemyKind, Facing, GameState, RewindState};
use crate::clamp_to_viewport;
use crate::consts::*;

/// Requested horizontal movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveIntent {
    Left,
    Stop,
    Right,
}

impl MoveIntent {
    /// From an axis value (-1, 0, 1); any other sign picks the nearest direction
    pub fn from_axis(axis: i32) -> Self {
        match axis.signum() {
            -1 => MoveIntent::Left,
            1 => MoveIntent::Right,
            _ => MoveIntent::Stop,
        }
    }

    fn facing(self) -> Option<Facing> {
        match self {
            MoveIntent::Left => Some(Facing::Left),
            MoveIntent::Right => Some(Facing::Right),
            MoveIntent::Stop => None,
        }
    }
}

/// Intents collected since the last tick, applied atomically at its start
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// New horizontal intent (None keeps the current velocity)
    pub movement: Option<MoveIntent>,
    pub jump: bool,
    pub start_rewind: bool,
    pub stop_rewind: bool,
}

impl TickInput {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply one frame's intents to a state
pub fn apply_input(state: &mut GameState, input: &TickInput) {
    if let Some(movement) = input.movement {
        let player = &mut state.player;
        match movement.facing() {
            Some(facing) => {
                player.vel.x = facing.sign() * player.speed;
                player.facing = facing;
            }
            None => player.vel.x = 0.0,
        }
    }

    if input.jump {
        let player = &mut state.player;
        if player.on_ground || player.can_double_jump {
            // Leaving the ground grants the air jump; using the air jump spends it
            player.can_double_jump = player.on_ground;
            player.vel.y = -player.jump_force;
            player.is_jumping = true;
            player.on_ground = false;
        }
    }

    if input.start_rewind && state.can_rewind() && !state.is_rewinding() {
        log::debug!(
            "Rewind started: {} snapshots, {:.1} energy",
            state.time_history.len(),
            state.rewind_energy
        );
        state.rewind = RewindState::Rewinding;
    }

    if input.stop_rewind {
        state.stop_rewind();
    }
}

/// Advance the simulation by `dt` seconds (capped), returning the next state
pub fn advance(state: &GameState, dt: f32) -> GameState {
    let mut next = state.clone();
    step(&mut next, dt);
    next
}

/// Apply intents, then advance by `dt`
pub fn tick(state: &GameState, input: &TickInput, dt: f32) -> GameState {
    let mut next = state.clone();
    apply_input(&mut next, input);
    step(&mut next, dt);
    next
}

/// In-place body of `advance`
fn step(state: &mut GameState, dt: f32) {
    let dt = dt.clamp(0.0, MAX_DT);

    if state.is_rewinding() {
        rewind_step(state, dt);
        return;
    }

    // Record where the player was before this tick moves it
    if state.player.is_moving() {
        state.time_history.push(TimeSnapshot {
            player_pos: state.player.pos,
            player_vel: state.player.vel,
            timestamp: state.elapsed,
        });
    }

    state.elapsed += dt;

    integrate_player(state, dt);
    update_enemies(state, dt);
    resolve_collisions(state);

    // Side pushes can land outside the viewport near its edges
    let player = &mut state.player;
    player.pos = clamp_to_viewport(player.pos, player.size, state.width, state.height);

    state.level_complete = level_complete(state);
    state.rewind_energy =
        (state.rewind_energy + state.rewind_recharge_rate * dt).min(state.max_rewind_energy);
}

/// Gravity, air control and viewport clamping for the player
fn integrate_player(state: &mut GameState, dt: f32) {
    let gravity = state.gravity;
    let (width, height) = (state.width, state.height);
    let player = &mut state.player;

    let resistance = if player.on_ground {
        GROUND_RESISTANCE
    } else {
        AIR_RESISTANCE
    };
    let vel_x = player.vel.x * resistance;
    let vel_y = if player.on_ground {
        0.0
    } else {
        (player.vel.y + gravity * dt).min(TERMINAL_VELOCITY)
    };

    player.vel = Vec2::new(vel_x, vel_y);
    player.pos = clamp_to_viewport(player.pos + player.vel * dt, player.size, width, height);

    // Moving upward leaves the ground
    player.on_ground = player.on_ground && vel_y >= 0.0;
    if player.on_ground {
        player.can_double_jump = true;
    }
}

/// Move every enemy along its pattern
fn update_enemies(state: &mut GameState, dt: f32) {
    let width = state.width;
    let bob = (state.elapsed * FLYER_BOB_FREQUENCY).sin() * FLYER_BOB_AMPLITUDE;

    for enemy in &mut state.enemies {
        match enemy.kind {
            EnemyKind::Patrol => {
                if (enemy.pos.x - enemy.start_pos.x).abs() >= enemy.patrol_distance {
                    enemy.facing = enemy.facing.flipped();
                }
                enemy.pos.x += enemy.speed * enemy.facing.sign() * dt;
            }
            EnemyKind::Flying => {
                let at_edge = (enemy.pos.x <= 0.0 && enemy.facing == Facing::Left)
                    || (enemy.pos.x + enemy.size.x >= width && enemy.facing == Facing::Right);

                enemy.pos.x += enemy.speed * enemy.facing.sign() * dt;
                enemy.pos.y = enemy.start_pos.y + bob;

                if at_edge {
                    enemy.facing = enemy.facing.flipped();
                }
            }
        }
    }
}
