//! Time rewind: bounded snapshot history and the per-tick rewind step

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::GameState;
use crate::consts::*;

/// Recorded player kinematics at one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSnapshot {
    pub player_pos: Vec2,
    pub player_vel: Vec2,
    /// Simulated seconds at capture
    pub timestamp: f32,
}

/// Maximum trail points handed to the renderer
pub const TRAIL_POINTS: usize = 10;
/// Alpha of the newest trail point
pub const TRAIL_MAX_ALPHA: f32 = 0.3;

/// Trail point for rewind rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub alpha: f32,
}

/// Fixed-capacity FIFO of snapshots (oldest at the front)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeHistory {
    snapshots: VecDeque<TimeSnapshot>,
    capacity: usize,
}

impl TimeHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Maximum snapshots kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Append a snapshot, evicting the oldest when full
    pub fn push(&mut self, snapshot: TimeSnapshot) {
        if self.capacity == 0 {
            return;
        }
        while self.snapshots.len() >= self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Remove and return the most recent snapshot
    pub fn pop_latest(&mut self) -> Option<TimeSnapshot> {
        self.snapshots.pop_back()
    }

    pub fn latest(&self) -> Option<&TimeSnapshot> {
        self.snapshots.back()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &TimeSnapshot> {
        self.snapshots.iter()
    }

    /// Up to `TRAIL_POINTS` evenly strided positions for the fading rewind
    /// trail, newest first
    pub fn trail(&self) -> Vec<TrailPoint> {
        let len = self.snapshots.len();
        if len == 0 {
            return Vec::new();
        }

        let step = (len / TRAIL_POINTS.min(len)).max(1);
        (0..len)
            .rev()
            .step_by(step)
            .take(TRAIL_POINTS)
            .map(|i| TrailPoint {
                pos: self.snapshots[i].player_pos,
                alpha: i as f32 / len as f32 * TRAIL_MAX_ALPHA,
            })
            .collect()
    }
}

/// Rewind speed multiplier for an energy level (more energy rewinds faster)
#[inline]
pub fn rewind_speed(energy: f32) -> f32 {
    (energy / REWIND_ENERGY_PER_SPEED).clamp(REWIND_MIN_SPEED, REWIND_MAX_SPEED)
}

/// One rewinding tick: consume snapshots and energy, move the player back
///
/// Falls back to `Idle` (dropping the remaining history) when history or
/// energy runs out.
pub fn rewind_step(state: &mut GameState, dt: f32) {
    if state.time_history.is_empty() || state.rewind_energy <= 0.0 {
        state.stop_rewind();
        return;
    }

    let speed = rewind_speed(state.rewind_energy);
    let count = speed.ceil() as usize;

    let mut target = None;
    for _ in 0..count {
        match state.time_history.pop_latest() {
            Some(snapshot) => target = Some(snapshot),
            None => break,
        }
    }

    let Some(target) = target else {
        state.stop_rewind();
        return;
    };

    let player = &mut state.player;
    player.pos = target.player_pos;
    player.vel = Vec2::ZERO;
    // Forces a fresh landing check once forward play resumes
    player.on_ground = false;

    let cost = REWIND_COST_PER_SECOND * dt * speed;
    state.rewind_energy = (state.rewind_energy - cost).max(0.0);

    if state.rewind_energy <= 0.0 {
        state.stop_rewind();
    }
}
