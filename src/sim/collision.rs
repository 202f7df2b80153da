//! Collision detection and response for axis-aligned boxes
//!
//! Every check is widened or shrunk by a small forgiveness buffer so landings
//! and hits favor the player over pixel-exact overlap.

use super::state::{Enemy, Entity, GameState, Platform, PlatformKind, Player};
use crate::consts::*;

/// True if the boxes intersect after shrinking both by the collision buffer
pub fn overlaps(a: &impl Entity, b: &impl Entity) -> bool {
    a.left() + COLLISION_BUFFER < b.right()
        && a.right() - COLLISION_BUFFER > b.left()
        && a.top() + COLLISION_BUFFER < b.bottom()
        && a.bottom() - COLLISION_BUFFER > b.top()
}

/// How the player touched a platform this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformContact {
    /// Fell onto the top surface
    Landed,
    /// Rose into the underside
    HeadBump,
    /// Pushed out horizontally
    Side,
}

/// Resolve the player against one platform, returning the contact kind if any
pub fn resolve_platform(player: &mut Player, platform: &Platform) -> Option<PlatformContact> {
    if !overlaps(player, platform) {
        return None;
    }

    let vy = player.vel.y;
    let lookback = vy * EDGE_LOOKBACK;

    if vy > 0.0
        && player.bottom() >= platform.top() - COLLISION_BUFFER
        && player.bottom() - lookback <= platform.top() + COLLISION_BUFFER
    {
        player.pos.y = platform.top() - player.size.y;
        player.vel.y = 0.0;
        player.is_jumping = false;
        player.on_ground = true;

        // Every tick of contact hurts, not just the first
        if platform.kind == PlatformKind::Hazard {
            player.health -= HAZARD_DAMAGE;
        }
        return Some(PlatformContact::Landed);
    }

    if vy < 0.0
        && player.top() <= platform.bottom()
        && player.top() - lookback >= platform.bottom()
    {
        player.pos.y = platform.bottom();
        player.vel.y = 0.0;
        return Some(PlatformContact::HeadBump);
    }

    if player.right() >= platform.left() && player.left() < platform.left() {
        player.pos.x = platform.left() - player.size.x;
        player.vel.x *= SIDE_BOUNCE_DAMPING;
        Some(PlatformContact::Side)
    } else if player.left() <= platform.right() && player.right() > platform.right() {
        player.pos.x = platform.right();
        player.vel.x *= SIDE_BOUNCE_DAMPING;
        Some(PlatformContact::Side)
    } else {
        None
    }
}

/// Resolve the player against every platform in list order
///
/// Later platforms may overwrite corrections from earlier ones. Grounded state
/// is cleared when nothing was landed on.
pub fn resolve_platforms(player: &mut Player, platforms: &[Platform]) {
    let mut landed = false;
    for platform in platforms {
        if resolve_platform(player, platform) == Some(PlatformContact::Landed) {
            landed = true;
        }
    }

    if !landed {
        player.on_ground = false;
    }
}

/// Apply damage and knockback for every overlapping enemy
pub fn resolve_enemies(player: &mut Player, enemies: &[Enemy]) {
    for enemy in enemies {
        if overlaps(player, enemy) {
            player.health -= enemy.damage;

            let away = if player.pos.x < enemy.pos.x { -1.0 } else { 1.0 };
            player.vel.x = away * KNOCKBACK_X;
            player.vel.y = KNOCKBACK_Y;
        }
    }
}

/// Resolve all player collisions in place
pub fn resolve_collisions(state: &mut GameState) {
    resolve_platforms(&mut state.player, &state.platforms);
    resolve_enemies(&mut state.player, &state.enemies);
}

/// True if the player is standing (within tolerance) on the goal platform
pub fn reached_goal(player: &Player, goal: &Platform) -> bool {
    player.right() >= goal.left() - COLLISION_BUFFER
        && player.left() <= goal.right() + COLLISION_BUFFER
        && (player.bottom() - goal.top()).abs() < GOAL_VERTICAL_TOLERANCE
}

/// Level completion for a state (false when there is no goal)
pub fn level_complete(state: &GameState) -> bool {
    state
        .goal()
        .is_some_and(|goal| reached_goal(&state.player, goal))
}
