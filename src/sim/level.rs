//! Procedural level generation
//!
//! Platforms are placed one after another, each within jumping range of the
//! previous one and clear of everything already placed. Placement retries a
//! fixed number of times and silently drops a platform that never fits, so a
//! level may end up with fewer platforms than requested.

use glam::Vec2;
use rand::Rng;

use super::history::TimeHistory;
use super::state::{
    Enemy, EnemyKind, FLYING_COLOR, Facing, GameState, PATROL_COLOR, Platform, PlatformKind,
    Player, RewindState,
};
use crate::tuning::Tuning;

/// Highest rise a jump can reliably clear
pub const MAX_JUMP_HEIGHT: f32 = 180.0;
/// Widest gap a jump can reliably clear
pub const MAX_JUMP_DISTANCE: f32 = 200.0;
/// Random placements tried per platform before giving up on it
pub const PLACEMENT_ATTEMPTS: u32 = 20;
/// Margin kept between platforms and the left/right viewport edges
pub const EDGE_MARGIN: f32 = 40.0;
/// Enemies are square
pub const ENEMY_SIZE: f32 = 40.0;
/// Flying enemies hover this far above their platform
pub const FLYER_HOVER: f32 = 40.0;
/// Cap on flying enemies per level
pub const MAX_FLYING_ENEMIES: u32 = 2;
/// Player spawn offset from the start platform's left edge
pub const SPAWN_OFFSET_X: f32 = 20.0;
/// Highest level the generator builds; larger requests are clamped
pub const MAX_LEVEL: u32 = 999;

/// Enemy count for a level
pub fn enemy_count(level: u32) -> u32 {
    (2 + level / 2).min(8)
}

/// Number of leading intermediate platforms that are hazards
pub fn hazard_count(level: u32) -> u32 {
    (1 + level / 3).min(4)
}

/// Intermediate platforms requested (some may be skipped)
pub fn platform_count(level: u32) -> u32 {
    6 + level / 2
}

/// Flying enemies requested (the rest patrol)
pub fn flying_count(level: u32) -> u32 {
    (level / 3).min(MAX_FLYING_ENEMIES)
}

/// Platform dimensions scaled to the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformSizes {
    pub thickness: f32,
    pub small: f32,
    pub medium: f32,
    pub large: f32,
}

impl PlatformSizes {
    pub fn for_viewport(width: f32, height: f32) -> Self {
        Self {
            thickness: (height * 0.03).max(20.0),
            small: (width * 0.15).max(100.0),
            medium: (width * 0.25).max(180.0),
            large: (width * 0.35).max(260.0),
        }
    }

    /// 40% small, 40% medium, 20% large
    fn pick_width(&self, roll: f32) -> f32 {
        if roll < 0.4 {
            self.small
        } else if roll < 0.8 {
            self.medium
        } else {
            self.large
        }
    }
}

/// Everything a generated level replaces in the game state
#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayout {
    pub width: f32,
    pub height: f32,
    /// Ground, start, intermediates, then goal
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub player: Player,
    pub gravity: f32,
    pub max_rewind_energy: f32,
    pub rewind_recharge_rate: f32,
}

/// Generate a level layout for a `width` x `height` viewport
///
/// `width` and `height` must be positive.
pub fn generate<R: Rng + ?Sized>(
    tuning: &Tuning,
    level: u32,
    width: f32,
    height: f32,
    rng: &mut R,
) -> LevelLayout {
    let level = level.clamp(1, MAX_LEVEL);
    let sizes = PlatformSizes::for_viewport(width, height);
    let thickness = sizes.thickness;

    let mut platforms = Vec::with_capacity(platform_count(level) as usize + 3);

    // Full-width ground
    platforms.push(Platform::new(
        PlatformKind::Normal,
        Vec2::new(0.0, height - thickness),
        Vec2::new(width, thickness),
    ));

    // Starting ledge, lower left
    let start = Platform::new(
        PlatformKind::Normal,
        Vec2::new(EDGE_MARGIN, height - thickness * 6.0),
        Vec2::new(sizes.medium, thickness),
    );
    let spawn = Vec2::new(
        start.pos.x + SPAWN_OFFSET_X,
        start.pos.y - tuning.player_height,
    );
    platforms.push(start);

    // Goal rises with level, but the player must still fit standing on it
    let goal_ceiling = tuning.player_height + thickness;
    let goal_y = (height * 0.4)
        .min(height - thickness * (8.0 + level as f32))
        .max(goal_ceiling);
    let goal = Platform::new(
        PlatformKind::Goal,
        Vec2::new(width - sizes.small - EDGE_MARGIN, goal_y),
        Vec2::new(sizes.small, thickness),
    );

    let requested = platform_count(level);
    let hazards = hazard_count(level);
    let mut skipped = 0u32;

    for i in 0..requested {
        let platform_width = sizes.pick_width(rng.random::<f32>());
        match place_platform(&platforms, i, requested, platform_width, &sizes, width, height, rng)
        {
            Some(pos) => {
                let kind = if i < hazards {
                    PlatformKind::Hazard
                } else {
                    PlatformKind::Normal
                };
                platforms.push(Platform::new(
                    kind,
                    pos,
                    Vec2::new(platform_width, thickness),
                ));
            }
            None => {
                skipped += 1;
                log::debug!(
                    "Level {}: no room for platform {} after {} attempts",
                    level,
                    i,
                    PLACEMENT_ATTEMPTS
                );
            }
        }
    }

    platforms.push(goal);

    let enemies = spawn_enemies(&platforms, level, sizes.medium, rng);

    log::info!(
        "Level {}: {}x{} viewport, {} platforms ({} skipped), {} enemies",
        level,
        width,
        height,
        platforms.len(),
        skipped,
        enemies.len()
    );

    LevelLayout {
        width,
        height,
        platforms,
        enemies,
        player: Player::new(tuning, spawn),
        gravity: tuning.gravity_for_level(level),
        max_rewind_energy: tuning.max_energy_for_level(level),
        rewind_recharge_rate: tuning.recharge_rate_for_level(level),
    }
}

/// Try to find a reachable, uncluttered spot for intermediate platform `index`
#[allow(clippy::too_many_arguments)]
fn place_platform<R: Rng + ?Sized>(
    placed: &[Platform],
    index: u32,
    requested: u32,
    platform_width: f32,
    sizes: &PlatformSizes,
    width: f32,
    height: f32,
    rng: &mut R,
) -> Option<Vec2> {
    // Always placed relative to the most recent platform (never the goal)
    let reference = placed.last()?.pos;

    // Later platforms drift lower through three vertical bands
    let zone = (index as f32 / (requested as f32 / 3.0)).floor();
    let min_y = height * 0.2 + zone * height * 0.2;
    let max_y = height * 0.8 - (2.0 - zone) * height * 0.2;

    let min_jump_y = reference.y - MAX_JUMP_HEIGHT;
    let max_jump_y = reference.y + MAX_JUMP_HEIGHT / 2.0;
    let min_jump_x = MAX_JUMP_DISTANCE * 0.4;
    let max_jump_x = MAX_JUMP_DISTANCE * 0.8;

    for _ in 0..PLACEMENT_ATTEMPTS {
        let y = (min_jump_y + rng.random::<f32>() * (max_jump_y - min_jump_y))
            .min(max_y)
            .max(min_y);
        let x = (reference.x + min_jump_x + rng.random::<f32>() * (max_jump_x - min_jump_x))
            .min(width - platform_width - EDGE_MARGIN)
            .max(EDGE_MARGIN);

        let crowded = placed.iter().any(|p| {
            (x - p.pos.x).abs() < platform_width * 1.2
                && (y - p.pos.y).abs() < sizes.thickness * 4.0
        });
        if crowded {
            continue;
        }

        let reachable = (x - reference.x).abs() <= MAX_JUMP_DISTANCE
            && (y - reference.y).abs() <= MAX_JUMP_HEIGHT;
        if reachable {
            return Some(Vec2::new(x, y));
        }
    }

    None
}

/// Put enemies on distinct wide-enough normal platforms
fn spawn_enemies<R: Rng + ?Sized>(
    platforms: &[Platform],
    level: u32,
    min_host_width: f32,
    rng: &mut R,
) -> Vec<Enemy> {
    let mut hosts: Vec<&Platform> = platforms
        .iter()
        .filter(|p| p.kind == PlatformKind::Normal && p.size.x >= min_host_width)
        .collect();

    let flyers = flying_count(level);
    let level_f = level as f32;
    let mut enemies = Vec::new();

    for i in 0..enemy_count(level) {
        if hosts.is_empty() {
            break;
        }
        let host = hosts.remove(rng.random_range(0..hosts.len()));
        let center_x = host.pos.x + host.size.x / 2.0 - ENEMY_SIZE / 2.0;

        let enemy = if i < flyers {
            let pos = Vec2::new(center_x, host.pos.y - ENEMY_SIZE - FLYER_HOVER);
            let facing = if rng.random::<f32>() > 0.5 {
                Facing::Right
            } else {
                Facing::Left
            };
            Enemy {
                pos,
                vel: Vec2::ZERO,
                size: Vec2::splat(ENEMY_SIZE),
                color: FLYING_COLOR,
                kind: EnemyKind::Flying,
                speed: 80.0 + level_f * 8.0,
                patrol_distance: host.size.x + 80.0,
                start_pos: pos,
                facing,
                damage: 10.0 + level_f,
            }
        } else {
            let surface_y = host.pos.y - ENEMY_SIZE;
            Enemy {
                pos: Vec2::new(center_x, surface_y),
                vel: Vec2::ZERO,
                size: Vec2::splat(ENEMY_SIZE),
                color: PATROL_COLOR,
                kind: EnemyKind::Patrol,
                speed: 60.0 + level_f * 5.0,
                patrol_distance: host.size.x * 0.7,
                start_pos: Vec2::new(host.pos.x, surface_y),
                facing: Facing::Right,
                damage: 10.0,
            }
        };
        enemies.push(enemy);
    }

    enemies
}

impl GameState {
    /// Fresh state for `level` from a generated layout
    pub fn from_layout(tuning: &Tuning, level: u32, layout: LevelLayout) -> Self {
        Self {
            width: layout.width,
            height: layout.height,
            player: layout.player,
            platforms: layout.platforms,
            enemies: layout.enemies,
            level,
            level_complete: false,
            gravity: layout.gravity,
            rewind_energy: tuning.rewind_energy.min(layout.max_rewind_energy),
            max_rewind_energy: layout.max_rewind_energy,
            rewind_recharge_rate: layout.rewind_recharge_rate,
            rewind: RewindState::Idle,
            time_history: TimeHistory::new(tuning.max_history_length),
            elapsed: 0.0,
        }
    }
}

/// Generate `level` (clamped to `1..=MAX_LEVEL`) and wrap it in a fresh game state
pub fn new_game_state<R: Rng + ?Sized>(
    tuning: &Tuning,
    level: u32,
    width: f32,
    height: f32,
    rng: &mut R,
) -> GameState {
    let level = level.clamp(1, MAX_LEVEL);
    let layout = generate(tuning, level, width, height, rng);
    GameState::from_layout(tuning, level, layout)
}

/// Regenerate the current level for a new viewport, keeping its energy and
/// completion
pub fn resize_state<R: Rng + ?Sized>(
    state: &GameState,
    tuning: &Tuning,
    width: f32,
    height: f32,
    rng: &mut R,
) -> GameState {
    let mut next = new_game_state(tuning, state.level, width, height, rng);
    next.rewind_energy = state.rewind_energy.clamp(0.0, next.max_rewind_energy);
    // A finished level stays finished until the session moves on
    next.level_complete = state.level_complete;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn layout(seed: u64, level: u32, width: f32, height: f32) -> LevelLayout {
        let mut rng = Pcg32::seed_from_u64(seed);
        generate(&Tuning::default(), level, width, height, &mut rng)
    }

    /// Structural checks every generated layout must pass
    fn check_layout(layout: &LevelLayout, level: u32) {
        let sizes = PlatformSizes::for_viewport(layout.width, layout.height);
        let platforms = &layout.platforms;

        let goals: Vec<_> = platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::Goal)
            .collect();
        assert_eq!(goals.len(), 1);
        assert_eq!(platforms.last().unwrap().kind, PlatformKind::Goal);

        let ground = &platforms[0];
        assert_eq!(ground.pos, Vec2::new(0.0, layout.height - sizes.thickness));
        assert_eq!(ground.size.x, layout.width);

        // Player stands on the start platform
        let start = &platforms[1];
        let player = &layout.player;
        assert!((player.pos.y + player.size.y - start.pos.y).abs() < 1e-3);
        assert!(player.pos.x >= start.pos.x);
        assert!(player.pos.x + player.size.x <= start.pos.x + start.size.x);

        let intermediates = &platforms[2..platforms.len() - 1];
        assert!(intermediates.len() as u32 <= platform_count(level));

        for (offset, platform) in intermediates.iter().enumerate() {
            let index = offset + 2;
            let previous = &platforms[index - 1];
            assert!((platform.pos.x - previous.pos.x).abs() <= MAX_JUMP_DISTANCE);
            assert!((platform.pos.y - previous.pos.y).abs() <= MAX_JUMP_HEIGHT);

            for earlier in &platforms[..index] {
                let crowded = (platform.pos.x - earlier.pos.x).abs() < platform.size.x * 1.2
                    && (platform.pos.y - earlier.pos.y).abs() < sizes.thickness * 4.0;
                assert!(!crowded, "platform {index} crowds an earlier platform");
            }
        }

        let hazards = platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::Hazard)
            .count() as u32;
        assert!(hazards <= hazard_count(level));

        let hosts = platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::Normal && p.size.x >= sizes.medium)
            .count() as u32;
        assert!(layout.enemies.len() as u32 <= enemy_count(level).min(hosts));

        let flyers = layout
            .enemies
            .iter()
            .filter(|e| e.kind == EnemyKind::Flying)
            .count() as u32;
        assert!(flyers <= flying_count(level));

        // Goal inside the viewport with room for the player on top
        let goal = &platforms[platforms.len() - 1];
        assert!(goal.pos.y >= player.size.y, "goal too high: {}", goal.pos.y);
        assert!(goal.pos.y + goal.size.y <= layout.height);

        let mut used_hosts = Vec::new();
        for enemy in &layout.enemies {
            let host = platforms
                .iter()
                .position(|p| {
                    let hover = match enemy.kind {
                        EnemyKind::Patrol => ENEMY_SIZE,
                        EnemyKind::Flying => ENEMY_SIZE + FLYER_HOVER,
                    };
                    p.kind == PlatformKind::Normal
                        && p.size.x >= sizes.medium
                        && (enemy.pos.x - (p.pos.x + p.size.x / 2.0 - ENEMY_SIZE / 2.0)).abs()
                            < 1e-3
                        && (enemy.pos.y - (p.pos.y - hover)).abs() < 1e-3
                })
                .unwrap_or_else(|| panic!("{:?} enemy has no host platform", enemy.kind));

            assert!(!used_hosts.contains(&host), "platform {host} hosts two enemies");
            used_hosts.push(host);

            let host = &platforms[host];
            match enemy.kind {
                EnemyKind::Patrol => {
                    assert!((enemy.start_pos.x - host.pos.x).abs() < 1e-3);
                    assert!((enemy.start_pos.y - enemy.pos.y).abs() < 1e-3);
                    assert!((enemy.patrol_distance - host.size.x * 0.7).abs() < 1e-3);
                }
                EnemyKind::Flying => {
                    assert_eq!(enemy.start_pos, enemy.pos);
                }
            }
        }
    }

    #[test]
    fn test_level_one_scenario() {
        let layout = layout(42, 1, 800.0, 600.0);
        check_layout(&layout, 1);
        assert!(layout.platforms.len() >= 3);
        assert!(layout.enemies.len() <= 2);
        assert!(layout.enemies.iter().all(|e| e.kind == EnemyKind::Patrol));
    }

    #[test]
    fn test_level_scaling() {
        assert_eq!(enemy_count(1), 2);
        assert_eq!(enemy_count(20), 8);
        assert_eq!(hazard_count(2), 1);
        assert_eq!(hazard_count(30), 4);
        assert_eq!(platform_count(5), 8);
        assert_eq!(flying_count(3), 1);
        assert_eq!(flying_count(12), 2);

        let easy = layout(1, 1, 800.0, 600.0);
        let hard = layout(1, 6, 800.0, 600.0);
        assert!(hard.gravity > easy.gravity);
        assert!(hard.max_rewind_energy > easy.max_rewind_energy);
        assert!(hard.rewind_recharge_rate > easy.rewind_recharge_rate);
    }

    #[test]
    fn test_goal_rises_with_level() {
        let low = layout(9, 1, 800.0, 600.0);
        let high = layout(9, 14, 800.0, 600.0);
        let goal_y = |l: &LevelLayout| l.platforms.last().unwrap().pos.y;
        assert_eq!(goal_y(&low), 240.0);
        assert!(goal_y(&high) < goal_y(&low));
    }

    #[test]
    fn test_goal_stays_reachable_on_late_levels() {
        let tuning = Tuning::default();
        for level in [26, 30, 60, MAX_LEVEL] {
            let layout = layout(3, level, 800.0, 600.0);
            let goal = layout.platforms.last().unwrap();
            // Clamped to the player height plus one platform thickness
            assert_eq!(goal.pos.y, tuning.player_height + 20.0);
            check_layout(&layout, level);
        }
    }

    #[test]
    fn test_level_is_clamped() {
        let mut rng = Pcg32::seed_from_u64(11);
        let state = new_game_state(&Tuning::default(), u32::MAX, 800.0, 600.0, &mut rng);
        assert_eq!(state.level, MAX_LEVEL);

        let mut rng = Pcg32::seed_from_u64(11);
        let state = new_game_state(&Tuning::default(), 0, 800.0, 600.0, &mut rng);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_same_seed_same_layout() {
        assert_eq!(layout(1234, 4, 1024.0, 600.0), layout(1234, 4, 1024.0, 600.0));
    }

    #[test]
    fn test_new_game_state_resets_rewind() {
        let mut rng = Pcg32::seed_from_u64(5);
        let state = new_game_state(&Tuning::default(), 2, 800.0, 600.0, &mut rng);
        assert_eq!(state.level, 2);
        assert!(state.time_history.is_empty());
        assert_eq!(state.time_history.capacity(), 120);
        assert_eq!(state.rewind, RewindState::Idle);
        assert_eq!(state.rewind_energy, 100.0);
        assert_eq!(state.max_rewind_energy, 110.0);
        assert!(!state.level_complete);
    }

    #[test]
    fn test_resize_keeps_level_and_energy() {
        let mut rng = Pcg32::seed_from_u64(5);
        let tuning = Tuning::default();
        let mut state = new_game_state(&tuning, 3, 800.0, 600.0, &mut rng);
        state.rewind_energy = 42.0;
        state.player.health = 30.0;

        let resized = resize_state(&state, &tuning, 1024.0, 600.0, &mut rng);

        assert_eq!(resized.level, 3);
        assert_eq!(resized.width, 1024.0);
        assert_eq!(resized.rewind_energy, 42.0);
        assert_eq!(resized.player.health, 100.0);
        assert_eq!(resized.platforms[0].size.x, 1024.0);
        assert!(!resized.level_complete);
    }

    #[test]
    fn test_resize_keeps_level_complete() {
        let mut rng = Pcg32::seed_from_u64(8);
        let tuning = Tuning::default();
        let mut state = new_game_state(&tuning, 2, 800.0, 600.0, &mut rng);
        state.level_complete = true;

        let resized = resize_state(&state, &tuning, 1024.0, 700.0, &mut rng);

        assert!(resized.level_complete);
        assert_eq!(resized.height, 700.0);
    }

    proptest! {
        #[test]
        fn generated_layouts_are_valid(
            seed in any::<u64>(),
            level in 1u32..40,
            width in 320.0f32..1600.0,
            height in 240.0f32..1000.0,
        ) {
            let layout = layout(seed, level, width, height);
            check_layout(&layout, level);
        }
    }
}
