//! Session orchestration
//!
//! Holds the flags the pure simulation must not know about (started, paused),
//! gates player intents on them, and owns the seeded RNG used for level
//! generation. Intents are queued and applied at the start of the next tick.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::sim::{
    GameState, MAX_LEVEL, MoveIntent, TickInput, new_game_state, resize_state, tick,
};
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting on the start screen
    NotStarted,
    /// Ticking and accepting intents
    Playing,
    Paused,
    /// Goal reached; waiting for the next level
    LevelComplete,
    /// Health ran out
    GameOver,
}

/// A running game session
#[derive(Debug, Clone)]
pub struct Game {
    state: GameState,
    tuning: Tuning,
    rng: Pcg32,
    /// Intents waiting for the next tick
    input: TickInput,
    started: bool,
    paused: bool,
}

impl Game {
    /// Create a session on level 1 with the tuning's default viewport
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let (width, height) = (tuning.width, tuning.height);
        Self::with_viewport(tuning, seed, 1, width, height)
    }

    /// Create a session on `level` for a `width` x `height` viewport
    ///
    /// The level is clamped to `1..=MAX_LEVEL`.
    pub fn with_viewport(tuning: Tuning, seed: u64, level: u32, width: f32, height: f32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = new_game_state(&tuning, level, width, height, &mut rng);
        Self {
            state,
            tuning,
            rng,
            input: TickInput::default(),
            started: false,
            paused: false,
        }
    }

    /// Current authoritative state (read-only)
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Intents queued for the next tick
    pub fn pending_input(&self) -> &TickInput {
        &self.input
    }

    pub fn phase(&self) -> GamePhase {
        if !self.started {
            GamePhase::NotStarted
        } else if self.state.is_game_over() {
            GamePhase::GameOver
        } else if self.state.level_complete {
            GamePhase::LevelComplete
        } else if self.paused {
            GamePhase::Paused
        } else {
            GamePhase::Playing
        }
    }

    fn accepts_intents(&self) -> bool {
        self.phase() == GamePhase::Playing
    }

    pub fn start(&mut self) {
        if !self.started {
            log::info!("Game started on level {}", self.state.level);
        }
        self.started = true;
    }

    pub fn pause(&mut self) {
        if self.phase() == GamePhase::Playing {
            log::info!("Paused");
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            log::info!("Resumed");
            self.paused = false;
        }
    }

    /// Horizontal intent: -1 left, 0 stop, 1 right
    pub fn set_horizontal_intent(&mut self, axis: i32) {
        if self.accepts_intents() {
            self.input.movement = Some(MoveIntent::from_axis(axis));
        }
    }

    pub fn jump(&mut self) {
        if self.accepts_intents() {
            self.input.jump = true;
        }
    }

    pub fn start_rewind(&mut self) {
        if self.accepts_intents() && self.state.can_rewind() {
            self.input.start_rewind = true;
            self.input.stop_rewind = false;
        }
    }

    pub fn stop_rewind(&mut self) {
        if self.accepts_intents() {
            self.input.stop_rewind = true;
            self.input.start_rewind = false;
        }
    }

    /// Regenerate the current level for a new viewport (accepted in any phase)
    ///
    /// Dimensions must be positive; sanitizing them is the caller's job.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.state = resize_state(&self.state, &self.tuning, width, height, &mut self.rng);
        self.input = TickInput::default();
    }

    /// Run one frame if playing. Returns true if the simulation ticked.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.phase() != GamePhase::Playing {
            return false;
        }

        let input = std::mem::take(&mut self.input);
        self.state = tick(&self.state, &input, dt);

        match self.phase() {
            GamePhase::GameOver => log::info!("Game over on level {}", self.state.level),
            GamePhase::LevelComplete => log::info!("Level {} complete", self.state.level),
            _ => {}
        }
        true
    }

    /// Start `level` (clamped to `1..=MAX_LEVEL`) afresh at the current viewport size
    pub fn reset_level(&mut self, level: u32) {
        let level = level.clamp(1, MAX_LEVEL);
        self.state = new_game_state(
            &self.tuning,
            level,
            self.state.width,
            self.state.height,
            &mut self.rng,
        );
        self.input = TickInput::default();
        self.paused = false;
    }

    pub fn next_level(&mut self) {
        self.reset_level(self.state.level.saturating_add(1));
    }

    pub fn restart(&mut self) {
        log::info!("Restarting from level 1");
        self.reset_level(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::RewindState;

    const DT: f32 = 0.016;

    fn playing() -> Game {
        let mut game = Game::new(Tuning::default(), 77);
        game.start();
        game
    }

    #[test]
    fn test_new_game_waits_for_start() {
        let mut game = Game::new(Tuning::default(), 1);
        assert_eq!(game.phase(), GamePhase::NotStarted);
        assert_eq!(game.state().level, 1);
        assert_eq!(game.state().width, 800.0);

        game.jump();
        assert!(game.pending_input().is_empty());
        assert!(!game.advance(DT));
    }

    #[test]
    fn test_intents_apply_on_next_tick() {
        let mut game = playing();
        game.set_horizontal_intent(1);

        // Queued, not yet applied
        assert_eq!(game.state().player.vel.x, 0.0);

        assert!(game.advance(DT));
        assert!(game.state().player.vel.x > 0.0);
        assert!(game.pending_input().is_empty());
    }

    #[test]
    fn test_pause_blocks_ticks_and_intents() {
        let mut game = playing();
        game.pause();
        assert_eq!(game.phase(), GamePhase::Paused);

        let before = game.state().clone();
        game.set_horizontal_intent(-1);
        game.start_rewind();
        assert!(game.pending_input().is_empty());
        assert!(!game.advance(DT));
        assert_eq!(game.state(), &before);

        game.resume();
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(game.advance(DT));
    }

    #[test]
    fn test_resize_accepted_while_paused() {
        let mut game = playing();
        game.pause();
        game.resize(1024.0, 614.0);
        assert_eq!(game.state().width, 1024.0);
        assert_eq!(game.state().height, 614.0);
        assert_eq!(game.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_resize_keeps_level_complete_screen() {
        let mut game = playing();
        game.state.level_complete = true;

        game.resize(1024.0, 700.0);

        assert_eq!(game.phase(), GamePhase::LevelComplete);
        game.next_level();
        assert_eq!(game.state().level, 2);
        assert_eq!(game.state().width, 1024.0);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_with_viewport_builds_requested_level() {
        let game = Game::with_viewport(Tuning::default(), 9, 4, 1024.0, 700.0);
        assert_eq!(game.phase(), GamePhase::NotStarted);
        assert_eq!(game.state().level, 4);
        assert_eq!(game.state().width, 1024.0);
        assert_eq!(game.state().height, 700.0);

        let again = Game::with_viewport(Tuning::default(), 9, 4, 1024.0, 700.0);
        assert_eq!(game.state(), again.state());

        let default_size = Game::with_viewport(Tuning::default(), 9, 1, 800.0, 600.0);
        assert_eq!(Game::new(Tuning::default(), 9).state(), default_size.state());
    }

    #[test]
    fn test_level_numbers_are_capped() {
        let mut game = playing();
        game.reset_level(u32::MAX);
        assert_eq!(game.state().level, MAX_LEVEL);

        game.next_level();
        assert_eq!(game.state().level, MAX_LEVEL);

        game.state.level = u32::MAX;
        game.next_level();
        assert_eq!(game.state().level, MAX_LEVEL);

        game.reset_level(0);
        assert_eq!(game.state().level, 1);
    }

    #[test]
    fn test_rewind_round_trip() {
        let mut game = playing();
        game.state.enemies.clear();
        game.set_horizontal_intent(1);
        for _ in 0..30 {
            game.advance(DT);
        }
        let recorded = game.state().time_history.len();
        assert!(recorded > 0);

        game.start_rewind();
        game.advance(DT);
        assert_eq!(game.state().rewind, RewindState::Rewinding);
        assert!(game.state().time_history.len() < recorded);

        game.stop_rewind();
        game.advance(DT);
        assert_eq!(game.state().rewind, RewindState::Idle);
        assert!(game.state().time_history.is_empty());
    }

    #[test]
    fn test_game_over_freezes_session() {
        let mut game = playing();
        game.state.player.health = 0.0;
        assert_eq!(game.phase(), GamePhase::GameOver);

        game.jump();
        assert!(game.pending_input().is_empty());
        assert!(!game.advance(DT));

        game.restart();
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.state().player.health, 100.0);
    }

    #[test]
    fn test_level_complete_and_next_level() {
        let mut game = playing();
        game.state.level_complete = true;
        assert_eq!(game.phase(), GamePhase::LevelComplete);
        assert!(!game.advance(DT));

        game.next_level();
        assert_eq!(game.state().level, 2);
        assert!(!game.state().level_complete);
        assert!(game.state().time_history.is_empty());
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut a = playing();
        let mut b = playing();
        for frame in 0..120 {
            if frame % 40 == 0 {
                a.jump();
                b.jump();
            }
            a.set_horizontal_intent(1);
            b.set_horizontal_intent(1);
            a.advance(DT);
            b.advance(DT);
        }
        assert_eq!(a.state(), b.state());
    }
}
