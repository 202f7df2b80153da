//! Rewind Runner entry point
//!
//! Headless native runner: plays the simulation with a simple autopilot and
//! prints a JSON summary. Rendering and device input live outside this crate.

use anyhow::{Context, Result, ensure};
use clap::Parser;
use serde::Serialize;

use rewind_runner::sim::{Entity, GameState, MAX_LEVEL};
use rewind_runner::{Game, GamePhase, Tuning};

/// Frame time of the driving loop (60 Hz; each tick is capped further by the engine)
const FRAME_DT: f32 = 1.0 / 60.0;
/// Frames a rewind is held after taking damage
const REWIND_HOLD_FRAMES: u32 = 15;

#[derive(Debug, Parser)]
#[command(name = "rewind-runner", about = "Run the platformer simulation headless")]
struct Args {
    /// Seed for level generation
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Level to start on
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Frames to simulate
    #[arg(long, default_value_t = 3600)]
    frames: u32,
    /// Viewport width (defaults to the tuning value)
    #[arg(long)]
    width: Option<f32>,
    /// Viewport height (defaults to the tuning value)
    #[arg(long)]
    height: Option<f32>,
    /// JSON tuning file
    #[arg(long)]
    tuning: Option<std::path::PathBuf>,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    frames: u32,
    start_level: u32,
    final_level: u32,
    levels_completed: u32,
    final_health: f32,
    rewinds: u32,
    game_over: bool,
}

/// Steers toward the goal, hops periodically and rewinds after getting hurt
#[derive(Debug, Default)]
struct Autopilot {
    last_health: f32,
    rewind_frames: u32,
    rewinds: u32,
}

impl Autopilot {
    fn drive(&mut self, game: &mut Game, frame: u32) {
        let state = game.state();

        if self.rewind_frames > 0 {
            self.rewind_frames -= 1;
            let rewinding = state.is_rewinding();
            self.last_health = state.player.health;
            if self.rewind_frames == 0 || !rewinding {
                game.stop_rewind();
                self.rewind_frames = 0;
            }
            return;
        }

        let hurt = state.player.health < self.last_health;
        self.last_health = state.player.health;
        let can_recover = state.rewind_energy > 30.0 && !state.time_history.is_empty();
        if hurt && can_recover {
            log::debug!("Frame {}: hurt, rewinding", frame);
            game.start_rewind();
            self.rewind_frames = REWIND_HOLD_FRAMES;
            self.rewinds += 1;
            return;
        }

        let axis = goal_direction(state);
        let stalled = state.player.vel.x.abs() < 30.0;
        let wants_jump = state.player.on_ground && (stalled || frame % 45 == 0);

        game.set_horizontal_intent(axis);
        if wants_jump {
            game.jump();
        }
    }
}

/// -1, 0 or 1 toward the goal platform's center
fn goal_direction(state: &GameState) -> i32 {
    let Some(goal) = state.goal() else {
        return 0;
    };
    let player_center = state.player.left() + state.player.size.x / 2.0;
    let goal_center = goal.left() + goal.size.x / 2.0;
    if (goal_center - player_center).abs() < 5.0 {
        0
    } else if goal_center > player_center {
        1
    } else {
        -1
    }
}

fn run(args: &Args) -> Result<RunSummary> {
    ensure!(args.frames > 0, "frames must be > 0");
    ensure!(
        (1..=MAX_LEVEL).contains(&args.level),
        "level must be between 1 and {MAX_LEVEL}"
    );

    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };

    let width = args.width.unwrap_or(tuning.width);
    let height = args.height.unwrap_or(tuning.height);
    ensure!(
        width > 0.0 && height > 0.0,
        "viewport must be positive, got {width}x{height}"
    );

    let mut game = Game::with_viewport(tuning, args.seed, args.level, width, height);
    game.start();

    let mut pilot = Autopilot {
        last_health: game.state().player.health,
        ..Default::default()
    };
    let mut levels_completed = 0;
    let mut frames = 0;

    for frame in 0..args.frames {
        frames = frame + 1;
        match game.phase() {
            GamePhase::GameOver => break,
            GamePhase::LevelComplete => {
                levels_completed += 1;
                game.next_level();
                pilot.last_health = game.state().player.health;
                continue;
            }
            _ => {}
        }

        pilot.drive(&mut game, frame);
        game.advance(FRAME_DT);
    }

    let state = game.state();
    Ok(RunSummary {
        seed: args.seed,
        frames,
        start_level: args.level,
        final_level: state.level,
        levels_completed,
        final_health: state.player.health,
        rewinds: pilot.rewinds,
        game_over: state.is_game_over(),
    })
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Rewind Runner (headless) starting...");

    let args = Args::parse();
    let summary = run(&args)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
