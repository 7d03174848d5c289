//! Ladder Rush headless runner
//!
//! Loads a run config (JSON row files, or the built-in sample), plays one
//! run at a fixed timestep with a simple autopilot and prints the result.
//!
//! Usage: `ladder-rush [player.json item.json] [seed]`

use std::process::ExitCode;

use ladder_rush::config::{self, Effect, LoadedConfig};
use ladder_rush::consts::*;
use ladder_rush::sim::{GameEvent, GameState, RunSummary, TickInput, tick};
use ladder_rush::{HighScores, Leaderboard};

const SAMPLE_PLAYER: &str = r#"[{"HP":3,"SizeX":200,"SizeY":300,"StartTimeSeconds":300,
    "OnHitStunSeconds":0.5,"OnHitInvincibleSeconds":1.0,"SecPerScreen":3,
    "Area1Sec":60,"Area2Sec":120,"Area3Sec":200,"goalSec":240}]"#;

const SAMPLE_ITEMS: &str = r#"[
    {"Id":1,"Name":"pebble","Effect":0,"Value":1,"Speed":1.0,"Area":0,"Weight":6,"SizeX":96,"SizeY":96,"Move":0},
    {"Id":2,"Name":"coin","Effect":3,"Value":100,"Speed":1.0,"Area":0,"Weight":10,"SizeX":80,"SizeY":80,"Move":0},
    {"Id":3,"Name":"bird","Effect":0,"Value":1,"Speed":1.2,"Area":1,"Weight":6,"SizeX":160,"SizeY":96,"Move":4},
    {"Id":4,"Name":"heart","Effect":1,"Value":1,"Speed":0.8,"Area":1,"Weight":2,"SizeX":80,"SizeY":80,"Move":3},
    {"Id":5,"Name":"satellite","Effect":0,"Value":1,"Speed":1.0,"Area":2,"Weight":6,"SizeX":600,"SizeY":200,"Move":0},
    {"Id":6,"Name":"star","Effect":2,"Value":3,"Speed":1.4,"Area":2,"Weight":2,"SizeX":80,"SizeY":80,"Move":3},
    {"Id":7,"Name":"gem","Effect":3,"Value":500,"Speed":1.5,"Area":3,"Weight":5,"SizeX":80,"SizeY":80,"Move":3},
    {"Id":8,"Name":"junk","Effect":3,"Value":-200,"Speed":1.0,"Area":3,"Weight":3,"SizeX":120,"SizeY":120,"Move":0}
]"#;

/// Safety cap on simulated time (s) in case the autopilot never clears
const MAX_RUN_SECONDS: f64 = 900.0;

fn load(args: &[String]) -> Result<LoadedConfig, Box<dyn std::error::Error>> {
    if args.len() >= 2 {
        let player = std::fs::read_to_string(&args[0])?;
        let items = std::fs::read_to_string(&args[1])?;
        Ok(config::load_json(&player, &items)?)
    } else {
        Ok(config::load_json(SAMPLE_PLAYER, SAMPLE_ITEMS)?)
    }
}

/// Hold climb unless a hazard is bearing down on our lane, in which case
/// sidestep toward the nearest clear lane.
fn autopilot(state: &GameState, prev: &TickInput) -> TickInput {
    let player = &state.player;
    let threatened = |lane: usize| {
        let x = ladder_rush::lane_x(lane);
        state.items.iter().any(|item| {
            item.def.effect == Effect::Damage
                && (item.pos.x - x).abs() < (item.def.size_x + player.size.x) * 0.5
                && item.pos.y < player.pos.y
                && player.pos.y - item.pos.y < 700.0
        })
    };

    let mut input = TickInput::default();
    if threatened(player.lane) {
        let left = player.lane.checked_sub(1).filter(|&l| !threatened(l));
        let right = Some(player.lane + 1).filter(|&l| l < LANE_COUNT && !threatened(l));
        // Steps are edge-triggered: leave a gap frame between presses
        let can_press = !prev.left_step && !prev.right_step;
        match (left, right) {
            (Some(_), _) if can_press => input.left_step = true,
            (None, Some(_)) if can_press => input.right_step = true,
            _ => {}
        }
    } else {
        input.scroll_held = true;
    }
    input
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (paths, seed_arg) = if args.len() >= 2 {
        (&args[..2], args.get(2))
    } else {
        (&args[..0], args.first())
    };
    let seed = seed_arg.and_then(|s| s.parse().ok()).unwrap_or(0x5eed);

    let loaded = match load(paths) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Config load failed: {}", e);
            eprintln!("config load failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    for warning in &loaded.warnings {
        eprintln!("warning: {warning}");
    }

    let mut state = GameState::new(&loaded, seed);
    state.start(0.0);

    let mut input = TickInput::default();
    let mut now = 0.0f64;
    let transition = loop {
        input = autopilot(&state, &input);
        now += SIM_DT as f64;
        let result = tick(&mut state, &input, now, SIM_DT);
        for event in state.drain_events() {
            match event {
                GameEvent::AreaChanged { area } => println!("[{now:7.2}s] area {area}"),
                GameEvent::HpChanged { hp } => log::debug!("hp {}", hp),
                GameEvent::RunCleared { bonus } => println!("[{now:7.2}s] cleared, bonus {bonus}"),
                GameEvent::RunFailed => println!("[{now:7.2}s] game over"),
                _ => {}
            }
        }
        if let Some(transition) = result {
            break Some(transition);
        }
        if now > MAX_RUN_SECONDS {
            break None;
        }
    };

    let Some(transition) = transition else {
        println!("run did not finish within {MAX_RUN_SECONDS}s of simulated time");
        return ExitCode::FAILURE;
    };

    let mut board = HighScores::new();
    let mut summary = RunSummary::new(transition, &board);
    println!(
        "{} with score {} (hp {}, {:.1}s played)",
        if summary.cleared { "CLEAR" } else { "GAME OVER" },
        summary.score,
        state.player.hp,
        state.game_seconds
    );
    if board.is_qualifying(summary.score) {
        match summary.submit("PILOT", seed as i64, &mut board) {
            Ok(rank) => println!("leaderboard rank: {rank:?}"),
            Err(e) => eprintln!("leaderboard: {e}"),
        }
    }
    for (rank, entry) in board.ranked() {
        println!("{rank:>2}. {:<10} {:>8}", entry.name, entry.score);
    }

    ExitCode::SUCCESS
}
