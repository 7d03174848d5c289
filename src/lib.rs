//! Ladder Rush - A four-lane climbing runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, items, spawning, collisions, run state)
//! - `config`: Run parameters and item catalog loading with diagnostics
//! - `highscores`: Top-10 leaderboard collaborator

pub mod config;
pub mod highscores;
pub mod sim;

pub use config::{ConfigError, ConfigWarning, ItemDef, LoadedConfig, RunConfig};
pub use highscores::{HighScores, Leaderboard};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Logical playfield size in pixels (portrait)
    pub const SCREEN_WIDTH: f32 = 1080.0;
    pub const SCREEN_HEIGHT: f32 = 1920.0;
    /// Bottom 20% of the screen is reserved for the control strip
    pub const BOTTOM_UI_RATIO: f32 = 0.2;

    /// Lanes
    pub const LANE_COUNT: usize = 4;
    pub const LANE_START_X: f32 = 180.0;
    pub const LANE_SPACING: f32 = 240.0;
    /// Player stands at 70% of the screen height
    pub const PLAYER_Y_RATIO: f32 = 0.7;
    /// Lane the player starts a run in
    pub const PLAYER_START_LANE: usize = 1;
    /// Seconds per walk animation frame
    pub const PLAYER_ANIM_FRAME_SECONDS: f32 = 0.2;

    /// Base item speed in px/s (scaled by the catalog speed multiplier)
    pub const BASE_FALL_SPEED: f32 = 300.0;
    /// Spawn cadence bounds (seconds)
    pub const SPAWN_INTERVAL_MIN: f64 = 0.8;
    pub const SPAWN_INTERVAL_MAX: f64 = 1.8;
    /// Snake movement: lateral speed amplitude (px/s) and angular velocity (rad/s)
    pub const SNAKE_AMPLITUDE: f32 = 80.0;
    pub const SNAKE_OMEGA: f32 = 2.6;
    /// Max re-placement attempts when a new item overlaps an existing one
    pub const REPOSITION_RETRY: usize = 6;
    /// Items wider than this spawn between lanes instead of on them
    pub const LARGE_ITEM_FOOTPRINT: f32 = 512.0;
    /// Extra room outside the playfield before an item is culled
    pub const OFFSCREEN_MARGIN: f32 = 200.0;
    /// Fraction of the scroll speed applied to items as downward drift
    pub const SCROLL_DRIFT_FACTOR: f32 = 0.5;

    /// Score ceiling (8 HUD digits)
    pub const SCORE_MAX: u32 = 99_999_999;
    /// Clear bonus per remaining second
    pub const CLEAR_BONUS_PER_SECOND: f64 = 100.0;
    /// Delay between the end of a run and the handoff to results
    pub const RESULT_SETTLE_SECONDS: f64 = 1.5;
}

/// X coordinate of a lane center
#[inline]
pub fn lane_x(lane: usize) -> f32 {
    consts::LANE_START_X + consts::LANE_SPACING * lane as f32
}

/// Clamp a running score into `[0, SCORE_MAX]`
#[inline]
pub fn clamp_score(score: i64) -> u32 {
    score.clamp(0, consts::SCORE_MAX as i64) as u32
}
