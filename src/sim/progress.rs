//! Climb progression: area index and scroll distance
//!
//! Accumulated active-scroll time is the single progression signal. The area
//! index (catalog and background selection) and the five-stage presentation
//! marker are both derived from it; the screen-distance accumulator only
//! feeds the background scroller.

use crate::config::RunConfig;
use crate::consts::SCREEN_HEIGHT;

/// Marker stage reported once the goal time is reached
pub const GOAL_STAGE: u8 = 4;

/// Area for a given climb time. Clamped at 3; reaching the goal is a
/// separate check.
pub fn area_for(elapsed_move: f64, config: &RunConfig) -> u8 {
    if elapsed_move < config.area1_sec {
        0
    } else if elapsed_move < config.area2_sec {
        1
    } else if elapsed_move < config.area3_sec {
        2
    } else {
        3
    }
}

pub fn is_goal_reached(elapsed_move: f64, config: &RunConfig) -> bool {
    elapsed_move >= config.goal_sec
}

/// Presentation marker: the area, or [`GOAL_STAGE`] at the goal
pub fn stage_for(elapsed_move: f64, config: &RunConfig) -> u8 {
    if is_goal_reached(elapsed_move, config) {
        GOAL_STAGE
    } else {
        area_for(elapsed_move, config)
    }
}

/// Changes produced by one progression update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressUpdate {
    pub area_changed: Option<u8>,
    pub stage_changed: Option<u8>,
}

/// Tracks area, stage and scroll distance across a run
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub area: u8,
    pub stage: u8,
    /// Distance climbed in screen heights
    pub progress_screens: f64,
}

impl Progress {
    /// Add scrolled pixels to the distance accumulator
    pub fn scroll(&mut self, pixels: f32) {
        self.progress_screens += pixels as f64 / SCREEN_HEIGHT as f64;
    }

    /// Recompute area and stage from the climb time
    pub fn update(&mut self, elapsed_move: f64, config: &RunConfig) -> ProgressUpdate {
        let mut out = ProgressUpdate::default();
        let area = area_for(elapsed_move, config);
        if area != self.area {
            self.area = area;
            out.area_changed = Some(area);
        }
        let stage = stage_for(elapsed_move, config);
        if stage != self.stage {
            self.stage = stage;
            out.stage_changed = Some(stage);
        }
        out
    }
}
