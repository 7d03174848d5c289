//! The climbing player: lane, health and hit timers

use glam::Vec2;

use super::aabb::Aabb;
use crate::config::RunConfig;
use crate::consts::*;
use crate::lane_x;

/// The player character. Exactly one per run.
#[derive(Debug, Clone)]
pub struct Player {
    /// Current lane (0..LANE_COUNT)
    pub lane: usize,
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: u32,
    pub max_hp: u32,
    /// Absolute time (s) until which input is ignored
    pub stun_until: f64,
    /// Absolute time (s) until which damage is ignored
    pub invincible_until: f64,
    /// Climb input is active and not overridden this frame
    pub allow_scroll: bool,
    anim_timer: f32,
    was_scrolling: bool,
}

impl Player {
    pub fn new(config: &RunConfig) -> Self {
        let max_hp = config.hp.max(1);
        Self {
            lane: PLAYER_START_LANE,
            pos: Vec2::new(lane_x(PLAYER_START_LANE), SCREEN_HEIGHT * PLAYER_Y_RATIO),
            size: Vec2::new(config.size_x, config.size_y),
            hp: max_hp,
            max_hp,
            stun_until: 0.0,
            invincible_until: 0.0,
            allow_scroll: false,
            anim_timer: 0.0,
            was_scrolling: false,
        }
    }

    #[inline]
    pub fn is_stunned(&self, now: f64) -> bool {
        now < self.stun_until
    }

    #[inline]
    pub fn is_invincible(&self, now: f64) -> bool {
        now < self.invincible_until
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.pos, self.size)
    }

    /// Move by `delta` lanes, clamped to the field. The step is immediate.
    pub fn step_lane(&mut self, delta: i32) {
        let target = (self.lane as i64 + delta as i64).clamp(0, LANE_COUNT as i64 - 1);
        self.lane = target as usize;
        self.pos.x = lane_x(self.lane);
    }

    /// Take a hit. Ignored while invincible; a positive hit stuns first and
    /// then grants invincibility after the stun ends.
    pub fn damage(&mut self, now: f64, amount: u32, stun_secs: f64, inv_secs: f64) {
        if self.is_invincible(now) {
            return;
        }
        self.hp = self.hp.saturating_sub(amount);
        if amount > 0 {
            self.stun_until = now + stun_secs;
            self.invincible_until = self.stun_until + inv_secs;
        }
    }

    pub fn heal(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
    }

    /// Grant invincibility; stacks onto an active window
    pub fn set_invincible(&mut self, now: f64, secs: f64) {
        if self.is_invincible(now) {
            self.invincible_until += secs;
        } else {
            self.invincible_until = now + secs;
        }
    }

    /// Advance the two-frame climb cycle. Only runs while climbing; letting
    /// go snaps to a frame boundary so a short tap still shows a step.
    pub fn animate(&mut self, dt: f32) {
        if !self.allow_scroll {
            if self.was_scrolling {
                self.anim_timer = if self.anim_timer > PLAYER_ANIM_FRAME_SECONDS * 0.5 {
                    0.0
                } else {
                    PLAYER_ANIM_FRAME_SECONDS
                };
            }
            self.was_scrolling = false;
            return;
        }
        self.was_scrolling = true;
        self.anim_timer += dt;
    }

    /// Current climb frame (0 or 1)
    pub fn anim_frame(&self) -> u8 {
        ((self.anim_timer / PLAYER_ANIM_FRAME_SECONDS).floor() as u32 % 2) as u8
    }
}
