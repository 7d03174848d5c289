//! Live item instances and their motion model

use std::sync::Arc;

use glam::Vec2;

use super::aabb::Aabb;
use crate::config::{ItemDef, Movement};
use crate::consts::*;

/// A spawned, moving occurrence of a catalog row
#[derive(Debug, Clone)]
pub struct ItemInstance {
    pub id: u32,
    /// Shared catalog row this item was spawned from
    pub def: Arc<ItemDef>,
    /// Resolved movement (a `Cross` row has already picked its direction)
    pub movement: Movement,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Snake phase in radians
    pub snake_phase: f32,
    /// Set when the item leaves the field or is consumed; compacted at tick end
    pub pending_removal: bool,
}

impl ItemInstance {
    /// Create an item at `pos` moving per `movement` at the row's speed
    pub fn new(id: u32, def: Arc<ItemDef>, movement: Movement, pos: Vec2, snake_phase: f32) -> Self {
        let vel = launch_velocity(movement, def.speed);
        Self {
            id,
            def,
            movement,
            pos,
            vel,
            snake_phase,
            pending_removal: false,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.def.size_x, self.def.size_y)
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.pos, self.size())
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        !self.pending_removal
    }

    /// Advance by `dt` seconds. `drift` is the shared downward scroll speed
    /// (px/s), zero while the player isn't climbing.
    pub fn integrate(&mut self, dt: f32, drift: f32) {
        self.pos += self.vel * dt;
        self.pos.y += drift * dt;
        if self.movement == Movement::FallSnake {
            self.snake_phase += SNAKE_OMEGA * dt;
            self.pos.x += self.snake_phase.sin() * SNAKE_AMPLITUDE * dt;
        }
    }

    /// Outside the playfield plus margin on the left, right or bottom.
    /// Items enter from above, so the top edge never culls.
    pub fn is_off_field(&self) -> bool {
        let margin = self.size() + Vec2::splat(OFFSCREEN_MARGIN);
        self.pos.x < -margin.x
            || self.pos.x > SCREEN_WIDTH + margin.x
            || self.pos.y > SCREEN_HEIGHT + margin.y
    }
}

/// Initial velocity for a resolved movement
pub fn launch_velocity(movement: Movement, speed: f32) -> Vec2 {
    let v = BASE_FALL_SPEED * speed;
    match movement {
        Movement::FallStraight | Movement::FallSnake => Vec2::new(0.0, v),
        Movement::CrossRightToLeft => Vec2::new(-v, 0.0),
        Movement::CrossLeftToRight | Movement::Cross => Vec2::new(v, 0.0),
    }
}

/// Where a resolved crossing mover enters: just outside its starting edge
pub fn crossing_entry_x(movement: Movement, size_x: f32) -> f32 {
    match movement {
        Movement::CrossRightToLeft => SCREEN_WIDTH + size_x,
        _ => -size_x,
    }
}
