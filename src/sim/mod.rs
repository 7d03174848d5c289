//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame clock supplied by the caller, deadlines as absolute times
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod collision;
pub mod item;
pub mod player;
pub mod progress;
pub mod results;
pub mod select;
pub mod spawner;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use collision::{CollisionOutcome, EFFECT_PRIORITY, resolve};
pub use item::ItemInstance;
pub use player::Player;
pub use progress::{GOAL_STAGE, Progress, area_for};
pub use results::RunSummary;
pub use select::{pick_weighted, select};
pub use spawner::Spawner;
pub use state::{GameEvent, GameState, Outcome, RemovalCause, RunPhase, Transition};
pub use tick::{TickInput, tick};
