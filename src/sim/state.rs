//! Run state and core simulation types
//!
//! Everything one run needs lives on [`GameState`]: config and catalog, the
//! player, the live item arena, spawner and progression state, the seeded
//! RNG and the single-fire end-of-run flags.

use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::item::ItemInstance;
use super::player::Player;
use super::progress::Progress;
use super::spawner::Spawner;
use crate::config::{ItemDef, LoadedConfig, RunConfig};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Cleared,
    Failed,
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Config loaded, waiting for the start signal
    NotStarted,
    /// Active gameplay
    Running,
    /// Run decided; handoff to results fires at `transition_at`
    Ending { outcome: Outcome, transition_at: f64 },
    /// Handed off to results
    Terminal { outcome: Outcome },
}

/// Why an item left the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    OffField,
    Collected,
}

/// Notifications for the presentation layer, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Catalog/background area changed
    AreaChanged { area: u8 },
    /// Five-stage progress marker changed (4 = goal)
    StageChanged { stage: u8 },
    /// Background scrolled by this many pixels
    Scrolled { pixels: f32 },
    ScoreChanged { score: u32 },
    HpChanged { hp: u32 },
    TimeRemaining { seconds: f64 },
    ItemSpawned { id: u32, def_id: u32, pos: Vec2 },
    ItemMoved { id: u32, pos: Vec2 },
    ItemRemoved { id: u32, cause: RemovalCause },
    RunCleared { bonus: u32 },
    RunFailed,
}

/// One-time handoff to the results collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub cleared: bool,
    pub score: u32,
}

/// Complete run state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub config: RunConfig,
    pub catalog: Vec<Arc<ItemDef>>,
    pub phase: RunPhase,
    pub player: Player,
    /// Live items (sorted by id, compacted at the end of each tick)
    pub items: Vec<ItemInstance>,
    pub spawner: Spawner,
    pub progress: Progress,
    /// Always-running clock while the run is live (s)
    pub game_seconds: f64,
    /// Climb time, only accumulates while scrolling (s)
    pub elapsed_move_seconds: f64,
    pub score: u32,
    pub started: bool,
    pub ended: bool,
    pub cleared: bool,
    pub bonus_applied: bool,
    /// Results handoff already fired
    pub exiting: bool,
    /// Set when a lateral step interrupts a held climb; the climb input
    /// must be released before it counts again
    pub scroll_latched: bool,
    /// Accept debug-only inputs such as forfeit
    pub debug_enabled: bool,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a run from loaded config. The run waits in `NotStarted`.
    pub fn new(loaded: &LoadedConfig, seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            config: loaded.run.clone(),
            catalog: loaded.catalog.clone(),
            phase: RunPhase::NotStarted,
            player: Player::new(&loaded.run),
            items: Vec::new(),
            spawner: Spawner::default(),
            progress: Progress::default(),
            game_seconds: 0.0,
            elapsed_move_seconds: 0.0,
            score: 0,
            started: false,
            ended: false,
            cleared: false,
            bonus_applied: false,
            exiting: false,
            scroll_latched: false,
            debug_enabled: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Enter `Running`. Only the first call has any effect.
    pub fn start(&mut self, now: f64) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        self.phase = RunPhase::Running;
        self.spawner.schedule_next(now, &mut self.rng);
        self.emit(GameEvent::HpChanged { hp: self.player.hp });
        self.emit(GameEvent::ScoreChanged { score: self.score });
        self.emit(GameEvent::TimeRemaining {
            seconds: self.config.start_time_seconds,
        });
        log::info!(
            "Run started (seed {}, {} catalog rows)",
            self.seed,
            self.catalog.len()
        );
        true
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Peek at the id the next spawn will receive
    pub(crate) fn peek_entity_id(&self) -> u32 {
        self.next_id
    }

    /// Seconds left on the countdown
    pub fn remaining_seconds(&self) -> f64 {
        (self.config.start_time_seconds - self.game_seconds).max(0.0)
    }

    #[inline]
    pub fn area(&self) -> u8 {
        self.progress.area
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            RunPhase::Ending { outcome, .. } | RunPhase::Terminal { outcome } => Some(outcome),
            _ => None,
        }
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all notifications produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop items marked for removal, keeping id order
    pub fn compact_items(&mut self) {
        self.items.retain(ItemInstance::is_live);
    }
}
