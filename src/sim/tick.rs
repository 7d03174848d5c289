//! Per-frame simulation tick
//!
//! Core game loop that advances a run deterministically given the frame
//! clock `(now, dt)` and the frame's input intents.

use super::collision;
use super::progress::is_goal_reached;
use super::state::{GameEvent, GameState, Outcome, RemovalCause, RunPhase, Transition};
use crate::clamp_score;
use crate::consts::*;

/// Input intents for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// One lane step left (rising edge, coalesced across input sources)
    pub left_step: bool,
    /// One lane step right
    pub right_step: bool,
    /// Climb input held
    pub scroll_held: bool,
    /// Debug: drop HP to zero (ignored unless the run has debug enabled)
    pub forfeit: bool,
}

/// Advance the run by one frame. Returns the results handoff on the single
/// frame it fires.
pub fn tick(state: &mut GameState, input: &TickInput, now: f64, dt: f32) -> Option<Transition> {
    // Nothing to simulate before start or after handoff
    match state.phase {
        RunPhase::NotStarted | RunPhase::Terminal { .. } => return None,
        RunPhase::Running | RunPhase::Ending { .. } => {}
    }

    if input.forfeit && state.debug_enabled && !state.ended {
        log::info!("Debug forfeit");
        state.player.hp = 0;
        state.emit(GameEvent::HpChanged { hp: 0 });
    }

    apply_input(state, input, now);
    state.player.animate(dt);

    // Clocks
    let dt_secs = dt as f64;
    if !state.ended {
        state.game_seconds += dt_secs;
    }
    let scroll_speed = state.config.scroll_speed();
    let scrolling = state.player.allow_scroll;
    if scrolling {
        state.elapsed_move_seconds += dt_secs;
        // Background distance uses the screen-based speed, not the player
        // sprite height, so distance matches SecPerScreen exactly
        let pixels = scroll_speed * dt;
        state.progress.scroll(pixels);
        state.emit(GameEvent::Scrolled { pixels });
    }

    // Progression
    let update = state
        .progress
        .update(state.elapsed_move_seconds, &state.config);
    if let Some(area) = update.area_changed {
        log::info!("Entered area {}", area);
        state.emit(GameEvent::AreaChanged { area });
    }
    if let Some(stage) = update.stage_changed {
        state.emit(GameEvent::StageChanged { stage });
    }

    // Spawning
    if !state.ended {
        let id = state.peek_entity_id();
        let area = state.progress.area;
        let spawned = state.spawner.update(
            now,
            area,
            &state.catalog,
            &state.items,
            &mut state.rng,
            id,
        );
        if let Some(item) = spawned {
            state.next_entity_id();
            state.emit(GameEvent::ItemSpawned {
                id: item.id,
                def_id: item.def.id,
                pos: item.pos,
            });
            state.items.push(item);
        }
    }

    // Motion
    let drift = if scrolling {
        scroll_speed * SCROLL_DRIFT_FACTOR
    } else {
        0.0
    };
    let mut motion_events = Vec::with_capacity(state.items.len());
    for item in state.items.iter_mut().filter(|i| i.is_live()) {
        item.integrate(dt, drift);
        if item.is_off_field() {
            item.pending_removal = true;
            motion_events.push(GameEvent::ItemRemoved {
                id: item.id,
                cause: RemovalCause::OffField,
            });
        } else {
            motion_events.push(GameEvent::ItemMoved {
                id: item.id,
                pos: item.pos,
            });
        }
    }
    for event in motion_events {
        state.emit(event);
    }

    // Collisions
    let outcome = collision::resolve(
        &mut state.player,
        &mut state.score,
        &mut state.items,
        now,
        &state.config,
        state.ended,
    );
    for &id in &outcome.consumed {
        state.emit(GameEvent::ItemRemoved {
            id,
            cause: RemovalCause::Collected,
        });
    }
    if outcome.applied {
        state.emit(GameEvent::HpChanged {
            hp: state.player.hp,
        });
        state.emit(GameEvent::ScoreChanged { score: state.score });
    }

    let remaining = state.remaining_seconds();
    state.emit(GameEvent::TimeRemaining { seconds: remaining });

    check_end(state, now, remaining);

    let transition = match state.phase {
        RunPhase::Ending {
            outcome,
            transition_at,
        } if now >= transition_at && !state.exiting => {
            state.exiting = true;
            state.phase = RunPhase::Terminal { outcome };
            log::info!("Handing off to results ({:?}, score {})", outcome, state.score);
            Some(Transition {
                cleared: outcome == Outcome::Cleared,
                score: state.score,
            })
        }
        _ => None,
    };

    state.compact_items();
    transition
}

/// Turn raw intents into lane steps and the climb flag.
///
/// Lateral steps beat climbing: a step while climb is held latches climb off
/// until the climb input is released. A stunned player's input is ignored.
fn apply_input(state: &mut GameState, input: &TickInput, now: f64) {
    let player = &mut state.player;
    if state.ended {
        player.allow_scroll = false;
        state.scroll_latched = false;
        return;
    }

    if state.scroll_latched && !input.scroll_held {
        state.scroll_latched = false;
    }
    if player.is_stunned(now) {
        player.allow_scroll = false;
        return;
    }

    let lateral = input.left_step || input.right_step;
    if lateral {
        player.allow_scroll = false;
        state.scroll_latched = true;
    } else {
        player.allow_scroll = input.scroll_held && !state.scroll_latched;
    }

    if !player.allow_scroll {
        if input.left_step {
            player.step_lane(-1);
        }
        if input.right_step {
            player.step_lane(1);
        }
    }
}

/// Clear or failure, whichever comes first. Each can fire once per run.
fn check_end(state: &mut GameState, now: f64, remaining: f64) {
    let transition_at = now + RESULT_SETTLE_SECONDS;

    if !state.cleared && !state.ended && is_goal_reached(state.elapsed_move_seconds, &state.config)
    {
        state.ended = true;
        state.cleared = true;
        let mut bonus = 0;
        if !state.bonus_applied {
            let before = state.score;
            let award = (remaining * CLEAR_BONUS_PER_SECOND).floor() as i64;
            state.score = clamp_score(before as i64 + award);
            bonus = state.score - before;
            state.bonus_applied = true;
        }
        state.phase = RunPhase::Ending {
            outcome: Outcome::Cleared,
            transition_at,
        };
        log::info!(
            "Run cleared at {:.1}s with {:.1}s left, bonus {}",
            state.game_seconds,
            remaining,
            bonus
        );
        state.emit(GameEvent::RunCleared { bonus });
        state.emit(GameEvent::ScoreChanged { score: state.score });
    }

    if state.player.hp == 0 && !state.ended {
        state.ended = true;
        state.phase = RunPhase::Ending {
            outcome: Outcome::Failed,
            transition_at,
        };
        log::info!("Run failed at {:.1}s, score {}", state.game_seconds, state.score);
        state.emit(GameEvent::RunFailed);
    }
}
