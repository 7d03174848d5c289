//! Player/item overlap detection and effect resolution
//!
//! All overlapping items are collected first, then effects are applied in a
//! fixed priority regardless of spawn order: invincibility, heal, damage,
//! score. That way an invincibility pickup touched in the same frame as a
//! hazard always protects against it.

use super::item::ItemInstance;
use super::player::Player;
use crate::clamp_score;
use crate::config::{Effect, RunConfig};

/// Order in which effects are applied within one tick
pub const EFFECT_PRIORITY: [Effect; 4] = [
    Effect::Invincible,
    Effect::Heal,
    Effect::Damage,
    Effect::Score,
];

/// What happened during one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionOutcome {
    /// Ids of items consumed this tick
    pub consumed: Vec<u32>,
    /// Whether any effect was applied (false once the run has ended)
    pub applied: bool,
}

impl CollisionOutcome {
    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}

/// Indices of live items touching the player
pub fn overlapping(player: &Player, items: &[ItemInstance]) -> Vec<usize> {
    let rect = player.aabb();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_live() && rect.intersects(&item.aabb()))
        .map(|(i, _)| i)
        .collect()
}

/// Whole hit points for an HP effect value. Any positive fraction counts as
/// at least one point so a hazard always hurts.
#[inline]
fn hp_amount(value: f64) -> u32 {
    value.max(0.0).ceil() as u32
}

/// Apply every overlapping item to the player and score, marking each one
/// for removal. After the run has ended items are removed without effect.
pub fn resolve(
    player: &mut Player,
    score: &mut u32,
    items: &mut [ItemInstance],
    now: f64,
    config: &RunConfig,
    ended: bool,
) -> CollisionOutcome {
    let hits = overlapping(player, items);
    let mut outcome = CollisionOutcome::default();
    if hits.is_empty() {
        return outcome;
    }

    if ended {
        for &i in &hits {
            items[i].pending_removal = true;
            outcome.consumed.push(items[i].id);
        }
        return outcome;
    }

    for effect in EFFECT_PRIORITY {
        for &i in &hits {
            let item = &mut items[i];
            if item.def.effect != effect {
                continue;
            }
            let value = item.def.value;
            match effect {
                Effect::Invincible => player.set_invincible(now, value.max(0.0)),
                Effect::Heal => player.heal(hp_amount(value)),
                Effect::Damage => player.damage(
                    now,
                    hp_amount(value),
                    config.on_hit_stun_seconds,
                    config.on_hit_invincible_seconds,
                ),
                Effect::Score => *score = clamp_score(*score as i64 + value.trunc() as i64),
            }
            log::debug!(
                "Item #{} '{}' applied {} {}",
                item.id,
                item.def.name,
                effect.as_str(),
                value
            );
            item.pending_removal = true;
            outcome.consumed.push(item.id);
        }
    }
    outcome.applied = true;
    outcome
}
