//! Weighted random choice of the next catalog row

use std::sync::Arc;

use rand::Rng;

use crate::config::ItemDef;

/// Catalog rows that may spawn in `area`, in catalog order
pub fn eligible(catalog: &[Arc<ItemDef>], area: u8) -> Vec<&Arc<ItemDef>> {
    catalog
        .iter()
        .filter(|def| def.area == area && def.weight > 0.0)
        .collect()
}

/// Pick from `list` using a draw in `[0, total weight)`.
///
/// Rows are scanned in order and the draw is reduced by each weight until it
/// falls inside a row's band, so ties resolve by list order. A draw that
/// rounds past the end selects the last row.
pub fn pick_weighted<'a>(list: &[&'a Arc<ItemDef>], draw: f64) -> Option<&'a Arc<ItemDef>> {
    let mut remaining = draw;
    for &def in list {
        let weight = def.weight.max(0.0);
        if weight > 0.0 && remaining <= weight {
            return Some(def);
        }
        remaining -= weight;
    }
    list.iter().rev().find(|def| def.weight > 0.0).copied()
}

/// Choose a row for `area`, or `None` when nothing can spawn there. A pool
/// whose weights overflow to infinity can't be drawn from and yields `None`.
pub fn select<'a, R: Rng>(
    catalog: &'a [Arc<ItemDef>],
    area: u8,
    rng: &mut R,
) -> Option<&'a Arc<ItemDef>> {
    let pool = eligible(catalog, area);
    let total: f64 = pool.iter().map(|def| def.weight).sum();
    if pool.is_empty() || !total.is_finite() || total <= 0.0 {
        return None;
    }
    let draw = rng.random_range(0.0..total);
    pick_weighted(&pool, draw)
}
