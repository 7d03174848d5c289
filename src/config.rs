//! Run configuration and item catalog
//!
//! Rows arrive already tokenized (CSV header names, numeric cells) and are
//! validated here into an immutable [`RunConfig`] and a catalog of shared
//! [`ItemDef`]s. Problems that make a run impossible are [`ConfigError`]s;
//! anything that can be coerced to a safe value is reported as a
//! [`ConfigWarning`] and the run proceeds.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal configuration problems. A run never starts with one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("player config has no value row")]
    NoPlayerRow,
    #[error("{field}: line {line} is empty")]
    MissingField { field: &'static str, line: usize },
    #[error("{field}: line {line} is not a number: {value}")]
    NotNumeric {
        field: &'static str,
        line: usize,
        value: f64,
    },
    #[error("{field}: line {line} is not an integer: {value}")]
    NotInteger {
        field: &'static str,
        line: usize,
        value: f64,
    },
    #[error("{field}: line {line} is out of range: {value}")]
    OutOfRange {
        field: &'static str,
        line: usize,
        value: f64,
    },
    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Non-fatal problems found while loading. The offending value was coerced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigWarning {
    #[error(
        "time thresholds out of order: need 0 < Area1Sec < Area2Sec < Area3Sec < goalSec <= StartTimeSeconds"
    )]
    AreaOrder,
    #[error("Effect: line {line} has unknown code {code}, using Score")]
    UnknownEffect { line: usize, code: i64 },
    #[error("Move: line {line} has unknown code {code}, using FallStraight")]
    UnknownMove { line: usize, code: i64 },
    #[error("Area: line {line} has unknown code {code}, using 0")]
    UnknownArea { line: usize, code: i64 },
    #[error("Value: line {line} is negative for an HP effect, clamped to 0")]
    NegativeHpValue { line: usize },
    #[error("Weight: area {area} weights overflow, nothing will spawn there")]
    WeightOverflow { area: u8 },
}

/// What an item does when it touches the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Damage,
    Heal,
    Invincible,
    Score,
}

impl Effect {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Effect::Damage),
            1 => Some(Effect::Heal),
            2 => Some(Effect::Invincible),
            3 => Some(Effect::Score),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Damage => "Damage",
            Effect::Heal => "Heal",
            Effect::Invincible => "Invincible",
            Effect::Score => "Score",
        }
    }

    /// Heal and Damage values count hit points and can't be negative
    pub fn is_hp_effect(&self) -> bool {
        matches!(self, Effect::Damage | Effect::Heal)
    }
}

/// How an item moves across the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Movement {
    #[default]
    FallStraight,
    CrossRightToLeft,
    CrossLeftToRight,
    FallSnake,
    /// Crossing item whose direction is a coin flip at spawn time
    Cross,
}

impl Movement {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Movement::FallStraight),
            1 => Some(Movement::CrossRightToLeft),
            2 => Some(Movement::CrossLeftToRight),
            3 => Some(Movement::FallSnake),
            4 => Some(Movement::Cross),
            _ => None,
        }
    }

    /// Falling movers enter from the top, crossing movers from a side
    pub fn is_falling(&self) -> bool {
        matches!(self, Movement::FallStraight | Movement::FallSnake)
    }
}

/// Number of catalog areas
pub const AREA_COUNT: u8 = 4;

/// Immutable per-run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub hp: u32,
    pub size_x: f32,
    pub size_y: f32,
    pub start_time_seconds: f64,
    pub on_hit_stun_seconds: f64,
    pub on_hit_invincible_seconds: f64,
    pub sec_per_screen: f64,
    pub area1_sec: f64,
    pub area2_sec: f64,
    pub area3_sec: f64,
    pub goal_sec: f64,
}

impl RunConfig {
    /// Whether `0 < area1 < area2 < area3 < goal <= start` holds
    pub fn thresholds_ordered(&self) -> bool {
        0.0 < self.area1_sec
            && self.area1_sec < self.area2_sec
            && self.area2_sec < self.area3_sec
            && self.area3_sec < self.goal_sec
            && self.goal_sec <= self.start_time_seconds
    }

    /// Scroll speed in px/s while the player is climbing
    pub fn scroll_speed(&self) -> f32 {
        (crate::consts::SCREEN_HEIGHT as f64 / self.sec_per_screen) as f32
    }
}

/// One catalog entry. Many live items may share one definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: u32,
    pub name: String,
    pub effect: Effect,
    pub value: f64,
    pub speed: f32,
    pub area: u8,
    pub weight: f64,
    pub size_x: f32,
    pub size_y: f32,
    pub movement: Movement,
}

/// Raw player row, keyed by the player sheet's header names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerRow {
    #[serde(rename = "HP")]
    pub hp: Option<f64>,
    #[serde(rename = "SizeX")]
    pub size_x: Option<f64>,
    #[serde(rename = "SizeY")]
    pub size_y: Option<f64>,
    #[serde(rename = "StartTimeSeconds")]
    pub start_time_seconds: Option<f64>,
    #[serde(rename = "OnHitStunSeconds")]
    pub on_hit_stun_seconds: Option<f64>,
    #[serde(rename = "OnHitInvincibleSeconds")]
    pub on_hit_invincible_seconds: Option<f64>,
    #[serde(rename = "SecPerScreen")]
    pub sec_per_screen: Option<f64>,
    #[serde(rename = "Area1Sec")]
    pub area1_sec: Option<f64>,
    #[serde(rename = "Area2Sec")]
    pub area2_sec: Option<f64>,
    #[serde(rename = "Area3Sec")]
    pub area3_sec: Option<f64>,
    #[serde(rename = "goalSec")]
    pub goal_sec: Option<f64>,
}

/// Raw item row, keyed by the item sheet's header names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemRow {
    #[serde(rename = "Id")]
    pub id: Option<f64>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Effect")]
    pub effect: Option<f64>,
    #[serde(rename = "Value")]
    pub value: Option<f64>,
    #[serde(rename = "Speed")]
    pub speed: Option<f64>,
    #[serde(rename = "Area")]
    pub area: Option<f64>,
    #[serde(rename = "Weight")]
    pub weight: Option<f64>,
    #[serde(rename = "SizeX")]
    pub size_x: Option<f64>,
    #[serde(rename = "SizeY")]
    pub size_y: Option<f64>,
    #[serde(rename = "Move")]
    pub movement: Option<f64>,
}

/// Result of a successful load
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub run: RunConfig,
    pub catalog: Vec<Arc<ItemDef>>,
    pub warnings: Vec<ConfigWarning>,
}

/// Sheet line of the first value row (line 1 is the header)
const FIRST_VALUE_LINE: usize = 2;

/// Load from JSON arrays of row objects. The first player row is used.
pub fn load_json(player_json: &str, item_json: &str) -> Result<LoadedConfig, ConfigError> {
    let players: Vec<PlayerRow> = serde_json::from_str(player_json)?;
    let items: Vec<ItemRow> = serde_json::from_str(item_json)?;
    load_rows(&players, &items)
}

/// Validate parsed rows into a run config and item catalog
pub fn load_rows(players: &[PlayerRow], items: &[ItemRow]) -> Result<LoadedConfig, ConfigError> {
    let mut warnings = Vec::new();

    let row = players.first().ok_or(ConfigError::NoPlayerRow)?;
    let run = parse_player(row, FIRST_VALUE_LINE)?;
    if !run.thresholds_ordered() {
        warnings.push(ConfigWarning::AreaOrder);
    }

    let mut catalog = Vec::with_capacity(items.len());
    for (idx, row) in items.iter().enumerate() {
        let def = parse_item(row, idx + FIRST_VALUE_LINE, &mut warnings)?;
        catalog.push(Arc::new(def));
    }
    for area in 0..AREA_COUNT {
        let total: f64 = catalog
            .iter()
            .filter(|def| def.area == area && def.weight > 0.0)
            .map(|def| def.weight)
            .sum();
        if !total.is_finite() {
            warnings.push(ConfigWarning::WeightOverflow { area });
        }
    }

    for warning in &warnings {
        log::warn!("{}", warning);
    }
    log::info!(
        "Config loaded: hp={}, goal={}s, {} catalog rows, {} warnings",
        run.hp,
        run.goal_sec,
        catalog.len(),
        warnings.len()
    );

    Ok(LoadedConfig {
        run,
        catalog,
        warnings,
    })
}

fn parse_player(row: &PlayerRow, line: usize) -> Result<RunConfig, ConfigError> {
    let hp = require_int(row.hp, "HP", line)?;
    let size_x = require_int(row.size_x, "SizeX", line)?;
    let size_y = require_int(row.size_y, "SizeY", line)?;
    let start_time_seconds = require_int(row.start_time_seconds, "StartTimeSeconds", line)?;
    let on_hit_stun_seconds = require(row.on_hit_stun_seconds, "OnHitStunSeconds", line)?;
    let on_hit_invincible_seconds =
        require(row.on_hit_invincible_seconds, "OnHitInvincibleSeconds", line)?;
    let sec_per_screen = require(row.sec_per_screen, "SecPerScreen", line)?;

    let hp = to_u32(positive(hp, "HP", line)?, "HP", line)?;
    let size_x = positive(size_x, "SizeX", line)?;
    let size_y = positive(size_y, "SizeY", line)?;
    let start_time_seconds = positive(start_time_seconds, "StartTimeSeconds", line)?;
    let sec_per_screen = positive(sec_per_screen, "SecPerScreen", line)?;
    let on_hit_stun_seconds = non_negative(on_hit_stun_seconds, "OnHitStunSeconds", line)?;
    let on_hit_invincible_seconds =
        non_negative(on_hit_invincible_seconds, "OnHitInvincibleSeconds", line)?;

    Ok(RunConfig {
        hp,
        size_x: size_x as f32,
        size_y: size_y as f32,
        start_time_seconds,
        on_hit_stun_seconds,
        on_hit_invincible_seconds,
        sec_per_screen,
        area1_sec: require(row.area1_sec, "Area1Sec", line)?,
        area2_sec: require(row.area2_sec, "Area2Sec", line)?,
        area3_sec: require(row.area3_sec, "Area3Sec", line)?,
        goal_sec: require(row.goal_sec, "goalSec", line)?,
    })
}

fn parse_item(
    row: &ItemRow,
    line: usize,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<ItemDef, ConfigError> {
    let id = to_u32(require_int(row.id, "Id", line)?, "Id", line)?;
    let effect_code = require_int(row.effect, "Effect", line)? as i64;
    let mut value = require(row.value, "Value", line)?;
    let speed = require(row.speed, "Speed", line)?;
    let area_code = require_int(row.area, "Area", line)? as i64;
    let weight = require(row.weight, "Weight", line)?;
    let size_x = positive(require_int(row.size_x, "SizeX", line)?, "SizeX", line)?;
    let size_y = positive(require_int(row.size_y, "SizeY", line)?, "SizeY", line)?;
    let move_code = require_int(row.movement, "Move", line)? as i64;

    let effect = Effect::from_code(effect_code).unwrap_or_else(|| {
        warnings.push(ConfigWarning::UnknownEffect {
            line,
            code: effect_code,
        });
        Effect::Score
    });
    let movement = Movement::from_code(move_code).unwrap_or_else(|| {
        warnings.push(ConfigWarning::UnknownMove {
            line,
            code: move_code,
        });
        Movement::FallStraight
    });
    let area = if (0..AREA_COUNT as i64).contains(&area_code) {
        area_code as u8
    } else {
        warnings.push(ConfigWarning::UnknownArea {
            line,
            code: area_code,
        });
        0
    };
    if effect.is_hp_effect() {
        // HP is counted in whole points
        if value.fract() != 0.0 {
            return Err(ConfigError::NotInteger {
                field: "Value",
                line,
                value,
            });
        }
        if value < 0.0 {
            warnings.push(ConfigWarning::NegativeHpValue { line });
            value = 0.0;
        }
    }

    Ok(ItemDef {
        id,
        name: row.name.clone().unwrap_or_default(),
        effect,
        value,
        speed: speed as f32,
        area,
        weight,
        size_x: size_x as f32,
        size_y: size_y as f32,
        movement,
    })
}

fn require(value: Option<f64>, field: &'static str, line: usize) -> Result<f64, ConfigError> {
    let value = value.ok_or(ConfigError::MissingField { field, line })?;
    if !value.is_finite() {
        return Err(ConfigError::NotNumeric { field, line, value });
    }
    Ok(value)
}

fn require_int(value: Option<f64>, field: &'static str, line: usize) -> Result<f64, ConfigError> {
    let value = require(value, field, line)?;
    if value.fract() != 0.0 {
        return Err(ConfigError::NotInteger { field, line, value });
    }
    Ok(value)
}

fn positive(value: f64, field: &'static str, line: usize) -> Result<f64, ConfigError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange { field, line, value })
    }
}

fn to_u32(value: f64, field: &'static str, line: usize) -> Result<u32, ConfigError> {
    if (0.0..=u32::MAX as f64).contains(&value) {
        Ok(value as u32)
    } else {
        Err(ConfigError::OutOfRange { field, line, value })
    }
}

fn non_negative(value: f64, field: &'static str, line: usize) -> Result<f64, ConfigError> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange { field, line, value })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn player_row() -> PlayerRow {
        PlayerRow {
            hp: Some(3.0),
            size_x: Some(200.0),
            size_y: Some(300.0),
            start_time_seconds: Some(300.0),
            on_hit_stun_seconds: Some(0.5),
            on_hit_invincible_seconds: Some(1.0),
            sec_per_screen: Some(2.0),
            area1_sec: Some(60.0),
            area2_sec: Some(120.0),
            area3_sec: Some(200.0),
            goal_sec: Some(280.0),
        }
    }

    pub(crate) fn item_row(effect: f64, value: f64, area: f64, movement: f64) -> ItemRow {
        ItemRow {
            id: Some(1.0),
            name: Some("rock".to_string()),
            effect: Some(effect),
            value: Some(value),
            speed: Some(1.0),
            area: Some(area),
            weight: Some(10.0),
            size_x: Some(128.0),
            size_y: Some(128.0),
            movement: Some(movement),
        }
    }

    #[test]
    fn test_load_valid_rows() {
        let loaded = load_rows(&[player_row()], &[item_row(0.0, 1.0, 0.0, 0.0)]).unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.run.hp, 3);
        assert_eq!(loaded.catalog.len(), 1);
        assert_eq!(loaded.catalog[0].effect, Effect::Damage);
        assert_eq!(loaded.catalog[0].movement, Movement::FallStraight);
    }

    #[test]
    fn test_missing_player_row_is_fatal() {
        assert!(matches!(
            load_rows(&[], &[]),
            Err(ConfigError::NoPlayerRow)
        ));
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let mut row = player_row();
        row.sec_per_screen = None;
        let err = load_rows(&[row], &[]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                field: "SecPerScreen",
                line: 2
            }
        ));
    }

    #[test]
    fn test_non_integer_hp_is_fatal() {
        let mut row = player_row();
        row.hp = Some(2.5);
        assert!(matches!(
            load_rows(&[row], &[]),
            Err(ConfigError::NotInteger { field: "HP", .. })
        ));
    }

    #[test]
    fn test_non_numeric_item_field_reports_line() {
        let mut bad = item_row(0.0, 1.0, 0.0, 0.0);
        bad.weight = Some(f64::NAN);
        let items = [item_row(3.0, 10.0, 0.0, 0.0), bad];
        assert!(matches!(
            load_rows(&[player_row()], &items),
            Err(ConfigError::NotNumeric {
                field: "Weight",
                line: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_out_of_order_thresholds_warn_but_load() {
        let mut row = player_row();
        row.area2_sec = Some(30.0);
        let loaded = load_rows(&[row], &[]).unwrap();
        assert_eq!(loaded.warnings, vec![ConfigWarning::AreaOrder]);
    }

    #[test]
    fn test_goal_after_start_time_warns() {
        let mut row = player_row();
        row.goal_sec = Some(301.0);
        let loaded = load_rows(&[row], &[]).unwrap();
        assert!(loaded.warnings.contains(&ConfigWarning::AreaOrder));
    }

    #[test]
    fn test_unknown_codes_are_coerced() {
        let loaded = load_rows(&[player_row()], &[item_row(9.0, 5.0, 7.0, 8.0)]).unwrap();
        let def = &loaded.catalog[0];
        assert_eq!(def.effect, Effect::Score);
        assert_eq!(def.movement, Movement::FallStraight);
        assert_eq!(def.area, 0);
        assert_eq!(loaded.warnings.len(), 3);
    }

    #[test]
    fn test_negative_hp_values_clamped() {
        let loaded = load_rows(
            &[player_row()],
            &[item_row(1.0, -2.0, 0.0, 0.0), item_row(3.0, -50.0, 0.0, 0.0)],
        )
        .unwrap();
        assert_eq!(loaded.catalog[0].value, 0.0);
        // Score penalties stay negative
        assert_eq!(loaded.catalog[1].value, -50.0);
        assert_eq!(
            loaded.warnings,
            vec![ConfigWarning::NegativeHpValue { line: 2 }]
        );
    }

    #[test]
    fn test_fractional_hp_value_is_fatal() {
        let items = [item_row(3.0, 0.5, 0.0, 0.0), item_row(0.0, 0.4, 0.0, 0.0)];
        assert!(matches!(
            load_rows(&[player_row()], &items),
            Err(ConfigError::NotInteger {
                field: "Value",
                line: 3,
                ..
            })
        ));

        // Invincibility is in seconds and may be fractional
        let loaded = load_rows(&[player_row()], &[item_row(2.0, 1.5, 0.0, 0.0)]).unwrap();
        assert_eq!(loaded.catalog[0].value, 1.5);
    }

    #[test]
    fn test_negative_or_huge_ids_rejected() {
        let mut row = item_row(3.0, 10.0, 0.0, 0.0);
        row.id = Some(-1.0);
        assert!(matches!(
            load_rows(&[player_row()], &[row]),
            Err(ConfigError::OutOfRange { field: "Id", .. })
        ));

        let mut player = player_row();
        player.hp = Some(1e12);
        assert!(matches!(
            load_rows(&[player], &[]),
            Err(ConfigError::OutOfRange { field: "HP", .. })
        ));
    }

    #[test]
    fn test_weight_overflow_warns() {
        let mut heavy = item_row(3.0, 10.0, 1.0, 0.0);
        heavy.weight = Some(1e308);
        let loaded = load_rows(&[player_row()], &[heavy.clone(), heavy]).unwrap();
        assert_eq!(
            loaded.warnings,
            vec![ConfigWarning::WeightOverflow { area: 1 }]
        );
    }

    #[test]
    fn test_load_json_uses_header_names() {
        let player = r#"[{"HP":3,"SizeX":200,"SizeY":300,"StartTimeSeconds":300,
            "OnHitStunSeconds":0.5,"OnHitInvincibleSeconds":1,"SecPerScreen":2,
            "Area1Sec":60,"Area2Sec":120,"Area3Sec":200,"goalSec":280}]"#;
        let items = r#"[{"Id":7,"Name":"coin","Effect":3,"Value":100,"Speed":1.5,
            "Area":2,"Weight":4,"SizeX":96,"SizeY":96,"Move":3}]"#;
        let loaded = load_json(player, items).unwrap();
        let def = &loaded.catalog[0];
        assert_eq!(def.id, 7);
        assert_eq!(def.name, "coin");
        assert_eq!(def.area, 2);
        assert_eq!(def.movement, Movement::FallSnake);
        assert_eq!(loaded.run.scroll_speed(), 960.0);
    }

    #[test]
    fn test_load_json_syntax_error() {
        assert!(matches!(
            load_json("[{", "[]"),
            Err(ConfigError::Json(_))
        ));
    }
}
