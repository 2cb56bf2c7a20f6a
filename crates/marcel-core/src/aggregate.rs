// Step 1 (weighted multi-season totals) and the playing-time projection used
// in step 4.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::columns::{prior_seasons, ColumnLayout, PlayerKind, Slot, PLAYER_ID, SEASON};
use crate::error::ProjectionError;
use crate::table::{StatTable, Value};

/// Flat playing time added to every hitter's projected PA.
pub const HITTER_PA_FLOOR: f64 = 200.0;
/// Projected innings for a pitcher who only starts.
pub const STARTER_IP: f64 = 60.0;
/// Projected innings for a pitcher who only relieves.
pub const RELIEVER_IP: f64 = 25.0;
/// Share of last season's and the season before's playing time carried forward.
const PLAYING_TIME_CARRY: [f64; 2] = [0.5, 0.1];

// ---------------------------------------------------------------------------
// Player key
// ---------------------------------------------------------------------------

/// A `playerid` cell usable as a grouping key. Numeric ids order before text
/// ids; rows whose id is missing have no key.
#[derive(Debug, Clone)]
pub enum PlayerKey {
    Number(f64),
    Text(String),
}

impl PlayerKey {
    /// Text ids that read as numbers key as numbers, so `10155` from a file
    /// whose id column also holds `sa917940` matches `10155` from a purely
    /// numeric file.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(v) if !v.is_nan() => Some(PlayerKey::Number(*v)),
            Value::Text(s) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Some(PlayerKey::Number(v)),
                _ => Some(PlayerKey::Text(s.clone())),
            },
            _ => None,
        }
    }
}

impl Ord for PlayerKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PlayerKey::Number(a), PlayerKey::Number(b)) => a.total_cmp(b),
            (PlayerKey::Text(a), PlayerKey::Text(b)) => a.cmp(b),
            (PlayerKey::Number(_), PlayerKey::Text(_)) => Ordering::Less,
            (PlayerKey::Text(_), PlayerKey::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for PlayerKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PlayerKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PlayerKey {}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerKey::Number(v) => write!(f, "{v}"),
            PlayerKey::Text(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Player line
// ---------------------------------------------------------------------------

/// One player's record while moving through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerLine {
    pub player: PlayerKey,
    /// Carried columns, aligned with `ColumnLayout::fields`.
    pub fields: Vec<Value>,
    /// Forecast columns, aligned with `ColumnLayout::stats`.
    pub stats: Vec<f64>,
}

impl PlayerLine {
    fn empty(player: PlayerKey, layout: &ColumnLayout) -> Self {
        Self {
            player,
            fields: vec![Value::Missing; layout.fields().len()],
            stats: vec![0.0; layout.stats().len()],
        }
    }
}

/// The larger of two carried cells. Missing loses; text compares
/// lexicographically; mismatched kinds keep the current value.
fn max_value(current: &Value, next: &Value) -> Value {
    match (current, next) {
        (_, n) if n.is_missing() => current.clone(),
        (c, _) if c.is_missing() => next.clone(),
        (Value::Number(a), Value::Number(b)) => Value::Number(a.max(*b)),
        (Value::Text(a), Value::Text(b)) => {
            if b > a {
                next.clone()
            } else {
                current.clone()
            }
        }
        _ => current.clone(),
    }
}

fn season_of(row: &[Value], season_idx: usize) -> Option<f64> {
    row[season_idx].as_f64()
}

fn require(table: &StatTable, column: &str, operation: &'static str) -> Result<usize, ProjectionError> {
    table
        .column_index(column)
        .ok_or_else(|| ProjectionError::MissingColumn {
            column: column.to_string(),
            operation,
        })
}

// ---------------------------------------------------------------------------
// Step 1: cumulative weighting
// ---------------------------------------------------------------------------

/// Weighted totals over seasons S-1, S-2 and S-3.
///
/// Every stat column of a row from season `S-k` is multiplied by
/// `weights[k-1]`. Rows are then grouped by `playerid`: stats are summed
/// (missing cells skipped) and carried fields keep their maximum. Players are
/// returned in `playerid` order; rows without an id are dropped.
pub fn cumulative(
    table: &StatTable,
    layout: &ColumnLayout,
    season: i32,
    weights: [f64; 3],
) -> Result<Vec<PlayerLine>, ProjectionError> {
    const OPERATION: &str = "cumulative weighting";
    let season_idx = require(table, SEASON, OPERATION)?;
    let id_idx = require(table, PLAYER_ID, OPERATION)?;

    let mut groups: BTreeMap<PlayerKey, PlayerLine> = BTreeMap::new();
    let mut dropped = 0usize;

    for (prior, weight) in prior_seasons(season)?.into_iter().zip(weights) {
        let target = f64::from(prior);
        for row in table.rows() {
            if season_of(row, season_idx) != Some(target) {
                continue;
            }
            let Some(key) = PlayerKey::from_value(&row[id_idx]) else {
                dropped += 1;
                continue;
            };

            let line = groups
                .entry(key.clone())
                .or_insert_with(|| PlayerLine::empty(key, layout));

            for (cell, slot) in row.iter().zip(layout.slots()) {
                match *slot {
                    Slot::Stat(i) => {
                        if let Some(v) = cell.as_f64() {
                            line.stats[i] += v * weight;
                        }
                    }
                    Slot::Field(j) => {
                        line.fields[j] = max_value(&line.fields[j], cell);
                    }
                }
            }
        }
    }

    if dropped > 0 {
        debug!("dropped {} rows without a playerid from step 1", dropped);
    }
    Ok(groups.into_values().collect())
}

// ---------------------------------------------------------------------------
// Step 4 target: playing-time prorating
// ---------------------------------------------------------------------------

/// Projected playing time per player for `season`, in PA (hitters) or IP
/// (pitchers).
///
/// Hitters: `0.5*PA(S-1) + 0.1*PA(S-2) + 200`.
/// Pitchers: `0.5*IP(S-1) + 0.1*IP(S-2) + (GS/G)*60 + (1 - GS/G)*25`, where
/// GS and G are totals over every row of the player. A pitcher with `G = 0`
/// gets `None`.
pub fn prorated_playing_time(
    table: &StatTable,
    kind: PlayerKind,
    season: i32,
) -> Result<BTreeMap<PlayerKey, Option<f64>>, ProjectionError> {
    const OPERATION: &str = "playing-time prorating";
    let season_idx = require(table, SEASON, OPERATION)?;
    let id_idx = require(table, PLAYER_ID, OPERATION)?;
    let pt_idx = require(table, kind.playing_time_column(), OPERATION)?;

    let starts = match kind {
        PlayerKind::Hitter => None,
        PlayerKind::Pitcher => Some((
            require(table, "GS", OPERATION)?,
            require(table, "G", OPERATION)?,
        )),
    };

    // (playing time, GS, G)
    let mut totals: BTreeMap<PlayerKey, (f64, f64, f64)> = BTreeMap::new();
    let [last, before_last, _] = prior_seasons(season)?.map(f64::from);

    for row in table.rows() {
        let Some(key) = PlayerKey::from_value(&row[id_idx]) else {
            continue;
        };
        let entry = totals.entry(key).or_insert((0.0, 0.0, 0.0));

        let row_season = season_of(row, season_idx);
        let carried = if row_season == Some(last) {
            row[pt_idx].as_f64().map(|v| v * PLAYING_TIME_CARRY[0])
        } else if row_season == Some(before_last) {
            row[pt_idx].as_f64().map(|v| v * PLAYING_TIME_CARRY[1])
        } else {
            Some(0.0)
        };
        if let Some(v) = carried {
            entry.0 += v;
        }

        if let Some((gs_idx, g_idx)) = starts {
            if let Some(gs) = row[gs_idx].as_f64() {
                entry.1 += gs;
            }
            if let Some(g) = row[g_idx].as_f64() {
                entry.2 += g;
            }
        }
    }

    let projected = totals
        .into_iter()
        .map(|(key, (pt, gs, g))| {
            let target = match kind {
                PlayerKind::Hitter => Some(pt + HITTER_PA_FLOOR),
                PlayerKind::Pitcher => {
                    if g == 0.0 {
                        debug!("pitcher {} has no games; projected IP undefined", key);
                        None
                    } else {
                        let start_share = gs / g;
                        Some(pt + start_share * STARTER_IP + (1.0 - start_share) * RELIEVER_IP)
                    }
                }
            };
            (key, target)
        })
        .collect();

    Ok(projected)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
