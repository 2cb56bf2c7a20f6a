// Marcel forecaster: owns the hitter and pitcher tables and runs the
// five-step projection for either.
//
// 1. Weighted totals over the three prior seasons (5/4/3 or 3/2/1)
// 2. League mean, scaled to 1200 PA / TBF
// 3. Regression: totals + scaled mean
// 4. Per-PA (per-IP) rates, rescaled to projected playing time
// 5. Age curve
// followed by recomputed rate stats.

use std::path::Path;

use tracing::info;

use crate::aggregate;
use crate::aging;
use crate::columns::{stat_columns, ColumnLayout, PlayerKind, Slot, StatPartition, AGE, PLAYER_ID, SEASON};
use crate::error::ProjectionError;
use crate::rates;
use crate::reference::LeagueMean;
use crate::regression::{self, RegressionTarget};
use crate::table::{ColumnKind, StatTable, TableError, Value};

// ---------------------------------------------------------------------------
// Player pool (one per kind)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct PlayerPool {
    kind: PlayerKind,
    table: StatTable,
    stats: Vec<String>,
    bad_stats: Vec<String>,
    partition: StatPartition,
}

impl PlayerPool {
    fn new(kind: PlayerKind, table: StatTable) -> Self {
        let mut pool = Self {
            kind,
            table,
            stats: Vec::new(),
            bad_stats: kind.default_bad_stats().iter().map(|s| s.to_string()).collect(),
            partition: StatPartition::default(),
        };
        pool.reclassify();
        pool
    }

    /// Re-derive stat columns and the good/bad split from the current table
    /// and bad-stat list.
    fn reclassify(&mut self) {
        self.stats = stat_columns(&self.table);
        self.partition = StatPartition::classify(&self.stats, &self.bad_stats, self.kind);
    }

    fn append(&mut self, data: StatTable) {
        self.table.append(data);
        self.reclassify();
    }

    fn set_bad_stats<S: AsRef<str>>(&mut self, bad: &[S]) {
        self.bad_stats = bad.iter().map(|s| s.as_ref().to_string()).collect();
        self.partition = StatPartition::classify(&self.stats, &self.bad_stats, self.kind);
    }

    fn expected_mean(&self, season: i32, use_default: bool) -> Result<LeagueMean, ProjectionError> {
        if use_default {
            Ok(LeagueMean::builtin(self.kind))
        } else {
            regression::expected_mean(&self.table, season)
        }
    }

    fn operation(&self) -> &'static str {
        match self.kind {
            PlayerKind::Hitter => "hitter projections",
            PlayerKind::Pitcher => "pitcher projections",
        }
    }

    /// Fail early, naming the column, when the table cannot be projected.
    fn check_schema(&self) -> Result<(), ProjectionError> {
        let operation = self.operation();
        for column in [SEASON, PLAYER_ID] {
            if !self.table.has_column(column) {
                return Err(ProjectionError::MissingColumn {
                    column: column.to_string(),
                    operation,
                });
            }
        }
        if let Some(idx) = self.table.column_index(SEASON) {
            if self.table.column_kind(idx) != ColumnKind::Numeric {
                return Err(ProjectionError::NonNumericColumn {
                    column: SEASON.to_string(),
                    operation,
                });
            }
        }
        for column in self.kind.required_columns() {
            if self.stats.iter().any(|s| s == column) {
                continue;
            }
            return Err(if self.table.has_column(column) {
                ProjectionError::NonNumericColumn {
                    column: column.to_string(),
                    operation,
                }
            } else {
                ProjectionError::MissingColumn {
                    column: column.to_string(),
                    operation,
                }
            });
        }
        Ok(())
    }

    fn project(&self, season: i32, use_default: bool, apply_age: bool) -> Result<StatTable, ProjectionError> {
        self.check_schema()?;
        let kind = self.kind;
        let layout = ColumnLayout::new(self.table.columns(), &self.stats);

        let lines = aggregate::cumulative(&self.table, &layout, season, kind.season_weights())?;

        let mean = self.expected_mean(season, use_default)?;
        let target = RegressionTarget::new(&mean, &self.stats, kind.reference_column())?;

        let playing_time = aggregate::prorated_playing_time(&self.table, kind, season)?;
        let denominator = layout
            .stat_index(kind.playing_time_column())
            .ok_or_else(|| ProjectionError::MissingColumn {
                column: kind.playing_time_column().to_string(),
                operation: self.operation(),
            })?;

        let age_field = if apply_age {
            Some(layout.field_index(AGE).ok_or_else(|| ProjectionError::MissingColumn {
                column: AGE.to_string(),
                operation: "the age curve",
            })?)
        } else {
            None
        };
        let good = layout.stat_indexes(&self.partition.good);
        let bad = layout.stat_indexes(&self.partition.bad);

        let mut rows = Vec::with_capacity(lines.len());
        let mut undefined = 0usize;
        for line in &lines {
            let age = match age_field {
                Some(j) => Some(line.fields[j].as_f64().ok_or_else(|| ProjectionError::MissingAge {
                    player: line.player.to_string(),
                })?),
                None => None,
            };

            let blended = target.blend(&line.stats);
            let projected_pt = playing_time.get(&line.player).copied().flatten();
            let mut projected = regression::project_line(&blended, denominator, projected_pt);

            if let (Some(stats), Some(age)) = (projected.as_mut(), age) {
                aging::apply_age_curve(stats, age, &good, &bad);
            }
            if projected.is_none() {
                undefined += 1;
            }

            let row: Vec<Value> = layout
                .slots()
                .iter()
                .map(|slot| match *slot {
                    Slot::Stat(i) => Value::from_computed(projected.as_ref().map(|s| s[i])),
                    Slot::Field(j) => line.fields[j].clone(),
                })
                .collect();
            rows.push(row);
        }

        let mut out = StatTable::from_parts(layout.columns().to_vec(), rows);
        let n = out.len();
        out.set_column(SEASON, vec![Value::from(season); n]);
        let derived = rates::derive_rates(&mut out, kind);

        if undefined > 0 {
            info!("{} {} have undefined projections (no playing-time basis)", undefined, kind.label());
        }
        info!(
            "projected {} {} for {} (default mean: {}, age curve: {}, rates: {:?})",
            out.len(),
            kind.label(),
            season,
            use_default,
            apply_age,
            derived
        );
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Forecaster
// ---------------------------------------------------------------------------

/// Creates Marcel projections from season-by-season hitter and pitcher
/// tables.
///
/// Hitter tables need `playerid`, `Season` and `PA`; pitcher tables need
/// `playerid`, `Season`, `IP`, `TBF`, `G` and `GS`. Every other numeric
/// column is projected as a counting stat.
#[derive(Debug, Clone)]
pub struct Forecaster {
    hitters: PlayerPool,
    pitchers: PlayerPool,
}

impl Forecaster {
    pub fn new(hitters: StatTable, pitchers: StatTable) -> Self {
        Self {
            hitters: PlayerPool::new(PlayerKind::Hitter, hitters),
            pitchers: PlayerPool::new(PlayerKind::Pitcher, pitchers),
        }
    }

    /// Load both tables from CSV files.
    pub fn from_paths(hitters: &Path, pitchers: &Path) -> Result<Self, TableError> {
        Ok(Self::new(StatTable::from_path(hitters)?, StatTable::from_path(pitchers)?))
    }

    pub fn hitters(&self) -> &StatTable {
        &self.hitters.table
    }

    pub fn pitchers(&self) -> &StatTable {
        &self.pitchers.table
    }

    pub fn hitter_stat_columns(&self) -> &[String] {
        &self.hitters.stats
    }

    pub fn pitcher_stat_columns(&self) -> &[String] {
        &self.pitchers.stats
    }

    pub fn hitter_partition(&self) -> &StatPartition {
        &self.hitters.partition
    }

    pub fn pitcher_partition(&self) -> &StatPartition {
        &self.pitchers.partition
    }

    /// Append more hitter rows (another season file, team, ...). Columns are
    /// unioned and nothing is deduplicated.
    pub fn add_hitter_data(&mut self, data: StatTable) {
        self.hitters.append(data);
    }

    pub fn add_pitcher_data(&mut self, data: StatTable) {
        self.pitchers.append(data);
    }

    /// Set which hitting stats hurt the hitter's team. Every other stat
    /// except PA and AB is treated as an improvement by the age curve.
    pub fn set_bad_hitting_stats<S: AsRef<str>>(&mut self, bad: &[S]) {
        self.hitters.set_bad_stats(bad);
    }

    /// Set which pitching stats help the opponents. Every other stat except
    /// TBF and IP is treated as an improvement by the age curve.
    pub fn set_bad_pitching_stats<S: AsRef<str>>(&mut self, bad: &[S]) {
        self.pitchers.set_bad_stats(bad);
    }

    /// League mean hitter for `season`, before scaling: the built-in row or
    /// a 5/4/3 weighted mean of the three prior seasons.
    pub fn expected_mean_hitter(&self, season: i32, use_default: bool) -> Result<LeagueMean, ProjectionError> {
        self.hitters.expected_mean(season, use_default)
    }

    pub fn expected_mean_pitcher(&self, season: i32, use_default: bool) -> Result<LeagueMean, ProjectionError> {
        self.pitchers.expected_mean(season, use_default)
    }

    /// Mean of `stat` over every hitter row.
    pub fn hitter_mean_from_data(&self, stat: &str) -> Option<f64> {
        regression::column_mean(&self.hitters.table, stat)
    }

    pub fn pitcher_mean_from_data(&self, stat: &str) -> Option<f64> {
        regression::column_mean(&self.pitchers.table, stat)
    }

    /// Hitter projections for `season`. One row per player with data in any
    /// of the three prior seasons, in the input table's column order.
    pub fn project_hitters(
        &self,
        season: i32,
        use_default: bool,
        apply_age: bool,
    ) -> Result<StatTable, ProjectionError> {
        self.hitters.project(season, use_default, apply_age)
    }

    /// Pitcher projections for `season`. The age curve always applies.
    pub fn project_pitchers(&self, season: i32, use_default: bool) -> Result<StatTable, ProjectionError> {
        self.pitchers.project(season, use_default, true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
