// Steps 2-4: regress weighted totals toward a league mean, convert to rates
// and rescale to projected playing time.

use tracing::warn;

use crate::columns::{prior_seasons, SEASON};
use crate::error::ProjectionError;
use crate::reference::LeagueMean;
use crate::table::{ColumnKind, StatTable};

/// Playing time (PA for hitters, TBF for pitchers) the league mean is
/// scaled to before being added to each player.
pub const REFERENCE_PLAYING_TIME: f64 = 1200.0;

/// Season weights for the live league mean (S-1, S-2, S-3).
const MEAN_WEIGHTS: [f64; 3] = [5.0, 4.0, 3.0];
const MEAN_WEIGHT_TOTAL: f64 = 12.0;

// ---------------------------------------------------------------------------
// Live league mean
// ---------------------------------------------------------------------------

/// Weighted league mean computed from the table itself:
/// `(5*mean(S-1) + 4*mean(S-2) + 3*mean(S-3)) / 12`, column by column over
/// every numeric column.
///
/// Each season must have at least one row. A column with no values in a
/// season yields NaN for that column.
pub fn expected_mean(table: &StatTable, season: i32) -> Result<LeagueMean, ProjectionError> {
    const OPERATION: &str = "the league mean";
    let season_idx = table
        .column_index(SEASON)
        .ok_or_else(|| ProjectionError::MissingColumn {
            column: SEASON.to_string(),
            operation: OPERATION,
        })?;

    let numeric: Vec<usize> = (0..table.columns().len())
        .filter(|&idx| table.column_kind(idx) == ColumnKind::Numeric)
        .collect();

    let mut blended = vec![0.0; numeric.len()];
    for (target, weight) in prior_seasons(season)?.into_iter().zip(&MEAN_WEIGHTS) {
        let rows: Vec<&Vec<_>> = table
            .rows()
            .iter()
            .filter(|r| r[season_idx].as_f64() == Some(f64::from(target)))
            .collect();
        if rows.is_empty() {
            return Err(ProjectionError::EmptySeason {
                season: target,
                operation: OPERATION,
            });
        }

        for (slot, &idx) in numeric.iter().enumerate() {
            let (sum, count) = rows
                .iter()
                .filter_map(|r| r[idx].as_f64())
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            let mean = if count == 0 { f64::NAN } else { sum / count as f64 };
            blended[slot] += mean * weight;
        }
    }

    Ok(LeagueMean::new(
        numeric
            .iter()
            .zip(blended)
            .map(|(&idx, total)| (table.columns()[idx].clone(), total / MEAN_WEIGHT_TOTAL))
            .collect(),
    ))
}

/// Mean of one column over every row of the table, missing cells skipped.
pub fn column_mean(table: &StatTable, column: &str) -> Option<f64> {
    let values = table.column(column)?;
    let (sum, count) = values
        .iter()
        .filter_map(|v| v.as_f64())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

// ---------------------------------------------------------------------------
// Regression target
// ---------------------------------------------------------------------------

/// A league mean scaled to `REFERENCE_PLAYING_TIME` and aligned with a
/// table's stat columns, ready to be added to every player.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTarget {
    offsets: Vec<f64>,
}

impl RegressionTarget {
    /// Scale `mean` so its `basis_column` equals 1200 and line it up with
    /// `stats`. Stats absent from the mean get no regression (offset 0).
    pub fn new(mean: &LeagueMean, stats: &[String], basis_column: &str) -> Result<Self, ProjectionError> {
        let scaled = mean.scaled_to(basis_column, REFERENCE_PLAYING_TIME)?;
        let offsets = stats
            .iter()
            .map(|name| match scaled.get(name) {
                Some(v) => v,
                None => {
                    warn!("league mean has no `{}`; projecting it without regression", name);
                    0.0
                }
            })
            .collect();
        Ok(Self { offsets })
    }

    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Step 3 blend: player totals plus the scaled league mean.
    pub fn blend(&self, totals: &[f64]) -> Vec<f64> {
        totals.iter().zip(&self.offsets).map(|(t, m)| t + m).collect()
    }
}

// ---------------------------------------------------------------------------
// Rate and rescale
// ---------------------------------------------------------------------------

/// Step 4: divide every blended stat by the player's own playing time at
/// `denominator`, then multiply by the projected playing time.
///
/// Returns `None` when the projected playing time is undefined or the
/// denominator is zero; every stat of that player is then undefined.
pub fn project_line(blended: &[f64], denominator: usize, target: Option<f64>) -> Option<Vec<f64>> {
    let target = target.filter(|t| t.is_finite())?;
    let denom = blended.get(denominator).copied().filter(|d| *d != 0.0 && d.is_finite())?;
    Some(blended.iter().map(|v| v / denom * target).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
