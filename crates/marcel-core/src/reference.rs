// League-mean reference rows used as the regression target.
//
// The built-in rows are a 5/4/3 blend of recent MLB seasons (hitters include
// roughly 2.6% pitchers; pitchers merge starters and relievers). They are
// useful when the loaded data is incomplete enough to skew a live mean.

use crate::columns::PlayerKind;
use crate::error::ProjectionError;

/// Built-in hitter reference row.
pub const DEFAULT_HITTER: &[(&str, f64)] = &[
    ("Season", 2018.1666666666667),
    ("G", 51.51177353805377),
    ("AB", 119.71508052446381),
    ("PA", 133.9807606888398),
    ("H", 30.109325557433724),
    ("1B", 18.985583962330328),
    ("2B", 6.064403346739954),
    ("3B", 0.5830666616544498),
    ("HR", 4.476271586708993),
    ("R", 16.32033556217925),
    ("RBI", 15.589974443437582),
    ("BB", 11.40276845277441),
    ("IBB", 0.6256480181445081),
    ("SO", 29.998066348656),
    ("HBP", 1.3754344554637221),
    ("SF", 0.8533821082483682),
    ("SH", 0.5985380352063702),
    ("GDP", 2.5592693878197363),
    ("SB", 1.7369829381732262),
    ("CS", 0.6493756891466893),
    ("AVG", 0.13013461925019312),
    ("playerid", 11776.34455945105),
];

/// Built-in pitcher reference row.
pub const DEFAULT_PITCHER: &[(&str, f64)] = &[
    ("Season", 2018.1666666666667),
    ("W", 3.0367303071680873),
    ("L", 3.0367303071680873),
    ("ERA", 5.847070224491219),
    ("G", 26.381013513566757),
    ("GS", 6.073460614336175),
    ("CG", 0.059621503114338927),
    ("ShO", 0.02990347444244394),
    ("SV", 1.5010360504908942),
    ("HLD", 3.1259730273385693),
    ("BS", 0.8077962867471701),
    ("IP", 54.01530616395814),
    ("TBF", 232.11361310712672),
    ("H", 52.16922028963712),
    ("R", 28.267709217301455),
    ("ER", 26.200651000332446),
    ("HR", 7.749032043428635),
    ("BB", 19.755219561851067),
    ("IBB", 1.086317006102944),
    ("HBP", 2.380395861422784),
    ("WP", 2.2663944934634954),
    ("BK", 0.1910347156856312),
    ("SO", 51.94216290973079),
    ("playerid", 11982.895321932285),
];

/// An expected "average player" line: one value per column name.
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueMean {
    values: Vec<(String, f64)>,
}

impl LeagueMean {
    pub fn new(values: Vec<(String, f64)>) -> Self {
        Self { values }
    }

    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        Self {
            values: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    /// The built-in reference row for `kind`.
    pub fn builtin(kind: PlayerKind) -> Self {
        match kind {
            PlayerKind::Hitter => Self::from_pairs(DEFAULT_HITTER),
            PlayerKind::Pitcher => Self::from_pairs(DEFAULT_PITCHER),
        }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.iter().find(|(k, _)| k == column).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Scale every value so that `column` equals `basis`:
    /// `value / self[column] * basis`.
    pub fn scaled_to(&self, column: &str, basis: f64) -> Result<LeagueMean, ProjectionError> {
        let denom = self
            .get(column)
            .filter(|v| v.is_finite() && *v != 0.0)
            .ok_or_else(|| ProjectionError::ZeroReferencePlayingTime {
                column: column.to_string(),
            })?;
        Ok(Self {
            values: self
                .values
                .iter()
                .map(|(k, v)| (k.clone(), v / denom * basis))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rows_carry_their_scaling_columns() {
        assert!(LeagueMean::builtin(PlayerKind::Hitter).get("PA").is_some());
        assert!(LeagueMean::builtin(PlayerKind::Pitcher).get("TBF").is_some());
        assert!(LeagueMean::builtin(PlayerKind::Pitcher).get("IP").is_some());
    }

    #[test]
    fn scaled_to_sets_basis_exactly() {
        let scaled = LeagueMean::builtin(PlayerKind::Hitter)
            .scaled_to("PA", 1200.0)
            .unwrap();
        assert_eq!(scaled.get("PA"), Some(1200.0));

        let hr = 4.476271586708993 / 133.9807606888398 * 1200.0;
        assert_eq!(scaled.get("HR"), Some(hr));
    }

    #[test]
    fn scaled_to_rejects_zero_or_absent_basis() {
        let mean = LeagueMean::from_pairs(&[("PA", 0.0), ("H", 10.0)]);
        assert_eq!(
            mean.scaled_to("PA", 1200.0).unwrap_err(),
            ProjectionError::ZeroReferencePlayingTime { column: "PA".into() }
        );
        assert!(mean.scaled_to("TBF", 1200.0).is_err());
    }

    #[test]
    fn builtin_rows_are_independent_values() {
        let mut a = LeagueMean::builtin(PlayerKind::Hitter);
        a = a.scaled_to("PA", 600.0).unwrap();
        let b = LeagueMean::builtin(PlayerKind::Hitter);
        assert_eq!(a.get("PA"), Some(600.0));
        assert_eq!(b.get("PA"), Some(133.9807606888398));
    }
}
