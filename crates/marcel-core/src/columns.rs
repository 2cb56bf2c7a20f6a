// Column classification: which columns get forecast, which are carried
// through as identity, and which forecast columns count as "bad" for the
// aging curve.

use crate::error::ProjectionError;
use crate::table::{ColumnKind, StatTable};

pub const SEASON: &str = "Season";
pub const PLAYER_ID: &str = "playerid";
pub const AGE: &str = "Age";

/// Numeric columns that are never forecast.
const IDENTIFYING: &[&str] = &[SEASON, PLAYER_ID, AGE];

/// Seasons S-1, S-2 and S-3 for a projection of `season`.
pub fn prior_seasons(season: i32) -> Result<[i32; 3], ProjectionError> {
    let back = |years: i32| {
        season
            .checked_sub(years)
            .ok_or(ProjectionError::SeasonOutOfRange { season })
    };
    Ok([back(1)?, back(2)?, back(3)?])
}

// ---------------------------------------------------------------------------
// Player kind
// ---------------------------------------------------------------------------

/// Hitters and pitchers share one pipeline and differ only in these constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerKind {
    Hitter,
    Pitcher,
}

impl PlayerKind {
    pub fn label(&self) -> &'static str {
        match self {
            PlayerKind::Hitter => "hitters",
            PlayerKind::Pitcher => "pitchers",
        }
    }

    /// Step-1 weights for seasons S-1, S-2, S-3.
    pub fn season_weights(&self) -> [f64; 3] {
        match self {
            PlayerKind::Hitter => [5.0, 4.0, 3.0],
            PlayerKind::Pitcher => [3.0, 2.0, 1.0],
        }
    }

    /// Column the league mean is scaled by (PA or TBF).
    pub fn reference_column(&self) -> &'static str {
        match self {
            PlayerKind::Hitter => "PA",
            PlayerKind::Pitcher => "TBF",
        }
    }

    /// Column each player's regressed totals are divided by, and the one
    /// the playing-time projection is expressed in (PA or IP).
    pub fn playing_time_column(&self) -> &'static str {
        match self {
            PlayerKind::Hitter => "PA",
            PlayerKind::Pitcher => "IP",
        }
    }

    /// Denominator columns left alone by the aging curve.
    pub fn age_exempt_columns(&self) -> &'static [&'static str] {
        match self {
            PlayerKind::Hitter => &["PA", "AB"],
            PlayerKind::Pitcher => &["TBF", "IP"],
        }
    }

    /// Stat columns a projection cannot run without.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            PlayerKind::Hitter => &["PA"],
            PlayerKind::Pitcher => &["IP", "TBF", "G", "GS"],
        }
    }

    /// Stats where a higher number hurts the player's team.
    pub fn default_bad_stats(&self) -> &'static [&'static str] {
        match self {
            PlayerKind::Hitter => &["SO", "CS", "GDP", "SH"],
            PlayerKind::Pitcher => &["BB", "IBB", "HBP", "ER", "R", "HR", "H", "L"],
        }
    }
}

// ---------------------------------------------------------------------------
// Stat column detection
// ---------------------------------------------------------------------------

/// Numeric columns of `table` in table order, minus Season, playerid and Age.
pub fn stat_columns(table: &StatTable) -> Vec<String> {
    table
        .columns()
        .iter()
        .enumerate()
        .filter(|(idx, name)| {
            table.column_kind(*idx) == ColumnKind::Numeric && !IDENTIFYING.contains(&name.as_str())
        })
        .map(|(_, name)| name.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Good / bad partition
// ---------------------------------------------------------------------------

/// Split of stat columns by the sign of their age adjustment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatPartition {
    pub good: Vec<String>,
    pub bad: Vec<String>,
}

impl StatPartition {
    /// Names in `bad_stats` that are forecast columns become bad (in list
    /// order); every other stat column except the kind's age-exempt
    /// denominators is good. Unknown names are ignored.
    pub fn classify<S: AsRef<str>>(stats: &[String], bad_stats: &[S], kind: PlayerKind) -> Self {
        let exempt = kind.age_exempt_columns();

        let mut bad: Vec<String> = Vec::new();
        for name in bad_stats.iter().map(AsRef::as_ref) {
            let is_stat = stats.iter().any(|s| s == name);
            if is_stat && !exempt.contains(&name) && !bad.iter().any(|b| b == name) {
                bad.push(name.to_string());
            }
        }

        let good = stats
            .iter()
            .filter(|s| !exempt.contains(&s.as_str()) && !bad.contains(*s))
            .cloned()
            .collect();

        Self { good, bad }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Where a table column lives inside a per-player record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Stat(usize),
    Field(usize),
}

/// Mapping between table columns and the two halves of a player record:
/// forecast stats (summed, regressed, aged) and carried fields (max'd).
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    columns: Vec<String>,
    stats: Vec<String>,
    fields: Vec<String>,
    slots: Vec<Slot>,
}

impl ColumnLayout {
    pub fn new(columns: &[String], stats: &[String]) -> Self {
        let mut fields = Vec::new();
        let mut slots = Vec::with_capacity(columns.len());
        for name in columns {
            match stats.iter().position(|s| s == name) {
                Some(i) => slots.push(Slot::Stat(i)),
                None => {
                    slots.push(Slot::Field(fields.len()));
                    fields.push(name.clone());
                }
            }
        }
        Self {
            columns: columns.to_vec(),
            stats: stats.to_vec(),
            fields,
            slots,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn stats(&self) -> &[String] {
        &self.stats
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// One slot per table column, in table order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn stat_index(&self, name: &str) -> Option<usize> {
        self.stats.iter().position(|s| s == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    /// Resolve names to stat indexes, skipping any that are not stats.
    pub fn stat_indexes(&self, names: &[String]) -> Vec<usize> {
        names.iter().filter_map(|n| self.stat_index(n)).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn hitter_table() -> StatTable {
        StatTable::from_rows(
            ["Name", "playerid", "Season", "Age", "PA", "AB", "H", "SO", "SB", "Team"],
            vec![vec![
                Value::from("Mike Trout"),
                Value::from(10155),
                Value::from(2018),
                Value::from(26),
                Value::from(608.0),
                Value::from(471.0),
                Value::from(147.0),
                Value::from(124.0),
                Value::from(24.0),
                Value::from("LAA"),
            ]],
        )
        .unwrap()
    }

    #[test]
    fn stat_columns_exclude_identity_and_text() {
        let stats = stat_columns(&hitter_table());
        assert_eq!(stats, names(&["PA", "AB", "H", "SO", "SB"]));
    }

    #[test]
    fn stat_columns_are_deterministic() {
        let table = hitter_table();
        assert_eq!(stat_columns(&table), stat_columns(&table));
    }

    #[test]
    fn stat_columns_empty_without_numeric_data() {
        let table = StatTable::from_rows(
            ["Name", "Season"],
            vec![vec![Value::from("Mike Trout"), Value::from(2018)]],
        )
        .unwrap();
        assert!(stat_columns(&table).is_empty());
    }

    #[test]
    fn hitter_partition_defaults() {
        let stats = names(&["PA", "AB", "H", "SO", "SB", "CS"]);
        let part = StatPartition::classify(&stats, PlayerKind::Hitter.default_bad_stats(), PlayerKind::Hitter);
        assert_eq!(part.bad, names(&["SO", "CS"]));
        assert_eq!(part.good, names(&["H", "SB"]));
    }

    #[test]
    fn pitcher_partition_exempts_tbf_and_ip() {
        let stats = names(&["W", "L", "G", "GS", "IP", "TBF", "ER", "SO"]);
        let part =
            StatPartition::classify(&stats, PlayerKind::Pitcher.default_bad_stats(), PlayerKind::Pitcher);
        assert_eq!(part.bad, names(&["ER", "L"]));
        assert_eq!(part.good, names(&["W", "G", "GS", "SO"]));
    }

    #[test]
    fn partition_ignores_unknown_duplicate_and_exempt_names() {
        let stats = names(&["PA", "AB", "H", "SO"]);
        let part = StatPartition::classify(&stats, &["SO", "XYZ", "SO", "PA"], PlayerKind::Hitter);
        assert_eq!(part.bad, names(&["SO"]));
        assert_eq!(part.good, names(&["H"]));
    }

    #[test]
    fn prior_seasons_count_back_three_years() {
        assert_eq!(prior_seasons(2019).unwrap(), [2018, 2017, 2016]);
        assert_eq!(prior_seasons(i32::MIN + 3).unwrap(), [i32::MIN + 2, i32::MIN + 1, i32::MIN]);
        assert_eq!(
            prior_seasons(i32::MIN + 2),
            Err(ProjectionError::SeasonOutOfRange { season: i32::MIN + 2 })
        );
    }

    #[test]
    fn layout_splits_stats_and_fields() {
        let table = hitter_table();
        let stats = stat_columns(&table);
        let layout = ColumnLayout::new(table.columns(), &stats);

        assert_eq!(layout.fields(), &names(&["Name", "playerid", "Season", "Age", "Team"])[..]);
        assert_eq!(layout.slots()[0], Slot::Field(0));
        assert_eq!(layout.slots()[4], Slot::Stat(0));
        assert_eq!(layout.slots()[9], Slot::Field(4));
        assert_eq!(layout.stat_index("SO"), Some(3));
        assert_eq!(layout.field_index("Age"), Some(3));
        assert_eq!(layout.stat_indexes(&names(&["SB", "nope", "PA"])), vec![4, 0]);
    }
}
