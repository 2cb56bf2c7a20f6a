// Derived rate stats (AVG, OBP, ERA, FIP, ...) recomputed from projected
// counting stats.
//
// Each formula lists its inputs. A formula whose inputs are not all present
// in the table is skipped as a whole; a player whose input cell is missing,
// or whose denominator is zero, gets a missing value for that stat only.

use tracing::debug;

use crate::columns::PlayerKind;
use crate::table::{StatTable, Value};

/// Where a formula argument comes from.
#[derive(Debug, Clone, Copy)]
enum Input {
    Column(&'static str),
    /// First candidate whose columns all exist, summed left to right.
    FirstOf(&'static [&'static [&'static str]]),
    /// A stat produced earlier in the same pass.
    Derived(&'static str),
}

struct Formula {
    stat: &'static str,
    inputs: &'static [Input],
    eval: fn(&[f64]) -> Option<f64>,
}

const HITS: Input = Input::FirstOf(&[&["H"], &["1B", "2B", "3B", "HR"]]);
const STRIKEOUTS: Input = Input::FirstOf(&[&["K"], &["SO"]]);

const HITTER_RATES: &[Formula] = &[
    Formula {
        stat: "AVG",
        inputs: &[HITS, Input::Column("AB")],
        eval: avg,
    },
    Formula {
        stat: "SLG",
        inputs: &[
            Input::Column("1B"),
            Input::Column("2B"),
            Input::Column("3B"),
            Input::Column("HR"),
            Input::Column("AB"),
        ],
        eval: slg,
    },
    Formula {
        stat: "OBP",
        inputs: &[HITS, Input::Column("BB"), Input::Column("HBP"), Input::Column("PA")],
        eval: obp,
    },
    Formula {
        stat: "OPS",
        inputs: &[Input::Derived("OBP"), Input::Derived("SLG")],
        eval: ops,
    },
];

const PITCHER_RATES: &[Formula] = &[
    Formula {
        stat: "ERA",
        inputs: &[Input::Column("ER"), Input::Column("IP")],
        eval: per_nine,
    },
    Formula {
        stat: "FIP",
        inputs: &[STRIKEOUTS, Input::Column("BB"), Input::Column("HR"), Input::Column("IP")],
        eval: fip,
    },
    Formula {
        stat: "K/9",
        inputs: &[STRIKEOUTS, Input::Column("IP")],
        eval: per_nine,
    },
    Formula {
        stat: "BB/9",
        inputs: &[Input::Column("BB"), Input::Column("IP")],
        eval: per_nine,
    },
    Formula {
        stat: "WHIP",
        inputs: &[STRIKEOUTS, Input::Column("BB"), Input::Column("IP")],
        eval: whip,
    },
];

/// FIP constant added to the per-inning component.
const FIP_CONSTANT: f64 = 3.2;

fn ratio(num: f64, denom: f64) -> Option<f64> {
    (denom != 0.0).then(|| num / denom)
}

fn avg(v: &[f64]) -> Option<f64> {
    ratio(v[0], v[1])
}

fn slg(v: &[f64]) -> Option<f64> {
    ratio(v[0] + 2.0 * v[1] + 3.0 * v[2] + 4.0 * v[3], v[4])
}

fn obp(v: &[f64]) -> Option<f64> {
    ratio(v[0] + v[1] + v[2], v[3])
}

fn ops(v: &[f64]) -> Option<f64> {
    Some(v[0] + v[1])
}

fn per_nine(v: &[f64]) -> Option<f64> {
    ratio(v[0], v[1]).map(|r| r * 9.0)
}

fn fip(v: &[f64]) -> Option<f64> {
    ratio(v[0] * -2.0 + v[1] * 3.0 + v[2] * 13.0, v[3]).map(|r| r + FIP_CONSTANT)
}

fn whip(v: &[f64]) -> Option<f64> {
    ratio(v[0] + v[1], v[2])
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

enum Resolved {
    Sum(Vec<usize>),
    Derived(usize),
}

fn resolve(table: &StatTable, derived: &[(&'static str, Vec<Option<f64>>)], input: Input) -> Option<Resolved> {
    match input {
        Input::Column(name) => table.column_index(name).map(|i| Resolved::Sum(vec![i])),
        Input::FirstOf(candidates) => candidates.iter().find_map(|cols| {
            cols.iter()
                .map(|c| table.column_index(c))
                .collect::<Option<Vec<usize>>>()
                .map(Resolved::Sum)
        }),
        Input::Derived(name) => derived.iter().position(|(s, _)| *s == name).map(Resolved::Derived),
    }
}

impl Resolved {
    fn value(&self, table: &StatTable, derived: &[(&'static str, Vec<Option<f64>>)], row: usize) -> Option<f64> {
        match self {
            Resolved::Sum(cols) => cols
                .iter()
                .map(|&c| table.rows()[row][c].as_f64())
                .sum::<Option<f64>>(),
            Resolved::Derived(i) => derived[*i].1[row],
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Recompute the rate stats for `kind` in place, overwriting existing columns
/// and appending new ones. Returns the stats that were written.
///
/// A rate column already in the table whose formula cannot run is cleared:
/// its cells went through the pipeline as a counting stat and mean nothing.
pub fn derive_rates(table: &mut StatTable, kind: PlayerKind) -> Vec<&'static str> {
    let formulas = match kind {
        PlayerKind::Hitter => HITTER_RATES,
        PlayerKind::Pitcher => PITCHER_RATES,
    };

    let (derived, skipped) = evaluate(table, formulas);
    for (stat, values) in &derived {
        table.set_column(stat, values.iter().map(|v| Value::from_computed(*v)).collect());
    }
    for stat in skipped {
        if table.has_column(stat) {
            debug!("clearing {}: inputs not present", stat);
            table.set_column(stat, vec![Value::Missing; table.len()]);
        }
    }
    derived.into_iter().map(|(stat, _)| stat).collect()
}

/// Evaluated formulas in order, plus the stats whose inputs were absent.
fn evaluate(
    table: &StatTable,
    formulas: &[Formula],
) -> (Vec<(&'static str, Vec<Option<f64>>)>, Vec<&'static str>) {
    let mut derived: Vec<(&'static str, Vec<Option<f64>>)> = Vec::new();
    let mut skipped = Vec::new();
    for formula in formulas {
        let resolved: Option<Vec<Resolved>> = formula
            .inputs
            .iter()
            .map(|input| resolve(table, &derived, *input))
            .collect();
        let Some(resolved) = resolved else {
            debug!("skipping {}: inputs not present", formula.stat);
            skipped.push(formula.stat);
            continue;
        };

        let values = (0..table.len())
            .map(|row| {
                let args: Option<Vec<f64>> = resolved
                    .iter()
                    .map(|r| r.value(table, &derived, row))
                    .collect();
                args.and_then(|a| (formula.eval)(&a))
            })
            .collect();
        derived.push((formula.stat, values));
    }
    (derived, skipped)
}

pub fn set_hitter_rates(table: &mut StatTable) -> Vec<&'static str> {
    derive_rates(table, PlayerKind::Hitter)
}

pub fn set_pitcher_rates(table: &mut StatTable) -> Vec<&'static str> {
    derive_rates(table, PlayerKind::Pitcher)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
