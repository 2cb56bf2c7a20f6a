// Errors raised by a projection call. Row-level numeric problems never show
// up here; they become `Value::Missing` cells in the output instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("missing required column `{column}` for {operation}")]
    MissingColumn {
        column: String,
        operation: &'static str,
    },

    #[error("column `{column}` must be numeric for {operation}")]
    NonNumericColumn {
        column: String,
        operation: &'static str,
    },

    #[error("no rows for season {season} while computing {operation}")]
    EmptySeason {
        season: i32,
        operation: &'static str,
    },

    #[error("season {season} has no prior seasons to project from")]
    SeasonOutOfRange { season: i32 },

    #[error("league mean has no usable `{column}` value to scale by")]
    ZeroReferencePlayingTime { column: String },

    #[error("player {player} has no Age value; disable the age curve to project without ages")]
    MissingAge { player: String },
}
