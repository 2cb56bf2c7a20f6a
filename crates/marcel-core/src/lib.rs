// Library root for the Marcel projection engine.
//
// Pipeline order: table -> columns -> aggregate -> regression -> aging -> rates,
// orchestrated by `forecaster::Forecaster`.

pub mod aggregate;
pub mod aging;
pub mod columns;
pub mod error;
pub mod forecaster;
pub mod rates;
pub mod reference;
pub mod regression;
pub mod table;

pub use columns::PlayerKind;
pub use error::ProjectionError;
pub use forecaster::Forecaster;
pub use reference::LeagueMean;
pub use table::{StatTable, TableError, Value};
