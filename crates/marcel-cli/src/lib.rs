// Library root: re-exports the CLI modules so integration tests can drive a
// full run without spawning the binary.

pub mod app;
pub mod config;
pub mod output;
