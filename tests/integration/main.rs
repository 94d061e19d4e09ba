//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a slice of the game
//! core against mock adapters: a manually advanced clock, a recording
//! broadcast sink, and a call-counting wrapper around the in-memory
//! store. No network or database is required.

mod game_flow_tests;
mod mocks;
