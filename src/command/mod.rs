//! Command surface
//!
//! `GameController` is the thread-safe entry point for serving layers.
//! The parser and session drive it from text, one command per line.

pub mod controller;
pub mod executor;
pub mod parser;

pub use controller::{CommandResponse, GameController, RoundOutcome};
pub use executor::Session;
pub use parser::GameCommand;
