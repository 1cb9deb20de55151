//! Rail Front - Turn-Based Campaign Simulation
//!
//! Two factions build towns and railways on a hex map, mobilize their
//! populations and race troops by rail to a contested region before the
//! war is called.

pub mod campaign;
pub mod command;
pub mod core;
