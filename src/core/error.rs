use thiserror::Error;

use crate::core::types::Faction;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Insufficient resources: need {needed}, have {available}")]
    InsufficientResources { needed: f64, available: f64 },

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Hexes ({from}) and ({to}) are not adjacent")]
    NotAdjacent { from: String, to: String },

    #[error("Already occupied: {0}")]
    DuplicateOccupancy(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Invalid phase: {0}")]
    InvalidPhase(String),

    #[error("Owned by {actual}, not {expected}")]
    OwnershipMismatch { expected: Faction, actual: Faction },

    #[error("Under construction: {0}")]
    UnderConstruction(String),

    #[error("Not connected by rail: {0}")]
    NotConnected(String),

    #[error("Troops already mobilized from {0}")]
    TroopsCommitted(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl GameError {
    /// True for expected rule failures a player can trigger; false for faults.
    pub fn is_rule_violation(&self) -> bool {
        !matches!(
            self,
            Self::Internal(_) | Self::InvalidConfig(_) | Self::Io(_) | Self::Toml(_) | Self::Serde(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
