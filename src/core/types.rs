//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Round counter (simulation time unit)
pub type Round = u32;

/// One of the two warring sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    CentralPowers,
    Entente,
}

impl Faction {
    pub const ALL: [Faction; 2] = [Faction::CentralPowers, Faction::Entente];

    pub fn opponent(&self) -> Self {
        match self {
            Self::CentralPowers => Self::Entente,
            Self::Entente => Self::CentralPowers,
        }
    }

    /// Stable key used in config files and command input
    pub fn key(&self) -> &'static str {
        match self {
            Self::CentralPowers => "central_powers",
            Self::Entente => "entente",
        }
    }

    /// Parse a faction from user input (`central_powers`, `central`, `cp`, `entente`, `en`)
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "central_powers" | "central" | "cp" => Some(Self::CentralPowers),
            "entente" | "en" => Some(Self::Entente),
            _ => None,
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CentralPowers => write!(f, "Central Powers"),
            Self::Entente => write!(f, "Entente"),
        }
    }
}

/// A value held once per faction
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerFaction<T> {
    pub central_powers: T,
    pub entente: T,
}

impl<T> PerFaction<T> {
    pub fn new(central_powers: T, entente: T) -> Self {
        Self { central_powers, entente }
    }

    pub fn get(&self, faction: Faction) -> &T {
        match faction {
            Faction::CentralPowers => &self.central_powers,
            Faction::Entente => &self.entente,
        }
    }

    pub fn get_mut(&mut self, faction: Faction) -> &mut T {
        match faction {
            Faction::CentralPowers => &mut self.central_powers,
            Faction::Entente => &mut self.entente,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Faction, &T)> {
        [
            (Faction::CentralPowers, &self.central_powers),
            (Faction::Entente, &self.entente),
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faction_opponent() {
        assert_eq!(Faction::CentralPowers.opponent(), Faction::Entente);
        assert_eq!(Faction::Entente.opponent(), Faction::CentralPowers);
    }

    #[test]
    fn test_faction_parse() {
        assert_eq!(Faction::parse("cp"), Some(Faction::CentralPowers));
        assert_eq!(Faction::parse(" Entente "), Some(Faction::Entente));
        assert_eq!(Faction::parse("ottoman"), None);
    }

    #[test]
    fn test_per_faction_access() {
        let mut tally = PerFaction::new(0u32, 0u32);
        *tally.get_mut(Faction::Entente) += 40;
        assert_eq!(*tally.get(Faction::Entente), 40);
        assert_eq!(*tally.get(Faction::CentralPowers), 0);
        assert_eq!(tally.iter().count(), 2);
    }

    #[test]
    fn test_faction_serde_key() {
        let json = serde_json::to_string(&Faction::CentralPowers).unwrap();
        assert_eq!(json, "\"central_powers\"");
    }
}
