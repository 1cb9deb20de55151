//! Phases of the campaign and the single war that ends it

use serde::{Deserialize, Serialize};

use crate::core::config::RulesConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{Faction, PerFaction, Round};

/// Campaign phase, fixed by the round number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No war actions allowed
    Protection,
    /// War may be declared
    Tension,
    War,
}

impl Phase {
    pub fn for_round(round: Round, rules: &RulesConfig) -> Self {
        if round <= rules.protection_end {
            Self::Protection
        } else if round <= rules.tension_end {
            Self::Tension
        } else {
            Self::War
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Protection => write!(f, "protection"),
            Self::Tension => write!(f, "tension"),
            Self::War => write!(f, "war"),
        }
    }
}

/// Declaration and countdown state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarFront {
    pub declared: bool,
    pub declared_by: Option<Faction>,
    pub countdown: u32,
}

/// Result of the war
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarOutcome {
    pub winner: Faction,
    pub final_forces: PerFaction<u32>,
}

impl WarFront {
    /// Declare war; only once, and only during the tension phase
    pub fn declare(&mut self, faction: Faction, phase: Phase, rules: &RulesConfig) -> Result<()> {
        if phase != Phase::Tension {
            return Err(GameError::InvalidPhase(format!(
                "war can only be declared in the tension phase (now {})",
                phase
            )));
        }
        if self.declared {
            return Err(GameError::InvalidPhase("war has already been declared".into()));
        }

        self.declared = true;
        self.declared_by = Some(faction);
        self.countdown = rules.war_countdown;
        Ok(())
    }

    /// Count one round down; true when the countdown has just run out
    pub fn tick(&mut self) -> bool {
        if !self.declared || self.countdown == 0 {
            return false;
        }
        self.countdown -= 1;
        self.countdown == 0
    }

    /// Decide the war on arrived forces; ties go to the side that did not declare
    pub fn resolve(&self, arrived: &PerFaction<u32>) -> WarOutcome {
        let cp = arrived.central_powers;
        let en = arrived.entente;

        let winner = if cp > en {
            Faction::CentralPowers
        } else if en > cp {
            Faction::Entente
        } else {
            match self.declared_by {
                Some(declarer) => declarer.opponent(),
                // Unreachable in play: resolution only follows a declaration
                None => Faction::Entente,
            }
        };

        WarOutcome {
            winner,
            final_forces: *arrived,
        }
    }
}
