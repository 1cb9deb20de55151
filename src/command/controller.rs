//! Thread-safe handle over a running game
//!
//! The serving layer owns a `GameController` (usually behind an `Arc`) and
//! calls it from any thread. Every command holds the lock for its whole run,
//! so a snapshot never observes a half-applied command.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

use crate::campaign::map::{HexCoord, Scenario};
use crate::campaign::mobilization::{Mobilization, MobilizeOrder};
use crate::campaign::railway::{RailwayId, RailwayLevel};
use crate::campaign::state::{GameSnapshot, GameState, RoundReport};
use crate::campaign::town::{TownId, TownLevel};
use crate::core::config::RulesConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::Faction;

/// Wire shape for command results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    pub message: String,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    /// Map a command result; rule violations become failures with their reason
    pub fn from_result<T>(result: &Result<T>, describe: impl FnOnce(&T) -> String) -> Self {
        match result {
            Ok(value) => Self::ok(describe(value)),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

/// Result of advancing a round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// False once the war is decided or the last round has passed
    pub can_continue: bool,
    pub report: RoundReport,
    pub snapshot: GameSnapshot,
}

pub struct GameController {
    state: Mutex<GameState>,
}

impl GameController {
    pub fn new(scenario: Scenario, rules: RulesConfig) -> Result<Self> {
        Ok(Self {
            state: Mutex::new(GameState::new(scenario, rules)?),
        })
    }

    /// Built-in scenario with default rules
    pub fn with_defaults() -> Result<Self> {
        Self::new(Scenario::western_front()?, RulesConfig::default())
    }

    fn lock(&self) -> Result<MutexGuard<'_, GameState>> {
        self.state
            .lock()
            .map_err(|_| GameError::Internal("game state lock poisoned".into()))
    }

    /// Start over with the same scenario and rules
    pub fn reset(&self) -> Result<()> {
        let mut state = self.lock()?;
        let fresh = GameState::new(state.scenario.clone(), state.rules.clone())?;
        *state = fresh;
        tracing::info!("game reset");
        Ok(())
    }

    pub fn snapshot(&self) -> Result<GameSnapshot> {
        Ok(self.lock()?.snapshot())
    }

    pub fn snapshot_json(&self) -> Result<String> {
        let snapshot = self.snapshot()?;
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Run a closure against the locked state; for read-only queries
    pub fn inspect<T>(&self, f: impl FnOnce(&GameState) -> T) -> Result<T> {
        let state = self.lock()?;
        Ok(f(&state))
    }

    pub fn build_town(&self, region_id: &str, hex: HexCoord, name: &str, faction: Faction) -> Result<TownId> {
        let result = self.lock()?.build_town(region_id, hex, name, faction);
        log_rejection("build_town", faction, &result);
        result
    }

    pub fn build_railway(&self, region_id: &str, start: HexCoord, end: HexCoord, faction: Faction) -> Result<RailwayId> {
        self.build_railway_with_level(region_id, start, end, faction, RailwayLevel::One)
    }

    pub fn build_railway_with_level(
        &self,
        region_id: &str,
        start: HexCoord,
        end: HexCoord,
        faction: Faction,
        level: RailwayLevel,
    ) -> Result<RailwayId> {
        let result = self
            .lock()?
            .build_railway_with_level(region_id, start, end, faction, level);
        log_rejection("build_railway", faction, &result);
        result
    }

    /// Mobilize from one named town, or from the whole region when `region_wide`
    pub fn mobilize(
        &self,
        region_id: &str,
        town_name: Option<&str>,
        amount: Option<u32>,
        faction: Faction,
        region_wide: bool,
    ) -> Result<Mobilization> {
        let order = if region_wide {
            MobilizeOrder::Region
        } else {
            let name = town_name.ok_or_else(|| GameError::InvalidCommand("town name required".into()))?;
            let amount = amount.ok_or_else(|| GameError::InvalidCommand("amount required".into()))?;
            MobilizeOrder::Town { name, amount }
        };

        let result = self.lock()?.mobilize(region_id, order, faction);
        log_rejection("mobilize", faction, &result);
        result
    }

    pub fn declare_war(&self, faction: Faction) -> Result<()> {
        let result = self.lock()?.declare_war(faction);
        log_rejection("declare_war", faction, &result);
        result
    }

    pub fn upgrade_town(
        &self,
        region_id: &str,
        a: HexCoord,
        b: HexCoord,
        faction: Faction,
        upgrade_type: TownLevel,
    ) -> Result<TownId> {
        let result = self.lock()?.upgrade_town(region_id, a, b, faction, upgrade_type);
        log_rejection("upgrade_town", faction, &result);
        result
    }

    pub fn advance_round(&self, faction: Faction) -> Result<RoundOutcome> {
        let mut state = self.lock()?;
        let report = match state.advance_round(faction) {
            Ok(report) => report,
            Err(e) => {
                tracing::debug!(faction = %faction, "advance_round rejected: {}", e);
                return Err(e);
            }
        };

        Ok(RoundOutcome {
            can_continue: !state.is_over(),
            report,
            snapshot: state.snapshot(),
        })
    }
}

fn log_rejection<T>(command: &str, faction: Faction, result: &Result<T>) {
    if let Err(e) = result {
        if e.is_rule_violation() {
            tracing::debug!(faction = %faction, "{} rejected: {}", command, e);
        } else {
            tracing::warn!(faction = %faction, "{} failed: {}", command, e);
        }
    }
}
