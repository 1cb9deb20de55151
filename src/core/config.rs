//! Game rules configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Every table is indexed by a closed
//! enumeration (`TownLevel`, `RailwayLevel`) rather than by string tags.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::campaign::railway::RailwayLevel;
use crate::campaign::town::TownLevel;
use crate::core::error::{GameError, Result};
use crate::core::types::Round;

/// How railway troop load behaves across rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RailLoadPolicy {
    /// Load counts troops carried during the current round and is cleared
    /// before armies move each round
    #[default]
    PerRound,
    /// Load only ever grows; a saturated line stays saturated
    Cumulative,
}

/// Fixed attributes of one town level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TownSpec {
    /// GDP cost to found a town at this level
    pub cost: f64,
    /// Population once construction completes
    pub population: u32,
    /// GDP yield per round once complete
    pub gdp: f64,
    /// Fraction of population that can be mobilized
    pub mobilization_rate: f64,
    /// Maximum towns of this level in a single region
    pub region_cap: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TownTable {
    pub village: TownSpec,
    pub small_city: TownSpec,
    pub large_city: TownSpec,
}

impl TownTable {
    pub fn get(&self, level: TownLevel) -> &TownSpec {
        match level {
            TownLevel::Village => &self.village,
            TownLevel::SmallCity => &self.small_city,
            TownLevel::LargeCity => &self.large_city,
        }
    }
}

impl Default for TownTable {
    fn default() -> Self {
        Self {
            village: TownSpec {
                cost: 50.0,
                population: 100,
                gdp: 20.0,
                mobilization_rate: 0.5,
                region_cap: 4,
            },
            small_city: TownSpec {
                cost: 150.0,
                population: 200,
                gdp: 50.0,
                mobilization_rate: 0.4,
                region_cap: 2,
            },
            large_city: TownSpec {
                cost: 300.0,
                population: 400,
                gdp: 120.0,
                mobilization_rate: 0.3,
                region_cap: 1,
            },
        }
    }
}

/// Fixed attributes of one railway level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RailwaySpec {
    pub cost: f64,
    /// Troops the line can carry (see `RailLoadPolicy`)
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailwayTable {
    pub level_1: RailwaySpec,
    pub level_2: RailwaySpec,
    pub level_3: RailwaySpec,
}

impl RailwayTable {
    pub fn get(&self, level: RailwayLevel) -> &RailwaySpec {
        match level {
            RailwayLevel::One => &self.level_1,
            RailwayLevel::Two => &self.level_2,
            RailwayLevel::Three => &self.level_3,
        }
    }
}

impl Default for RailwayTable {
    fn default() -> Self {
        Self {
            level_1: RailwaySpec { cost: 30.0, capacity: 100 },
            level_2: RailwaySpec { cost: 60.0, capacity: 300 },
            level_3: RailwaySpec { cost: 100.0, capacity: 1000 },
        }
    }
}

/// Cost of merging two towns of a level into one town of the next level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeRule {
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeTable {
    /// Two villages into one small city
    pub village: UpgradeRule,
    /// Two small cities into one large city
    pub small_city: UpgradeRule,
}

impl UpgradeTable {
    /// Rule for merging two towns of `from`; large cities have no upgrade
    pub fn get(&self, from: TownLevel) -> Option<&UpgradeRule> {
        match from {
            TownLevel::Village => Some(&self.village),
            TownLevel::SmallCity => Some(&self.small_city),
            TownLevel::LargeCity => None,
        }
    }
}

impl Default for UpgradeTable {
    fn default() -> Self {
        Self {
            village: UpgradeRule { cost: 150.0 },
            small_city: UpgradeRule { cost: 400.0 },
        }
    }
}

/// Rules for a whole game
///
/// These values define the pacing of the campaign. Changing them
/// shifts how early a faction can afford to mobilize and how long
/// the war window stays open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    // === ECONOMY ===
    /// GDP each faction starts with
    ///
    /// At 200 a faction can found exactly four villages before
    /// its first income arrives.
    pub starting_gdp: f64,

    /// Multiplier applied to a region's GDP when all of a faction's
    /// towns there are linked by completed railways
    pub connectivity_bonus: f64,

    // === CALENDAR ===
    /// Last playable round
    pub max_rounds: Round,

    /// Last round of the protection phase (no war actions)
    pub protection_end: Round,

    /// Last round of the tension phase (war may be declared)
    pub tension_end: Round,

    /// Rounds between a declaration and resolution
    pub war_countdown: u32,

    // === TRANSIT ===
    /// Army age (in rounds) at which it starts loading
    pub loading_after: Round,

    /// Army age (in rounds) at which it starts moving
    pub transport_after: Round,

    /// Maximum railway hops an army makes per round
    pub max_hops_per_round: usize,

    pub rail_load_policy: RailLoadPolicy,

    // === TABLES ===
    pub towns: TownTable,
    pub railways: RailwayTable,
    pub upgrades: UpgradeTable,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            starting_gdp: 200.0,
            connectivity_bonus: 1.2,

            max_rounds: 75,
            protection_end: 30,
            tension_end: 40,
            war_countdown: 3,

            loading_after: 1,
            transport_after: 2,
            max_hops_per_round: 5,
            rail_load_policy: RailLoadPolicy::PerRound,

            towns: TownTable::default(),
            railways: RailwayTable::default(),
            upgrades: UpgradeTable::default(),
        }
    }
}

impl RulesConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rules from a TOML string; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RulesConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load rules from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.protection_end >= self.tension_end {
            return Err(GameError::InvalidConfig(format!(
                "protection_end ({}) must be before tension_end ({})",
                self.protection_end, self.tension_end
            )));
        }

        if self.tension_end > self.max_rounds {
            return Err(GameError::InvalidConfig(format!(
                "tension_end ({}) must not exceed max_rounds ({})",
                self.tension_end, self.max_rounds
            )));
        }

        if self.war_countdown == 0 {
            return Err(GameError::InvalidConfig("war_countdown must be positive".into()));
        }

        if self.transport_after <= self.loading_after {
            return Err(GameError::InvalidConfig(format!(
                "transport_after ({}) must come after loading_after ({})",
                self.transport_after, self.loading_after
            )));
        }

        if self.max_hops_per_round == 0 {
            return Err(GameError::InvalidConfig("max_hops_per_round must be positive".into()));
        }

        if self.connectivity_bonus < 1.0 {
            return Err(GameError::InvalidConfig(format!(
                "connectivity_bonus ({}) must be at least 1.0",
                self.connectivity_bonus
            )));
        }

        for level in TownLevel::ALL {
            let spec = self.towns.get(level);
            if !(spec.mobilization_rate > 0.0 && spec.mobilization_rate <= 1.0) {
                return Err(GameError::InvalidConfig(format!(
                    "{} mobilization_rate ({}) must be in (0, 1]",
                    level, spec.mobilization_rate
                )));
            }
        }

        for level in RailwayLevel::ALL {
            if self.railways.get(level).capacity == 0 {
                return Err(GameError::InvalidConfig(format!("{} capacity must be positive", level)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RulesConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_tables() {
        let config = RulesConfig::default();
        assert_eq!(config.towns.get(TownLevel::Village).cost, 50.0);
        assert_eq!(config.towns.get(TownLevel::SmallCity).population, 200);
        assert_eq!(config.towns.get(TownLevel::LargeCity).region_cap, 1);
        assert_eq!(config.railways.get(RailwayLevel::Two).capacity, 300);
        assert_eq!(config.upgrades.get(TownLevel::Village).map(|u| u.cost), Some(150.0));
        assert!(config.upgrades.get(TownLevel::LargeCity).is_none());
    }

    #[test]
    fn test_partial_toml_override() {
        let config = RulesConfig::from_toml_str(
            r#"
            starting_gdp = 500.0
            rail_load_policy = "cumulative"

            [railways.level_1]
            cost = 10.0
            capacity = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.starting_gdp, 500.0);
        assert_eq!(config.rail_load_policy, RailLoadPolicy::Cumulative);
        assert_eq!(config.railways.level_1.capacity, 50);
        // Untouched keys keep defaults
        assert_eq!(config.railways.level_3.capacity, 1000);
        assert_eq!(config.max_rounds, 75);
    }

    #[test]
    fn test_shipped_rules_match_defaults() {
        let shipped = RulesConfig::from_toml_str(include_str!("../../data/rules.toml")).unwrap();
        assert_eq!(shipped, RulesConfig::default());
    }

    #[test]
    fn test_validate_rejects_inverted_phases() {
        let config = RulesConfig {
            protection_end: 40,
            tension_end: 30,
            ..RulesConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_rate() {
        let mut config = RulesConfig::default();
        config.towns.village.mobilization_rate = 1.5;
        assert!(config.validate().is_err());
    }
}
