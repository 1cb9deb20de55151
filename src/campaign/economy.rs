//! Per-round economy: GDP accrual and population pools

use serde::{Deserialize, Serialize};

use super::map::{CampaignMap, Region};
use super::network::TownGraph;
use super::town::TownId;
use crate::core::config::RulesConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{Faction, PerFaction};

/// A faction's stock of GDP and mobilizable population
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub gdp: f64,
    pub population: u32,
}

impl Resources {
    pub fn new(gdp: f64) -> Self {
        Self { gdp, population: 0 }
    }

    pub fn can_afford(&self, cost: f64) -> bool {
        self.gdp >= cost
    }

    /// Check funds without spending them
    pub fn ensure(&self, cost: f64) -> Result<()> {
        if !self.can_afford(cost) {
            return Err(GameError::InsufficientResources {
                needed: cost,
                available: self.gdp,
            });
        }
        Ok(())
    }

    pub fn spend(&mut self, cost: f64) -> Result<()> {
        self.ensure(cost)?;
        self.gdp -= cost;
        Ok(())
    }
}

/// Resources of both factions
pub type Treasury = PerFaction<Resources>;

/// What one faction earned in a round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccrualReport {
    pub round_gdp: f64,
    pub population: u32,
    /// Regions where the connectivity bonus applied
    pub bonus_regions: Vec<String>,
}

/// GDP a faction draws from one region, and whether the bonus applied
pub fn region_gdp(region: &Region, faction: Faction, rules: &RulesConfig) -> (f64, bool) {
    let owned: Vec<_> = region.towns.iter().filter(|t| t.owner == faction).collect();
    let base: f64 = owned.iter().map(|t| t.gdp(&rules.towns)).sum();

    if owned.len() < 2 {
        return (base, false);
    }

    let ids: Vec<TownId> = owned.iter().map(|t| t.id).collect();
    if TownGraph::build(region).all_connected(&ids) {
        (base * rules.connectivity_bonus, true)
    } else {
        (base, false)
    }
}

/// Credit each faction's round income and recount its population pool
pub fn accrue(map: &CampaignMap, rules: &RulesConfig, treasury: &mut Treasury) -> PerFaction<AccrualReport> {
    let mut reports = PerFaction::<AccrualReport>::default();

    for faction in Faction::ALL {
        let report = reports.get_mut(faction);

        for region in &map.regions {
            let (gdp, bonus) = region_gdp(region, faction, rules);
            report.round_gdp += gdp;
            if bonus {
                report.bonus_regions.push(region.id.clone());
            }
        }

        report.population = map
            .regions
            .iter()
            .flat_map(|r| r.towns.iter())
            .filter(|t| t.owner == faction && !t.under_construction)
            .map(|t| t.population)
            .sum();

        let resources = treasury.get_mut(faction);
        resources.gdp += report.round_gdp;
        resources.population = report.population;

        tracing::debug!(
            faction = %faction,
            gdp = report.round_gdp,
            population = report.population,
            "round income"
        );
    }

    reports
}
