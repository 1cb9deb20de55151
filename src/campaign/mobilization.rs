//! Mobilization - turning town population into armies
//!
//! A town can field at most `floor(population * rate)` troops over its
//! lifetime, and every soldier raised also comes out of the faction's
//! population pool for the round.

use serde::{Deserialize, Serialize};

use super::route::{Army, ArmyId};
use super::state::GameState;
use crate::core::error::{GameError, Result};
use crate::core::types::Faction;

/// What to mobilize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobilizeOrder<'a> {
    /// Up to `amount` troops from the named town
    Town { name: &'a str, amount: u32 },
    /// Everything every eligible town in the region can still give
    Region,
}

/// One town's contribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobilizationDetail {
    pub town: String,
    pub amount: u32,
    pub army: ArmyId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mobilization {
    pub total: u32,
    pub details: Vec<MobilizationDetail>,
}

impl Mobilization {
    pub fn armies(&self) -> impl Iterator<Item = ArmyId> + '_ {
        self.details.iter().map(|d| d.army)
    }
}

pub fn mobilize(state: &mut GameState, region_id: &str, order: MobilizeOrder<'_>, faction: Faction) -> Result<Mobilization> {
    let region_idx = state
        .map
        .region_idx(region_id)
        .ok_or_else(|| GameError::InvalidLocation(format!("unknown region {}", region_id)))?;

    match order {
        MobilizeOrder::Town { name, amount } => mobilize_town(state, region_idx, name, amount, faction),
        MobilizeOrder::Region => mobilize_region(state, region_idx, faction),
    }
}

fn mobilize_town(
    state: &mut GameState,
    region_idx: usize,
    name: &str,
    amount: u32,
    faction: Faction,
) -> Result<Mobilization> {
    if amount == 0 {
        return Err(GameError::InvalidCommand("mobilize at least one soldier".into()));
    }

    let region = &state.map.regions[region_idx];
    let town_idx = region
        .towns
        .iter()
        .position(|t| t.name == name)
        .ok_or_else(|| GameError::EntityNotFound(format!("no town named {} in {}", name, region.id)))?;
    let town = &region.towns[town_idx];

    if town.owner != faction {
        return Err(GameError::OwnershipMismatch {
            expected: faction,
            actual: town.owner,
        });
    }
    if town.under_construction {
        return Err(GameError::UnderConstruction(town.name.clone()));
    }

    let pool = state.resources.get(faction).population;
    let actual = amount.min(pool).min(town.mobilizable(&state.rules.towns));

    if actual == 0 {
        if pool == 0 {
            return Err(GameError::InsufficientResources {
                needed: amount as f64,
                available: 0.0,
            });
        }
        return Err(GameError::CapacityExceeded(format!(
            "{} has no more troops to give",
            town.name
        )));
    }

    let detail = raise_army(state, region_idx, town_idx, actual);
    Ok(Mobilization {
        total: actual,
        details: vec![detail],
    })
}

fn mobilize_region(state: &mut GameState, region_idx: usize, faction: Faction) -> Result<Mobilization> {
    let region = &state.map.regions[region_idx];
    let eligible: Vec<usize> = region
        .towns
        .iter()
        .enumerate()
        .filter(|(_, t)| t.owner == faction && !t.under_construction)
        .map(|(i, _)| i)
        .collect();

    if eligible.is_empty() {
        return Err(GameError::EntityNotFound(format!(
            "no eligible town for {} in {}",
            faction, region.id
        )));
    }

    let mut result = Mobilization::default();
    for town_idx in eligible {
        let pool = state.resources.get(faction).population;
        let available = state.map.regions[region_idx].towns[town_idx].mobilizable(&state.rules.towns);
        let amount = available.min(pool);
        if amount == 0 {
            continue;
        }

        let detail = raise_army(state, region_idx, town_idx, amount);
        result.total += detail.amount;
        result.details.push(detail);
    }

    Ok(result)
}

/// Commit troops from a town and send them off toward the front
fn raise_army(state: &mut GameState, region_idx: usize, town_idx: usize, amount: u32) -> MobilizationDetail {
    let id = state.next_army_id();
    let round = state.round;

    let town = &mut state.map.regions[region_idx].towns[town_idx];
    town.mobilized += amount;

    let pool = &mut state.resources.get_mut(town.owner).population;
    *pool = pool.saturating_sub(amount);

    let target = state.scenario.conflict_region(town.owner);
    let army = Army::new(id, town, amount, target, round);

    tracing::info!(
        army = id.0,
        faction = %town.owner,
        amount,
        "{} mobilized, bound for {}",
        town.name,
        target
    );

    let detail = MobilizationDetail {
        town: town.name.clone(),
        amount,
        army: id,
    };
    state.armies.push(army);
    detail
}
