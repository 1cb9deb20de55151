//! Armies and their transit by rail to the front
//!
//! An army is born in a town, spends a round forming and a round loading,
//! then rides the rail network toward its faction's conflict region. Each
//! railway can only carry so many troops, and an army never splits: if the
//! next line cannot take all of it, it waits.

use serde::{Deserialize, Serialize};

use super::map::{CampaignMap, HexCoord};
use super::network::{find_path_to_region, railway_between};
use super::town::{Town, TownId, TownLevel};
use super::railway::RailwayId;
use crate::core::config::RulesConfig;
use crate::core::types::{Faction, PerFaction, Round};

/// Unique identifier for an army
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArmyId(pub u32);

/// Transit lifecycle; `Arrived` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmyStatus {
    Generating,
    Loading,
    Transporting,
    Arrived,
}

impl ArmyStatus {
    /// Status for an army of this age, before arrival is considered
    pub fn for_age(age: Round, rules: &RulesConfig) -> Self {
        if age >= rules.transport_after {
            Self::Transporting
        } else if age >= rules.loading_after {
            Self::Loading
        } else {
            Self::Generating
        }
    }
}

impl std::fmt::Display for ArmyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generating => write!(f, "generating"),
            Self::Loading => write!(f, "loading"),
            Self::Transporting => write!(f, "transporting"),
            Self::Arrived => write!(f, "arrived"),
        }
    }
}

/// A body of mobilized troops
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Army {
    pub id: ArmyId,
    pub owner: Faction,
    pub amount: u32,
    pub source_town: String,
    pub status: ArmyStatus,
    pub position: HexCoord,
    /// Hexes still to visit, current hex excluded; empty when no route is cached
    pub path: Vec<HexCoord>,
    pub target_region: String,
    pub created_round: Round,
}

impl Army {
    /// Raise an army on the primary hex of its source town
    pub fn new(id: ArmyId, town: &Town, amount: u32, target_region: &str, round: Round) -> Self {
        Self {
            id,
            owner: town.owner,
            amount,
            source_town: town.name.clone(),
            status: ArmyStatus::Generating,
            position: town.primary_hex(),
            path: Vec::new(),
            target_region: target_region.to_string(),
            created_round: round,
        }
    }

    pub fn age(&self, round: Round) -> Round {
        round.saturating_sub(self.created_round)
    }

    pub fn has_arrived(&self) -> bool {
        self.status == ArmyStatus::Arrived
    }

    fn in_target(&self, map: &CampaignMap) -> bool {
        match (map.region_of(self.position), map.region_idx(&self.target_region)) {
            (Some(here), Some(target)) => here == target,
            _ => false,
        }
    }

    /// Cache a fresh route from the current hex; false if none exists
    fn plan_route(&mut self, map: &CampaignMap) -> bool {
        match find_path_to_region(&map.regions, self.position, &self.target_region) {
            Some(route) => {
                self.path = route.hexes.into_iter().skip(1).collect();
                true
            }
            None => {
                self.path.clear();
                false
            }
        }
    }
}

/// Why an army stopped short this round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    UnderConstruction,
    CapacityExceeded { load: u32, capacity: u32 },
}

/// Events produced while advancing a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CampaignEvent {
    TownCompleted { town: TownId, name: String, level: TownLevel },
    RailwayCompleted { railway: RailwayId, start: HexCoord, end: HexCoord },
    ArmyLoading { army: ArmyId },
    ArmyTransporting { army: ArmyId },
    ArmyMoved { army: ArmyId, position: HexCoord, hops: usize },
    ArmyHalted { army: ArmyId, position: HexCoord, reason: HaltReason },
    ArmyArrived { army: ArmyId, faction: Faction, amount: u32, position: HexCoord },
    NoRoute { army: ArmyId, position: HexCoord },
    WarCountdown { remaining: u32 },
    WarResolved { winner: Faction, forces: PerFaction<u32> },
}

/// Clear the troop load on every railway
pub fn reset_rail_loads(map: &mut CampaignMap) {
    for railway in map.regions.iter_mut().flat_map(|r| r.railways.iter_mut()) {
        railway.reset_load();
    }
}

/// Advance every army one round, in creation order
pub fn transit_tick(
    map: &mut CampaignMap,
    armies: &mut [Army],
    round: Round,
    rules: &RulesConfig,
    arrived_forces: &mut PerFaction<u32>,
) -> Vec<CampaignEvent> {
    let mut events = Vec::new();

    for army in armies.iter_mut().filter(|a| !a.has_arrived()) {
        let status = ArmyStatus::for_age(army.age(round), rules);
        if status != army.status {
            army.status = status;
            match status {
                ArmyStatus::Loading => events.push(CampaignEvent::ArmyLoading { army: army.id }),
                ArmyStatus::Transporting => {
                    tracing::debug!(army = army.id.0, "army departing {}", army.source_town);
                    events.push(CampaignEvent::ArmyTransporting { army: army.id });
                }
                _ => {}
            }
        }

        if army.status == ArmyStatus::Transporting {
            move_army(map, army, rules, arrived_forces, &mut events);
        }
    }

    events
}

fn move_army(
    map: &mut CampaignMap,
    army: &mut Army,
    rules: &RulesConfig,
    arrived_forces: &mut PerFaction<u32>,
    events: &mut Vec<CampaignEvent>,
) {
    // Raised inside the target: no railway to ride, so never counted at the front
    if army.in_target(map) {
        return;
    }

    if army.path.is_empty() && !army.plan_route(map) {
        events.push(CampaignEvent::NoRoute {
            army: army.id,
            position: army.position,
        });
        return;
    }

    let mut hops = 0;
    let mut replanned = false;

    while hops < rules.max_hops_per_round {
        let Some(&next) = army.path.first() else {
            break;
        };

        let key = if map.contains(next) {
            railway_between(map, army.position, next)
        } else {
            None
        };

        let Some(key) = key else {
            // Route went stale; try once more from here
            if !replanned {
                replanned = true;
                if army.plan_route(map) {
                    continue;
                }
            }
            army.path.clear();
            events.push(CampaignEvent::NoRoute {
                army: army.id,
                position: army.position,
            });
            break;
        };

        let Some(railway) = key.resolve_mut(&mut map.regions) else {
            army.path.clear();
            break;
        };

        let halt = if railway.under_construction {
            Some(HaltReason::UnderConstruction)
        } else if !railway.can_carry(army.amount, &rules.railways) {
            Some(HaltReason::CapacityExceeded {
                load: railway.troops,
                capacity: railway.capacity(&rules.railways),
            })
        } else {
            None
        };

        if let Some(reason) = halt {
            tracing::debug!(army = army.id.0, ?reason, "army halted at {}", army.position);
            events.push(CampaignEvent::ArmyHalted {
                army: army.id,
                position: army.position,
                reason,
            });
            break;
        }

        railway.carry(army.amount);
        army.position = next;
        army.path.remove(0);
        hops += 1;

        if army.in_target(map) {
            break;
        }
    }

    if hops > 0 {
        events.push(CampaignEvent::ArmyMoved {
            army: army.id,
            position: army.position,
            hops,
        });
    }

    if hops > 0 && army.in_target(map) {
        arrive(army, arrived_forces, events);
    }
}

fn arrive(army: &mut Army, arrived_forces: &mut PerFaction<u32>, events: &mut Vec<CampaignEvent>) {
    army.status = ArmyStatus::Arrived;
    army.path.clear();
    *arrived_forces.get_mut(army.owner) += army.amount;

    tracing::info!(
        army = army.id.0,
        faction = %army.owner,
        amount = army.amount,
        "army arrived in {}",
        army.target_region
    );
    events.push(CampaignEvent::ArmyArrived {
        army: army.id,
        faction: army.owner,
        amount: army.amount,
        position: army.position,
    });
}
