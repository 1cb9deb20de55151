//! Game state and the round controller
//!
//! `GameState` owns the map, the armies, both treasuries and the war. All
//! player commands are methods here; each checks its preconditions in a fixed
//! order and leaves the state untouched when one fails.

use serde::{Deserialize, Serialize};

use super::economy::{self, AccrualReport, Resources, Treasury};
use super::map::{CampaignMap, HexCoord, HexTile, Region, Scenario};
use super::mobilization::{self, Mobilization, MobilizeOrder};
use super::network::{railway_between, TownGraph};
use super::railway::{Railway, RailwayId, RailwayLevel};
use super::route::{self, Army, ArmyId, CampaignEvent};
use super::town::{Town, TownId, TownLevel};
use super::war::{Phase, WarFront, WarOutcome};
use crate::core::config::{RailLoadPolicy, RulesConfig};
use crate::core::error::{GameError, Result};
use crate::core::types::{Faction, PerFaction, Round};

/// Everything that happened during one call to `advance_round`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundReport {
    /// The round just entered
    pub round: Round,
    pub phase: Phase,
    pub accrual: PerFaction<AccrualReport>,
    pub events: Vec<CampaignEvent>,
    pub outcome: Option<WarOutcome>,
}

/// A hex with its stable id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileView {
    pub tile_id: String,
    #[serde(flatten)]
    pub tile: HexTile,
}

/// A town with the GDP it yields this round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TownView {
    #[serde(flatten)]
    pub town: Town,
    pub gdp: f64,
}

/// A railway with its current carrying capacity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RailwayView {
    #[serde(flatten)]
    pub railway: Railway,
    pub capacity: u32,
}

/// A region as the serving layer sees it; derived values are filled in from
/// the rules so clients never need them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionView {
    pub id: String,
    pub name: String,
    pub nation: String,
    pub hexes: Vec<TileView>,
    pub towns: Vec<TownView>,
    pub railways: Vec<RailwayView>,
}

impl RegionView {
    pub fn new(region: &Region, rules: &RulesConfig) -> Self {
        Self {
            id: region.id.clone(),
            name: region.name.clone(),
            nation: region.nation.clone(),
            hexes: region
                .hexes
                .iter()
                .map(|tile| TileView {
                    tile_id: tile.tile_id(&region.id),
                    tile: tile.clone(),
                })
                .collect(),
            towns: region
                .towns
                .iter()
                .map(|town| TownView {
                    gdp: town.gdp(&rules.towns),
                    town: town.clone(),
                })
                .collect(),
            railways: region
                .railways
                .iter()
                .map(|railway| RailwayView {
                    capacity: railway.capacity(&rules.railways),
                    railway: railway.clone(),
                })
                .collect(),
        }
    }
}

/// Plain copy of the whole game for serving layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub round: Round,
    pub max_rounds: Round,
    pub phase: Phase,
    pub current_player: Faction,
    pub war_declared: bool,
    pub declared_by: Option<Faction>,
    pub war_countdown: u32,
    pub resources: Treasury,
    pub regions: Vec<RegionView>,
    pub armies: Vec<Army>,
    /// Nation names per faction
    pub factions: PerFaction<Vec<String>>,
    pub conflict_regions: PerFaction<String>,
    pub arrived_forces: PerFaction<u32>,
    pub game_ended: bool,
    pub winner: Option<Faction>,
    pub final_forces: Option<PerFaction<u32>>,
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub rules: RulesConfig,
    pub scenario: Scenario,
    pub map: CampaignMap,
    pub round: Round,
    pub phase: Phase,
    pub current_player: Faction,
    pub resources: Treasury,
    pub war: WarFront,
    pub armies: Vec<Army>,
    pub arrived_forces: PerFaction<u32>,
    pub outcome: Option<WarOutcome>,
    next_town_id: u32,
    next_railway_id: u32,
    next_army_id: u32,
}

impl GameState {
    pub fn new(scenario: Scenario, rules: RulesConfig) -> Result<Self> {
        rules.validate()?;
        scenario.validate()?;
        let map = scenario.build_map()?;
        let start = Resources::new(rules.starting_gdp);

        Ok(Self {
            phase: Phase::for_round(1, &rules),
            round: 1,
            current_player: Faction::CentralPowers,
            resources: Treasury::new(start, start),
            war: WarFront::default(),
            armies: Vec::new(),
            arrived_forces: PerFaction::default(),
            outcome: None,
            next_town_id: 1,
            next_railway_id: 1,
            next_army_id: 1,
            map,
            scenario,
            rules,
        })
    }

    /// Default rules on the built-in western front
    pub fn western_front() -> Result<Self> {
        Self::new(Scenario::western_front()?, RulesConfig::default())
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some() || self.round > self.rules.max_rounds
    }

    /// Commands are refused once the game is over
    fn ensure_active(&self) -> Result<()> {
        if let Some(outcome) = &self.outcome {
            return Err(GameError::InvalidPhase(format!(
                "the war is over, {} won",
                outcome.winner
            )));
        }
        if self.round > self.rules.max_rounds {
            return Err(GameError::InvalidPhase(format!(
                "the campaign ended after round {}",
                self.rules.max_rounds
            )));
        }
        Ok(())
    }

    pub fn conflict_region(&self, faction: Faction) -> &str {
        self.scenario.conflict_region(faction)
    }

    fn region_index(&self, region_id: &str) -> Result<usize> {
        self.map
            .region_idx(region_id)
            .ok_or_else(|| GameError::InvalidLocation(format!("unknown region {}", region_id)))
    }

    pub fn town(&self, id: TownId) -> Option<&Town> {
        self.map.regions.iter().find_map(|r| r.town(id))
    }

    pub fn army(&self, id: ArmyId) -> Option<&Army> {
        self.armies.iter().find(|a| a.id == id)
    }

    pub(crate) fn next_army_id(&mut self) -> ArmyId {
        let id = ArmyId(self.next_army_id);
        self.next_army_id += 1;
        id
    }

    // === CONSTRUCTION ===

    /// Found a village on an empty hex
    pub fn build_town(&mut self, region_id: &str, hex: HexCoord, name: &str, faction: Faction) -> Result<TownId> {
        self.ensure_active()?;
        let spec = *self.rules.towns.get(TownLevel::Village);
        self.resources.get(faction).ensure(spec.cost)?;

        let region_idx = self.region_index(region_id)?;
        let region = &self.map.regions[region_idx];

        let tile = region
            .hex(hex)
            .ok_or_else(|| GameError::InvalidLocation(format!("({}) is not in region {}", hex, region_id)))?;
        if tile.town.is_some() {
            return Err(GameError::DuplicateOccupancy(format!("({}) already has a town", hex)));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidCommand("town name must not be empty".into()));
        }
        if region.town_by_name(name).is_some() {
            return Err(GameError::DuplicateOccupancy(format!(
                "region {} already has a town named {}",
                region_id, name
            )));
        }

        if region.count_towns(TownLevel::Village) >= spec.region_cap {
            return Err(GameError::CapacityExceeded(format!(
                "region {} already has {} villages",
                region_id, spec.region_cap
            )));
        }

        self.resources.get_mut(faction).spend(spec.cost)?;

        let id = TownId(self.next_town_id);
        self.next_town_id += 1;

        let region = &mut self.map.regions[region_idx];
        region
            .towns
            .push(Town::new(id, name.to_string(), TownLevel::Village, faction, hex));
        if let Some(tile) = region.hex_mut(hex) {
            tile.town = Some(id);
        }

        tracing::info!(faction = %faction, town = id.0, "founded {} at ({}) in {}", name, hex, region_id);
        Ok(id)
    }

    pub fn build_railway(&mut self, region_id: &str, start: HexCoord, end: HexCoord, faction: Faction) -> Result<RailwayId> {
        self.build_railway_with_level(region_id, start, end, faction, RailwayLevel::One)
    }

    /// Lay a railway; it is filed under the region of its start hex
    pub fn build_railway_with_level(
        &mut self,
        region_id: &str,
        start: HexCoord,
        end: HexCoord,
        faction: Faction,
        level: RailwayLevel,
    ) -> Result<RailwayId> {
        self.ensure_active()?;
        let cost = self.rules.railways.get(level).cost;
        self.resources.get(faction).ensure(cost)?;

        let region_idx = self.region_index(region_id)?;

        for coord in [start, end] {
            if !self.map.contains(coord) {
                return Err(GameError::InvalidLocation(format!("({}) is not on the map", coord)));
            }
        }
        if self.map.region_of(start) != Some(region_idx) {
            return Err(GameError::InvalidLocation(format!(
                "railway must start in region {}, ({}) lies elsewhere",
                region_id, start
            )));
        }

        let railway = Railway::new(RailwayId(self.next_railway_id), start, end, level)?;

        if railway_between(&self.map, start, end).is_some() {
            return Err(GameError::DuplicateOccupancy(format!(
                "({}) and ({}) are already linked",
                start, end
            )));
        }

        self.resources.get_mut(faction).spend(cost)?;
        self.next_railway_id += 1;

        let id = railway.id;
        self.map.regions[region_idx].railways.push(railway);

        tracing::info!(faction = %faction, railway = id.0, %level, "laying railway ({}) - ({})", start, end);
        Ok(id)
    }

    /// Merge two linked towns of level `from` into one town of the next level
    pub fn upgrade_town(
        &mut self,
        region_id: &str,
        a: HexCoord,
        b: HexCoord,
        faction: Faction,
        from: TownLevel,
    ) -> Result<TownId> {
        self.ensure_active()?;
        let region_idx = self.region_index(region_id)?;
        let region = &self.map.regions[region_idx];

        let town_a = region
            .town_at(a)
            .ok_or_else(|| GameError::EntityNotFound(format!("no town at ({})", a)))?;
        let town_b = region
            .town_at(b)
            .ok_or_else(|| GameError::EntityNotFound(format!("no town at ({})", b)))?;
        if town_a.id == town_b.id {
            return Err(GameError::EntityNotFound(format!(
                "({}) and ({}) are the same town",
                a, b
            )));
        }

        for town in [town_a, town_b] {
            if town.owner != faction {
                return Err(GameError::OwnershipMismatch {
                    expected: faction,
                    actual: town.owner,
                });
            }
        }
        for town in [town_a, town_b] {
            if town.under_construction {
                return Err(GameError::UnderConstruction(town.name.clone()));
            }
        }
        for town in [town_a, town_b] {
            if town.mobilized > 0 {
                return Err(GameError::TroopsCommitted(town.name.clone()));
            }
        }

        let (Some(rule), Some(target)) = (self.rules.upgrades.get(from), from.next()) else {
            return Err(GameError::InvalidCommand(format!("{} cannot be upgraded", from)));
        };
        if town_a.level != from || town_b.level != from {
            return Err(GameError::InvalidCommand(format!(
                "both towns must be {} (found {} and {})",
                from, town_a.level, town_b.level
            )));
        }

        if !TownGraph::build(region).connected(town_a.id, town_b.id) {
            return Err(GameError::NotConnected(format!(
                "{} and {} are not linked by railway",
                town_a.name, town_b.name
            )));
        }

        let cost = rule.cost;
        self.resources.get(faction).ensure(cost)?;

        let cap = self.rules.towns.get(target).region_cap;
        if region.count_towns(target) >= cap {
            return Err(GameError::CapacityExceeded(format!(
                "region {} already has {} {}",
                region_id, cap, target
            )));
        }

        let id = TownId(self.next_town_id);
        let merged = Town::merged(id, town_a, town_b, target);
        let (old_a, old_b) = (town_a.id, town_b.id);

        self.resources.get_mut(faction).spend(cost)?;
        self.next_town_id += 1;

        let region = &mut self.map.regions[region_idx];
        region.towns.retain(|t| t.id != old_a && t.id != old_b);
        for hex in &merged.hexes {
            if let Some(tile) = region.hex_mut(*hex) {
                tile.town = Some(id);
            }
        }

        tracing::info!(faction = %faction, town = id.0, "{} rebuilt as {}", merged.name, target);
        region.towns.push(merged);
        Ok(id)
    }

    // === MILITARY ===

    pub fn mobilize(&mut self, region_id: &str, order: MobilizeOrder<'_>, faction: Faction) -> Result<Mobilization> {
        self.ensure_active()?;
        mobilization::mobilize(self, region_id, order, faction)
    }

    pub fn declare_war(&mut self, faction: Faction) -> Result<()> {
        self.ensure_active()?;
        let target = self.conflict_region(faction).to_string();
        if self.map.region(&target).is_none() {
            return Err(GameError::InvalidLocation(format!("conflict region {} is not on the map", target)));
        }

        self.war.declare(faction, self.phase, &self.rules)?;
        tracing::info!(faction = %faction, round = self.round, "war declared, {} rounds to resolution", self.war.countdown);
        Ok(())
    }

    // === ROUND ===

    /// Run one round: income, construction, calendar, armies, war
    pub fn advance_round(&mut self, faction: Faction) -> Result<RoundReport> {
        self.ensure_active()?;

        let accrual = economy::accrue(&self.map, &self.rules, &mut self.resources);
        let mut events = self.complete_construction();

        self.round += 1;
        self.phase = Phase::for_round(self.round, &self.rules);
        self.current_player = faction;

        if self.rules.rail_load_policy == RailLoadPolicy::PerRound {
            route::reset_rail_loads(&mut self.map);
        }
        events.extend(route::transit_tick(
            &mut self.map,
            &mut self.armies,
            self.round,
            &self.rules,
            &mut self.arrived_forces,
        ));

        if self.war.tick() {
            let outcome = self.war.resolve(&self.arrived_forces);
            tracing::info!(
                winner = %outcome.winner,
                central_powers = outcome.final_forces.central_powers,
                entente = outcome.final_forces.entente,
                "war resolved"
            );
            events.push(CampaignEvent::WarResolved {
                winner: outcome.winner,
                forces: outcome.final_forces,
            });
            self.outcome = Some(outcome);
        } else if self.war.declared {
            events.push(CampaignEvent::WarCountdown {
                remaining: self.war.countdown,
            });
        }

        tracing::info!(round = self.round, phase = %self.phase, "round advanced by {}", faction);

        Ok(RoundReport {
            round: self.round,
            phase: self.phase,
            accrual,
            events,
            outcome: self.outcome,
        })
    }

    fn complete_construction(&mut self) -> Vec<CampaignEvent> {
        let mut events = Vec::new();

        for region in &mut self.map.regions {
            for town in region.towns.iter_mut().filter(|t| t.under_construction) {
                town.complete_construction(&self.rules.towns);
                tracing::debug!(town = town.id.0, "{} completed", town.name);
                events.push(CampaignEvent::TownCompleted {
                    town: town.id,
                    name: town.name.clone(),
                    level: town.level,
                });
            }
            for railway in region.railways.iter_mut().filter(|r| r.under_construction) {
                railway.complete_construction();
                events.push(CampaignEvent::RailwayCompleted {
                    railway: railway.id,
                    start: railway.start,
                    end: railway.end,
                });
            }
        }

        events
    }

    // === VIEW ===

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            round: self.round,
            max_rounds: self.rules.max_rounds,
            phase: self.phase,
            current_player: self.current_player,
            war_declared: self.war.declared,
            declared_by: self.war.declared_by,
            war_countdown: self.war.countdown,
            resources: self.resources,
            regions: self
                .map
                .regions
                .iter()
                .map(|region| RegionView::new(region, &self.rules))
                .collect(),
            armies: self.armies.clone(),
            factions: PerFaction::new(
                self.scenario.nation_names(Faction::CentralPowers),
                self.scenario.nation_names(Faction::Entente),
            ),
            conflict_regions: PerFaction::new(
                self.conflict_region(Faction::CentralPowers).to_string(),
                self.conflict_region(Faction::Entente).to_string(),
            ),
            arrived_forces: self.arrived_forces,
            game_ended: self.outcome.is_some(),
            winner: self.outcome.map(|o| o.winner),
            final_forces: self.outcome.map(|o| o.final_forces),
        }
    }
}
