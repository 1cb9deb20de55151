//! Campaign map - hex-based strategic layer
//!
//! The map is a set of regions, each owning its hexes outright. Hexes are
//! stored in cube coordinates but adjacency follows an offset grid keyed on
//! column parity, which is what the scenario tables are drawn against.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::railway::Railway;
use super::town::{Town, TownId, TownLevel};
use crate::core::error::{GameError, Result};
use crate::core::types::{Faction, PerFaction};

/// Cube hex coordinate with q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "CubeRepr")]
pub struct HexCoord {
    q: i32, // Column
    r: i32, // Row
    s: i32,
}

#[derive(Deserialize)]
struct CubeRepr {
    q: i32,
    r: i32,
    s: i32,
}

impl TryFrom<CubeRepr> for HexCoord {
    type Error = GameError;

    fn try_from(raw: CubeRepr) -> Result<Self> {
        HexCoord::new(raw.q, raw.r, raw.s)
    }
}

impl HexCoord {
    /// Largest magnitude accepted for any component; keeps neighbour and
    /// distance arithmetic clear of `i32` overflow
    pub const LIMIT: i32 = 1 << 24;

    pub fn new(q: i32, r: i32, s: i32) -> Result<Self> {
        if [q, r, s].iter().any(|c| c.unsigned_abs() > Self::LIMIT as u32) {
            return Err(GameError::InvalidLocation(format!(
                "({},{},{}) is outside the map bounds",
                q, r, s
            )));
        }
        if q + r + s != 0 {
            return Err(GameError::InvalidLocation(format!(
                "({},{},{}) does not satisfy q + r + s = 0",
                q, r, s
            )));
        }
        Ok(Self { q, r, s })
    }

    /// Checked axial constructor for coordinates read from outside the crate
    pub fn axial(q: i32, r: i32) -> Result<Self> {
        let s = q
            .checked_add(r)
            .and_then(|sum| sum.checked_neg())
            .ok_or_else(|| GameError::InvalidLocation(format!("({},{}) is outside the map bounds", q, r)))?;
        Self::new(q, r, s)
    }

    /// Build from column and row; s is derived. Inputs must lie within
    /// `LIMIT`; use `axial` for untrusted values.
    pub fn from_axial(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    pub fn q(&self) -> i32 {
        self.q
    }

    pub fn r(&self) -> i32 {
        self.r
    }

    pub fn s(&self) -> i32 {
        self.s
    }

    /// The six neighbours under the column-parity offset rule
    pub fn neighbors(&self) -> [HexCoord; 6] {
        let (q, r) = (self.q, self.r);
        if q.rem_euclid(2) == 0 {
            [
                HexCoord::from_axial(q, r - 1),
                HexCoord::from_axial(q, r + 1),
                HexCoord::from_axial(q - 1, r),
                HexCoord::from_axial(q + 1, r),
                HexCoord::from_axial(q - 1, r + 1),
                HexCoord::from_axial(q + 1, r + 1),
            ]
        } else {
            [
                HexCoord::from_axial(q, r - 1),
                HexCoord::from_axial(q, r + 1),
                HexCoord::from_axial(q - 1, r - 1),
                HexCoord::from_axial(q + 1, r - 1),
                HexCoord::from_axial(q - 1, r),
                HexCoord::from_axial(q + 1, r),
            ]
        }
    }

    /// Adjacency test used for railways and frontiers (parity rule, not cube distance)
    pub fn is_adjacent(&self, other: &HexCoord) -> bool {
        self.neighbors().contains(other)
    }

    /// Chebyshev distance over (q, r, s)
    pub fn distance(&self, other: &HexCoord) -> i32 {
        (self.q - other.q)
            .abs()
            .max((self.r - other.r).abs())
            .max((self.s - other.s).abs())
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.q, self.r, self.s)
    }
}

impl std::str::FromStr for HexCoord {
    type Err = GameError;

    /// Accepts `q,r` or `q,r,s`
    fn from_str(input: &str) -> Result<Self> {
        let parts: Vec<i32> = input
            .trim()
            .trim_matches(|c| c == '(' || c == ')')
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| GameError::InvalidLocation(format!("cannot parse hex '{}'", input)))?;

        match parts.as_slice() {
            [q, r] => HexCoord::axial(*q, *r),
            [q, r, s] => HexCoord::new(*q, *r, *s),
            _ => Err(GameError::InvalidLocation(format!("cannot parse hex '{}'", input))),
        }
    }
}

/// Terrain tag carried by each hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Plains,
    Forest,
    Hills,
    Mountains,
    Swamp,
    River,
    Coast,
}

/// A single hex tile on the campaign map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexTile {
    pub coord: HexCoord,
    pub terrain: Terrain,
    pub town: Option<TownId>,
}

impl HexTile {
    pub fn new(coord: HexCoord, terrain: Terrain) -> Self {
        Self { coord, terrain, town: None }
    }

    /// Stable identifier `{region}-{q}-{r}-{s}`
    pub fn tile_id(&self, region_id: &str) -> String {
        format!("{}-{}-{}-{}", region_id, self.coord.q, self.coord.r, self.coord.s)
    }
}

/// A region: the unit of ownership for hexes, towns and railways
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub nation: String,
    pub hexes: Vec<HexTile>,
    pub towns: Vec<Town>,
    /// Railways whose start hex lies in this region
    pub railways: Vec<Railway>,
}

impl Region {
    pub fn new(id: &str, name: &str, nation: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            nation: nation.to_string(),
            hexes: Vec::new(),
            towns: Vec::new(),
            railways: Vec::new(),
        }
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.hexes.iter().any(|h| h.coord == coord)
    }

    pub fn hex(&self, coord: HexCoord) -> Option<&HexTile> {
        self.hexes.iter().find(|h| h.coord == coord)
    }

    pub fn hex_mut(&mut self, coord: HexCoord) -> Option<&mut HexTile> {
        self.hexes.iter_mut().find(|h| h.coord == coord)
    }

    pub fn coords(&self) -> AHashSet<HexCoord> {
        self.hexes.iter().map(|h| h.coord).collect()
    }

    pub fn town(&self, id: TownId) -> Option<&Town> {
        self.towns.iter().find(|t| t.id == id)
    }

    /// Town standing on a hex of this region
    pub fn town_at(&self, coord: HexCoord) -> Option<&Town> {
        let id = self.hex(coord)?.town?;
        self.town(id)
    }

    pub fn town_by_name(&self, name: &str) -> Option<&Town> {
        self.towns.iter().find(|t| t.name == name)
    }

    pub fn town_by_name_mut(&mut self, name: &str) -> Option<&mut Town> {
        self.towns.iter_mut().find(|t| t.name == name)
    }

    pub fn count_towns(&self, level: TownLevel) -> usize {
        self.towns.iter().filter(|t| t.level == level).count()
    }

    /// Index of the railway linking `a` and `b`, if this region holds one
    pub fn find_railway_between(&self, a: HexCoord, b: HexCoord) -> Option<usize> {
        self.railways.iter().position(|r| r.connects(a, b))
    }
}

/// The campaign map containing all regions
#[derive(Debug, Clone)]
pub struct CampaignMap {
    pub regions: Vec<Region>,
    region_index: AHashMap<String, usize>,
    hex_index: AHashMap<HexCoord, usize>,
}

impl CampaignMap {
    /// Assemble a map; every hex must belong to exactly one region
    pub fn new(regions: Vec<Region>) -> Result<Self> {
        let mut region_index = AHashMap::new();
        let mut hex_index = AHashMap::new();

        for (idx, region) in regions.iter().enumerate() {
            if region_index.insert(region.id.clone(), idx).is_some() {
                return Err(GameError::InvalidConfig(format!("duplicate region id {}", region.id)));
            }
            for hex in &region.hexes {
                if let Some(other) = hex_index.insert(hex.coord, idx) {
                    return Err(GameError::InvalidConfig(format!(
                        "hex ({}) belongs to both {} and {}",
                        hex.coord, regions[other].id, region.id
                    )));
                }
            }
        }

        Ok(Self {
            regions,
            region_index,
            hex_index,
        })
    }

    pub fn region_idx(&self, id: &str) -> Option<usize> {
        self.region_index.get(id).copied()
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.region_idx(id).map(|idx| &self.regions[idx])
    }

    pub fn region_mut(&mut self, id: &str) -> Option<&mut Region> {
        let idx = self.region_idx(id)?;
        self.regions.get_mut(idx)
    }

    /// Index of the region owning a coordinate
    pub fn region_of(&self, coord: HexCoord) -> Option<usize> {
        self.hex_index.get(&coord).copied()
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.hex_index.contains_key(&coord)
    }

    pub fn hex(&self, coord: HexCoord) -> Option<&HexTile> {
        let idx = self.region_of(coord)?;
        self.regions[idx].hex(coord)
    }
}

/// A nation: a group of regions sharing an id prefix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NationDef {
    pub name: String,
    pub region_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionDef {
    /// Nation keys (see `Scenario::nations`)
    pub nations: Vec<String>,
    pub conflict_region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionDef {
    pub id: String,
    pub name: String,
    pub nation: String,
    #[serde(default)]
    pub terrain: Terrain,
    /// `[q, r]` pairs; s is derived
    pub hexes: Vec<[i32; 2]>,
}

/// Starting layout of a game: nations, faction alignment and regions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub nations: BTreeMap<String, NationDef>,
    pub factions: PerFaction<FactionDef>,
    pub regions: Vec<RegionDef>,
}

const WESTERN_FRONT: &str = include_str!("../../data/western_front.toml");

impl Scenario {
    /// The built-in France/Belgium/Germany map
    pub fn western_front() -> Result<Self> {
        Self::from_toml_str(WESTERN_FRONT)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        for region in &self.regions {
            if !self.nations.contains_key(&region.nation) {
                return Err(GameError::InvalidConfig(format!(
                    "region {} names unknown nation {}",
                    region.id, region.nation
                )));
            }
        }

        for (faction, def) in self.factions.iter() {
            if !self.regions.iter().any(|r| r.id == def.conflict_region) {
                return Err(GameError::InvalidConfig(format!(
                    "{} conflict region {} is not on the map",
                    faction, def.conflict_region
                )));
            }
            if let Some(unknown) = def.nations.iter().find(|n| !self.nations.contains_key(*n)) {
                return Err(GameError::InvalidConfig(format!(
                    "{} lists unknown nation {}",
                    faction, unknown
                )));
            }
        }

        // Catches hexes claimed by two regions
        self.build_map()?;

        Ok(())
    }

    /// Fresh map with no towns or railways
    pub fn build_map(&self) -> Result<CampaignMap> {
        let regions = self
            .regions
            .iter()
            .map(|def| -> Result<Region> {
                let mut region = Region::new(&def.id, &def.name, &def.nation);
                region.hexes = def
                    .hexes
                    .iter()
                    .map(|[q, r]| HexCoord::axial(*q, *r).map(|coord| HexTile::new(coord, def.terrain)))
                    .collect::<Result<_>>()?;
                Ok(region)
            })
            .collect::<Result<Vec<_>>>()?;
        CampaignMap::new(regions)
    }

    /// Display names of the nations a faction fights for
    pub fn nation_names(&self, faction: Faction) -> Vec<String> {
        self.factions
            .get(faction)
            .nations
            .iter()
            .filter_map(|key| self.nations.get(key))
            .map(|n| n.name.clone())
            .collect()
    }

    pub fn conflict_region(&self, faction: Faction) -> &str {
        &self.factions.get(faction).conflict_region
    }

    /// Nation keys of a faction
    pub fn nation_keys(&self, faction: Faction) -> &[String] {
        &self.factions.get(faction).nations
    }
}
