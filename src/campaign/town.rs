//! Towns - population centres that yield GDP and supply troops

use serde::{Deserialize, Serialize};

use super::map::HexCoord;
use crate::core::config::TownTable;
use crate::core::types::Faction;

/// Unique identifier for a town
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TownId(pub u32);

/// Town size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TownLevel {
    Village,
    SmallCity,
    LargeCity,
}

impl TownLevel {
    pub const ALL: [TownLevel; 3] = [TownLevel::Village, TownLevel::SmallCity, TownLevel::LargeCity];

    /// Level produced by merging two towns of this level
    pub fn next(&self) -> Option<TownLevel> {
        match self {
            Self::Village => Some(Self::SmallCity),
            Self::SmallCity => Some(Self::LargeCity),
            Self::LargeCity => None,
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "village" => Some(Self::Village),
            "small_city" | "small" => Some(Self::SmallCity),
            "large_city" | "large" => Some(Self::LargeCity),
            _ => None,
        }
    }
}

impl std::fmt::Display for TownLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Village => write!(f, "village"),
            Self::SmallCity => write!(f, "small_city"),
            Self::LargeCity => write!(f, "large_city"),
        }
    }
}

/// A town on the campaign map
///
/// A town founded by a player occupies one hex. A town produced by an
/// upgrade occupies the hexes of both towns it replaced; the first is
/// its primary hex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Town {
    pub id: TownId,
    pub name: String,
    pub level: TownLevel,
    pub owner: Faction,
    pub population: u32,
    pub mobilized: u32,
    pub under_construction: bool,
    pub hexes: Vec<HexCoord>,
}

impl Town {
    /// Found a new town; it stays empty until construction completes
    pub fn new(id: TownId, name: String, level: TownLevel, owner: Faction, hex: HexCoord) -> Self {
        Self {
            id,
            name,
            level,
            owner,
            population: 0,
            mobilized: 0,
            under_construction: true,
            hexes: vec![hex],
        }
    }

    /// Merge two towns into one of `level`, keeping their combined population
    pub fn merged(id: TownId, a: &Town, b: &Town, level: TownLevel) -> Self {
        let mut hexes = a.hexes.clone();
        hexes.extend(b.hexes.iter().copied());
        Self {
            id,
            name: format!("{} - {}", a.name, b.name),
            level,
            owner: a.owner,
            population: a.population + b.population,
            mobilized: 0,
            under_construction: true,
            hexes,
        }
    }

    pub fn primary_hex(&self) -> HexCoord {
        self.hexes[0]
    }

    pub fn complete_construction(&mut self, table: &TownTable) {
        self.under_construction = false;
        self.population = table.get(self.level).population;
    }

    /// GDP yield for one round (nothing while under construction)
    pub fn gdp(&self, table: &TownTable) -> f64 {
        if self.under_construction {
            return 0.0;
        }
        table.get(self.level).gdp
    }

    /// Most troops this town can ever field
    pub fn mobilization_cap(&self, table: &TownTable) -> u32 {
        if self.under_construction {
            return 0;
        }
        (self.population as f64 * table.get(self.level).mobilization_rate).floor() as u32
    }

    /// Troops this town can still field
    pub fn mobilizable(&self, table: &TownTable) -> u32 {
        self.mobilization_cap(table).saturating_sub(self.mobilized)
    }
}
