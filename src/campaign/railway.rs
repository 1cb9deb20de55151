//! Railways - links between adjacent hexes that carry troops

use serde::{Deserialize, Serialize};

use super::map::HexCoord;
use crate::core::config::RailwayTable;
use crate::core::error::{GameError, Result};

/// Unique identifier for a railway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RailwayId(pub u32);

/// Railway grade; higher grades cost more and carry more troops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RailwayLevel {
    #[serde(rename = "level_1")]
    One,
    #[serde(rename = "level_2")]
    Two,
    #[serde(rename = "level_3")]
    Three,
}

impl RailwayLevel {
    pub const ALL: [RailwayLevel; 3] = [RailwayLevel::One, RailwayLevel::Two, RailwayLevel::Three];

    pub fn from_number(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }
}

impl std::fmt::Display for RailwayLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::One => write!(f, "level_1"),
            Self::Two => write!(f, "level_2"),
            Self::Three => write!(f, "level_3"),
        }
    }
}

/// A railway between two adjacent hexes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Railway {
    pub id: RailwayId,
    pub start: HexCoord,
    pub end: HexCoord,
    pub level: RailwayLevel,
    /// Troops carried (see `RailLoadPolicy`)
    pub troops: u32,
    pub under_construction: bool,
}

impl Railway {
    /// Lay a new railway; fails unless the endpoints are adjacent
    pub fn new(id: RailwayId, start: HexCoord, end: HexCoord, level: RailwayLevel) -> Result<Self> {
        if !start.is_adjacent(&end) {
            return Err(GameError::NotAdjacent {
                from: start.to_string(),
                to: end.to_string(),
            });
        }

        Ok(Self {
            id,
            start,
            end,
            level,
            troops: 0,
            under_construction: true,
        })
    }

    /// True if this railway links `a` and `b` in either direction
    pub fn connects(&self, a: HexCoord, b: HexCoord) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }

    pub fn complete_construction(&mut self) {
        self.under_construction = false;
    }

    /// Carrying capacity (nothing while under construction)
    pub fn capacity(&self, table: &RailwayTable) -> u32 {
        if self.under_construction {
            return 0;
        }
        table.get(self.level).capacity
    }

    /// Whether `amount` more troops fit on this line right now
    pub fn can_carry(&self, amount: u32, table: &RailwayTable) -> bool {
        !self.under_construction && self.troops.saturating_add(amount) <= self.capacity(table)
    }

    pub fn carry(&mut self, amount: u32) {
        self.troops = self.troops.saturating_add(amount);
    }

    pub fn reset_load(&mut self) {
        self.troops = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_railway_requires_adjacency() {
        let a = HexCoord::from_axial(0, 0);
        let b = HexCoord::from_axial(1, 0);
        let far = HexCoord::from_axial(3, 0);

        assert!(Railway::new(RailwayId(1), a, b, RailwayLevel::One).is_ok());
        assert!(matches!(
            Railway::new(RailwayId(2), a, far, RailwayLevel::One),
            Err(GameError::NotAdjacent { .. })
        ));
        assert!(Railway::new(RailwayId(3), a, a, RailwayLevel::One).is_err());
    }

    #[test]
    fn test_capacity_zero_while_building() {
        let table = RailwayTable::default();
        let mut rail = Railway::new(
            RailwayId(1),
            HexCoord::from_axial(0, 0),
            HexCoord::from_axial(0, 1),
            RailwayLevel::One,
        )
        .unwrap();

        assert_eq!(rail.capacity(&table), 0);
        assert!(!rail.can_carry(1, &table));

        rail.complete_construction();
        assert_eq!(rail.capacity(&table), 100);
        assert!(rail.can_carry(100, &table));
    }

    #[test]
    fn test_load_limits_capacity() {
        let table = RailwayTable::default();
        let mut rail = Railway::new(
            RailwayId(1),
            HexCoord::from_axial(0, 0),
            HexCoord::from_axial(0, 1),
            RailwayLevel::One,
        )
        .unwrap();
        rail.complete_construction();

        rail.carry(60);
        assert!(rail.can_carry(40, &table));
        assert!(!rail.can_carry(41, &table));

        rail.reset_load();
        assert!(rail.can_carry(100, &table));
    }

    #[test]
    fn test_connects_either_direction() {
        let a = HexCoord::from_axial(2, 1);
        let b = HexCoord::from_axial(2, 2);
        let rail = Railway::new(RailwayId(1), a, b, RailwayLevel::Two).unwrap();
        assert!(rail.connects(a, b));
        assert!(rail.connects(b, a));
        assert!(!rail.connects(a, HexCoord::from_axial(3, 1)));
    }
}
