//! Rail network graph and breadth-first route finding
//!
//! The graph is rebuilt from the region list on every query. Only completed
//! railways contribute edges, so a line under construction is invisible to
//! routing and to town connectivity alike.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::map::{CampaignMap, HexCoord, Region};
use super::railway::Railway;
use super::town::TownId;

/// Handle to a railway: owning region index plus position in its list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RailwayKey {
    pub region: usize,
    pub index: usize,
}

impl RailwayKey {
    pub fn resolve<'a>(&self, regions: &'a [Region]) -> Option<&'a Railway> {
        regions.get(self.region)?.railways.get(self.index)
    }

    pub fn resolve_mut<'a>(&self, regions: &'a mut [Region]) -> Option<&'a mut Railway> {
        regions.get_mut(self.region)?.railways.get_mut(self.index)
    }
}

/// A route over the rail network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RailPath {
    /// Hexes visited, starting hex included
    pub hexes: Vec<HexCoord>,
    /// Railway used for each step; one shorter than `hexes`
    pub railways: Vec<RailwayKey>,
}

impl RailPath {
    pub fn hops(&self) -> usize {
        self.railways.len()
    }
}

/// Undirected graph over every completed railway on the map
#[derive(Debug, Default)]
pub struct RailGraph {
    adjacency: AHashMap<HexCoord, Vec<(HexCoord, RailwayKey)>>,
}

impl RailGraph {
    /// Collect edges in region order, then railway build order
    pub fn build(regions: &[Region]) -> Self {
        let mut adjacency: AHashMap<HexCoord, Vec<(HexCoord, RailwayKey)>> = AHashMap::new();

        for (region_idx, region) in regions.iter().enumerate() {
            for (index, railway) in region.railways.iter().enumerate() {
                if railway.under_construction {
                    continue;
                }
                let key = RailwayKey { region: region_idx, index };
                adjacency.entry(railway.start).or_default().push((railway.end, key));
                adjacency.entry(railway.end).or_default().push((railway.start, key));
            }
        }

        Self { adjacency }
    }

    pub fn neighbors(&self, hex: HexCoord) -> &[(HexCoord, RailwayKey)] {
        self.adjacency.get(&hex).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum::<usize>() / 2
    }

    /// Shortest (fewest hops) path from `start` to any hex in `goal`
    pub fn shortest_path(&self, start: HexCoord, goal: &AHashSet<HexCoord>) -> Option<RailPath> {
        if goal.contains(&start) {
            return Some(RailPath {
                hexes: vec![start],
                railways: Vec::new(),
            });
        }

        let mut came_from: AHashMap<HexCoord, (HexCoord, RailwayKey)> = AHashMap::new();
        let mut visited = AHashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for &(next, key) in self.neighbors(current) {
                if !visited.insert(next) {
                    continue;
                }
                came_from.insert(next, (current, key));

                if goal.contains(&next) {
                    return Some(reconstruct(&came_from, start, next));
                }
                queue.push_back(next);
            }
        }

        None
    }
}

fn reconstruct(
    came_from: &AHashMap<HexCoord, (HexCoord, RailwayKey)>,
    start: HexCoord,
    end: HexCoord,
) -> RailPath {
    let mut hexes = vec![end];
    let mut railways = Vec::new();
    let mut current = end;

    while current != start {
        let Some(&(prev, key)) = came_from.get(&current) else {
            break;
        };
        railways.push(key);
        hexes.push(prev);
        current = prev;
    }

    hexes.reverse();
    railways.reverse();
    RailPath { hexes, railways }
}

/// Route from `start` to the region with id `target`, if one exists
pub fn find_path_to_region(regions: &[Region], start: HexCoord, target: &str) -> Option<RailPath> {
    let goal = regions.iter().find(|r| r.id == target)?.coords();
    RailGraph::build(regions).shortest_path(start, &goal)
}

/// Railway linking two hexes; searches the region of `from`, then of `to`
pub fn railway_between(map: &CampaignMap, from: HexCoord, to: HexCoord) -> Option<RailwayKey> {
    let candidates = [map.region_of(from), map.region_of(to)];
    candidates.into_iter().flatten().find_map(|region_idx| {
        map.regions[region_idx]
            .find_railway_between(from, to)
            .map(|index| RailwayKey {
                region: region_idx,
                index,
            })
    })
}

/// Town adjacency inside one region, from completed railways whose two
/// endpoints both carry a town
pub struct TownGraph {
    edges: AHashMap<TownId, Vec<TownId>>,
}

impl TownGraph {
    pub fn build(region: &Region) -> Self {
        let mut edges: AHashMap<TownId, Vec<TownId>> = AHashMap::new();

        for railway in region.railways.iter().filter(|r| !r.under_construction) {
            let start = region.hex(railway.start).and_then(|h| h.town);
            let end = region.hex(railway.end).and_then(|h| h.town);
            if let (Some(a), Some(b)) = (start, end) {
                if a == b {
                    continue;
                }
                edges.entry(a).or_default().push(b);
                edges.entry(b).or_default().push(a);
            }
        }

        Self { edges }
    }

    /// Towns reachable from `from`, itself included
    pub fn reachable(&self, from: TownId) -> AHashSet<TownId> {
        let mut visited = AHashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for &next in self.edges.get(&current).map(Vec::as_slice).unwrap_or(&[]) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited
    }

    pub fn connected(&self, a: TownId, b: TownId) -> bool {
        self.reachable(a).contains(&b)
    }

    /// True when every town in `towns` can reach every other
    pub fn all_connected(&self, towns: &[TownId]) -> bool {
        let Some(first) = towns.first() else {
            return true;
        };
        let reachable = self.reachable(*first);
        towns.iter().all(|t| reachable.contains(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::map::{HexTile, Terrain};
    use crate::campaign::railway::{RailwayId, RailwayLevel};

    fn hex(q: i32, r: i32) -> HexCoord {
        HexCoord::from_axial(q, r)
    }

    fn region(id: &str, coords: &[(i32, i32)]) -> Region {
        let mut region = Region::new(id, id, "test");
        region.hexes = coords
            .iter()
            .map(|(q, r)| HexTile::new(hex(*q, *r), Terrain::Plains))
            .collect();
        region
    }

    fn lay(region: &mut Region, a: HexCoord, b: HexCoord, complete: bool) {
        let id = RailwayId(region.railways.len() as u32 + 1);
        let mut rail = Railway::new(id, a, b, RailwayLevel::One).unwrap();
        if complete {
            rail.complete_construction();
        }
        region.railways.push(rail);
    }

    /// Row of hexes (0,0)..(4,0) in region A, then (5,0) in region B
    fn strip() -> Vec<Region> {
        let a = region("A", &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        let b = region("B", &[(5, 0), (6, 0)]);
        vec![a, b]
    }

    #[test]
    fn test_start_in_target_is_trivial() {
        let regions = strip();
        let path = find_path_to_region(&regions, hex(5, 0), "B").unwrap();
        assert_eq!(path.hexes, vec![hex(5, 0)]);
        assert_eq!(path.hops(), 0);
    }

    #[test]
    fn test_no_railways_no_path() {
        let regions = strip();
        assert!(find_path_to_region(&regions, hex(0, 0), "B").is_none());
        assert!(find_path_to_region(&regions, hex(0, 0), "missing").is_none());
    }

    #[test]
    fn test_path_across_regions() {
        let mut regions = strip();
        for q in 0..4 {
            lay(&mut regions[0], hex(q, 0), hex(q + 1, 0), true);
        }
        // Cross-region link recorded in the start hex's region
        lay(&mut regions[0], hex(4, 0), hex(5, 0), true);

        let path = find_path_to_region(&regions, hex(0, 0), "B").unwrap();
        assert_eq!(path.hexes.first(), Some(&hex(0, 0)));
        assert_eq!(path.hexes.last(), Some(&hex(5, 0)));
        assert_eq!(path.hops(), 5);
        assert_eq!(path.railways[4], RailwayKey { region: 0, index: 4 });
    }

    #[test]
    fn test_construction_breaks_path() {
        let mut regions = strip();
        lay(&mut regions[0], hex(3, 0), hex(4, 0), true);
        lay(&mut regions[0], hex(4, 0), hex(5, 0), false);
        assert!(find_path_to_region(&regions, hex(3, 0), "B").is_none());

        regions[0].railways[1].complete_construction();
        assert!(find_path_to_region(&regions, hex(3, 0), "B").is_some());
    }

    #[test]
    fn test_prefers_fewest_hops() {
        // Long way round: (0,0)->(0,1)->(1,1)->(2,1)->(2,0)->(3,0)
        // Short way: (0,0)->(1,0)->(2,0)->(3,0)
        let a = region(
            "A",
            &[(0, 0), (0, 1), (1, 1), (2, 1), (1, 0), (2, 0)],
        );
        let b = region("B", &[(3, 0)]);
        let mut regions = vec![a, b];

        lay(&mut regions[0], hex(0, 0), hex(0, 1), true);
        lay(&mut regions[0], hex(0, 1), hex(1, 1), true);
        lay(&mut regions[0], hex(1, 1), hex(2, 1), true);
        lay(&mut regions[0], hex(2, 1), hex(2, 0), true);
        lay(&mut regions[0], hex(0, 0), hex(1, 0), true);
        lay(&mut regions[0], hex(1, 0), hex(2, 0), true);
        lay(&mut regions[0], hex(2, 0), hex(3, 0), true);

        let path = find_path_to_region(&regions, hex(0, 0), "B").unwrap();
        assert_eq!(path.hexes, vec![hex(0, 0), hex(1, 0), hex(2, 0), hex(3, 0)]);
    }

    #[test]
    fn test_graph_counts() {
        let mut regions = strip();
        lay(&mut regions[0], hex(0, 0), hex(1, 0), true);
        lay(&mut regions[0], hex(1, 0), hex(2, 0), true);
        lay(&mut regions[0], hex(2, 0), hex(3, 0), false);

        let graph = RailGraph::build(&regions);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.neighbors(hex(3, 0)).is_empty());
    }

    #[test]
    fn test_town_graph_connectivity() {
        let mut r = region("A", &[(0, 0), (1, 0), (2, 0), (3, 0)]);
        for (q, id) in [(0, 1), (1, 2), (3, 3)] {
            r.hex_mut(hex(q, 0)).unwrap().town = Some(TownId(id));
        }
        lay(&mut r, hex(0, 0), hex(1, 0), true);
        // Town to empty hex does not count
        lay(&mut r, hex(2, 0), hex(3, 0), true);

        let graph = TownGraph::build(&r);
        assert!(graph.connected(TownId(1), TownId(2)));
        assert!(!graph.connected(TownId(1), TownId(3)));
        assert!(graph.all_connected(&[TownId(1), TownId(2)]));
        assert!(!graph.all_connected(&[TownId(1), TownId(2), TownId(3)]));
    }
}
