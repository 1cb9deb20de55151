//! Campaign layer integration tests on the western front map

use rail_front::campaign::map::HexCoord;
use rail_front::campaign::network::find_path_to_region;
use rail_front::campaign::route::{ArmyStatus, CampaignEvent, HaltReason};
use rail_front::campaign::town::TownLevel;
use rail_front::campaign::{GameState, MobilizeOrder, Phase, Scenario};
use rail_front::core::config::{RailLoadPolicy, RulesConfig};
use rail_front::core::error::GameError;
use rail_front::core::types::Faction;

fn hex(q: i32, r: i32) -> HexCoord {
    HexCoord::from_axial(q, r)
}

fn advance_to(state: &mut GameState, round: u32) {
    while state.round < round {
        state.advance_round(Faction::Entente).unwrap();
    }
}

/// Entente village at (-1,1) in FR-1 with a railway into FR-3
fn entente_railhead(state: &mut GameState) {
    state.build_town("FR-1", hex(-1, 1), "Amiens", Faction::Entente).unwrap();
    state.build_railway("FR-1", hex(-1, 1), hex(-1, 2), Faction::Entente).unwrap();
}

#[test]
fn test_four_villages_exhaust_starting_gdp() {
    let mut state = GameState::western_front().unwrap();
    for (i, q) in [-1, -2, -3, -4].iter().enumerate() {
        state
            .build_town("FR-1", hex(*q, 0), &format!("v{i}"), Faction::Entente)
            .unwrap();
    }
    assert_eq!(state.resources.entente.gdp, 0.0);
    assert!(matches!(
        state.build_town("FR-2", hex(-4, 2), "v5", Faction::Entente),
        Err(GameError::InsufficientResources { .. })
    ));
}

#[test]
fn test_connectivity_bonus_needs_completed_railway() {
    // Railway laid together with the towns: complete before the second income
    let mut linked = GameState::western_front().unwrap();
    linked.build_town("FR-1", hex(-1, 0), "Rouen", Faction::Entente).unwrap();
    linked.build_town("FR-1", hex(-2, 0), "Evreux", Faction::Entente).unwrap();
    linked.build_railway("FR-1", hex(-1, 0), hex(-2, 0), Faction::Entente).unwrap();
    linked.advance_round(Faction::Entente).unwrap();
    let report = linked.advance_round(Faction::Entente).unwrap();
    assert!((report.accrual.entente.round_gdp - 48.0).abs() < 1e-9);
    assert_eq!(report.accrual.entente.bonus_regions, vec!["FR-1".to_string()]);

    // Railway laid a round later is still under construction at income time
    let mut late = GameState::western_front().unwrap();
    late.build_town("FR-1", hex(-1, 0), "Rouen", Faction::Entente).unwrap();
    late.build_town("FR-1", hex(-2, 0), "Evreux", Faction::Entente).unwrap();
    late.advance_round(Faction::Entente).unwrap();
    late.build_railway("FR-1", hex(-1, 0), hex(-2, 0), Faction::Entente).unwrap();
    let report = late.advance_round(Faction::Entente).unwrap();
    assert_eq!(report.accrual.entente.round_gdp, 40.0);
    assert!(report.accrual.entente.bonus_regions.is_empty());
}

#[test]
fn test_army_lifecycle_by_round() {
    let mut state = GameState::western_front().unwrap();
    state.build_town("FR-1", hex(-3, 0), "Caen", Faction::Entente).unwrap();
    advance_to(&mut state, 3);

    let created = state.round;
    let result = state
        .mobilize("FR-1", MobilizeOrder::Town { name: "Caen", amount: 20 }, Faction::Entente)
        .unwrap();
    let id = result.details[0].army;
    assert_eq!(state.army(id).unwrap().status, ArmyStatus::Generating);

    state.advance_round(Faction::Entente).unwrap();
    assert_eq!(state.round, created + 1);
    assert_eq!(state.army(id).unwrap().status, ArmyStatus::Loading);

    // No railway yet: transporting but stuck
    let report = state.advance_round(Faction::Entente).unwrap();
    assert_eq!(state.army(id).unwrap().status, ArmyStatus::Transporting);
    assert!(report.events.contains(&CampaignEvent::NoRoute {
        army: id,
        position: hex(-3, 0)
    }));
}

#[test]
fn test_army_reaches_front_by_rail() {
    let mut state = GameState::western_front().unwrap();
    entente_railhead(&mut state);
    advance_to(&mut state, 3);

    state
        .mobilize("FR-1", MobilizeOrder::Town { name: "Amiens", amount: 50 }, Faction::Entente)
        .unwrap();
    advance_to(&mut state, 5);

    let army = &state.armies[0];
    assert_eq!(army.status, ArmyStatus::Arrived);
    assert_eq!(army.position, hex(-1, 2));
    assert_eq!(state.arrived_forces.entente, 50);
    assert_eq!(state.arrived_forces.central_powers, 0);
}

#[test]
fn test_shortest_route_is_taken() {
    let mut state = GameState::western_front().unwrap();
    // Three-hop route first, so build order favours it
    state.build_railway("FR-1", hex(-1, 1), hex(-1, 0), Faction::Entente).unwrap();
    state.build_railway("FR-1", hex(-1, 0), hex(0, 0), Faction::Entente).unwrap();
    state.build_railway("FR-1", hex(0, 0), hex(0, 1), Faction::Entente).unwrap();
    state.build_railway("FR-1", hex(-1, 1), hex(-1, 2), Faction::Entente).unwrap();

    // Nothing is routable until construction completes
    assert!(find_path_to_region(&state.map.regions, hex(-1, 1), "FR-3").is_none());
    state.advance_round(Faction::Entente).unwrap();

    let path = find_path_to_region(&state.map.regions, hex(-1, 1), "FR-3").unwrap();
    assert_eq!(path.hexes, vec![hex(-1, 1), hex(-1, 2)]);
    assert_eq!(path.hops(), 1);

    let long = find_path_to_region(&state.map.regions, hex(-1, 0), "FR-3").unwrap();
    assert_eq!(long.hops(), 2);
}

#[test]
fn test_railway_capacity_holds_army_back() {
    let rules = RulesConfig::from_toml_str(
        r#"
        [railways.level_1]
        cost = 30.0
        capacity = 60
        "#,
    )
    .unwrap();
    let mut state = GameState::new(Scenario::western_front().unwrap(), rules).unwrap();
    state.resources.entente.gdp = 500.0;

    entente_railhead(&mut state);
    state.build_town("FR-1", hex(-2, 1), "Albert", Faction::Entente).unwrap();
    state.build_railway("FR-1", hex(-2, 1), hex(-1, 1), Faction::Entente).unwrap();
    advance_to(&mut state, 3);

    let first = MobilizeOrder::Town { name: "Amiens", amount: 50 };
    let second = MobilizeOrder::Town { name: "Albert", amount: 50 };
    state.mobilize("FR-1", first, Faction::Entente).unwrap();
    state.mobilize("FR-1", second, Faction::Entente).unwrap();

    advance_to(&mut state, 4);
    let report = state.advance_round(Faction::Entente).unwrap();

    // Amiens' army took 50 of the 60 on the line into FR-3
    assert!(state.armies[0].has_arrived());
    assert_eq!(state.armies[1].position, hex(-1, 1));
    assert!(report.events.iter().any(|e| matches!(
        e,
        CampaignEvent::ArmyHalted {
            reason: HaltReason::CapacityExceeded { load: 50, capacity: 60 },
            ..
        }
    )));

    // Loads reset each round, so the second army gets through
    state.advance_round(Faction::Entente).unwrap();
    assert!(state.armies[1].has_arrived());
    assert_eq!(state.arrived_forces.entente, 100);
}

#[test]
fn test_cumulative_load_policy_keeps_line_saturated() {
    let rules = RulesConfig {
        rail_load_policy: RailLoadPolicy::Cumulative,
        ..RulesConfig::default()
    };
    let mut state = GameState::new(Scenario::western_front().unwrap(), rules).unwrap();
    state.resources.entente.gdp = 1000.0;

    entente_railhead(&mut state);
    state.build_town("FR-1", hex(-2, 1), "Albert", Faction::Entente).unwrap();
    state.build_town("FR-1", hex(-2, 0), "Evreux", Faction::Entente).unwrap();
    state.build_railway("FR-1", hex(-2, 1), hex(-1, 1), Faction::Entente).unwrap();
    state.build_railway("FR-1", hex(-2, 0), hex(-2, 1), Faction::Entente).unwrap();
    advance_to(&mut state, 3);

    state.mobilize("FR-1", MobilizeOrder::Region, Faction::Entente).unwrap();
    advance_to(&mut state, 8);

    // 150 troops against a 100-troop line that never empties
    let arrived = state.arrived_forces.entente;
    assert_eq!(arrived, 100);
    assert_eq!(state.armies.iter().filter(|a| a.has_arrived()).count(), 2);
}

#[test]
fn test_upgrade_merges_linked_villages() {
    let mut state = GameState::western_front().unwrap();
    state.resources.entente.gdp = 1000.0;
    state.build_town("FR-1", hex(-1, 0), "Rouen", Faction::Entente).unwrap();
    state.build_town("FR-1", hex(-2, 0), "Evreux", Faction::Entente).unwrap();
    advance_to(&mut state, 2);

    assert!(matches!(
        state.upgrade_town("FR-1", hex(-1, 0), hex(-2, 0), Faction::Entente, TownLevel::Village),
        Err(GameError::NotConnected(_))
    ));

    state.build_railway("FR-1", hex(-1, 0), hex(-2, 0), Faction::Entente).unwrap();
    advance_to(&mut state, 3);

    assert!(matches!(
        state.upgrade_town("FR-1", hex(-1, 0), hex(-2, 0), Faction::CentralPowers, TownLevel::Village),
        Err(GameError::OwnershipMismatch { .. })
    ));
    assert!(matches!(
        state.upgrade_town("FR-1", hex(-1, 0), hex(-2, 0), Faction::Entente, TownLevel::SmallCity),
        Err(GameError::InvalidCommand(_))
    ));

    let gdp_before = state.resources.entente.gdp;
    let id = state
        .upgrade_town("FR-1", hex(-1, 0), hex(-2, 0), Faction::Entente, TownLevel::Village)
        .unwrap();
    assert_eq!(state.resources.entente.gdp, gdp_before - 150.0);

    let region = state.map.region("FR-1").unwrap();
    assert_eq!(region.towns.len(), 1);
    let town = region.town(id).unwrap();
    assert_eq!(town.name, "Rouen - Evreux");
    assert_eq!(town.level, TownLevel::SmallCity);
    assert_eq!(town.population, 200);
    assert!(town.under_construction);
    assert_eq!(region.hex(hex(-1, 0)).unwrap().town, Some(id));
    assert_eq!(region.hex(hex(-2, 0)).unwrap().town, Some(id));
}

#[test]
fn test_upgrade_refused_after_mobilization() {
    let mut state = GameState::western_front().unwrap();
    state.resources.entente.gdp = 1000.0;
    state.build_town("FR-1", hex(-1, 0), "Rouen", Faction::Entente).unwrap();
    state.build_town("FR-1", hex(-2, 0), "Evreux", Faction::Entente).unwrap();
    state.build_railway("FR-1", hex(-1, 0), hex(-2, 0), Faction::Entente).unwrap();
    advance_to(&mut state, 3);

    state
        .mobilize("FR-1", MobilizeOrder::Town { name: "Rouen", amount: 10 }, Faction::Entente)
        .unwrap();
    assert!(matches!(
        state.upgrade_town("FR-1", hex(-1, 0), hex(-2, 0), Faction::Entente, TownLevel::Village),
        Err(GameError::TroopsCommitted(_))
    ));
}

#[test]
fn test_war_resolves_after_countdown() {
    let mut state = GameState::western_front().unwrap();
    entente_railhead(&mut state);
    state.build_town("GE-1", hex(5, 0), "Aachen", Faction::CentralPowers).unwrap();
    state.build_railway("GE-1", hex(5, 0), hex(5, 1), Faction::CentralPowers).unwrap();
    advance_to(&mut state, 3);

    state
        .mobilize("FR-1", MobilizeOrder::Town { name: "Amiens", amount: 50 }, Faction::Entente)
        .unwrap();
    state
        .mobilize("GE-1", MobilizeOrder::Town { name: "Aachen", amount: 30 }, Faction::CentralPowers)
        .unwrap();

    assert!(matches!(
        state.declare_war(Faction::CentralPowers),
        Err(GameError::InvalidPhase(_))
    ));

    advance_to(&mut state, 31);
    assert_eq!(state.phase, Phase::Tension);
    state.declare_war(Faction::CentralPowers).unwrap();
    assert_eq!(state.war.countdown, 3);
    assert!(state.declare_war(Faction::Entente).is_err());

    state.advance_round(Faction::Entente).unwrap();
    state.advance_round(Faction::Entente).unwrap();
    assert!(state.outcome.is_none());
    assert_eq!(state.war.countdown, 1);

    let report = state.advance_round(Faction::Entente).unwrap();
    let outcome = report.outcome.unwrap();
    assert_eq!(state.round, 34);
    assert_eq!(outcome.winner, Faction::Entente);
    assert_eq!(outcome.final_forces.entente, 50);
    assert_eq!(outcome.final_forces.central_powers, 30);

    assert!(matches!(
        state.build_town("FR-2", hex(-4, 2), "Late", Faction::Entente),
        Err(GameError::InvalidPhase(_))
    ));
}
