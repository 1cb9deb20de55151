//! Command execution - applies parsed text commands to a controller

use std::fmt::Write as _;

use crate::campaign::route::ArmyStatus;
use crate::campaign::state::TownView;
use crate::command::controller::{CommandResponse, GameController};
use crate::command::parser::{GameCommand, USAGE};
use crate::core::types::Faction;

/// A console session: one controller and the faction currently at the helm
pub struct Session<'a> {
    controller: &'a GameController,
    pub faction: Faction,
    pub finished: bool,
}

impl<'a> Session<'a> {
    pub fn new(controller: &'a GameController, faction: Faction) -> Self {
        Self {
            controller,
            faction,
            finished: false,
        }
    }

    /// Execute one command
    pub fn execute(&mut self, command: &GameCommand) -> CommandResponse {
        let faction = self.faction;
        let controller = self.controller;

        match command {
            GameCommand::Town { region, hex, name } => {
                let result = controller.build_town(region, *hex, name, faction);
                CommandResponse::from_result(&result, |id| {
                    format!("{} founded at ({}) in {} [town {}], ready next round", name, hex, region, id.0)
                })
            }
            GameCommand::Rail { region, start, end, level } => {
                let result = controller.build_railway_with_level(region, *start, *end, faction, *level);
                CommandResponse::from_result(&result, |id| {
                    format!("{} railway ({}) - ({}) under construction [rail {}]", level, start, end, id.0)
                })
            }
            GameCommand::Mobilize { region, town, amount } => {
                let result = controller.mobilize(region, Some(town.as_str()), Some(*amount), faction, false);
                CommandResponse::from_result(&result, |m| format!("{} troops raised in {}", m.total, town))
            }
            GameCommand::MobilizeRegion { region } => {
                let result = controller.mobilize(region, None, None, faction, true);
                CommandResponse::from_result(&result, |m| {
                    let towns: Vec<String> = m.details.iter().map(|d| format!("{} {}", d.town, d.amount)).collect();
                    format!("{} troops raised in {} ({})", m.total, region, towns.join(", "))
                })
            }
            GameCommand::Upgrade { region, a, b, from } => {
                let result = controller.upgrade_town(region, *a, *b, faction, *from);
                CommandResponse::from_result(&result, |id| format!("towns merged into town {}", id.0))
            }
            GameCommand::War => {
                let result = controller.declare_war(faction);
                CommandResponse::from_result(&result, |_| format!("{} declares war!", faction))
            }
            GameCommand::Next => match controller.advance_round(faction) {
                Ok(outcome) => {
                    let mut message = format!("Round {} ({})", outcome.report.round, outcome.report.phase);
                    for event in &outcome.report.events {
                        let _ = write!(message, "\n  {:?}", event);
                    }
                    if let Some(result) = outcome.report.outcome {
                        let _ = write!(
                            message,
                            "\n{} win! Forces at the front: Central Powers {}, Entente {}",
                            result.winner, result.final_forces.central_powers, result.final_forces.entente
                        );
                    }
                    if !outcome.can_continue {
                        self.finished = true;
                        let _ = write!(message, "\nThe campaign is over.");
                    }
                    CommandResponse::ok(message)
                }
                Err(e) => CommandResponse::failed(e.to_string()),
            },
            GameCommand::Status => match self.status() {
                Ok(text) => CommandResponse::ok(text),
                Err(e) => CommandResponse::failed(e.to_string()),
            },
            GameCommand::Json => match controller.snapshot_json() {
                Ok(json) => CommandResponse::ok(json),
                Err(e) => CommandResponse::failed(e.to_string()),
            },
            GameCommand::Faction(next) => {
                self.faction = *next;
                CommandResponse::ok(format!("Now commanding {}", next))
            }
            GameCommand::Reset => {
                let result = controller.reset();
                self.finished = false;
                CommandResponse::from_result(&result, |_| "New game started".to_string())
            }
            GameCommand::Help => CommandResponse::ok(USAGE),
            GameCommand::Quit => {
                self.finished = true;
                CommandResponse::ok("Goodbye")
            }
        }
    }

    /// Short summary of the game from this session's point of view
    pub fn status(&self) -> crate::core::error::Result<String> {
        let snapshot = self.controller.snapshot()?;
        let mut out = String::new();

        let _ = writeln!(
            out,
            "--- Round {}/{} | {} | playing {} ---",
            snapshot.round, snapshot.max_rounds, snapshot.phase, self.faction
        );
        for (faction, res) in snapshot.resources.iter() {
            let _ = writeln!(
                out,
                "  {}: GDP {:.1}, population {}, at the front {}",
                faction,
                res.gdp,
                res.population,
                snapshot.arrived_forces.get(faction)
            );
        }
        if snapshot.war_declared {
            let _ = writeln!(out, "  War declared, {} rounds to resolution", snapshot.war_countdown);
        }

        for region in &snapshot.regions {
            let towns: Vec<_> = region
                .towns
                .iter()
                .filter(|view| view.town.owner == self.faction)
                .collect();
            if towns.is_empty() && region.railways.is_empty() {
                continue;
            }
            let _ = writeln!(out, "  [{}] {}", region.id, region.name);
            for TownView { town, gdp } in towns {
                let state = if town.under_construction { " (building)" } else { "" };
                let _ = writeln!(
                    out,
                    "    {} {} at ({}) pop {} mobilized {} gdp {:.1}{}",
                    town.level,
                    town.name,
                    town.primary_hex(),
                    town.population,
                    town.mobilized,
                    gdp,
                    state
                );
            }
            if !region.railways.is_empty() {
                let _ = writeln!(out, "    {} railway(s)", region.railways.len());
            }
        }

        let moving = snapshot
            .armies
            .iter()
            .filter(|a| a.owner == self.faction && a.status != ArmyStatus::Arrived)
            .count();
        let _ = write!(out, "  Armies in transit: {}", moving);

        if snapshot.game_ended {
            if let Some(winner) = snapshot.winner {
                let _ = write!(out, "\n  Game over: {} won", winner);
            }
        }

        Ok(out)
    }
}
