//! Text commands for the console driver
//!
//! One command per line, whitespace separated. Hexes are written `q,r` or
//! `q,r,s`. Town names may contain spaces where they are the last argument.

use crate::campaign::map::HexCoord;
use crate::campaign::railway::RailwayLevel;
use crate::campaign::town::TownLevel;
use crate::core::error::{GameError, Result};
use crate::core::types::Faction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    Town { region: String, hex: HexCoord, name: String },
    Rail { region: String, start: HexCoord, end: HexCoord, level: RailwayLevel },
    Mobilize { region: String, town: String, amount: u32 },
    MobilizeRegion { region: String },
    Upgrade { region: String, a: HexCoord, b: HexCoord, from: TownLevel },
    War,
    Next,
    Status,
    Json,
    Faction(Faction),
    Reset,
    Help,
    Quit,
}

pub const USAGE: &str = "\
Commands:
  town <region> <q,r> <name>            - Found a village (50 GDP)
  rail <region> <q,r> <q,r> [1|2|3]     - Lay a railway from the region's hex
  mobilize <region> <town> <amount>     - Raise troops from one town
  mobilize-region <region>              - Raise everything a region can give
  upgrade <region> <q,r> <q,r> <level>  - Merge two linked towns of <level>
  war                                   - Declare war (rounds 31-40)
  next / n                              - End the round
  status / s                            - Show a summary
  json                                  - Dump the full state as JSON
  faction <cp|entente>                  - Switch the faction you command
  reset                                 - Start a new game
  quit / q                              - Exit";

impl GameCommand {
    /// Parse one line; `Ok(None)` for blank lines and comments
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (verb, args) = (tokens[0].to_ascii_lowercase(), &tokens[1..]);

        let command = match verb.as_str() {
            "town" => {
                expect_at_least(&verb, args, 3)?;
                GameCommand::Town {
                    region: args[0].to_string(),
                    hex: args[1].parse()?,
                    name: args[2..].join(" "),
                }
            }
            "rail" => {
                expect_at_least(&verb, args, 3)?;
                let level = match args.get(3) {
                    None => RailwayLevel::One,
                    Some(raw) => raw
                        .parse::<u8>()
                        .ok()
                        .and_then(RailwayLevel::from_number)
                        .ok_or_else(|| GameError::InvalidCommand(format!("unknown railway level {}", raw)))?,
                };
                GameCommand::Rail {
                    region: args[0].to_string(),
                    start: args[1].parse()?,
                    end: args[2].parse()?,
                    level,
                }
            }
            "mobilize" => {
                expect_at_least(&verb, args, 3)?;
                let last = args.len() - 1;
                let amount = args[last];
                GameCommand::Mobilize {
                    region: args[0].to_string(),
                    town: args[1..last].join(" "),
                    amount: amount
                        .parse()
                        .map_err(|_| GameError::InvalidCommand(format!("bad amount '{}'", amount)))?,
                }
            }
            "mobilize-region" => {
                expect_at_least(&verb, args, 1)?;
                GameCommand::MobilizeRegion {
                    region: args[0].to_string(),
                }
            }
            "upgrade" => {
                expect_at_least(&verb, args, 4)?;
                GameCommand::Upgrade {
                    region: args[0].to_string(),
                    a: args[1].parse()?,
                    b: args[2].parse()?,
                    from: TownLevel::parse(args[3])
                        .ok_or_else(|| GameError::InvalidCommand(format!("unknown town level {}", args[3])))?,
                }
            }
            "faction" => {
                expect_at_least(&verb, args, 1)?;
                let faction = Faction::parse(&args.join("_"))
                    .ok_or_else(|| GameError::InvalidCommand(format!("unknown faction {}", args.join(" "))))?;
                GameCommand::Faction(faction)
            }
            "war" => GameCommand::War,
            "next" | "n" => GameCommand::Next,
            "status" | "s" => GameCommand::Status,
            "json" => GameCommand::Json,
            "reset" => GameCommand::Reset,
            "help" | "h" | "?" => GameCommand::Help,
            "quit" | "q" | "exit" => GameCommand::Quit,
            other => return Err(GameError::InvalidCommand(format!("unknown command '{}'", other))),
        };

        Ok(Some(command))
    }
}

fn expect_at_least(verb: &str, args: &[&str], n: usize) -> Result<()> {
    if args.len() < n {
        return Err(GameError::InvalidCommand(format!(
            "{} needs {} arguments, got {}",
            verb,
            n,
            args.len()
        )));
    }
    Ok(())
}
