//! Rail Front - Entry Point
//!
//! Console driver for the campaign. Reads commands from stdin, or replays a
//! script file first when one is given.

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use rail_front::campaign::map::Scenario;
use rail_front::command::parser::USAGE;
use rail_front::command::{GameCommand, GameController, Session};
use rail_front::core::config::RulesConfig;
use rail_front::core::error::{GameError, Result};
use rail_front::core::types::Faction;

#[derive(Parser, Debug)]
#[command(name = "rail-front")]
#[command(about = "Turn-based rail and mobilization campaign on a hex map")]
struct Args {
    /// Rules file (TOML); defaults are used for missing keys
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Scenario file (TOML); defaults to the built-in western front
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Faction to command at start (central_powers or entente)
    #[arg(long, default_value = "central_powers")]
    faction: String,

    /// Commands to run before reading stdin, one per line
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rail_front=info")),
        )
        .init();

    let args = Args::parse();

    let rules = match &args.rules {
        Some(path) => RulesConfig::load(path)?,
        None => RulesConfig::default(),
    };
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::western_front()?,
    };
    let faction = Faction::parse(&args.faction)
        .ok_or_else(|| GameError::InvalidCommand(format!("unknown faction {}", args.faction)))?;

    let controller = GameController::new(scenario, rules)?;
    let mut session = Session::new(&controller, faction);

    tracing::info!("Rail Front starting as {}", faction);

    println!("\n=== RAIL FRONT ===");
    println!("Build, mobilize, and get your troops to the front before the war is decided.");
    println!();
    println!("{}", USAGE);
    println!();

    if let Some(path) = &args.script {
        let content = std::fs::read_to_string(path)?;
        for line in content.lines() {
            if session.finished {
                break;
            }
            run_line(&mut session, line, true);
        }
    }

    let stdin = io::stdin();
    while !session.finished {
        print!("[{}] > ", session.faction);
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        run_line(&mut session, &input, false);
    }

    if let Ok(status) = session.status() {
        println!("\n{}", status);
    }
    Ok(())
}

fn run_line(session: &mut Session<'_>, line: &str, echo: bool) {
    let command = match GameCommand::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };

    if echo {
        println!("> {}", line.trim());
    }

    let response = session.execute(&command);
    if response.success {
        println!("{}", response.message);
    } else {
        println!("Failed: {}", response.message);
    }
}
