//! Deku - Self-play driver
//!
//! Usage:
//!     deku_chess [config.toml]
//!
//! Two agents sharing one configuration play each other from the starting
//! position until the game ends, printing the board after every move.
//! Log verbosity follows `RUST_LOG` (for example `RUST_LOG=deku_chess=debug`).

use std::env;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use deku_chess::{Agent, AgentConfig, Color, Game, GameStatus};

/// Safety net against endless games when repetition draws are disabled
const MAX_PLIES: u32 = 600;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match env::args().nth(1) {
        Some(path) => match AgentConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(%path, %err, "could not load configuration");
                return ExitCode::FAILURE;
            }
        },
        None => AgentConfig::default(),
    };

    info!(?config, "starting self-play");

    let mut game = Game::new(config.threefold_repetition);
    let mut white = Agent::new(Color::White, config.clone());
    let mut black = Agent::new(Color::Black, config);

    println!("{}", game.board());

    while !game.is_over() && game.plies() < MAX_PLIES {
        let agent = match game.board().side_to_move() {
            Color::White => &mut white,
            Color::Black => &mut black,
        };
        let Some(mv) = game.play_agent(agent) else { break };
        println!("{}. {}\n{}", game.plies(), mv, game.board());
    }

    match game.status() {
        GameStatus::Checkmate(loser) => println!("Checkmate, {} wins", !loser),
        GameStatus::Stalemate => println!("Stalemate"),
        GameStatus::Draw => println!("Draw"),
        GameStatus::Ongoing => println!("Stopped after {} plies", game.plies()),
    }

    ExitCode::SUCCESS
}
