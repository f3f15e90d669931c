use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;
use tile_board::config::GameConfig;
use tile_board::grid::Direction;
use tile_board::round::{MoveStatus, RoundController, RoundState};
use tile_board::score::{MemoryStore, ScoreStore, TomlFileStore};
use tile_board::session::Session;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML game config
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for tile spawns (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file holding the best score; kept in memory if omitted
    #[arg(long, value_name = "FILE")]
    best_file: Option<PathBuf>,
}

fn parse_direction(input: &str) -> Option<Direction> {
    match input {
        "w" | "up" => Some(Direction::Up),
        "s" | "down" => Some(Direction::Down),
        "a" | "left" => Some(Direction::Left),
        "d" | "right" => Some(Direction::Right),
        _ => None,
    }
}

fn print_status<S: ScoreStore, R: rand::Rng>(game: &Session<S, R>) {
    println!("---------------------");
    println!("Score: {}, Best: {}", game.score(), game.best());
    println!("{}", game.round().board());
}

fn run<S: ScoreStore>(cfg: &GameConfig, store: S) -> Result<()> {
    let round = RoundController::from_config(cfg).context("invalid game config")?;
    let mut game = Session::new(round, store);
    game.new_game().context("failed to start a new game")?;
    println!("Welcome to 2048!");

    let stdin = io::stdin();
    loop {
        print_status(&game);
        if game.round().state() == RoundState::GameOver {
            println!("GAME OVER! Enter 'n' for a new game or 'q' to quit.");
        }
        print!("Move (w/a/s/d), 'n' for new game, 'q' to quit: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        match input.trim() {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "n" => {
                game.new_game()?;
            }
            other => match parse_direction(other) {
                Some(direction) => {
                    let (status, _) = game.submit_move(direction);
                    match status {
                        MoveStatus::Changed(_) => {
                            if let Some(wait) = game.round().settle_remaining(Instant::now()) {
                                thread::sleep(wait);
                            }
                            game.poll(Instant::now())?;
                        }
                        MoveStatus::NoChange => println!("Nothing moves that way."),
                        MoveStatus::Ignored => {}
                    }
                }
                None => println!("Invalid input. Use w/a/s/d, 'n' or 'q'."),
            },
        }
    }

    game.save();
    info!("final score {}", game.score());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => GameConfig::from_toml(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }

    match &args.best_file {
        Some(path) => {
            let store = TomlFileStore::open(path)
                .with_context(|| format!("failed to open best score file {}", path.display()))?;
            run(&cfg, store)
        }
        None => run(&cfg, MemoryStore::default()),
    }
}
