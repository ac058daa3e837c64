use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use hexapawn::ai::QLearningAgent;
use hexapawn::checkpoint::{AgentId, TableStore};
use hexapawn::config::AppConfig;
use hexapawn::game::{Board, GameEngine, Move, Outcome, Side};
use hexapawn::training::online;

/// Play Hexapawn in the terminal by typing moves as `r1 c1 r2 c2`.
#[derive(Parser)]
#[command(name = "console", about = "Play Hexapawn on a plain text console")]
struct Cli {
    /// Two human players instead of White against the AI
    #[arg(long)]
    pvp: bool,

    /// Path to TOML configuration file
    #[arg(long, default_value = "hexapawn.toml")]
    config: PathBuf,

    /// Play against the AI without updating its table
    #[arg(long)]
    no_learn: bool,
}

fn print_board(board: &Board) {
    println!();
    println!("    0 1 2");
    for (row, cells) in board.rows().iter().enumerate() {
        let line: Vec<String> = cells.iter().map(|c| c.symbol().to_string()).collect();
        println!("  {row} {}", line.join(" "));
    }
    println!();
}

/// Prompt until the player enters a legal move. `None` on end of input.
fn read_move(input: &mut impl BufRead, engine: &GameEngine) -> Result<Option<Move>> {
    let legal = engine.current_moves();
    loop {
        print!("{} to move (e.g. 0 0 1 0): ", engine.turn());
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).context("reading move")? == 0 {
            return Ok(None);
        }
        match line.parse::<Move>() {
            Ok(mv) if legal.contains(&mv) => return Ok(Some(mv)),
            Ok(mv) => println!("Illegal move: {mv}"),
            Err(e) => println!("Bad input: {e}"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let learn = !cli.no_learn;

    let store = TableStore::new(config.store.clone());
    let black_id = AgentId::new(Side::Black);
    let (mut agent, episodes_trained) = if cli.pvp {
        (None, 0)
    } else {
        let loaded = store.load_or_empty(&black_id);
        let episodes = loaded.episodes_trained();
        (
            Some(QLearningAgent::new(Side::Black, config.agent.clone(), loaded.table)),
            episodes,
        )
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut engine = GameEngine::new();

    while !engine.is_terminal() {
        print_board(engine.board());

        let ai_turn = engine.turn() == Side::Black;
        match agent.as_mut() {
            Some(agent) if ai_turn => {
                match online::agent_move(agent, &mut engine, learn)? {
                    Some(mv) => println!("Black (AI) plays {mv}"),
                    None => {
                        println!("Black (AI) has no move.");
                        break;
                    }
                }
            }
            _ => {
                let Some(mv) = read_move(&mut input, &engine)? else {
                    println!("Goodbye.");
                    return Ok(());
                };
                engine.apply_move(mv)?;
                if let Some(agent) = agent.as_mut().filter(|_| learn) {
                    online::learn_from_game_end(agent, &engine);
                }
            }
        }
    }

    print_board(engine.board());
    match engine.outcome() {
        Outcome::Draw => println!("Game over: draw!"),
        Outcome::InProgress => {}
        outcome => println!("Game over: {outcome}"),
    }

    if let Some(agent) = &agent {
        if learn {
            let path = store
                .save(&black_id, agent.table(), agent.config(), episodes_trained)
                .context("saving the AI's table")?;
            println!("Saved AI table to {}", path.display());
        }
    }
    Ok(())
}
