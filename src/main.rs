//! Interactive terminal front-end.
//!
//! Reads one command per line from stdin while battle timers fire in the
//! background; narration is printed as soon as each timer settles.

use metronome_arena::config::ArenaConfig;
use metronome_arena::errors::ArenaError;
use metronome_arena::logging;
use metronome_arena::mcp_interface::{handle_lookup_move_command, Arena};
use metronome_arena::{CoinSide, Difficulty};
use std::str::FromStr;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  start <easy|medium|hard>   start a battle
  heads | tails              call the coin toss
  wag                        use 손가락흔들기
  status                     show the battle
  progress                   show coins, deck and owned moves
  shop <1|10>                draw moves for 30 coins each
  upgrade <move>             spend five copies to upgrade a move
  deck <m1,m2,...>           replace the deck (must include 튀어오르기)
  odds                       show draw probabilities
  move <name>                describe a move
  leave                      leave the battle
  quit                       exit";

enum Command {
    Start(Difficulty),
    Guess(CoinSide),
    Wag,
    Status,
    Progress,
    Shop(u32),
    Upgrade(String),
    Deck(Vec<String>),
    Odds,
    Lookup(String),
    Leave,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let (word, rest) = match line.trim().split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line.trim(), ""),
    };
    match word.to_lowercase().as_str() {
        "start" => Difficulty::from_str(rest)
            .map(Command::Start)
            .map_err(|_| "Usage: start <easy|medium|hard>".to_string()),
        "heads" | "tails" => CoinSide::from_str(word)
            .map(Command::Guess)
            .map_err(|_| "Usage: heads | tails".to_string()),
        "wag" => Ok(Command::Wag),
        "status" => Ok(Command::Status),
        "progress" => Ok(Command::Progress),
        "shop" => rest
            .parse::<u32>()
            .map(Command::Shop)
            .map_err(|_| "Usage: shop <1|10>".to_string()),
        "upgrade" if !rest.is_empty() => Ok(Command::Upgrade(rest.to_string())),
        "deck" if !rest.is_empty() => Ok(Command::Deck(
            rest.split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        )),
        "odds" => Ok(Command::Odds),
        "move" if !rest.is_empty() => Ok(Command::Lookup(rest.to_string())),
        "leave" => Ok(Command::Leave),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err(String::new()),
        other => Err(format!("Unknown command '{}'. Type 'help' for commands.", other)),
    }
}

/// Runs one command. Returns false when the user asked to quit.
fn handle_command(arena: &mut Arena, command: Command) -> bool {
    let outcome: Result<String, ArenaError> = match command {
        Command::Start(difficulty) => arena.start_battle(difficulty),
        Command::Guess(guess) => arena.guess_coin(guess),
        Command::Wag => arena.finger_wag(),
        Command::Status => Ok(arena.status()),
        Command::Progress => arena.progress(),
        Command::Shop(count) => arena.pull_moves(count),
        Command::Upgrade(name) => arena.upgrade_move(&name),
        Command::Deck(names) => arena.update_deck(&names),
        Command::Odds => Ok(arena.move_odds()),
        Command::Lookup(name) => handle_lookup_move_command(&name),
        Command::Leave => Ok(arena.leave_battle()),
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => return false,
    };
    match outcome {
        Ok(text) if text.is_empty() => {}
        Ok(text) => println!("{}", text.trim_end()),
        Err(err) => println!("Error: {}", err),
    }
    true
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("warn");

    let config = ArenaConfig::load_or_default(&ArenaConfig::path_from_env());
    let (mut arena, mut tickets) = Arena::open(&config)?;

    println!("=== Metronome Arena ===");
    println!("{}", HELP);

    let mut input = BufReader::new(stdin()).lines();
    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(command) => {
                        if !handle_command(&mut arena, command) {
                            break;
                        }
                    }
                    Err(message) if message.is_empty() => {}
                    Err(message) => println!("{}", message),
                }
            }
            Some(ticket) = tickets.recv() => {
                match arena.fire(ticket) {
                    Ok(_) => {
                        for line in arena.take_new_lines() {
                            println!("{}", line);
                        }
                    }
                    Err(err) => println!("Error: {}", err),
                }
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
