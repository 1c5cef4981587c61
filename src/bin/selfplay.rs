//! Single-match CLI.
//!
//! Plays one game between a minimax agent and an opponent and prints the
//! match record as a JSON line.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --depth N         Minimax search depth (default: 2)
//!   --heuristic NAME  liberties, baseline, distance or composite (default: composite)
//!   --parallel        Search root moves in parallel
//!   --opponent KIND   random, greedy or minimax (default: random)
//!   --second          Minimax agent moves second
//!   --movetime MS     Time budget per turn in ms (default: 150)
//!   --seed N          Random seed for the random opponent (default: entropy)
//!   --output FILE     Output file path (default: stdout)

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;

use islet::agent::{Agent, GreedyPlayer, MinimaxPlayer, RandomPlayer};
use islet::board::Isolation;
use islet::config::AgentConfig;
use islet::game::PlayerId;
use islet::selfplay::{self, MatchConfig};

struct Options {
    agent: AgentConfig,
    opponent: String,
    second: bool,
    seed: Option<u64>,
    output: Option<String>,
    config: MatchConfig,
}

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    let raw = args
        .get(i)
        .ok_or_else(|| format!("missing value for {}", flag))?;
    raw.parse()
        .map_err(|_| format!("invalid {} value: {}", flag, raw))
}

fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options {
        agent: AgentConfig::default(),
        opponent: "random".to_string(),
        second: false,
        seed: None,
        output: None,
        config: MatchConfig::default(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--depth" => {
                i += 1;
                options.agent.depth = value(args, i, "--depth")?;
            }
            "--heuristic" => {
                i += 1;
                let name: String = value(args, i, "--heuristic")?;
                options
                    .agent
                    .apply_option("heuristic", Some(&name))
                    .map_err(|e| e.to_string())?;
            }
            "--parallel" => {
                options.agent.parallel = true;
            }
            "--opponent" => {
                i += 1;
                options.opponent = value(args, i, "--opponent")?;
            }
            "--second" => {
                options.second = true;
            }
            "--movetime" => {
                i += 1;
                options.config.time_limit_ms = value(args, i, "--movetime")?;
            }
            "--seed" => {
                i += 1;
                options.seed = Some(value(args, i, "--seed")?);
            }
            "--output" => {
                i += 1;
                options.output = Some(value(args, i, "--output")?);
            }
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("unknown argument: {}", other)),
        }
        i += 1;
    }

    options.agent.validate().map_err(|e| e.to_string())?;
    Ok(Some(options))
}

fn build_agents(options: &Options) -> Result<[Box<dyn Agent<Isolation>>; 2], String> {
    let (us, them) = if options.second {
        (PlayerId::SECOND, PlayerId::FIRST)
    } else {
        (PlayerId::FIRST, PlayerId::SECOND)
    };
    let minimax: Box<dyn Agent<Isolation>> = Box::new(MinimaxPlayer::new(us, options.agent));
    let opponent: Box<dyn Agent<Isolation>> = match options.opponent.as_str() {
        "random" => Box::new(RandomPlayer::new(them, options.seed)),
        "greedy" => Box::new(GreedyPlayer::new(them, options.agent.heuristic)),
        "minimax" => Box::new(MinimaxPlayer::new(them, options.agent)),
        other => return Err(format!("unknown opponent: {}", other)),
    };
    Ok(if options.second {
        [opponent, minimax]
    } else {
        [minimax, opponent]
    })
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            process::exit(1);
        }
    };
    let agents = match build_agents(&options) {
        Ok(agents) => agents,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    log::info!(
        "selfplay: depth {}, heuristic {}, opponent {}, {}ms/turn",
        options.agent.depth,
        options.agent.heuristic,
        options.opponent,
        options.config.time_limit_ms
    );
    let record = selfplay::play_match(agents, &options.config);

    let written = match &options.output {
        Some(path) => File::create(path)
            .and_then(|file| selfplay::write_jsonl(&record, &mut BufWriter::new(file))),
        None => selfplay::write_jsonl(&record, &mut BufWriter::new(io::stdout().lock())),
    };
    if let Err(e) = written {
        eprintln!("failed to write match record: {}", e);
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --depth N         Minimax search depth (default: 2)");
    eprintln!(
        "  --heuristic NAME  liberties, baseline, distance or composite (default: composite)"
    );
    eprintln!("  --parallel        Search root moves in parallel");
    eprintln!("  --opponent KIND   random, greedy or minimax (default: random)");
    eprintln!("  --second          Minimax agent moves second");
    eprintln!("  --movetime MS     Time budget per turn in ms (default: 150)");
    eprintln!("  --seed N          Random seed for the random opponent (default: entropy)");
    eprintln!("  --output FILE     Output file path (default: stdout)");
}
