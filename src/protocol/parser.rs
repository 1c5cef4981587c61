//! IEP command parser.
//!
//! Parses incoming protocol commands from raw text into structured
//! `Command` variants that the engine main loop can dispatch on.

/// Search constraints passed with the `go` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub movetime: Option<u64>,
    pub depth: Option<u32>,
}

/// A parsed caller-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Initialize the protocol handshake.
    Iep,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Reset engine state for a new game.
    NewGame,

    /// Set the position: `position startpos [moves <cell>...]`.
    Position { moves: Vec<String> },

    /// Choose a move for the side to move.
    Go(GoParams),

    /// Interrupt the current search. Searches run to completion, so this
    /// is accepted and ignored.
    Stop,

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "iep" => Some(Command::Iep),
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "newgame" => Some(Command::NewGame),
        "stop" => Some(Command::Stop),

        "setoption" => parse_setoption(&tokens),
        "position" => parse_position(&tokens),
        "go" => parse_go(&tokens),

        other => {
            log::warn!("unknown command: {}", other);
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        log::warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");

    let (name, value) = match value_idx {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            let value_parts = &tokens[vi + 1..];
            if name_parts.is_empty() {
                log::warn!("malformed setoption: empty name");
                return None;
            }
            let value = if value_parts.is_empty() {
                None
            } else {
                Some(value_parts.join(" "))
            };
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}

/// Parses `position startpos [moves <cell>...]`.
fn parse_position(tokens: &[&str]) -> Option<Command> {
    if tokens.get(1) != Some(&"startpos") {
        log::warn!("malformed position: expected 'position startpos [moves <cell>...]'");
        return None;
    }
    let moves = match tokens.get(2) {
        None => Vec::new(),
        Some(&"moves") => tokens[3..].iter().map(|t| t.to_string()).collect(),
        Some(other) => {
            log::warn!("malformed position: unexpected '{}'", other);
            return None;
        }
    };
    Some(Command::Position { moves })
}

/// Parses `go [movetime <ms>] [depth <n>]`.
fn parse_go(tokens: &[&str]) -> Option<Command> {
    let mut params = GoParams::default();
    let mut i = 1;

    while i < tokens.len() {
        match tokens[i] {
            "movetime" => {
                i += 1;
                match tokens.get(i).map(|t| t.parse::<u64>()) {
                    Some(Ok(v)) => params.movetime = Some(v),
                    _ => log::warn!("invalid movetime value: '{}'", tokens.get(i).unwrap_or(&"")),
                }
            }
            "depth" => {
                i += 1;
                match tokens.get(i).map(|t| t.parse::<u32>()) {
                    Some(Ok(v)) => params.depth = Some(v),
                    _ => log::warn!("invalid depth value: '{}'", tokens.get(i).unwrap_or(&"")),
                }
            }
            other => {
                log::warn!("unknown go parameter: '{}'", other);
            }
        }
        i += 1;
    }

    Some(Command::Go(params))
}
