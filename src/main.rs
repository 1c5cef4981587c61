//! islet -- a knight's Isolation engine speaking the IEP protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Diagnostics go to stderr through `env_logger` (set `RUST_LOG`).

use std::io::{self, BufRead};

use islet::engine::Engine;
use islet::protocol::parser::{parse_command, Command};

/// Runs the main IEP protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() -> io::Result<()> {
    env_logger::init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match cmd {
            Command::Iep => engine.handle_iep(&mut out)?,
            Command::IsReady => engine.handle_isready(&mut out)?,
            Command::SetOption { name, value } => {
                engine.set_option(&name, value.as_deref());
            }
            Command::NewGame => engine.new_game(),
            Command::Position { moves } => {
                if let Err(e) = engine.set_position(&moves) {
                    log::warn!("position: {}", e);
                }
            }
            Command::Go(params) => engine.handle_go(&params, &mut out)?,
            Command::Stop => {
                // Search is synchronous; nothing to interrupt
            }
            Command::Quit => break,
        }
    }
    Ok(())
}
