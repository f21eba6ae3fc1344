use anyhow::Result;

use taikai_backend::cli::Command;
use taikai_backend::{handle_completions, handle_draw, handle_serve, handle_setup, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Setup => handle_setup(),
        Command::Draw {
            tournament_id,
            umpires,
        } => handle_draw(*tournament_id, umpires),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
