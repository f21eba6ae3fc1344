pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod seeding;
pub mod services;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use colored::Colorize;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::domain::models::UmpirePolicy;
use crate::services::draw::DrawService;
use crate::services::server::ServerService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_setup() -> Result<()> {
    let pool = database::create_pool(&database_path())?;
    let mut conn = database::get_connection(&pool)?;
    database::setup::reset_database(&mut conn)
}

pub fn handle_draw(tournament_id: i64, umpires: &str) -> Result<()> {
    let policy = UmpirePolicy::parse(umpires)
        .ok_or_else(|| anyhow::anyhow!("Unknown umpire policy: {umpires}"))?;

    let config = AppConfig::new();
    let pool = database::create_pool(&database_path())?;
    let mut conn = database::get_connection(&pool)?;

    let service = DrawService::new(config.draw);
    let summary = service.generate(&mut conn, tournament_id, policy)?;

    println!(
        "{} bracket for tournament {}",
        "Generated".green().bold(),
        tournament_id
    );
    println!(
        "  {} entries into {} slots ({} byes)",
        summary.entry_count, summary.bracket_size, summary.bye_count
    );
    println!(
        "  {} rounds, {} matches, recommended seeds: {}",
        summary.round_count, summary.match_count, summary.recommended_seeds
    );
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
    Ok(())
}

fn database_path() -> String {
    std::env::var("DATABASE_PATH").unwrap_or_else(|_| "taikai.db".to_string())
}
