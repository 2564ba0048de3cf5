use anyhow::Result;
use clap::Parser;
use microtasker_core::db;
use microtasker_core::error::CoreError;
use microtasker_core::repository::SqliteRepository;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod query_parser;
mod util;
mod views;

use cli::{Cli, Commands};
use config::Config;

const LOG_ENV: &str = "MTASK_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        handle_error(e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::new()?;
    let today = config.today()?;

    // Previews never touch the database.
    if let Commands::Capture(command) = &cli.command {
        if command.suggest {
            commands::capture::suggest(&config.capture_parser()?, command);
            return Ok(());
        }
        if command.dry_run {
            return commands::capture::dry_run(&config.capture_parser()?, command, &today);
        }
    }

    let db_pool = db::establish_connection(&config.database_path).await?;
    let repository = SqliteRepository::new(db_pool, config.recurrence_generator());
    tracing::debug!(database = %config.database_path, today = %today.date(), "repository ready");

    match cli.command {
        Commands::Capture(command) => {
            let parser = config.capture_parser()?;
            commands::capture::capture_task(&repository, &parser, command, &today).await
        }
        Commands::Add(command) => commands::add::add_task(&repository, command, &today).await,
        Commands::List(command) => {
            commands::list::list_tasks(&repository, command, &config, &today).await
        }
        Commands::Today(command) => commands::today::show_today(&repository, command, &today).await,
        Commands::Backlog(command) => {
            commands::backlog::show_backlog(&repository, command, &today).await
        }
        Commands::Plan(command) => commands::plan::show_plan(&repository, command, &today).await,
        Commands::Do(command) => commands::r#do::do_task(&repository, command, &today).await,
        Commands::Undo(command) => commands::undo::undo_task(&repository, command).await,
        Commands::Edit(command) => commands::edit::edit_task(&repository, command, &today).await,
        Commands::Delete(command) => commands::delete::delete_task(&repository, command).await,
        Commands::Progress(command) => {
            commands::progress::show_progress(&repository, command, &today).await
        }
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    match err.downcast_ref::<CoreError>() {
        Some(CoreError::NotFound(s)) => {
            eprintln!("{} {}", "Error:".style(error_style), s);
        }
        Some(CoreError::AmbiguousId(tasks)) => {
            eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
            eprintln!("Did you mean one of these?");
            for (id, title) in tasks {
                eprintln!("  {} ({})", id.yellow(), title);
            }
        }
        Some(CoreError::InvalidInput(s)) => {
            eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
        }
        Some(CoreError::InvalidTimezone(tz)) => {
            eprintln!(
                "{} Unknown timezone '{}'. Set MTASK_TIMEZONE to an IANA name such as Europe/Berlin.",
                "Error:".style(error_style),
                tz
            );
        }
        Some(CoreError::Capture(e)) => {
            eprintln!("{} {}", "Error:".style(error_style), e);
        }
        _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
    }
}
