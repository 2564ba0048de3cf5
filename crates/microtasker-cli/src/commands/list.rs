use anyhow::Result;
use microtasker_core::repository::Repository;
use microtasker_core::timezone::Today;

use crate::cli::ListCommand;
use crate::config::Config;
use crate::query_parser;
use crate::views::table::display_tasks;

pub async fn list_tasks(
    repo: &impl Repository,
    command: ListCommand,
    config: &Config,
    today: &Today,
) -> Result<()> {
    let query_str = if command.query.is_empty() && !config.default_filters.is_empty() {
        config
            .default_filters
            .iter()
            .map(|f| format!("({})", f))
            .collect::<Vec<_>>()
            .join(" and ")
    } else {
        command.query.join(" ")
    };

    let query = query_parser::parse_query(&query_str)?;
    tracing::debug!(query = %query_str, "listing tasks");

    let tasks = repo.find_tasks(&query, today).await?;

    if command.json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else {
        display_tasks(&tasks, today.date());
    }

    Ok(())
}
