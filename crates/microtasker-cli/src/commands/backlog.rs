use anyhow::Result;
use microtasker_core::repository::Repository;
use microtasker_core::timezone::Today;

use crate::cli::BacklogCommand;
use crate::views::table::display_tasks;

pub async fn show_backlog(repo: &impl Repository, command: BacklogCommand, today: &Today) -> Result<()> {
    let tasks = repo.backlog(command.filter, command.search.as_deref()).await?;
    display_tasks(&tasks, today.date());
    Ok(())
}
