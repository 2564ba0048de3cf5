use anyhow::Result;
use microtasker_core::models::NewTaskData;
use microtasker_core::repository::Repository;
use microtasker_core::timezone::Today;

use crate::cli::AddCommand;
use crate::commands::print_outcome;
use crate::parser::parse_date;

pub async fn add_task(repo: &impl Repository, command: AddCommand, today: &Today) -> Result<()> {
    let due_date = command.due.as_deref().map(|d| parse_date(d, today)).transpose()?;
    let end_date = command.until.as_deref().map(|d| parse_date(d, today)).transpose()?;

    // A series starts on its first due date, or today when none is given.
    let start_date = command.every.map(|_| due_date.unwrap_or_else(|| today.date()));

    let new_task_data = NewTaskData {
        title: command.title,
        category: command.category,
        tags: command.tag,
        priority: command.priority,
        time_estimate: command.estimate,
        due_date,
        frequency: command.every,
        start_date,
        end_date,
        template_id: None,
    };

    let outcome = repo.add_task(new_task_data).await?;
    print_outcome(&outcome);
    Ok(())
}
