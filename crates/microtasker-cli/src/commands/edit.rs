use anyhow::{anyhow, Result};
use microtasker_core::error::CoreError;
use microtasker_core::models::UpdateTaskData;
use microtasker_core::repository::Repository;
use microtasker_core::timezone::Today;

use crate::cli::EditCommand;
use crate::parser::parse_date;
use crate::util::resolve_task_id;

fn clearable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

pub async fn edit_task(repo: &impl Repository, command: EditCommand, today: &Today) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo
        .find_task_by_id(task_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Task with ID '{}' not found.", task_id)))?;

    let due_date = command.due.as_deref().map(|d| parse_date(d, today)).transpose()?;
    let end_date = command.until.as_deref().map(|d| parse_date(d, today)).transpose()?;

    let mut update = UpdateTaskData {
        title: command.title,
        category: clearable(command.category, command.category_clear),
        priority: clearable(command.priority, command.priority_clear),
        time_estimate: command.estimate,
        due_date: clearable(due_date, command.due_clear),
        end_date: None,
        completed: None,
        add_tags: (!command.add_tag.is_empty()).then_some(command.add_tag),
        remove_tags: (!command.remove_tag.is_empty()).then_some(command.remove_tag),
    };
    let series_end = clearable(end_date, command.until_clear);

    let touches_task = update.title.is_some()
        || update.category.is_some()
        || update.priority.is_some()
        || update.time_estimate.is_some()
        || update.due_date.is_some()
        || update.add_tags.is_some()
        || update.remove_tags.is_some();
    if !touches_task && series_end.is_none() {
        return Err(anyhow!(CoreError::InvalidInput(
            "Nothing to edit; pass at least one field flag.".to_string()
        )));
    }

    // The end date lives on the template, so an occurrence edits its series.
    match (task.template_id, series_end) {
        (Some(template_id), Some(end_date)) => {
            let series_update = UpdateTaskData {
                end_date: Some(end_date),
                ..Default::default()
            };
            repo.update_task(template_id, series_update).await?;
            println!("Updated the series end date.");
        }
        (_, end_date) => update.end_date = end_date,
    }

    if touches_task || update.end_date.is_some() {
        let updated = repo.update_task(task_id, update).await?;
        println!("Updated task: '{}'", updated.title);
    }
    Ok(())
}
