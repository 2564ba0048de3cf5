use anyhow::{anyhow, Result};
use microtasker_core::error::CoreError;
use microtasker_core::repository::Repository;
use uuid::Uuid;

pub const SHORT_ID_LEN: usize = 8;

/// The hex prefix shown in tables and accepted back by `resolve_task_id`.
pub fn short_id(id: &Uuid) -> String {
    let mut simple = id.simple().to_string();
    simple.truncate(SHORT_ID_LEN);
    simple
}

pub async fn resolve_task_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    let short_id = short_id.trim().replace('-', "");
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    if !short_id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!(CoreError::InvalidInput(format!(
            "'{}' is not a task ID",
            short_id
        ))));
    }
    let tasks = repo.find_tasks_by_short_id_prefix(&short_id).await?;
    if tasks.len() == 1 {
        Ok(tasks[0].id)
    } else if tasks.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            short_id
        ))))
    } else {
        let task_info: Vec<(String, String)> = tasks
            .into_iter()
            .map(|t| (self::short_id(&t.id), t.title))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(task_info)))
    }
}
