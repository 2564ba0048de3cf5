use anyhow::Result;
use microtasker_core::repository::Repository;

use crate::cli::UndoCommand;
use crate::util::resolve_task_id;

pub async fn undo_task(repo: &impl Repository, command: UndoCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo.reopen_task(task_id).await?;
    println!("Reopened task: '{}'", task.title);
    Ok(())
}
