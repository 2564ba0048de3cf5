use anyhow::Result;
use microtasker_core::models::CompletionResult;
use microtasker_core::repository::Repository;
use microtasker_core::timezone::Today;
use owo_colors::OwoColorize;

use crate::cli::DoCommand;
use crate::util::{resolve_task_id, short_id};

pub async fn do_task(repo: &impl Repository, command: DoCommand, today: &Today) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;

    match repo.complete_task(task_id, today).await? {
        CompletionResult::Single(task) => {
            println!("{} Completed task: '{}'", "✓".green().bold(), task.title);
        }
        CompletionResult::Recurring { completed, next } => {
            println!("{} Completed task: '{}'", "✓".green().bold(), completed.title);
            match next {
                Some(next) => {
                    let due = next.due_date.map(|d| d.to_string()).unwrap_or_default();
                    println!(
                        "  Next occurrence {} due {}",
                        short_id(&next.id).yellow(),
                        due
                    );
                }
                None => println!("  The series has ended; no further occurrences."),
            }
        }
    }

    Ok(())
}
