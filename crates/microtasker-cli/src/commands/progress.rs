use anyhow::Result;
use microtasker_core::repository::Repository;
use microtasker_core::timezone::Today;

use crate::cli::ProgressCommand;
use crate::views::summary::display_progress;

pub async fn show_progress(repo: &impl Repository, command: ProgressCommand, today: &Today) -> Result<()> {
    let report = repo.progress(today).await?;
    if command.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_progress(&report);
    }
    Ok(())
}
