use anyhow::Result;
use microtasker_core::repository::Repository;
use microtasker_core::timezone::Today;

use crate::cli::TodayCommand;
use crate::views::summary::display_focus;

pub async fn show_today(repo: &impl Repository, command: TodayCommand, today: &Today) -> Result<()> {
    let focus = repo.today_focus(today).await?;
    if command.json {
        println!("{}", serde_json::to_string_pretty(&focus)?);
    } else {
        display_focus(&focus, today.date(), command.grouped);
    }
    Ok(())
}
