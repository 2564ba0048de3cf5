use anyhow::Result;
use microtasker_core::models::BacklogFilter;
use microtasker_core::repository::Repository;
use microtasker_core::timezone::Today;
use owo_colors::{OwoColorize, Style};

use crate::cli::PlanCommand;
use crate::parser::parse_date;
use crate::views::table::{describe_due, display_tasks};

pub async fn show_plan(repo: &impl Repository, command: PlanCommand, today: &Today) -> Result<()> {
    let date = match command.date.as_deref() {
        Some(date) => parse_date(date, today)?,
        None => today.date(),
    };
    let header = Style::new().bold();

    let planned = repo.planned_for(date).await?;
    println!(
        "{} {} ({})",
        "Planned for".style(header),
        date.format("%A, %B %-d"),
        describe_due(date, today.date())
    );
    display_tasks(&planned, today.date());

    let unplanned = repo.backlog(BacklogFilter::Unplanned, None).await?;
    println!();
    println!("{}", format!("Unplanned ({})", unplanned.len()).style(header));
    display_tasks(&unplanned, today.date());
    Ok(())
}
