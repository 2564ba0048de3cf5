use anyhow::Result;
use microtasker_core::capture::{CaptureParser, TaskDraft};
use microtasker_core::error::CoreError;
use microtasker_core::repository::Repository;
use microtasker_core::timezone::Today;

use crate::cli::CaptureCommand;
use crate::commands::print_outcome;
use crate::parser::parse_date;
use crate::views::summary::display_draft;

fn draft(parser: &CaptureParser, command: &CaptureCommand, today: &Today) -> Result<TaskDraft> {
    let text = command.text.join(" ");
    let draft = parser.parse(&text, today).map_err(CoreError::from)?;

    match &command.until {
        Some(until) if !draft.is_recurring => Err(CoreError::InvalidInput(format!(
            "--until {} needs a repeating capture (#daily, #weekly or #monthly)",
            until
        ))
        .into()),
        Some(until) => Ok(draft.until(parse_date(until, today)?)),
        None => Ok(draft),
    }
}

/// Prints completions for the trailing `/category` or `#tag` fragment.
pub fn suggest(parser: &CaptureParser, command: &CaptureCommand) {
    for suggestion in parser.suggestions(&command.text.join(" ")) {
        println!("{}", suggestion);
    }
}

pub fn dry_run(parser: &CaptureParser, command: &CaptureCommand, today: &Today) -> Result<()> {
    let draft = draft(parser, command, today)?;
    display_draft(&draft, today.date());
    Ok(())
}

pub async fn capture_task(
    repo: &impl Repository,
    parser: &CaptureParser,
    command: CaptureCommand,
    today: &Today,
) -> Result<()> {
    let draft = draft(parser, &command, today)?;
    let outcome = repo.capture(draft).await?;
    print_outcome(&outcome);
    Ok(())
}
