use microtasker_core::models::{CaptureOutcome, Task};
use owo_colors::{OwoColorize, Style};

use crate::util::short_id;

pub mod add;
pub mod backlog;
pub mod capture;
pub mod delete;
pub mod r#do;
pub mod edit;
pub mod list;
pub mod plan;
pub mod progress;
pub mod today;
pub mod undo;

fn due_suffix(task: &Task) -> String {
    task.due_date.map(|d| format!(" due {}", d)).unwrap_or_default()
}

/// Success line shared by `add` and `capture`.
pub(crate) fn print_outcome(outcome: &CaptureOutcome) {
    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    match outcome {
        CaptureOutcome::Single(task) => {
            println!(
                "{} Created task: {}{}",
                "✓".style(success_style),
                task.title.bright_white().bold(),
                due_suffix(task)
            );
            println!("  {} Task ID: {}", "→".style(info_style), short_id(&task.id).yellow());
        }
        CaptureOutcome::Recurring { template, first } => {
            println!(
                "{} Created recurring task: {}{}",
                "✓".style(success_style),
                first.title.bright_white().bold(),
                due_suffix(first)
            );
            println!("  {} Task ID: {}", "→".style(info_style), short_id(&first.id).yellow());
            let until = template
                .end_date
                .map(|end| format!(" until {}", end))
                .unwrap_or_default();
            if let Some(frequency) = template.frequency {
                println!(
                    "  {} Repeats {}{} (template {})",
                    "→".style(info_style),
                    frequency,
                    until,
                    short_id(&template.id).yellow()
                );
            }
        }
    }
}
