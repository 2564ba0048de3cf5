use chrono::NaiveDate;
use comfy_table::{Cell, Color, Table};
use microtasker_core::capture::TaskDraft;
use microtasker_core::stats::{ProgressReport, TodayFocus};
use owo_colors::{OwoColorize, Style};

use crate::views::table::{describe_due, display_tasks};

/// Renders minutes the way a human would say them: `45 min`, `1h 30m`.
pub fn format_minutes(minutes: f64) -> String {
    let total = minutes.round() as u64;
    if total < 60 {
        format!("{} min", total)
    } else if total % 60 == 0 {
        format!("{}h", total / 60)
    } else {
        format!("{}h {}m", total / 60, total % 60)
    }
}

pub fn display_focus(focus: &TodayFocus, today: NaiveDate, grouped: bool) {
    let header = Style::new().bold();
    let subtle = Style::new().bright_black();

    println!(
        "{} {}",
        "Today".style(header),
        today.format("%A, %B %-d").style(subtle)
    );
    println!(
        "{} open, {} done, {}% complete, about {} to go",
        focus.open.len(),
        focus.completed.len(),
        focus.completion_rate,
        format_minutes(focus.estimated_minutes)
    );
    println!();

    if focus.open.is_empty() {
        if focus.completed.is_empty() {
            println!("Nothing due today.");
        } else {
            println!("{}", "All done for today.".green().bold());
        }
    } else if grouped {
        for (category, tasks) in focus.by_category() {
            let name = category.map(|c| c.to_string()).unwrap_or_else(|| "Uncategorized".to_string());
            println!("{}", format!("{} ({})", name, tasks.len()).style(header));
            let owned: Vec<_> = tasks.into_iter().cloned().collect();
            display_tasks(&owned, today);
        }
    } else {
        display_tasks(&focus.open, today);
    }

    if !focus.completed.is_empty() {
        println!();
        println!("{}", "Completed today".style(header));
        for task in &focus.completed {
            println!("  {} {}", "✓".green(), task.title.style(subtle));
        }
    }
}

pub fn display_progress(report: &ProgressReport) {
    let header = Style::new().bold();

    println!("{}", "Progress".style(header));
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Completed today"), Cell::new(report.completed_today)]);
    table.add_row(vec![
        Cell::new("Completed this week"),
        Cell::new(report.completed_this_week),
    ]);
    let streak = if report.current_streak == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", report.current_streak)
    };
    table.add_row(vec![
        Cell::new("Current streak"),
        Cell::new(streak).fg(if report.current_streak > 0 { Color::Green } else { Color::Reset }),
    ]);
    table.add_row(vec![
        Cell::new("Completion rate"),
        Cell::new(format!(
            "{}% ({} of {})",
            report.completion_rate, report.total_completed, report.total_tasks
        )),
    ]);
    println!("{table}");

    if report.completed_this_week == 0 {
        println!("No tasks completed in the last 7 days.");
        return;
    }

    println!();
    println!("{}", "This week by category".style(header));
    let mut categories = Table::new();
    categories.set_header(vec!["Category", "Done", "Share"]);
    for share in report.categories.iter().filter(|s| s.count > 0) {
        categories.add_row(vec![
            Cell::new(share.category),
            Cell::new(share.count),
            Cell::new(format!("{}%", share.percentage)),
        ]);
    }
    println!("{categories}");
}

/// Shows how a capture was understood, before or after saving it.
pub fn display_draft(draft: &TaskDraft, today: NaiveDate) {
    let label = Style::new().bright_black();
    let value = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    println!("{} {}", "Title:".style(label), draft.title.bold());
    println!(
        "{} {}",
        "Category:".style(label),
        value(draft.category.map(|c| c.to_string()))
    );
    println!(
        "{} {}",
        "Priority:".style(label),
        value(draft.priority.map(|p| p.to_string()))
    );
    println!("{} {}", "Estimate:".style(label), draft.time_estimate);
    println!(
        "{} {}",
        "Due:".style(label),
        value(
            draft
                .due_date
                .map(|d| format!("{} ({})", d, describe_due(d, today)))
        )
    );
    if !draft.tags.is_empty() {
        let tags: Vec<String> = draft.tags.iter().map(|t| format!("#{}", t)).collect();
        println!("{} {}", "Tags:".style(label), tags.join(" "));
    }
    if let Some(frequency) = draft.frequency.filter(|_| draft.is_recurring) {
        let until = draft
            .end_date
            .map(|end| format!(" until {}", end))
            .unwrap_or_default();
        println!("{} {}{}", "Repeats:".style(label), frequency, until);
    }
}
