use chrono::{Duration, NaiveDate};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use microtasker_core::models::{Priority, Task};

use crate::util::short_id;

/// How a due date reads relative to `today`.
pub fn describe_due(due: NaiveDate, today: NaiveDate) -> String {
    match (due - today).num_days() {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        days => Duration::days(days).humanize(),
    }
}

fn title_cell(task: &Task) -> Cell {
    let mut display_title = String::new();
    if task.is_recurring {
        display_title.push('↻');
        display_title.push(' ');
    }
    display_title.push_str(&task.title);
    if task.is_template {
        if let Some(frequency) = task.frequency {
            display_title.push_str(&format!(" ({} template)", frequency));
        }
    }

    let cell = Cell::new(display_title);
    if task.completed {
        return cell.add_attribute(Attribute::CrossedOut).fg(Color::DarkGrey);
    }
    match task.priority {
        Some(Priority::High) => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        Some(Priority::Medium) => cell.fg(Color::Yellow),
        Some(Priority::Low) => cell.fg(Color::Green),
        None => cell,
    }
}

fn due_cell(task: &Task, today: NaiveDate) -> Cell {
    if task.is_template {
        let until = task
            .end_date
            .map(|end| format!("until {}", end))
            .unwrap_or_else(|| "no end".to_string());
        return Cell::new(until).fg(Color::DarkGrey);
    }
    let Some(due) = task.due_date else {
        return Cell::new("-");
    };
    let text = format!("{} ({})", due, describe_due(due, today));
    if task.completed {
        Cell::new(text)
    } else if due < today {
        Cell::new(text).fg(Color::Red)
    } else if due == today {
        Cell::new(text).fg(Color::Yellow)
    } else {
        Cell::new(text)
    }
}

pub fn display_tasks(tasks: &[Task], today: NaiveDate) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Category", "Priority", "Estimate", "Due", "Tags"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&task.id)));
        row.add_cell(title_cell(task));
        row.add_cell(Cell::new(
            task.category.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
        ));
        row.add_cell(Cell::new(
            task.priority.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
        ));
        row.add_cell(Cell::new(task.time_estimate.as_str()));
        row.add_cell(due_cell(task, today));
        row.add_cell(Cell::new(if task.tags.is_empty() {
            "-".to_string()
        } else {
            task.tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ")
        }));
        table.add_row(row);
    }

    println!("{table}");
}
