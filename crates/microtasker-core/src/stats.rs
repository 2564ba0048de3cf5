//! Progress analytics and the daily focus summary.
//!
//! Everything here is a pure function of a task list and a [`Today`]; the
//! repository gathers the rows and hands them over.

use crate::models::{Category, Priority, Task};
use crate::timezone::Today;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Longest streak reported. Older history is not scanned.
pub const MAX_STREAK_DAYS: u32 = 30;

/// Width of the weekly window, today included.
pub const WEEK_DAYS: u64 = 7;

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub completed_today: usize,
    pub completed_this_week: usize,
    /// Every category, most completions first.
    pub categories: Vec<CategoryShare>,
    pub current_streak: u32,
    pub total_completed: usize,
    pub total_tasks: usize,
    pub completion_rate: u32,
}

impl ProgressReport {
    /// Builds the report from every non-template task in the store.
    pub fn compute(tasks: &[Task], today: &Today) -> Self {
        let completion_dates: Vec<NaiveDate> = tasks
            .iter()
            .filter(|t| t.completed)
            .filter_map(|t| t.completed_at)
            .map(|at| today.local_date(at))
            .collect();

        let week_start = today.minus_days(WEEK_DAYS - 1);
        let completed_today = completion_dates.iter().filter(|d| **d == today.date()).count();

        let weekly: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.completed)
            .filter(|t| {
                t.completed_at
                    .map(|at| today.local_date(at))
                    .is_some_and(|d| d >= week_start && d <= today.date())
            })
            .collect();

        let mut categories: Vec<CategoryShare> = Category::ALL
            .into_iter()
            .map(|category| {
                let count = weekly.iter().filter(|t| t.category == Some(category)).count();
                CategoryShare {
                    category,
                    count,
                    percentage: percent(count, weekly.len()),
                }
            })
            .collect();
        categories.sort_by_key(|share| Reverse(share.count));

        let total_completed = tasks.iter().filter(|t| t.completed).count();

        Self {
            completed_today,
            completed_this_week: weekly.len(),
            categories,
            current_streak: current_streak(&completion_dates, today),
            total_completed,
            total_tasks: tasks.len(),
            completion_rate: percent(total_completed, tasks.len()),
        }
    }
}

/// Consecutive days ending today with at least one completion.
pub fn current_streak(completion_dates: &[NaiveDate], today: &Today) -> u32 {
    let active: HashSet<NaiveDate> = completion_dates.iter().copied().collect();
    let mut streak = 0;
    while streak < MAX_STREAK_DAYS && active.contains(&today.minus_days(u64::from(streak))) {
        streak += 1;
    }
    streak
}

/// What is on the plate today.
#[derive(Debug, Clone, Serialize)]
pub struct TodayFocus {
    /// Open tasks due today, highest priority first.
    pub open: Vec<Task>,
    /// Tasks completed today.
    pub completed: Vec<Task>,
    pub estimated_minutes: f64,
    pub completion_rate: u32,
}

impl TodayFocus {
    pub fn new(mut open: Vec<Task>, completed: Vec<Task>) -> Self {
        open.sort_by_key(|t| Reverse(Priority::rank(t.priority)));
        let estimated_minutes = open.iter().map(|t| t.time_estimate.minutes()).sum();
        let completion_rate = percent(completed.len(), open.len() + completed.len());
        Self {
            open,
            completed,
            estimated_minutes,
            completion_rate,
        }
    }

    /// Open tasks grouped by category in display order, uncategorized last.
    /// Empty groups are omitted.
    pub fn by_category(&self) -> Vec<(Option<Category>, Vec<&Task>)> {
        Category::ALL
            .into_iter()
            .map(Some)
            .chain(std::iter::once(None))
            .filter_map(|category| {
                let group: Vec<&Task> = self.open.iter().filter(|t| t.category == category).collect();
                (!group.is_empty()).then_some((category, group))
            })
            .collect()
    }
}
