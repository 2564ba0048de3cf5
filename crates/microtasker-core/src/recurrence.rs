use chrono::{Datelike, Days, NaiveDate};
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

use crate::models::{Frequency, NewTaskData, Task};
use crate::timezone::Today;

/// What a monthly recurrence does when the anchor day does not exist in the
/// following month (e.g. the 31st).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthEndPolicy {
    /// Use the last day of the shorter month: Jan 31 -> Feb 29 -> Mar 31.
    #[default]
    Clamp,
    /// Jump to the next month that has the anchor day: Jan 31 -> Mar 31.
    Skip,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid month-end policy: {0}")]
pub struct ParseMonthEndPolicyError(String);

impl FromStr for MonthEndPolicy {
    type Err = ParseMonthEndPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clamp" => Ok(MonthEndPolicy::Clamp),
            "skip" => Ok(MonthEndPolicy::Skip),
            _ => Err(ParseMonthEndPolicyError(s.to_string())),
        }
    }
}

/// How successor dates are computed when a monthly series hits a short month.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecurrenceConfig {
    pub month_end: MonthEndPolicy,
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|d| d.day())
}

fn is_last_day_of_month(date: NaiveDate) -> bool {
    last_day_of_month(date.year(), date.month()) == Some(date.day())
}

fn add_months(year: i32, month: u32, months: u32) -> (i32, u32) {
    let zero_based = month - 1 + months;
    (year + (zero_based / 12) as i32, zero_based % 12 + 1)
}

/// Date of the occurrence that follows `prior`.
///
/// Daily and weekly add 1 and 7 days. Monthly lands on `anchor_day` of the
/// following month, resolving short months with `policy`. `Custom` has no
/// rule and advances one day.
pub fn next_occurrence(
    prior: NaiveDate,
    frequency: Frequency,
    anchor_day: u32,
    policy: MonthEndPolicy,
) -> Option<NaiveDate> {
    match frequency {
        Frequency::Daily | Frequency::Custom => prior.checked_add_days(Days::new(1)),
        Frequency::Weekly => prior.checked_add_days(Days::new(7)),
        Frequency::Monthly => {
            let anchor_day = anchor_day.clamp(1, 31);
            match policy {
                MonthEndPolicy::Clamp => {
                    let (year, month) = add_months(prior.year(), prior.month(), 1);
                    let day = anchor_day.min(last_day_of_month(year, month)?);
                    NaiveDate::from_ymd_opt(year, month, day)
                }
                MonthEndPolicy::Skip => (1..=12).find_map(|offset| {
                    let (year, month) = add_months(prior.year(), prior.month(), offset);
                    NaiveDate::from_ymd_opt(year, month, anchor_day)
                }),
            }
        }
    }
}

/// Computes and guards successor instances for recurring templates.
#[derive(Debug, Clone, Default)]
pub struct RecurrenceGenerator {
    config: RecurrenceConfig,
}

impl RecurrenceGenerator {
    pub fn new(config: RecurrenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecurrenceConfig {
        &self.config
    }

    /// Next date after `prior`, anchored on `prior`'s own day of month.
    pub fn next_occurrence(&self, prior: NaiveDate, frequency: Frequency) -> Option<NaiveDate> {
        next_occurrence(prior, frequency, prior.day(), self.config.month_end)
    }

    /// Builds the instance that follows `instance`, or `None` when the
    /// template has no frequency or the next date falls after its end date.
    ///
    /// Instances without a due date advance from `today`.
    pub fn generate_next(&self, instance: &Task, template: &Task, today: &Today) -> Option<NewTaskData> {
        if !template.is_template || instance.template_id != Some(template.id) {
            tracing::warn!(
                instance = %instance.id,
                template = %template.id,
                "instance does not belong to template"
            );
            return None;
        }
        let frequency = template.frequency?;
        let prior = instance.due_date.unwrap_or_else(|| today.date());

        let next = next_occurrence(
            prior,
            frequency,
            Self::anchor_day(prior, template),
            self.config.month_end,
        )?;

        if let Some(end_date) = template.end_date {
            if next > end_date {
                tracing::debug!(template = %template.id, %next, %end_date, "series ended");
                return None;
            }
        }

        Some(NewTaskData {
            title: template.title.clone(),
            category: template.category,
            tags: template.tags.clone(),
            priority: template.priority,
            time_estimate: Some(template.time_estimate),
            due_date: Some(next),
            frequency: None,
            start_date: None,
            end_date: None,
            template_id: Some(template.id),
        })
    }

    /// Day of month a monthly series should land on. A prior date that was
    /// clamped to a month end springs back to the day the series started on.
    fn anchor_day(prior: NaiveDate, template: &Task) -> u32 {
        match template.start_date {
            Some(start) if start.day() > prior.day() && is_last_day_of_month(prior) => start.day(),
            _ => prior.day(),
        }
    }
}
