use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Value types
// ============================================================================

/// The fixed set of task categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum Category {
    Read,
    Write,
    Speak,
    Learn,
    Pray,
    Break,
    Build,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Read,
        Category::Write,
        Category::Speak,
        Category::Learn,
        Category::Pray,
        Category::Break,
        Category::Build,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Read => "Read",
            Category::Write => "Write",
            Category::Speak => "Speak",
            Category::Learn => "Learn",
            Category::Pray => "Pray",
            Category::Break => "Break",
            Category::Build => "Build",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid category: {0}")]
pub struct ParseCategoryError(String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort weight used by the focus views. Higher sorts first.
    pub fn rank(priority: Option<Priority>) -> u8 {
        match priority {
            Some(Priority::High) => 3,
            Some(Priority::Medium) => 2,
            Some(Priority::Low) => 1,
            None => 0,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid priority: {0}")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// Coarse time buckets a micro-task can fall into.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum TimeEstimate {
    #[default]
    #[serde(rename = "2-5 min")]
    #[sqlx(rename = "2-5 min")]
    Quick,
    #[serde(rename = "5-10 min")]
    #[sqlx(rename = "5-10 min")]
    Mid,
    #[serde(rename = "10+ min")]
    #[sqlx(rename = "10+ min")]
    Long,
}

impl TimeEstimate {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeEstimate::Quick => "2-5 min",
            TimeEstimate::Mid => "5-10 min",
            TimeEstimate::Long => "10+ min",
        }
    }

    /// Representative duration of the bucket, used for daily totals.
    pub fn minutes(&self) -> f64 {
        match self {
            TimeEstimate::Quick => 3.5,
            TimeEstimate::Mid => 7.5,
            TimeEstimate::Long => 15.0,
        }
    }
}

impl std::fmt::Display for TimeEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid time estimate: {0}")]
pub struct ParseTimeEstimateError(String);

impl FromStr for TimeEstimate {
    type Err = ParseTimeEstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "2-5 min" | "2-5" | "quick" => Ok(TimeEstimate::Quick),
            "5-10 min" | "5-10" | "mid" => Ok(TimeEstimate::Mid),
            "10+ min" | "10+" | "long" => Ok(TimeEstimate::Long),
            _ => Err(ParseTimeEstimateError(s.to_string())),
        }
    }
}

/// How often a recurring template spawns instances.
///
/// `Custom` exists because older stores used it as a repeat type; it carries
/// no rule of its own and advances one day at a time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "custom" => Ok(Frequency::Custom),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

// ============================================================================
// Task
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub category: Option<Category>,
    /// Lowercase, deduplicated and sorted.
    pub tags: Vec<String>,
    pub priority: Option<Priority>,
    pub time_estimate: TimeEstimate,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_recurring: bool,
    /// Templates only spawn instances and are never due themselves.
    pub is_template: bool,
    /// Set on instances; points at the owning template.
    pub template_id: Option<Uuid>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: String::new(),
            category: None,
            tags: Vec::new(),
            priority: None,
            time_estimate: TimeEstimate::default(),
            due_date: None,
            completed: false,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_recurring: false,
            is_template: false,
            template_id: None,
            frequency: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl Task {
    /// True for a dated occurrence spawned by a template.
    pub fn is_instance(&self) -> bool {
        self.template_id.is_some()
    }
}

/// Normalizes a tag list into the stored form: trimmed, lowercase, unique.
/// First-seen order is preserved.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().trim_start_matches('#').to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

// ============================================================================
// Data Transfer Objects
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTaskData {
    pub title: String,
    pub category: Option<Category>,
    pub tags: Vec<String>,
    pub priority: Option<Priority>,
    pub time_estimate: Option<TimeEstimate>,
    pub due_date: Option<NaiveDate>,
    /// When present the task is created as a recurring template plus its
    /// first instance.
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Links an instance to its template. Set by the recurrence generator.
    pub template_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTaskData {
    pub title: Option<String>,
    pub category: Option<Option<Category>>,
    pub priority: Option<Option<Priority>>,
    pub time_estimate: Option<TimeEstimate>,
    pub due_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    /// `Some(true)` stamps `completed_at` if the task was open,
    /// `Some(false)` clears it.
    pub completed: Option<bool>,
    pub add_tags: Option<Vec<String>>,
    pub remove_tags: Option<Vec<String>>,
}

#[derive(Debug)]
pub enum CompletionResult {
    Single(Task),
    /// A recurring instance was completed; `next` is its successor unless the
    /// template's end date has passed.
    Recurring { completed: Task, next: Option<Task> },
}

#[derive(Debug)]
pub enum CaptureOutcome {
    Single(Task),
    Recurring { template: Task, first: Task },
}

/// Narrowing applied on top of the backlog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BacklogFilter {
    #[default]
    All,
    Uncategorized,
    Categorized,
    Planned,
    Unplanned,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid backlog filter: {0}")]
pub struct ParseBacklogFilterError(String);

impl FromStr for BacklogFilter {
    type Err = ParseBacklogFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(BacklogFilter::All),
            "uncategorized" => Ok(BacklogFilter::Uncategorized),
            "categorized" => Ok(BacklogFilter::Categorized),
            "planned" => Ok(BacklogFilter::Planned),
            "unplanned" => Ok(BacklogFilter::Unplanned),
            _ => Err(ParseBacklogFilterError(s.to_string())),
        }
    }
}
