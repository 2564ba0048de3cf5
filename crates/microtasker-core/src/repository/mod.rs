use crate::db::DbPool;
use crate::error::CoreError;
use crate::capture::TaskDraft;
use crate::models::{
    BacklogFilter, CaptureOutcome, Category, CompletionResult, Frequency, NewTaskData, Priority,
    Task, TimeEstimate, UpdateTaskData,
};
use crate::query::Query;
use crate::recurrence::RecurrenceGenerator;
use crate::stats::{ProgressReport, TodayFocus};
use crate::timezone::Today;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, Sqlite};
use uuid::Uuid;

pub mod tasks;
pub mod views;
pub mod query_builder;

/// Separator used when tags are folded into one column.
pub(crate) const TAG_SEPARATOR: char = '\u{1f}';

/// Column list shared by every task read. Callers append their own
/// `WHERE`, then `GROUP BY t.id` and an `ORDER BY`.
pub(crate) const TASK_SELECT: &str = r#"SELECT
    t.id, t.title, t.category, t.priority, t.time_estimate, t.due_date,
    t.completed, t.completed_at, t.is_recurring, t.is_template, t.template_id,
    t.frequency, t.start_date, t.end_date, t.created_at, t.updated_at,
    GROUP_CONCAT(tt.tag_name, char(31)) AS tags
FROM tasks t
LEFT JOIN task_tags tt ON t.id = tt.task_id
"#;

#[derive(Debug, Clone, FromRow)]
pub(crate) struct TaskRow {
    pub id: Uuid,
    pub title: String,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub time_estimate: TimeEstimate,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_recurring: bool,
    pub is_template: bool,
    pub template_id: Option<Uuid>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Option<String>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        let mut tags: Vec<String> = row
            .tags
            .as_deref()
            .map(|joined| {
                joined
                    .split(TAG_SEPARATOR)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        tags.sort();
        tags.dedup();

        Task {
            id: row.id,
            title: row.title,
            category: row.category,
            tags,
            priority: row.priority,
            time_estimate: row.time_estimate,
            due_date: row.due_date,
            completed: row.completed,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            is_recurring: row.is_recurring,
            is_template: row.is_template,
            template_id: row.template_id,
            frequency: row.frequency,
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}

/// Loads one task with its tags through any executor (pool or transaction).
pub(crate) async fn fetch_task<'e, E>(executor: E, id: Uuid) -> Result<Option<Task>, CoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!("{TASK_SELECT} WHERE t.id = ? GROUP BY t.id");
    let row: Option<TaskRow> = sqlx::query_as(&sql).bind(id).fetch_optional(executor).await?;
    Ok(row.map(Task::from))
}

/// Domain-specific trait for task operations
#[async_trait]
pub trait TaskRepository {
    /// Inserts a task. A `frequency` creates a template and its first instance;
    /// a `template_id` adds an instance to an existing template.
    async fn add_task(&self, data: NewTaskData) -> Result<CaptureOutcome, CoreError>;
    /// Persists a parsed quick-capture draft.
    async fn capture(&self, draft: TaskDraft) -> Result<CaptureOutcome, CoreError>;
    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError>;
    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError>;
    async fn find_tasks(&self, query: &Query, today: &Today) -> Result<Vec<Task>, CoreError>;
    async fn update_task(&self, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError>;
    async fn complete_task(&self, id: Uuid, today: &Today) -> Result<CompletionResult, CoreError>;
    async fn reopen_task(&self, id: Uuid) -> Result<Task, CoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for the read-only views
#[async_trait]
pub trait ViewRepository {
    /// Non-template tasks due on `day`, open and done.
    async fn today_tasks(&self, day: NaiveDate) -> Result<Vec<Task>, CoreError>;
    /// Tasks whose completion falls on `day` in its timezone.
    async fn completed_on(&self, day: &Today) -> Result<Vec<Task>, CoreError>;
    async fn today_focus(&self, today: &Today) -> Result<TodayFocus, CoreError>;
    async fn backlog(&self, filter: BacklogFilter, search: Option<&str>) -> Result<Vec<Task>, CoreError>;
    /// Open tasks scheduled on `date`.
    async fn planned_for(&self, date: NaiveDate) -> Result<Vec<Task>, CoreError>;
    async fn progress(&self, today: &Today) -> Result<ProgressReport, CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository: TaskRepository + ViewRepository {}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    generator: RecurrenceGenerator,
}

impl SqliteRepository {
    pub fn new(pool: DbPool, generator: RecurrenceGenerator) -> Self {
        Self { pool, generator }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub(crate) fn generator(&self) -> &RecurrenceGenerator {
        &self.generator
    }
}

impl Repository for SqliteRepository {}
