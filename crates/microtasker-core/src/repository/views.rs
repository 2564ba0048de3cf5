use crate::error::CoreError;
use crate::models::{BacklogFilter, Task};
use crate::repository::{SqliteRepository, TaskRow, TASK_SELECT};
use crate::stats::{ProgressReport, TodayFocus};
use crate::timezone::Today;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite};

/// Escapes `LIKE` wildcards so `term` matches literally under `ESCAPE '\\'`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl SqliteRepository {
    async fn fetch_rows(&self, mut query_builder: QueryBuilder<'_, Sqlite>) -> Result<Vec<Task>, CoreError> {
        let rows: Vec<TaskRow> = query_builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }
}

#[async_trait]
impl super::ViewRepository for SqliteRepository {
    async fn today_tasks(&self, day: NaiveDate) -> Result<Vec<Task>, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(TASK_SELECT);
        qb.push(" WHERE t.is_template = 0 AND t.due_date = ");
        qb.push_bind(day);
        qb.push(" GROUP BY t.id ORDER BY t.completed, t.created_at");
        self.fetch_rows(qb).await
    }

    async fn completed_on(&self, day: &Today) -> Result<Vec<Task>, CoreError> {
        let (start, end) = day.day_bounds();
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(TASK_SELECT);
        qb.push(" WHERE t.completed = 1 AND t.completed_at >= ");
        qb.push_bind(start);
        qb.push(" AND t.completed_at < ");
        qb.push_bind(end);
        qb.push(" GROUP BY t.id ORDER BY t.completed_at DESC");
        self.fetch_rows(qb).await
    }

    async fn today_focus(&self, today: &Today) -> Result<TodayFocus, CoreError> {
        let open: Vec<Task> = self
            .today_tasks(today.date())
            .await?
            .into_iter()
            .filter(|t| !t.completed)
            .collect();
        let completed = self.completed_on(today).await?;
        Ok(TodayFocus::new(open, completed))
    }

    async fn backlog(&self, filter: BacklogFilter, search: Option<&str>) -> Result<Vec<Task>, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(TASK_SELECT);
        qb.push(" WHERE t.completed = 0 AND t.is_template = 0");

        match filter {
            BacklogFilter::All => {}
            BacklogFilter::Uncategorized => {
                qb.push(" AND t.category IS NULL");
            }
            BacklogFilter::Categorized => {
                qb.push(" AND t.category IS NOT NULL");
            }
            BacklogFilter::Planned => {
                qb.push(" AND t.due_date IS NOT NULL");
            }
            BacklogFilter::Unplanned => {
                qb.push(" AND t.due_date IS NULL");
            }
        }

        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));

            qb.push(" AND (LOWER(t.title) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '\\' OR t.id IN (SELECT task_id FROM task_tags WHERE tag_name LIKE ");
            qb.push_bind(pattern);
            qb.push(" ESCAPE '\\'))");
        }

        qb.push(" GROUP BY t.id ORDER BY t.created_at DESC");
        self.fetch_rows(qb).await
    }

    async fn planned_for(&self, date: NaiveDate) -> Result<Vec<Task>, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(TASK_SELECT);
        qb.push(" WHERE t.completed = 0 AND t.is_template = 0 AND t.due_date = ");
        qb.push_bind(date);
        qb.push(" GROUP BY t.id ORDER BY t.created_at");
        self.fetch_rows(qb).await
    }

    async fn progress(&self, today: &Today) -> Result<ProgressReport, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(TASK_SELECT);
        qb.push(" WHERE t.is_template = 0 GROUP BY t.id");
        let tasks = self.fetch_rows(qb).await?;
        tracing::debug!(tasks = tasks.len(), "computing progress");
        Ok(ProgressReport::compute(&tasks, today))
    }
}
