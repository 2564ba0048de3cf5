use crate::capture::TaskDraft;
use crate::error::CoreError;
use crate::models::{
    normalize_tags, CaptureOutcome, CompletionResult, Frequency, NewTaskData, Task, UpdateTaskData,
};
use crate::query::Query;
use crate::repository::query_builder::SqlQueryBuilder;
use crate::repository::{fetch_task, SqliteRepository, TaskRow, TASK_SELECT};
use crate::timezone::Today;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, Transaction};
use uuid::Uuid;

pub const MAX_TITLE_LENGTH: usize = 200;

/// What kind of row `add_task_in_transaction` writes.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TaskKind {
    Standalone,
    Template { frequency: Frequency },
    Instance { template_id: Uuid, frequency: Option<Frequency> },
}

fn validate_title(title: &str) -> Result<String, CoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CoreError::InvalidInput("Task title cannot be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::InvalidInput(format!(
            "Task title cannot be longer than {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title.to_string())
}

#[async_trait]
impl super::TaskRepository for SqliteRepository {
    async fn add_task(&self, mut data: NewTaskData) -> Result<CaptureOutcome, CoreError> {
        data.title = validate_title(&data.title)?;
        data.tags = normalize_tags(&data.tags);

        let mut tx = self.pool().begin().await?;

        let outcome = if let Some(template_id) = data.template_id {
            let template = fetch_task(&mut *tx, template_id)
                .await?
                .filter(|t| t.is_template)
                .ok_or_else(|| CoreError::NotFound(format!("Recurring template {}", template_id)))?;
            if let Some(due_date) = data.due_date {
                if Self::find_instance_on(&mut tx, template_id, due_date).await?.is_some() {
                    return Err(CoreError::InvalidInput(format!(
                        "'{}' already has an occurrence on {}",
                        template.title, due_date
                    )));
                }
            }
            let kind = TaskKind::Instance {
                template_id,
                frequency: template.frequency,
            };
            CaptureOutcome::Single(Self::add_task_in_transaction(&mut tx, data, kind).await?)
        } else if let Some(frequency) = data.frequency {
            let start_date = data.start_date.or(data.due_date).ok_or_else(|| {
                CoreError::InvalidInput("A recurring task needs a start or due date".to_string())
            })?;
            let first_due = data.due_date.unwrap_or(start_date);
            if let Some(end_date) = data.end_date {
                if end_date < first_due {
                    return Err(CoreError::InvalidInput(format!(
                        "End date {} is before the first occurrence on {}",
                        end_date, first_due
                    )));
                }
            }

            // Monthly successors spring back to the day the series first fell on.
            let mut template_data = data.clone();
            template_data.due_date = None;
            template_data.start_date = Some(first_due);
            let template = Self::add_task_in_transaction(
                &mut tx,
                template_data,
                TaskKind::Template { frequency },
            )
            .await?;

            let first_data = NewTaskData {
                due_date: Some(first_due),
                start_date: None,
                end_date: None,
                frequency: None,
                template_id: Some(template.id),
                ..data
            };
            let first = Self::add_task_in_transaction(
                &mut tx,
                first_data,
                TaskKind::Instance {
                    template_id: template.id,
                    frequency: Some(frequency),
                },
            )
            .await?;

            tracing::debug!(template = %template.id, first = %first.id, %frequency, "created recurring task");
            CaptureOutcome::Recurring { template, first }
        } else {
            if data.end_date.is_some() {
                return Err(CoreError::InvalidInput(
                    "An end date only applies to recurring tasks".to_string(),
                ));
            }
            CaptureOutcome::Single(
                Self::add_task_in_transaction(&mut tx, data, TaskKind::Standalone).await?,
            )
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn capture(&self, draft: TaskDraft) -> Result<CaptureOutcome, CoreError> {
        self.add_task(draft.into_new_task()).await
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError> {
        fetch_task(self.pool(), id).await
    }

    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError> {
        let mut pattern = String::with_capacity(short_id.len() + 1);
        pattern.push_str(&short_id.to_lowercase());
        pattern.push('%');

        let sql = format!(
            "{TASK_SELECT} WHERE lower(hex(t.id)) LIKE ? GROUP BY t.id ORDER BY t.created_at"
        );
        let rows: Vec<TaskRow> = sqlx::query_as(&sql)
            .bind(pattern)
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn find_tasks(&self, query: &Query, today: &Today) -> Result<Vec<Task>, CoreError> {
        let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(TASK_SELECT);
        query_builder.push(" WHERE (");
        SqlQueryBuilder::build_sql_where_clause(query, today, &mut query_builder);
        query_builder.push(")");
        if !query.mentions_templates() {
            query_builder.push(" AND t.is_template = 0");
        }
        query_builder.push(" GROUP BY t.id ORDER BY t.created_at DESC, t.rowid DESC");

        let rows: Vec<TaskRow> = query_builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn update_task(&self, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError> {
        let mut tx = self.pool().begin().await?;

        let current = fetch_task(&mut *tx, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        if current.is_template {
            if matches!(data.due_date, Some(Some(_))) {
                return Err(CoreError::InvalidInput(
                    "A recurring template cannot have a due date".to_string(),
                ));
            }
            if data.completed.is_some() {
                return Err(CoreError::InvalidInput(
                    "A recurring template cannot be completed".to_string(),
                ));
            }
        } else if matches!(data.end_date, Some(Some(_))) {
            return Err(CoreError::InvalidInput(
                "An end date only applies to recurring templates".to_string(),
            ));
        }

        Self::update_task_fields(&mut tx, &current, &data).await?;

        let updated = fetch_task(&mut *tx, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn complete_task(&self, id: Uuid, today: &Today) -> Result<CompletionResult, CoreError> {
        let mut tx = self.pool().begin().await?;

        let task = fetch_task(&mut *tx, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        if task.is_template {
            return Err(CoreError::InvalidInput(
                "A recurring template cannot be completed; complete one of its occurrences".to_string(),
            ));
        }
        if task.completed {
            return Err(CoreError::InvalidInput(format!(
                "'{}' is already completed",
                task.title
            )));
        }

        let now = Utc::now();
        sqlx::query("UPDATE tasks SET completed = 1, completed_at = $1, updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let completed = fetch_task(&mut *tx, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        let template = match completed.template_id {
            Some(template_id) => fetch_task(&mut *tx, template_id).await?,
            None => None,
        };

        let Some(template) = template else {
            tx.commit().await?;
            return Ok(CompletionResult::Single(completed));
        };

        let next = match self.generator().generate_next(&completed, &template, today) {
            Some(next_data) => {
                let existing = match next_data.due_date {
                    Some(due_date) => Self::find_instance_on(&mut tx, template.id, due_date).await?,
                    None => None,
                };
                match existing {
                    Some(existing) => {
                        tracing::debug!(task = %existing.id, "successor already exists");
                        Some(existing)
                    }
                    None => {
                        let kind = TaskKind::Instance {
                            template_id: template.id,
                            frequency: template.frequency,
                        };
                        Some(Self::add_task_in_transaction(&mut tx, next_data, kind).await?)
                    }
                }
            }
            None => None,
        };

        tx.commit().await?;
        Ok(CompletionResult::Recurring { completed, next })
    }

    async fn reopen_task(&self, id: Uuid) -> Result<Task, CoreError> {
        let mut tx = self.pool().begin().await?;

        let task = fetch_task(&mut *tx, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        if task.is_template {
            return Err(CoreError::InvalidInput(
                "A recurring template cannot be reopened".to_string(),
            ));
        }

        sqlx::query("UPDATE tasks SET completed = 0, completed_at = NULL, updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let reopened = fetch_task(&mut *tx, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        tx.commit().await?;
        Ok(reopened)
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        tracing::debug!(task = %id, "deleted task");
        Ok(())
    }
}

impl SqliteRepository {
    pub(crate) async fn add_task_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        data: NewTaskData,
        kind: TaskKind,
    ) -> Result<Task, CoreError> {
        let now = Utc::now();
        let (is_recurring, is_template, template_id, frequency) = match kind {
            TaskKind::Standalone => (false, false, None, None),
            TaskKind::Template { frequency } => (true, true, None, Some(frequency)),
            TaskKind::Instance { template_id, frequency } => (true, false, Some(template_id), frequency),
        };

        let mut tags = normalize_tags(&data.tags);
        tags.sort();

        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            category: data.category,
            tags,
            priority: data.priority,
            time_estimate: data.time_estimate.unwrap_or_default(),
            due_date: if is_template { None } else { data.due_date },
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
            is_recurring,
            is_template,
            template_id,
            frequency,
            start_date: if is_template { data.start_date } else { None },
            end_date: if is_template { data.end_date } else { None },
        };

        sqlx::query(
            r#"INSERT INTO tasks (id, title, category, priority, time_estimate, due_date, completed,
                is_recurring, is_template, template_id, frequency, start_date, end_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(task.category)
        .bind(task.priority)
        .bind(task.time_estimate)
        .bind(task.due_date)
        .bind(task.is_recurring)
        .bind(task.is_template)
        .bind(task.template_id)
        .bind(task.frequency)
        .bind(task.start_date)
        .bind(task.end_date)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&mut **tx)
        .await?;

        if !task.tags.is_empty() {
            let mut query_builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO task_tags (task_id, tag_name) ");
            query_builder.push_values(task.tags.iter(), |mut b, tag| {
                b.push_bind(task.id).push_bind(tag.clone());
            });
            query_builder.build().execute(&mut **tx).await?;
        }

        Ok(task)
    }

    /// The instance of `template_id` scheduled on `due_date`, if any.
    pub(crate) async fn find_instance_on<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        template_id: Uuid,
        due_date: NaiveDate,
    ) -> Result<Option<Task>, CoreError> {
        let sql = format!("{TASK_SELECT} WHERE t.template_id = ? AND t.due_date = ? GROUP BY t.id");
        let row: Option<TaskRow> = sqlx::query_as(&sql)
            .bind(template_id)
            .bind(due_date)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(Task::from))
    }

    pub(crate) async fn update_task_fields<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        current: &Task,
        data: &UpdateTaskData,
    ) -> Result<(), CoreError> {
        let id = current.id;
        let mut touched = false;

        if let Some(tags_to_add) = &data.add_tags {
            let tags_to_add = normalize_tags(tags_to_add);
            if !tags_to_add.is_empty() {
                let mut query_builder: QueryBuilder<Sqlite> =
                    QueryBuilder::new("INSERT OR IGNORE INTO task_tags (task_id, tag_name) ");
                query_builder.push_values(tags_to_add.iter(), |mut b, tag| {
                    b.push_bind(id).push_bind(tag.clone());
                });
                query_builder.build().execute(&mut **tx).await?;
                touched = true;
            }
        }

        if let Some(tags_to_remove) = &data.remove_tags {
            let tags_to_remove = normalize_tags(tags_to_remove);
            if !tags_to_remove.is_empty() {
                let mut query_builder: QueryBuilder<Sqlite> =
                    QueryBuilder::new("DELETE FROM task_tags WHERE task_id = ");
                query_builder.push_bind(id);
                query_builder.push(" AND tag_name IN (");
                let mut separated = query_builder.separated(", ");
                for tag in tags_to_remove.iter() {
                    separated.push_bind(tag.clone());
                }
                separated.push_unseparated(")");
                query_builder.build().execute(&mut **tx).await?;
                touched = true;
            }
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE tasks SET updated_at = ");
        qb.push_bind(Utc::now());

        if let Some(title) = &data.title {
            qb.push(", title = ");
            qb.push_bind(validate_title(title)?);
            touched = true;
        }
        if let Some(category) = data.category {
            qb.push(", category = ");
            qb.push_bind(category);
            touched = true;
        }
        if let Some(priority) = data.priority {
            qb.push(", priority = ");
            qb.push_bind(priority);
            touched = true;
        }
        if let Some(time_estimate) = data.time_estimate {
            qb.push(", time_estimate = ");
            qb.push_bind(time_estimate);
            touched = true;
        }
        if let Some(due_date) = data.due_date {
            qb.push(", due_date = ");
            qb.push_bind(due_date);
            touched = true;
        }
        if let Some(end_date) = data.end_date {
            qb.push(", end_date = ");
            qb.push_bind(end_date);
            touched = true;
        }
        match data.completed {
            Some(true) if !current.completed => {
                qb.push(", completed = 1, completed_at = ");
                qb.push_bind(Utc::now());
                touched = true;
            }
            Some(false) if current.completed => {
                qb.push(", completed = 0, completed_at = NULL");
                touched = true;
            }
            _ => {}
        }

        if touched {
            qb.push(" WHERE id = ");
            qb.push_bind(id);
            qb.build().execute(&mut **tx).await?;
        }

        Ok(())
    }
}
