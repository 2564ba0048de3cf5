use crate::query::{DueDate, Filter, Operator, Query, Status};
use crate::timezone::Today;
use sqlx::{QueryBuilder, Sqlite};

/// Utility functions for building SQL queries from our AST
pub struct SqlQueryBuilder;

impl SqlQueryBuilder {
    /// Build a SQL WHERE clause from a Query AST. Relative dates resolve
    /// against `today`.
    pub fn build_sql_where_clause<'a>(
        query: &Query,
        today: &Today,
        qb: &mut QueryBuilder<'a, Sqlite>,
    ) {
        match query {
            Query::All => {
                qb.push("1 = 1");
            }
            Query::Filter(filter) => Self::build_filter_clause(filter, today, qb),
            Query::Not(query) => {
                qb.push("NOT (");
                Self::build_sql_where_clause(query, today, qb);
                qb.push(")");
            }
            Query::Binary { op, left, right } => {
                qb.push("(");
                Self::build_sql_where_clause(left, today, qb);
                match op {
                    Operator::And => qb.push(") AND ("),
                    Operator::Or => qb.push(") OR ("),
                };
                Self::build_sql_where_clause(right, today, qb);
                qb.push(")");
            }
        }
    }

    fn build_filter_clause<'a>(filter: &Filter, today: &Today, qb: &mut QueryBuilder<'a, Sqlite>) {
        match filter {
            Filter::Category(category) => {
                qb.push("t.category = ");
                qb.push_bind(*category);
            }
            Filter::Priority(Some(priority)) => {
                qb.push("t.priority = ");
                qb.push_bind(*priority);
            }
            Filter::Priority(None) => {
                qb.push("t.priority IS NULL");
            }
            Filter::Tag(tag) => {
                qb.push("t.id IN (SELECT task_id FROM task_tags WHERE tag_name = ");
                qb.push_bind(tag.to_lowercase());
                qb.push(")");
            }
            Filter::Status(Status::Open) => {
                qb.push("t.completed = 0");
            }
            Filter::Status(Status::Done) => {
                qb.push("t.completed = 1");
            }
            Filter::Estimate(estimate) => {
                qb.push("t.time_estimate = ");
                qb.push_bind(*estimate);
            }
            Filter::Due(due_date) => Self::build_due_date_clause(due_date, today, qb),
            Filter::Recurring(recurring) => {
                qb.push("t.is_recurring = ");
                qb.push_bind(*recurring);
            }
            Filter::Template(template) => {
                qb.push("t.is_template = ");
                qb.push_bind(*template);
            }
        }
    }

    /// Build SQL clause for due date filters
    fn build_due_date_clause<'a>(due_date: &DueDate, today: &Today, qb: &mut QueryBuilder<'a, Sqlite>) {
        match due_date {
            DueDate::Today => {
                qb.push("t.due_date = ");
                qb.push_bind(today.date());
            }
            DueDate::Tomorrow => {
                qb.push("t.due_date = ");
                qb.push_bind(today.plus_days(1));
            }
            DueDate::Overdue => {
                qb.push("t.due_date < ");
                qb.push_bind(today.date());
                qb.push(" AND t.completed = 0");
            }
            DueDate::None => {
                qb.push("t.due_date IS NULL");
            }
            DueDate::On(date) => {
                qb.push("t.due_date = ");
                qb.push_bind(*date);
            }
        }
    }
}
