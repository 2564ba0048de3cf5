use crate::models::{Category, Priority, TimeEstimate};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Matches every task the listing would otherwise show.
    All,
    Filter(Filter),
    Not(Box<Query>),
    Binary {
        op: Operator,
        left: Box<Query>,
        right: Box<Query>,
    },
}

impl Query {
    pub fn and(left: Query, right: Query) -> Self {
        Query::Binary {
            op: Operator::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// True when the expression mentions `template:` anywhere. Listings hide
    /// templates unless asked about them.
    pub fn mentions_templates(&self) -> bool {
        match self {
            Query::All => false,
            Query::Filter(filter) => matches!(filter, Filter::Template(_)),
            Query::Not(inner) => inner.mentions_templates(),
            Query::Binary { left, right, .. } => {
                left.mentions_templates() || right.mentions_templates()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Open,
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DueDate {
    Today,
    Tomorrow,
    Overdue,
    None,
    On(NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Category(Category),
    /// `None` selects tasks without a priority.
    Priority(Option<Priority>),
    Tag(String),
    Status(Status),
    Estimate(TimeEstimate),
    Due(DueDate),
    Recurring(bool),
    Template(bool),
}
