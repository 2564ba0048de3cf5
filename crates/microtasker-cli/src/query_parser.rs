use std::str::FromStr;

use chrono::NaiveDate;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::PrattParser;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use microtasker_core::models::{Category, Priority, TimeEstimate};
use microtasker_core::query::{DueDate, Filter, Operator, Query, Status};

#[derive(Parser)]
#[grammar = "filter.pest"]
pub struct FilterParser;

lazy_static::lazy_static! {
    static ref PRATT_PARSER: PrattParser<Rule> = {
        use pest::pratt_parser::{Assoc::*, Op};
        use Rule::*;

        PrattParser::new()
            .op(Op::infix(or, Left))
            .op(Op::infix(and, Left))
            .op(Op::prefix(not))
    };
}

#[derive(Error, Debug)]
pub enum QueryParseError {
    #[error("Pest parsing error: {0}")]
    Pest(#[from] Box<pest::error::Error<Rule>>),
    #[error("Invalid filter expression: {0}")]
    InvalidFilter(String),
    #[error("Unknown rule: {0:?}")]
    UnknownRule(Rule),
    #[error("Invalid {key} value: {value}")]
    InvalidValue { key: &'static str, value: String },
}

fn invalid(key: &'static str, value: &str) -> QueryParseError {
    QueryParseError::InvalidValue {
        key,
        value: value.to_string(),
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, QueryParseError> {
    match value.to_lowercase().as_str() {
        "yes" | "true" => Ok(true),
        "no" | "false" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn build_filter(pair: Pair<Rule>) -> Result<Filter, QueryParseError> {
    let text = pair.as_str().to_string();
    let mut inner = pair.into_inner();
    let (Some(key), Some(value)) = (inner.next(), inner.next()) else {
        return Err(QueryParseError::InvalidFilter(text));
    };
    let key = key.as_str().to_lowercase();
    let value = value.as_str().trim_matches('"').trim();

    let filter = match key.as_str() {
        "category" | "cat" => Filter::Category(
            Category::from_str(value.trim_start_matches('/')).map_err(|_| invalid("category", value))?,
        ),
        "priority" => match value.to_lowercase().as_str() {
            "none" => Filter::Priority(None),
            _ => Filter::Priority(Some(
                Priority::from_str(value).map_err(|_| invalid("priority", value))?,
            )),
        },
        "tag" => Filter::Tag(value.trim_start_matches('#').to_lowercase()),
        "status" => match value.to_lowercase().as_str() {
            "open" | "pending" => Filter::Status(Status::Open),
            "done" | "completed" => Filter::Status(Status::Done),
            _ => return Err(invalid("status", value)),
        },
        "estimate" => Filter::Estimate(
            TimeEstimate::from_str(value).map_err(|_| invalid("estimate", value))?,
        ),
        "due" => Filter::Due(match value.to_lowercase().as_str() {
            "today" => DueDate::Today,
            "tomorrow" => DueDate::Tomorrow,
            "overdue" => DueDate::Overdue,
            "none" => DueDate::None,
            _ => DueDate::On(
                NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid("due", value))?,
            ),
        }),
        "recurring" => Filter::Recurring(parse_flag("recurring", value)?),
        "template" => Filter::Template(parse_flag("template", value)?),
        _ => {
            return Err(QueryParseError::InvalidFilter(format!(
                "Unknown filter key: {}",
                key
            )))
        }
    };
    Ok(filter)
}

fn build_ast(pairs: Pairs<Rule>) -> Result<Query, QueryParseError> {
    PRATT_PARSER
        .map_primary(|primary| match primary.as_rule() {
            Rule::filter_expression => Ok(Query::Filter(build_filter(primary)?)),
            Rule::expression => build_ast(primary.into_inner()),
            rule => Err(QueryParseError::UnknownRule(rule)),
        })
        .map_prefix(|op, rhs| {
            let op_rule = op.as_rule();
            match op_rule {
                Rule::not => Ok(Query::Not(Box::new(rhs?))),
                _ => Err(QueryParseError::UnknownRule(op_rule)),
            }
        })
        .map_infix(|lhs, op, rhs| {
            let op = match op.as_rule() {
                Rule::and => Operator::And,
                Rule::or => Operator::Or,
                rule => return Err(QueryParseError::UnknownRule(rule)),
            };
            Ok(Query::Binary {
                op,
                left: Box::new(lhs?),
                right: Box::new(rhs?),
            })
        })
        .parse(pairs)
}

/// Parses a filter expression. An empty expression matches everything.
pub fn parse_query(input: &str) -> Result<Query, QueryParseError> {
    let query = FilterParser::parse(Rule::filter_query, input)
        .map_err(Box::new)?
        .next()
        .ok_or_else(|| QueryParseError::InvalidFilter(input.to_string()))?;

    match query.into_inner().find(|pair| pair.as_rule() == Rule::expression) {
        Some(expression) => build_ast(expression.into_inner()),
        None => Ok(Query::All),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn filter(f: Filter) -> Query {
        Query::Filter(f)
    }

    #[test]
    fn empty_query_matches_all() {
        assert_eq!(parse_query("").unwrap(), Query::All);
        assert_eq!(parse_query("   ").unwrap(), Query::All);
    }

    #[rstest]
    #[case("category:write", Filter::Category(Category::Write))]
    #[case("category:/Read", Filter::Category(Category::Read))]
    #[case("priority:high", Filter::Priority(Some(Priority::High)))]
    #[case("priority:none", Filter::Priority(None))]
    #[case("tag:#Work", Filter::Tag("work".to_string()))]
    #[case("status:done", Filter::Status(Status::Done))]
    #[case("estimate:long", Filter::Estimate(TimeEstimate::Long))]
    #[case("estimate:\"5-10 min\"", Filter::Estimate(TimeEstimate::Mid))]
    #[case("due:overdue", Filter::Due(DueDate::Overdue))]
    #[case("due:2024-06-01", Filter::Due(DueDate::On(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())))]
    #[case("recurring:yes", Filter::Recurring(true))]
    #[case("template:no", Filter::Template(false))]
    fn single_filters(#[case] input: &str, #[case] expected: Filter) {
        assert_eq!(parse_query(input).unwrap(), filter(expected));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let query = parse_query("tag:a or tag:b and not status:done").unwrap();
        let expected = Query::Binary {
            op: Operator::Or,
            left: Box::new(filter(Filter::Tag("a".to_string()))),
            right: Box::new(Query::Binary {
                op: Operator::And,
                left: Box::new(filter(Filter::Tag("b".to_string()))),
                right: Box::new(Query::Not(Box::new(filter(Filter::Status(Status::Done))))),
            }),
        };
        assert_eq!(query, expected);
    }

    #[test]
    fn parentheses_group() {
        let query = parse_query("(tag:a or tag:b) and status:open").unwrap();
        let Query::Binary { op, left, .. } = query else {
            panic!("expected a binary query");
        };
        assert_eq!(op, Operator::And);
        assert!(matches!(*left, Query::Binary { op: Operator::Or, .. }));
    }

    #[test]
    fn keys_starting_with_operator_words_still_parse() {
        assert!(matches!(
            parse_query("notes:x"),
            Err(QueryParseError::InvalidFilter(_))
        ));
        assert_eq!(
            parse_query("NOT tag:order").unwrap(),
            Query::Not(Box::new(filter(Filter::Tag("order".to_string()))))
        );
    }

    #[rstest]
    #[case("category:cooking")]
    #[case("status:maybe")]
    #[case("due:someday")]
    #[case("color:red")]
    #[case("status:open and")]
    #[case("(tag:a")]
    fn invalid_queries_are_rejected(#[case] input: &str) {
        assert!(parse_query(input).is_err());
    }
}
