//! # Microtasker Core Library
//!
//! Storage and domain logic for a personal micro-task manager: tasks that
//! take minutes, captured from one line of text and repeated on a schedule.
//!
//! ## Features
//!
//! - **Quick Capture**: `Read chapter 3 /learn #high #10min #tomorrow` becomes a
//!   categorized, prioritized, estimated and scheduled task
//! - **Recurring Tasks**: a template spawns one dated instance at a time; each
//!   completion generates the next occurrence until the series ends
//! - **Timezone Awareness**: "today" is always the user's local calendar day
//! - **Filtering**: boolean filter expressions compiled to SQL
//! - **Progress Analytics**: streaks, weekly category breakdown, daily focus
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`capture`]: Quick-capture parser and tag vocabulary
//! - [`recurrence`]: Next-occurrence rules and successor generation
//! - [`repository`]: Data access layer with Repository pattern
//! - [`stats`]: Progress report and today's focus
//! - [`timezone`]: Timezone utilities and validation
//! - [`error`]: Error types
//! - [`query`]: Filter expression AST
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use microtasker_core::{
//!     capture::CaptureParser, db, recurrence::RecurrenceGenerator,
//!     repository::{SqliteRepository, TaskRepository}, timezone::Today,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), microtasker_core::error::CoreError> {
//!     let pool = db::establish_connection("microtasker.db").await?;
//!     let repo = SqliteRepository::new(pool, RecurrenceGenerator::default());
//!
//!     let today = Today::now(chrono_tz::Tz::UTC);
//!     let draft = CaptureParser::default().parse("Stretch /break #daily #quick", &today)?;
//!     repo.capture(draft).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod recurrence;
pub mod repository;
pub mod stats;
pub mod timezone;
