#![allow(dead_code)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Runs `mtask` against a throwaway database in its own working directory,
/// so no `config.toml` from the developer's checkout leaks in.
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self { temp_dir, db_path }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("mtask").expect("Failed to find mtask binary");
        cmd.current_dir(self.temp_dir.path())
            .env("MTASK_DATABASE_PATH", &self.db_path)
            .env("MTASK_TIMEZONE", "UTC")
            .env_remove("MTASK_LOG");
        cmd
    }

    pub fn dir(&self) -> &std::path::Path {
        self.temp_dir.path()
    }

    pub fn db_path(&self) -> &std::path::Path {
        &self.db_path
    }

    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Runs `list --json` with `query` and returns the parsed tasks.
    pub fn list_json(&self, query: &[&str]) -> Vec<serde_json::Value> {
        let mut args = vec!["list", "--json"];
        args.extend_from_slice(query);
        let output = self.run_success(&args).get_output().stdout.clone();
        serde_json::from_slice(&output).expect("list --json should print a JSON array")
    }

    /// Short ID of the single task whose title is `title`.
    pub fn short_id_of(&self, title: &str) -> String {
        let tasks = self.list_json(&[]);
        let task = tasks
            .iter()
            .find(|t| t["title"] == title)
            .unwrap_or_else(|| panic!("no task titled '{}'", title));
        task["id"].as_str().expect("id should be a string").replace('-', "")[..8].to_string()
    }
}

pub mod assertions {
    use super::*;

    pub fn task_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("Created task").or(predicate::str::contains("Created recurring task"))
    }

    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Title"))
            .and(predicate::str::contains("Due"))
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
