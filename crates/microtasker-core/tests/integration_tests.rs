use chrono::NaiveDate;
use chrono_tz::Tz;
use microtasker_core::capture::CaptureParser;
use microtasker_core::db::establish_connection;
use microtasker_core::error::CoreError;
use microtasker_core::models::*;
use microtasker_core::query::{DueDate, Filter, Query, Status};
use microtasker_core::recurrence::{MonthEndPolicy, RecurrenceConfig, RecurrenceGenerator};
use microtasker_core::repository::{SqliteRepository, TaskRepository, ViewRepository};
use microtasker_core::timezone::Today;
use tempfile::TempDir;

/// Helper function to create a test database
async fn setup_test_db() -> (SqliteRepository, TempDir) {
    setup_test_db_with(RecurrenceConfig::default()).await
}

async fn setup_test_db_with(config: RecurrenceConfig) -> (SqliteRepository, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("nested").join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    let repository = SqliteRepository::new(pool, RecurrenceGenerator::new(config));
    (repository, temp_dir)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixed_today(y: i32, m: u32, d: u32) -> Today {
    Today::fixed(date(y, m, d), Tz::UTC)
}

/// Helper function to create a plain task
async fn create_test_task(repo: &SqliteRepository, data: NewTaskData) -> Task {
    match repo.add_task(data).await.expect("Failed to create test task") {
        CaptureOutcome::Single(task) => task,
        other => panic!("expected a single task, got {:?}", other),
    }
}

async fn capture(repo: &SqliteRepository, text: &str, today: &Today) -> CaptureOutcome {
    let draft = CaptureParser::default()
        .parse(text, today)
        .expect("capture should parse");
    repo.capture(draft).await.expect("capture should persist")
}

#[tokio::test]
async fn test_capture_persists_every_shortcut() {
    let (repo, _temp_dir) = setup_test_db().await;
    let today = Today::now(Tz::UTC);

    let outcome = capture(&repo, "Email Bob /write #high #10min #tomorrow #Work", &today).await;
    let CaptureOutcome::Single(task) = outcome else {
        panic!("non-recurring capture should create one task");
    };

    let stored = repo.find_task_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Email Bob");
    assert_eq!(stored.category, Some(Category::Write));
    assert_eq!(stored.priority, Some(Priority::High));
    assert_eq!(stored.time_estimate, TimeEstimate::Mid);
    assert_eq!(stored.due_date, Some(today.plus_days(1)));
    assert_eq!(stored.tags, vec!["work".to_string()]);
    assert!(!stored.is_recurring);
    assert!(!stored.completed);
}

#[tokio::test]
async fn test_empty_titles_are_never_persisted() {
    let (repo, _temp_dir) = setup_test_db().await;
    let today = fixed_today(2024, 6, 1);

    let parsed = CaptureParser::default().parse("#high /write", &today);
    assert!(parsed.is_err());

    let result = repo
        .add_task(NewTaskData {
            title: "   ".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));

    let result = repo
        .add_task(NewTaskData {
            title: "x".repeat(201),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));

    let all = repo.find_tasks(&Query::All, &today).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_weekly_series_until_end_date() {
    let (repo, _temp_dir) = setup_test_db().await;
    let today = fixed_today(2024, 6, 1);

    let draft = CaptureParser::default()
        .parse("Stretch /break #weekly", &today)
        .unwrap()
        .until(date(2024, 6, 10));
    let CaptureOutcome::Recurring { template, first } = repo.capture(draft).await.unwrap() else {
        panic!("weekly capture should create a template");
    };

    assert!(template.is_template);
    assert_eq!(template.due_date, None);
    assert_eq!(template.frequency, Some(Frequency::Weekly));
    assert_eq!(template.start_date, Some(date(2024, 6, 1)));
    assert_eq!(template.end_date, Some(date(2024, 6, 10)));
    assert_eq!(first.template_id, Some(template.id));
    assert_eq!(first.due_date, Some(date(2024, 6, 1)));

    let result = repo.complete_task(first.id, &today).await.unwrap();
    let CompletionResult::Recurring { completed, next: Some(second) } = result else {
        panic!("first completion should produce a successor");
    };
    assert!(completed.completed);
    assert!(completed.completed_at.is_some());
    assert_eq!(second.due_date, Some(date(2024, 6, 8)));
    assert_eq!(second.template_id, Some(template.id));
    assert_eq!(second.category, Some(Category::Break));

    let result = repo.complete_task(second.id, &today).await.unwrap();
    assert!(matches!(result, CompletionResult::Recurring { next: None, .. }));
}

#[tokio::test]
async fn test_monthly_series_clamps_and_recovers() {
    let (repo, _temp_dir) = setup_test_db().await;
    let today = fixed_today(2024, 1, 31);

    let CaptureOutcome::Recurring { first, .. } = capture(&repo, "Pay rent #monthly", &today).await else {
        panic!("monthly capture should create a template");
    };

    let CompletionResult::Recurring { next: Some(february), .. } =
        repo.complete_task(first.id, &today).await.unwrap()
    else {
        panic!("expected a February occurrence");
    };
    assert_eq!(february.due_date, Some(date(2024, 2, 29)));

    let CompletionResult::Recurring { next: Some(march), .. } =
        repo.complete_task(february.id, &today).await.unwrap()
    else {
        panic!("expected a March occurrence");
    };
    assert_eq!(march.due_date, Some(date(2024, 3, 31)));
}

#[tokio::test]
async fn test_monthly_series_anchors_on_first_due_date() {
    let (repo, _temp_dir) = setup_test_db().await;
    let today = fixed_today(2024, 1, 30);

    let CaptureOutcome::Recurring { template, first } =
        capture(&repo, "Pay rent #monthly #tomorrow", &today).await
    else {
        panic!("monthly capture should create a template");
    };
    assert_eq!(first.due_date, Some(date(2024, 1, 31)));
    assert_eq!(template.start_date, Some(date(2024, 1, 31)));

    let mut series = vec![first.due_date];
    let mut current = first;
    for _ in 0..3 {
        let CompletionResult::Recurring { next: Some(next), .. } =
            repo.complete_task(current.id, &today).await.unwrap()
        else {
            panic!("expected another occurrence");
        };
        series.push(next.due_date);
        current = next;
    }

    assert_eq!(
        series,
        vec![
            Some(date(2024, 1, 31)),
            Some(date(2024, 2, 29)),
            Some(date(2024, 3, 31)),
            Some(date(2024, 4, 30)),
        ]
    );
}

#[tokio::test]
async fn test_monthly_series_with_skip_policy() {
    let (repo, _temp_dir) = setup_test_db_with(RecurrenceConfig {
        month_end: MonthEndPolicy::Skip,
    })
    .await;
    let today = fixed_today(2024, 1, 31);

    let CaptureOutcome::Recurring { first, .. } = capture(&repo, "Pay rent #monthly", &today).await else {
        panic!("monthly capture should create a template");
    };
    let CompletionResult::Recurring { next: Some(next), .. } =
        repo.complete_task(first.id, &today).await.unwrap()
    else {
        panic!("expected a successor");
    };
    assert_eq!(next.due_date, Some(date(2024, 3, 31)));
}

#[tokio::test]
async fn test_completion_guards() {
    let (repo, _temp_dir) = setup_test_db().await;
    let today = fixed_today(2024, 6, 1);

    let CaptureOutcome::Recurring { template, first } = capture(&repo, "Pray /pray #daily", &today).await else {
        panic!("daily capture should create a template");
    };

    let result = repo.complete_task(template.id, &today).await;
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));

    repo.complete_task(first.id, &today).await.unwrap();
    let result = repo.complete_task(first.id, &today).await;
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));

    let result = repo.complete_task(uuid::Uuid::now_v7(), &today).await;
    assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_recompleting_does_not_duplicate_successor() {
    let (repo, _temp_dir) = setup_test_db().await;
    let today = fixed_today(2024, 6, 1);

    let CaptureOutcome::Recurring { template, first } = capture(&repo, "Journal /write #daily", &today).await else {
        panic!("daily capture should create a template");
    };

    let CompletionResult::Recurring { next: Some(next), .. } =
        repo.complete_task(first.id, &today).await.unwrap()
    else {
        panic!("expected a successor");
    };

    let reopened = repo.reopen_task(first.id).await.unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completed_at, None);

    let CompletionResult::Recurring { next: Some(again), .. } =
        repo.complete_task(first.id, &today).await.unwrap()
    else {
        panic!("expected the existing successor");
    };
    assert_eq!(again.id, next.id);

    let query = Query::Filter(Filter::Due(DueDate::On(date(2024, 6, 2))));
    let on_second_day = repo.find_tasks(&query, &today).await.unwrap();
    assert_eq!(on_second_day.len(), 1);
    assert_eq!(on_second_day[0].template_id, Some(template.id));
}

#[tokio::test]
async fn test_deleting_template_detaches_instances() {
    let (repo, _temp_dir) = setup_test_db().await;
    let today = fixed_today(2024, 6, 1);

    let CaptureOutcome::Recurring { template, first } = capture(&repo, "Walk /break #daily", &today).await else {
        panic!("daily capture should create a template");
    };

    repo.delete_task(template.id).await.unwrap();
    assert!(repo.find_task_by_id(template.id).await.unwrap().is_none());

    let orphan = repo.find_task_by_id(first.id).await.unwrap().unwrap();
    assert_eq!(orphan.template_id, None);

    let result = repo.complete_task(first.id, &today).await.unwrap();
    assert!(matches!(result, CompletionResult::Single(_)));

    let result = repo.delete_task(template.id).await;
    assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_short_id_prefix_lookup() {
    let (repo, _temp_dir) = setup_test_db().await;
    let task = create_test_task(
        &repo,
        NewTaskData {
            title: "Find me".to_string(),
            ..Default::default()
        },
    )
    .await;

    let simple = task.id.simple().to_string();
    let found = repo.find_tasks_by_short_id_prefix(&simple[..8]).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, task.id);

    let found = repo
        .find_tasks_by_short_id_prefix(&simple[..8].to_uppercase())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_find_tasks_with_filters() {
    let (repo, _temp_dir) = setup_test_db().await;
    let today = fixed_today(2024, 6, 10);

    let essay = create_test_task(
        &repo,
        NewTaskData {
            title: "Draft essay".to_string(),
            category: Some(Category::Write),
            tags: vec!["school".to_string()],
            due_date: Some(date(2024, 6, 9)),
            ..Default::default()
        },
    )
    .await;
    create_test_task(
        &repo,
        NewTaskData {
            title: "Read paper".to_string(),
            category: Some(Category::Read),
            tags: vec!["School".to_string()],
            priority: Some(Priority::High),
            ..Default::default()
        },
    )
    .await;
    capture(&repo, "Stretch #daily", &today).await;

    let by_category = Query::Filter(Filter::Category(Category::Write));
    let found = repo.find_tasks(&by_category, &today).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, essay.id);

    let by_tag = Query::Filter(Filter::Tag("SCHOOL".to_string()));
    assert_eq!(repo.find_tasks(&by_tag, &today).await.unwrap().len(), 2);

    let overdue = Query::Filter(Filter::Due(DueDate::Overdue));
    assert_eq!(repo.find_tasks(&overdue, &today).await.unwrap().len(), 1);

    let open_and_unprioritized = Query::and(
        Query::Filter(Filter::Status(Status::Open)),
        Query::Filter(Filter::Priority(None)),
    );
    // The essay and the first stretch instance; the template stays hidden.
    assert_eq!(repo.find_tasks(&open_and_unprioritized, &today).await.unwrap().len(), 2);

    let templates = Query::Filter(Filter::Template(true));
    let found = repo.find_tasks(&templates, &today).await.unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].is_template);

    // Newest first.
    let all = repo.find_tasks(&Query::All, &today).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all.last().unwrap().id, essay.id);
}

#[tokio::test]
async fn test_update_task_fields_and_completion_flag() {
    let (repo, _temp_dir) = setup_test_db().await;
    let task = create_test_task(
        &repo,
        NewTaskData {
            title: "Call mom".to_string(),
            tags: vec!["family".to_string()],
            ..Default::default()
        },
    )
    .await;

    let updated = repo
        .update_task(
            task.id,
            UpdateTaskData {
                title: Some("Call mom back".to_string()),
                category: Some(Some(Category::Speak)),
                time_estimate: Some(TimeEstimate::Long),
                due_date: Some(Some(date(2024, 7, 1))),
                add_tags: Some(vec!["Phone".to_string()]),
                remove_tags: Some(vec!["family".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Call mom back");
    assert_eq!(updated.category, Some(Category::Speak));
    assert_eq!(updated.time_estimate, TimeEstimate::Long);
    assert_eq!(updated.due_date, Some(date(2024, 7, 1)));
    assert_eq!(updated.tags, vec!["phone".to_string()]);

    let done = repo
        .update_task(
            task.id,
            UpdateTaskData {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(done.completed);
    assert!(done.completed_at.is_some());

    let reopened = repo
        .update_task(
            task.id,
            UpdateTaskData {
                completed: Some(false),
                category: Some(None),
                due_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completed_at, None);
    assert_eq!(reopened.category, None);
    assert_eq!(reopened.due_date, None);

    let result = repo
        .update_task(
            task.id,
            UpdateTaskData {
                title: Some(" ".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));
}

#[tokio::test]
async fn test_templates_reject_due_dates() {
    let (repo, _temp_dir) = setup_test_db().await;
    let today = fixed_today(2024, 6, 1);

    let CaptureOutcome::Recurring { template, first } = capture(&repo, "Floss #daily", &today).await else {
        panic!("daily capture should create a template");
    };

    let result = repo
        .update_task(
            template.id,
            UpdateTaskData {
                due_date: Some(Some(date(2024, 6, 5))),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));

    let ended = repo
        .update_task(
            template.id,
            UpdateTaskData {
                end_date: Some(Some(date(2024, 6, 1))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ended.end_date, Some(date(2024, 6, 1)));

    let result = repo.complete_task(first.id, &today).await.unwrap();
    assert!(matches!(result, CompletionResult::Recurring { next: None, .. }));
}

#[tokio::test]
async fn test_backlog_filters_and_search() {
    let (repo, _temp_dir) = setup_test_db().await;

    for (title, category, due, tags) in [
        ("Sketch logo", Some(Category::Build), None, vec!["design"]),
        ("Buy stamps", None, None, vec![]),
        ("Renew passport", None, Some(date(2024, 6, 20)), vec!["admin"]),
    ] {
        create_test_task(
            &repo,
            NewTaskData {
                title: title.to_string(),
                category,
                due_date: due,
                tags: tags.into_iter().map(String::from).collect(),
                ..Default::default()
            },
        )
        .await;
    }

    let titles = |tasks: Vec<Task>| -> Vec<String> {
        let mut titles: Vec<String> = tasks.into_iter().map(|t| t.title).collect();
        titles.sort();
        titles
    };

    assert_eq!(repo.backlog(BacklogFilter::All, None).await.unwrap().len(), 3);
    assert_eq!(
        titles(repo.backlog(BacklogFilter::Unplanned, None).await.unwrap()),
        vec!["Buy stamps", "Sketch logo"]
    );
    assert_eq!(
        titles(repo.backlog(BacklogFilter::Planned, None).await.unwrap()),
        vec!["Renew passport"]
    );
    assert_eq!(
        titles(repo.backlog(BacklogFilter::Categorized, None).await.unwrap()),
        vec!["Sketch logo"]
    );
    assert_eq!(
        titles(repo.backlog(BacklogFilter::Uncategorized, Some("STAMP")).await.unwrap()),
        vec!["Buy stamps"]
    );
    assert_eq!(
        titles(repo.backlog(BacklogFilter::All, Some("desi")).await.unwrap()),
        vec!["Sketch logo"]
    );
}

#[tokio::test]
async fn test_backlog_search_treats_wildcards_literally() {
    let (repo, _temp_dir) = setup_test_db().await;

    for title in ["Hit 100% of goals", "Hit 1000 steps", "Rename a_b", "Rename axb"] {
        create_test_task(
            &repo,
            NewTaskData {
                title: title.to_string(),
                ..Default::default()
            },
        )
        .await;
    }

    for (term, expected) in [
        ("100%", "Hit 100% of goals"),
        ("a_b", "Rename a_b"),
        ("%", "Hit 100% of goals"),
    ] {
        let found: Vec<String> = repo
            .backlog(BacklogFilter::All, Some(term))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(found, vec![expected], "search {:?}", term);
    }
}

#[tokio::test]
async fn test_today_focus_and_progress() {
    let (repo, _temp_dir) = setup_test_db().await;
    let today = Today::now(Tz::UTC);

    let low = create_test_task(
        &repo,
        NewTaskData {
            title: "Low thing".to_string(),
            priority: Some(Priority::Low),
            due_date: Some(today.date()),
            ..Default::default()
        },
    )
    .await;
    create_test_task(
        &repo,
        NewTaskData {
            title: "High thing".to_string(),
            priority: Some(Priority::High),
            time_estimate: Some(TimeEstimate::Long),
            due_date: Some(today.date()),
            ..Default::default()
        },
    )
    .await;
    let done = create_test_task(
        &repo,
        NewTaskData {
            title: "Done thing".to_string(),
            category: Some(Category::Learn),
            ..Default::default()
        },
    )
    .await;
    repo.complete_task(done.id, &today).await.unwrap();

    let focus = repo.today_focus(&today).await.unwrap();
    assert_eq!(focus.open.len(), 2);
    assert_eq!(focus.open[0].title, "High thing");
    assert_eq!(focus.open[1].id, low.id);
    assert!((focus.estimated_minutes - 18.5).abs() < f64::EPSILON);
    assert_eq!(focus.completed.len(), 1);
    assert_eq!(focus.completion_rate, 33);

    let planned = repo.planned_for(today.date()).await.unwrap();
    assert_eq!(planned.len(), 2);

    let progress = repo.progress(&today).await.unwrap();
    assert_eq!(progress.completed_today, 1);
    assert_eq!(progress.current_streak, 1);
    assert_eq!(progress.total_tasks, 3);
    assert_eq!(progress.completion_rate, 33);
    assert_eq!(progress.categories[0].category, Category::Learn);
    assert_eq!(progress.categories[0].percentage, 100);
}

#[tokio::test]
async fn test_in_memory_database() {
    let pool = establish_connection(":memory:").await.unwrap();
    let repo = SqliteRepository::new(pool, RecurrenceGenerator::default());
    create_test_task(
        &repo,
        NewTaskData {
            title: "Ephemeral".to_string(),
            ..Default::default()
        },
    )
    .await;
    let today = fixed_today(2024, 6, 1);
    assert_eq!(repo.find_tasks(&Query::All, &today).await.unwrap().len(), 1);
}
