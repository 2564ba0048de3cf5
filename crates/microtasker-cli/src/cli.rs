use clap::{Parser, Subcommand};
use microtasker_core::models::{BacklogFilter, Category, Frequency, Priority, TimeEstimate};

/// Microtasker: capture micro-tasks in one line and work through them today
#[derive(Parser, Debug)]
#[command(name = "mtask", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Capture a task from one line of text with /category and #tag shortcuts
    Capture(CaptureCommand),
    /// Add a task with explicit fields
    Add(AddCommand),
    /// List tasks matching a filter expression
    List(ListCommand),
    /// Show today's focus: open tasks due today and what is already done
    Today(TodayCommand),
    /// Show open tasks waiting to be scheduled or worked on
    Backlog(BacklogCommand),
    /// Show what is planned for a date, plus unplanned tasks
    Plan(PlanCommand),
    /// Mark a task as completed
    Do(DoCommand),
    /// Mark a completed task as open again
    Undo(UndoCommand),
    /// Edit a task
    Edit(EditCommand),
    /// Delete a task
    Delete(DeleteCommand),
    /// Show completion statistics and streaks
    Progress(ProgressCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct CaptureCommand {
    /// The capture text, e.g. `Email Bob /write #high #tomorrow`
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub text: Vec<String>,
    /// Last date a recurring capture may occur on
    #[arg(long)]
    pub until: Option<String>,
    /// Show the parsed task without saving it
    #[arg(long)]
    pub dry_run: bool,
    /// Print completions for the shortcut at the end of the text
    #[arg(long, conflicts_with_all = ["dry_run", "until"])]
    pub suggest: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The title of the task
    pub title: String,
    /// Category (read, write, speak, learn, pray, break, build)
    #[arg(short, long)]
    pub category: Option<Category>,
    /// Priority (high, medium, low)
    #[arg(short, long)]
    pub priority: Option<Priority>,
    /// Time estimate (quick, mid, long or "2-5 min", "5-10 min", "10+ min")
    #[arg(short, long)]
    pub estimate: Option<TimeEstimate>,
    /// The due date of the task
    #[arg(short, long)]
    pub due: Option<String>,
    /// Tags to add to the task
    #[arg(short, long, num_args = 1..)]
    pub tag: Vec<String>,
    /// Repeat the task (daily, weekly, monthly)
    #[arg(long)]
    pub every: Option<Frequency>,
    /// End date for recurrence
    #[arg(long, requires = "every")]
    pub until: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// A filter expression (e.g. "status:open and (category:write or tag:urgent)")
    #[arg(num_args = 0.., trailing_var_arg = true)]
    pub query: Vec<String>,
    /// Print tasks as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct TodayCommand {
    /// Group open tasks by category instead of sorting by priority
    #[arg(short, long)]
    pub grouped: bool,
    /// Print the focus summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct BacklogCommand {
    /// Narrow the backlog (all, uncategorized, categorized, planned, unplanned)
    #[arg(short, long, default_value = "all")]
    pub filter: BacklogFilter,
    /// Only tasks whose title or tags contain this text
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct PlanCommand {
    /// The date to plan (defaults to today)
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DoCommand {
    /// The ID of the task to mark as completed
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct UndoCommand {
    /// The ID of the task to reopen
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID of the task to edit
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub category: Option<Category>,
    #[arg(long, conflicts_with = "category")]
    pub category_clear: bool,

    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long, conflicts_with = "priority")]
    pub priority_clear: bool,

    #[arg(long)]
    pub estimate: Option<TimeEstimate>,

    #[arg(long)]
    pub due: Option<String>,
    #[arg(long, conflicts_with = "due")]
    pub due_clear: bool,

    /// End date of the recurring series this task belongs to
    #[arg(long)]
    pub until: Option<String>,
    #[arg(long, conflicts_with = "until")]
    pub until_clear: bool,

    /// Add tags to the task
    #[arg(long, num_args = 1..)]
    pub add_tag: Vec<String>,

    /// Remove tags from the task
    #[arg(long, num_args = 1..)]
    pub remove_tag: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the task to delete
    pub id: String,
    /// Force deletion without confirmation
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ProgressCommand {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}
