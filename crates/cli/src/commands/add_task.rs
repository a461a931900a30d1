// `lexflow add-task`: add a task.

use clap::Args;
use lexflow_common::types::{Task, TaskPriority, TaskStatus};

use super::ls::task_line;
use super::{block_on, emit, given, open_context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct AddTaskArgs {
    title: String,
    /// Due date (YYYY-MM-DD).
    #[arg(long, default_value = "")]
    due: String,
    /// Hard deadline; takes precedence over the due date on the calendar.
    #[arg(long)]
    deadline: Option<String>,
    /// High, Medium or Low.
    #[arg(long, default_value_t = TaskPriority::Medium)]
    priority: TaskPriority,
    /// To Do, In Progress or Done.
    #[arg(long, default_value_t = TaskStatus::ToDo)]
    status: TaskStatus,
    #[arg(long, default_value = "")]
    assignee: String,
    #[arg(long)]
    case: Option<String>,
    #[arg(long)]
    client: Option<String>,
    #[arg(long)]
    workplace: Option<String>,
    #[arg(long)]
    working_day: Option<String>,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

pub fn run(args: AddTaskArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = block_on(add(&args)).and_then(|inner| inner);
    emit(format, result, format_human)
}

async fn add(args: &AddTaskArgs) -> anyhow::Result<Task> {
    let context = open_context().await?;
    let added = context.orchestrator().add(new_task(args)).await?;
    context.orchestrator().settle_mirrors().await;
    Ok(context.store().task(&added.id).unwrap_or(added))
}

fn new_task(args: &AddTaskArgs) -> Task {
    Task {
        id: String::new(),
        title: args.title.trim().to_string(),
        case_id: given(&args.case),
        client_id: given(&args.client),
        due_date: args.due.trim().to_string(),
        priority: args.priority,
        status: args.status,
        assignee: args.assignee.trim().to_string(),
        workplace: given(&args.workplace),
        deadline: given(&args.deadline),
        working_day: given(&args.working_day),
        google_calendar_event_id: None,
    }
}

fn format_human(task: &Task) -> String {
    let mut text = format!("Added task {}", task_line(task));
    if let Some(event_id) = &task.google_calendar_event_id {
        text.push_str(&format!("\nCalendar event: {event_id}"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> AddTaskArgs {
        AddTaskArgs {
            title: "File written statement".into(),
            due: "2024-05-10".into(),
            deadline: Some("2024-05-08".into()),
            priority: TaskPriority::High,
            status: TaskStatus::ToDo,
            assignee: "Adv. Sharma".into(),
            case: Some("101".into()),
            client: Some("".into()),
            workplace: None,
            working_day: None,
            json: false,
        }
    }

    #[test]
    fn blank_optionals_are_dropped() {
        let task = new_task(&args());
        assert_eq!(task.case_id.as_deref(), Some("101"));
        assert_eq!(task.client_id, None);
        assert_eq!(task.effective_date(), "2024-05-08");
    }

    #[test]
    fn human_output_uses_deadline() {
        let task = Task { id: "1712345678901".into(), ..new_task(&args()) };
        assert_eq!(
            format_human(&task),
            "Added task 1712345678901  File written statement [High, To Do] due 2024-05-08 (Adv. Sharma)"
        );
    }
}
