// `lexflow move-task`: move a task between board columns.

use clap::Args;
use lexflow_common::types::{Task, TaskPatch, TaskStatus};

use super::{block_on, emit, open_context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct MoveTaskArgs {
    /// Task id.
    id: String,
    /// To Do, In Progress or Done.
    status: TaskStatus,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

pub fn run(args: MoveTaskArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = block_on(move_task(&args)).and_then(|inner| inner);
    emit(format, result, format_human)
}

async fn move_task(args: &MoveTaskArgs) -> anyhow::Result<Task> {
    let context = open_context().await?;
    let patch = TaskPatch { status: Some(args.status), ..TaskPatch::default() };
    let moved = context.orchestrator().update::<Task>(&args.id, patch).await?;
    context.orchestrator().settle_mirrors().await;
    Ok(moved)
}

fn format_human(task: &Task) -> String {
    format!("Task {} ({}) moved to {}", task.id, task.title, task.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexflow_common::seed;

    #[test]
    fn human_output_names_the_column() {
        let mut task = seed::tasks().remove(1);
        task.status = TaskStatus::InProgress;
        assert_eq!(format_human(&task), "Task t2 (Client Meeting - TechSolutions) moved to In Progress");
    }
}
