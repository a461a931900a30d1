// `lexflow agenda`: hearings and deadlines for a month or a single day.

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use clap::Args;
use lexflow_common::agenda::{items_on, month_agenda, DayAgenda};
use lexflow_common::types::{Case, Task};
use serde::Serialize;

use super::ls::{case_line, task_line};
use super::{block_on, emit, open_context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct AgendaArgs {
    /// Month as YYYY-MM; defaults to the current month.
    #[arg(long, conflicts_with = "day")]
    month: Option<String>,
    /// A single day as YYYY-MM-DD.
    #[arg(long)]
    day: Option<String>,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgendaResult {
    /// `YYYY-MM` or `YYYY-MM-DD`.
    pub period: String,
    pub days: Vec<DayAgenda>,
}

pub fn run(args: AgendaArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = block_on(agenda(&args)).and_then(|inner| inner);
    emit(format, result, format_human)
}

async fn agenda(args: &AgendaArgs) -> anyhow::Result<AgendaResult> {
    let period = Period::from_args(args, chrono::Local::now().date_naive())?;
    let context = open_context().await?;
    let store = context.store();
    Ok(period.collect(&store.cases(), &store.tasks()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    Month { year: i32, month: u32 },
    Day(NaiveDate),
}

impl Period {
    fn from_args(args: &AgendaArgs, today: NaiveDate) -> anyhow::Result<Self> {
        if let Some(day) = &args.day {
            let date = NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
                .with_context(|| format!("invalid day `{day}`, expected YYYY-MM-DD"))?;
            return Ok(Self::Day(date));
        }
        let Some(month) = &args.month else {
            return Ok(Self::Month { year: today.year(), month: today.month() });
        };
        let first = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
            .with_context(|| format!("invalid month `{month}`, expected YYYY-MM"))?;
        Ok(Self::Month { year: first.year(), month: first.month() })
    }

    fn collect(self, cases: &[Case], tasks: &[Task]) -> AgendaResult {
        match self {
            Self::Month { year, month } => AgendaResult {
                period: format!("{year:04}-{month:02}"),
                days: month_agenda(year, month, cases, tasks),
            },
            Self::Day(date) => {
                let period = date.format("%Y-%m-%d").to_string();
                let day = items_on(&period, cases, tasks);
                AgendaResult { days: if day.is_empty() { Vec::new() } else { vec![day] }, period }
            }
        }
    }
}

fn format_human(result: &AgendaResult) -> String {
    if result.days.is_empty() {
        return format!("Nothing scheduled for {}.", result.period);
    }
    let mut lines = Vec::new();
    for day in &result.days {
        lines.push(day.date.clone());
        lines.extend(day.hearings.iter().map(|case| format!("  hearing  {}", case_line(case))));
        lines.extend(day.tasks.iter().map(|task| format!("  task     {}", task_line(task))));
    }
    lines.join("\n")
}
