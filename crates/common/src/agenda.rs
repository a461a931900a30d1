// Date-oriented views: the month grid, per-day agenda and dashboard summary.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::calendar::parse_day;
use crate::types::{is_scheduled, Case, CaseStatus, Task, TaskPriority, TaskStatus};

/// Cells in a month view: six Sunday-first weeks.
pub const GRID_CELLS: usize = 42;

/// How many upcoming hearings the dashboard lists.
pub const UPCOMING_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    /// False for the leading and trailing days borrowed from adjacent months.
    pub in_month: bool,
}

/// The 42-cell grid for `month` of `year`, or `None` for an invalid month.
pub fn month_grid(year: i32, month: u32) -> Option<Vec<DayCell>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let leading = u64::from(first.weekday().num_days_from_sunday());
    let start = first.checked_sub_days(Days::new(leading))?;

    let cells = start
        .iter_days()
        .take(GRID_CELLS)
        .map(|date| DayCell { date, in_month: date.month() == month && date.year() == year })
        .collect();
    Some(cells)
}

/// Everything listed on one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayAgenda {
    pub date: String,
    pub hearings: Vec<Case>,
    pub tasks: Vec<Task>,
}

impl DayAgenda {
    pub fn is_empty(&self) -> bool {
        self.hearings.is_empty() && self.tasks.is_empty()
    }
}

/// Cases with their next hearing on `date` and tasks due (or with a
/// deadline) on `date`.
pub fn items_on(date: &str, cases: &[Case], tasks: &[Task]) -> DayAgenda {
    DayAgenda {
        date: date.to_string(),
        hearings: cases.iter().filter(|case| case.next_hearing == date).cloned().collect(),
        tasks: tasks
            .iter()
            .filter(|task| task.deadline.as_deref() == Some(date) || task.due_date == date)
            .cloned()
            .collect(),
    }
}

/// Non-empty day agendas for every day of a month, in date order.
pub fn month_agenda(year: i32, month: u32, cases: &[Case], tasks: &[Task]) -> Vec<DayAgenda> {
    month_grid(year, month)
        .unwrap_or_default()
        .into_iter()
        .filter(|cell| cell.in_month)
        .map(|cell| items_on(&cell.date.format("%Y-%m-%d").to_string(), cases, tasks))
        .filter(|agenda| !agenda.is_empty())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub today: String,
    pub tomorrow: String,
    /// Open or pending.
    pub active_cases: usize,
    /// Anything not done.
    pub pending_tasks: usize,
    pub high_priority_tasks: Vec<Task>,
    pub todays_listings: Vec<Case>,
    pub tomorrows_listings: Vec<Case>,
    pub upcoming_hearings: Vec<Case>,
}

pub fn dashboard(today: NaiveDate, cases: &[Case], tasks: &[Task]) -> DashboardSummary {
    let today_str = today.format("%Y-%m-%d").to_string();
    let tomorrow_str = today
        .checked_add_days(Days::new(1))
        .map(|day| day.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let listed_on = |date: &str| -> Vec<Case> {
        cases.iter().filter(|case| case.next_hearing == date).cloned().collect()
    };

    let mut upcoming: Vec<Case> =
        cases.iter().filter(|case| is_scheduled(&case.next_hearing)).cloned().collect();
    upcoming.sort_by_key(|case| parse_day(&case.next_hearing));
    upcoming.truncate(UPCOMING_LIMIT);

    DashboardSummary {
        active_cases: cases
            .iter()
            .filter(|case| matches!(case.status, CaseStatus::Open | CaseStatus::Pending))
            .count(),
        pending_tasks: tasks.iter().filter(|task| task.status != TaskStatus::Done).count(),
        high_priority_tasks: tasks
            .iter()
            .filter(|task| task.priority == TaskPriority::High && task.status != TaskStatus::Done)
            .cloned()
            .collect(),
        todays_listings: listed_on(&today_str),
        tomorrows_listings: listed_on(&tomorrow_str),
        upcoming_hearings: upcoming,
        today: today_str,
        tomorrow: tomorrow_str,
    }
}
