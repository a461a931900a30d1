// All-day calendar events derived from case hearings and task deadlines.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::types::{is_scheduled, Case, Task, TaskPriority};

/// Calendar colour for case hearings.
pub const HEARING_COLOR_ID: &str = "9";

/// Reminder minutes attached to newly created events.
pub const EMAIL_REMINDER_MINUTES: u32 = 24 * 60;
pub const POPUP_REMINDER_MINUTES: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDate {
    pub date: String,
}

/// The event body sent to the calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub summary: String,
    pub description: String,
    pub start: EventDate,
    /// Exclusive end: the day after `start`.
    pub end: EventDate,
    pub color_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

impl Default for Reminders {
    fn default() -> Self {
        Self {
            use_default: false,
            overrides: vec![
                ReminderOverride { method: "email".into(), minutes: EMAIL_REMINDER_MINUTES },
                ReminderOverride { method: "popup".into(), minutes: POPUP_REMINDER_MINUTES },
            ],
        }
    }
}

/// Parse a `YYYY-MM-DD` date, tolerating a trailing time component.
pub fn parse_day(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    let day = date.get(..10).unwrap_or(date);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// The calendar day after `date`, as `YYYY-MM-DD`.
pub fn next_day(date: &str) -> Option<String> {
    let day = parse_day(date)?.checked_add_days(Days::new(1))?;
    Some(day.format("%Y-%m-%d").to_string())
}

fn all_day(date: &str) -> Option<(EventDate, EventDate)> {
    if !is_scheduled(date) {
        return None;
    }
    let start = parse_day(date)?;
    let end = next_day(date)?;
    Some((EventDate { date: start.format("%Y-%m-%d").to_string() }, EventDate { date: end }))
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Event for a case's next hearing, or `None` when nothing is scheduled.
pub fn case_hearing_event(case: &Case) -> Option<EventPayload> {
    let (start, end) = all_day(&case.next_hearing)?;

    let mut lines = Vec::new();
    if let Some(number) = non_empty(&case.case_number) {
        lines.push(format!("Case No: {number}"));
    }
    if let Some(court) = non_empty(&case.court) {
        lines.push(format!("Court: {court}"));
    }
    if let Some(client) = non_empty(&case.client_name) {
        lines.push(format!("Client: {client}"));
    }
    if let Some(cnr) = case.cnr_number.as_deref().and_then(non_empty) {
        lines.push(format!("CNR: {cnr}"));
    }
    let first = case.first_party.as_deref().and_then(non_empty);
    let opposite = case.opposite_party.as_deref().and_then(non_empty);
    if let (Some(first), Some(opposite)) = (first, opposite) {
        lines.push(format!("{first} vs {opposite}"));
    }

    Some(EventPayload {
        summary: format!("⚖️ Hearing: {}", non_empty(&case.title).unwrap_or("Case Hearing")),
        description: lines.join("\n"),
        start,
        end,
        color_id: HEARING_COLOR_ID.to_string(),
    })
}

pub fn task_color_id(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::High => "11",
        TaskPriority::Medium => "5",
        TaskPriority::Low => "2",
    }
}

fn task_glyph(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::High => "🔴",
        TaskPriority::Medium => "🟡",
        TaskPriority::Low => "🟢",
    }
}

/// Event for a task's deadline (falling back to its due date).
pub fn task_deadline_event(task: &Task) -> Option<EventPayload> {
    let (start, end) = all_day(task.effective_date())?;

    let mut lines = vec![format!("Priority: {}", task.priority)];
    if let Some(assignee) = non_empty(&task.assignee) {
        lines.push(format!("Assignee: {assignee}"));
    }
    if let Some(day) = task.working_day.as_deref().and_then(non_empty) {
        lines.push(format!("Working Day: {day}"));
    }

    Some(EventPayload {
        summary: format!(
            "{} Task: {}",
            task_glyph(task.priority),
            non_empty(&task.title).unwrap_or("Task")
        ),
        description: lines.join("\n"),
        start,
        end,
        color_id: task_color_id(task.priority).to_string(),
    })
}

const TEMPLATE_BASE: &str = "https://calendar.google.com/calendar/render";

/// A pre-filled "create event" link, usable without a calendar connection.
pub fn template_url(event: &EventPayload, location: Option<&str>) -> String {
    let compact = |date: &str| date.replace('-', "");
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("action", "TEMPLATE");
    query.append_pair("text", &event.summary);
    query.append_pair("dates", &format!("{}/{}", compact(&event.start.date), compact(&event.end.date)));
    if !event.description.is_empty() {
        query.append_pair("details", &event.description);
    }
    if let Some(location) = location.filter(|location| !location.is_empty()) {
        query.append_pair("location", location);
    }
    format!("{TEMPLATE_BASE}?{}", query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CaseStatus;

    fn hearing_case(next_hearing: &str) -> Case {
        Case {
            id: "c1".into(),
            case_number: "CIV/2024/7".into(),
            title: "Rao vs. Municipal Board".into(),
            client_name: "S. Rao".into(),
            court: "District Court".into(),
            status: CaseStatus::Open,
            next_hearing: next_hearing.into(),
            ..Case::default()
        }
    }

    #[test]
    fn hearing_event_is_all_day_with_exclusive_end() {
        let event = case_hearing_event(&hearing_case("2024-03-15")).expect("scheduled case");
        assert_eq!(event.start.date, "2024-03-15");
        assert_eq!(event.end.date, "2024-03-16");
        assert_eq!(event.color_id, "9");
        assert_eq!(event.summary, "⚖️ Hearing: Rao vs. Municipal Board");
        assert_eq!(
            event.description,
            "Case No: CIV/2024/7\nCourt: District Court\nClient: S. Rao"
        );
    }

    #[test]
    fn hearing_event_skips_blank_fields() {
        let case = Case {
            next_hearing: "2024-03-15".into(),
            title: "T".into(),
            ..Case::default()
        };
        let event = case_hearing_event(&case).expect("scheduled case");
        assert_eq!(event.description, "");

        let case = Case { court: "  ".into(), ..hearing_case("2024-03-15") };
        let event = case_hearing_event(&case).expect("scheduled case");
        assert_eq!(event.description, "Case No: CIV/2024/7\nClient: S. Rao");
    }

    #[test]
    fn unscheduled_or_unparsable_hearings_produce_no_event() {
        assert!(case_hearing_event(&hearing_case("-")).is_none());
        assert!(case_hearing_event(&hearing_case("")).is_none());
        assert!(case_hearing_event(&hearing_case("next week")).is_none());
    }

    #[test]
    fn description_includes_parties_only_when_both_present() {
        let mut case = hearing_case("2024-03-15");
        case.cnr_number = Some("UPKN010012342024".into());
        case.first_party = Some("Rao".into());
        let event = case_hearing_event(&case).expect("scheduled case");
        assert!(event.description.contains("CNR: UPKN010012342024"));
        assert!(!event.description.contains(" vs "));

        case.opposite_party = Some("Municipal Board".into());
        let event = case_hearing_event(&case).expect("scheduled case");
        assert!(event.description.ends_with("Rao vs Municipal Board"));
    }

    #[test]
    fn untitled_case_uses_generic_summary() {
        let mut case = hearing_case("2024-03-15");
        case.title = String::new();
        let event = case_hearing_event(&case).expect("scheduled case");
        assert_eq!(event.summary, "⚖️ Hearing: Case Hearing");
    }

    #[test]
    fn task_event_prefers_deadline_and_colours_by_priority() {
        let task = Task {
            title: "File reply".into(),
            due_date: "2024-04-30".into(),
            deadline: Some("2024-04-25".into()),
            priority: TaskPriority::High,
            assignee: "Adv. Sharma".into(),
            working_day: Some("Monday".into()),
            ..Task::default()
        };
        let event = task_deadline_event(&task).expect("task with deadline");
        assert_eq!(event.start.date, "2024-04-25");
        assert_eq!(event.end.date, "2024-04-26");
        assert_eq!(event.color_id, "11");
        assert_eq!(event.summary, "🔴 Task: File reply");
        assert_eq!(event.description, "Priority: High\nAssignee: Adv. Sharma\nWorking Day: Monday");
    }

    #[test]
    fn task_without_dates_produces_no_event() {
        assert!(task_deadline_event(&Task::default()).is_none());
        let task = Task { due_date: "-".into(), ..Task::default() };
        assert!(task_deadline_event(&task).is_none());
    }

    #[test]
    fn low_priority_untitled_task() {
        let task = Task { due_date: "2024-01-31".into(), priority: TaskPriority::Low, ..Task::default() };
        let event = task_deadline_event(&task).expect("task with due date");
        assert_eq!(event.summary, "🟢 Task: Task");
        assert_eq!(event.color_id, "2");
        assert_eq!(event.end.date, "2024-02-01");
    }

    #[test]
    fn next_day_crosses_month_and_leap_boundaries() {
        assert_eq!(next_day("2024-02-28").as_deref(), Some("2024-02-29"));
        assert_eq!(next_day("2023-02-28").as_deref(), Some("2023-03-01"));
        assert_eq!(next_day("2023-12-31").as_deref(), Some("2024-01-01"));
        assert_eq!(next_day("2024-03-15T10:00:00Z").as_deref(), Some("2024-03-16"));
        assert_eq!(next_day("31/12/2023"), None);
    }

    #[test]
    fn template_url_encodes_all_day_range() {
        let event = case_hearing_event(&hearing_case("2024-03-15")).expect("scheduled case");
        let link = template_url(&event, Some("District Court"));
        assert!(link.starts_with("https://calendar.google.com/calendar/render?action=TEMPLATE"));
        assert!(link.contains("dates=20240315%2F20240316"));
        assert!(link.contains("location=District+Court"));
    }

    #[test]
    fn default_reminders_are_day_and_hour_before() {
        let reminders = serde_json::to_value(Reminders::default()).expect("reminders serialize");
        assert_eq!(
            reminders,
            serde_json::json!({
                "useDefault": false,
                "overrides": [
                    { "method": "email", "minutes": 1440 },
                    { "method": "popup", "minutes": 60 },
                ],
            })
        );
    }
}
