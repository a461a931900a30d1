// Pure filters and groupings over record snapshots.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{Case, CaseStatus, Client, LegalDocument, Task, TaskStatus};

/// The named court locations; everything else is "Other Places".
pub const WORKPLACES: [&str; 3] = ["Ghatampur Court", "Mati court", "Kanpur Court"];
pub const OTHER_PLACES: &str = "Other Places";

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn opt_contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|value| contains_folded(value, needle))
}

// ── Search ──────────────────────────────────────────────────────────

pub fn search_clients<'a>(clients: &'a [Client], term: &str) -> Vec<&'a Client> {
    let term = term.trim().to_lowercase();
    clients
        .iter()
        .filter(|client| contains_folded(&client.name, &term) || contains_folded(&client.email, &term))
        .collect()
}

pub fn search_cases<'a>(cases: &'a [Case], term: &str, status: Option<CaseStatus>) -> Vec<&'a Case> {
    let term = term.trim().to_lowercase();
    cases
        .iter()
        .filter(|case| status.is_none_or(|status| case.status == status))
        .filter(|case| {
            contains_folded(&case.title, &term)
                || contains_folded(&case.case_number, &term)
                || contains_folded(&case.client_name, &term)
                || opt_contains(case.act_section.as_deref(), &term)
                || opt_contains(case.police_station.as_deref(), &term)
        })
        .collect()
}

pub fn search_tasks<'a>(tasks: &'a [Task], term: &str) -> Vec<&'a Task> {
    let term = term.trim().to_lowercase();
    tasks
        .iter()
        .filter(|task| {
            contains_folded(&task.title, &term)
                || opt_contains(task.case_id.as_deref(), &term)
                || contains_folded(&task.assignee, &term)
        })
        .collect()
}

pub fn search_documents<'a>(documents: &'a [LegalDocument], term: &str) -> Vec<&'a LegalDocument> {
    let term = term.trim().to_lowercase();
    documents
        .iter()
        .filter(|document| {
            contains_folded(&document.name, &term)
                || document.tags.iter().any(|tag| contains_folded(tag, &term))
        })
        .collect()
}

// ── Kanban ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanBoard {
    pub to_do: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub done: Vec<Task>,
}

impl KanbanBoard {
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::ToDo => &self.to_do,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }
}

pub fn kanban<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> KanbanBoard {
    let mut board = KanbanBoard::default();
    for task in tasks {
        let column = match task.status {
            TaskStatus::ToDo => &mut board.to_do,
            TaskStatus::InProgress => &mut board.in_progress,
            TaskStatus::Done => &mut board.done,
        };
        column.push(task.clone());
    }
    board
}

// ── Workplaces ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkplaceGroup {
    pub name: String,
    pub cases: Vec<Case>,
    pub tasks: Vec<Task>,
}

fn matches_workplace(location: &str, workplace: &str) -> bool {
    let location = location.to_lowercase();
    if workplace == OTHER_PLACES {
        return !WORKPLACES.iter().any(|known| location.contains(&known.to_lowercase()));
    }
    location.contains(&workplace.to_lowercase())
}

fn case_location(case: &Case) -> &str {
    match case.workplace.as_deref() {
        Some(workplace) if !workplace.is_empty() => workplace,
        _ => &case.court,
    }
}

/// One group per known workplace plus "Other Places". Records without any
/// location appear in no group.
pub fn group_by_workplace(cases: &[Case], tasks: &[Task]) -> Vec<WorkplaceGroup> {
    WORKPLACES
        .iter()
        .copied()
        .chain(std::iter::once(OTHER_PLACES))
        .map(|name| WorkplaceGroup {
            name: name.to_string(),
            cases: cases
                .iter()
                .filter(|case| {
                    let location = case_location(case);
                    !location.is_empty() && matches_workplace(location, name)
                })
                .cloned()
                .collect(),
            tasks: tasks
                .iter()
                .filter(|task| {
                    let location = task.workplace.as_deref().unwrap_or_default();
                    !location.is_empty() && matches_workplace(location, name)
                })
                .cloned()
                .collect(),
        })
        .collect()
}

/// Number of cases per client id.
pub fn case_counts_by_client(cases: &[Case]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for case in cases {
        *counts.entry(case.client_id.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn ids<T>(items: &[&T], id: impl Fn(&T) -> &str) -> Vec<String> {
        items.iter().map(|item| id(item).to_string()).collect()
    }

    #[test]
    fn client_search_matches_name_or_email() {
        let clients = seed::clients();
        assert_eq!(ids(&search_clients(&clients, "GREENFIELD"), |c| &c.id), vec!["4"]);
        assert_eq!(ids(&search_clients(&clients, "kumar"), |c| &c.id), vec!["1"]);
        assert_eq!(search_clients(&clients, "").len(), 4);
    }

    #[test]
    fn case_search_covers_optional_fields_and_status() {
        let mut cases = seed::cases();
        cases[2].police_station = Some("Bandra West".into());
        assert_eq!(ids(&search_cases(&cases, "bandra west", None), |c| &c.id), vec!["103"]);
        assert_eq!(
            ids(&search_cases(&cases, "", Some(CaseStatus::Open)), |c| &c.id),
            vec!["101", "104"]
        );
        assert!(search_cases(&cases, "kumar", Some(CaseStatus::Closed)).is_empty());
    }

    #[test]
    fn task_and_document_search() {
        let tasks = seed::tasks();
        assert_eq!(ids(&search_tasks(&tasks, "para."), |t| &t.id), vec!["t3"]);
        assert_eq!(search_tasks(&tasks, "101").len(), 2);

        let documents = seed::documents();
        assert_eq!(ids(&search_documents(&documents, "evidence"), |d| &d.id), vec!["d2"]);
        assert_eq!(ids(&search_documents(&documents, "important"), |d| &d.id), vec!["d4"]);
    }

    #[test]
    fn kanban_partitions_by_status() {
        let tasks = seed::tasks();
        let board = kanban(&tasks);
        assert_eq!(board.column(TaskStatus::ToDo).len(), 2);
        assert_eq!(board.column(TaskStatus::InProgress)[0].id, "t1");
        assert_eq!(board.column(TaskStatus::Done)[0].id, "t3");
    }

    #[test]
    fn workplaces_group_by_substring_with_court_fallback() {
        let mut cases = seed::cases();
        cases[0].workplace = None;
        cases[0].court = "Kanpur Court No. 3".into();
        let mut tasks = seed::tasks();
        tasks[3].workplace = None;

        let groups = group_by_workplace(&cases, &tasks);
        let names: Vec<&str> = groups.iter().map(|group| group.name.as_str()).collect();
        assert_eq!(names, vec!["Ghatampur Court", "Mati court", "Kanpur Court", "Other Places"]);

        let kanpur = &groups[2];
        let case_ids: Vec<&str> = kanpur.cases.iter().map(|case| case.id.as_str()).collect();
        assert_eq!(case_ids, vec!["101", "103"]);
        assert!(kanpur.tasks.is_empty());

        let other = &groups[3];
        assert!(other.cases.is_empty());
        let task_ids: Vec<&str> = other.tasks.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(task_ids, vec!["t1"]);
    }

    #[test]
    fn counts_cases_per_client() {
        let mut cases = seed::cases();
        cases[1].client_id = "1".into();
        let counts = case_counts_by_client(&cases);
        assert_eq!(counts.get("1"), Some(&2));
        assert_eq!(counts.get("2"), None);
    }
}
