// Demonstration dataset served when neither backend has anything to offer.

use crate::types::{
    Case, CaseStatus, Client, ClientCategory, ClientStatus, LegalDocument, Task, TaskPriority,
    TaskStatus,
};

fn client(
    id: &str,
    name: &str,
    email: &str,
    phone: &str,
    category: ClientCategory,
    status: ClientStatus,
    last_contact: &str,
) -> Client {
    Client {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        phone: phone.into(),
        category,
        status,
        last_contact: last_contact.into(),
    }
}

pub fn clients() -> Vec<Client> {
    use ClientCategory::{Corporate, Individual};
    use ClientStatus::{Active, Inactive};
    vec![
        client("1", "Rajesh Kumar", "rajesh.k@example.com", "+91 98765 43210", Individual, Active, "2023-10-25"),
        client("2", "TechSolutions Pvt Ltd", "legal@techsolutions.com", "+91 22 1234 5678", Corporate, Active, "2023-10-24"),
        client("3", "Amitabh Verma", "a.verma@example.com", "+91 99887 76655", Individual, Inactive, "2023-09-15"),
        client("4", "Green Field Estates", "contact@greenfield.in", "+91 11 2233 4455", Corporate, Active, "2023-10-26"),
    ]
}

struct CaseSeed {
    id: &'static str,
    number: &'static str,
    title: &'static str,
    client: (&'static str, &'static str),
    court: &'static str,
    case_type: &'static str,
    status: CaseStatus,
    next_hearing: &'static str,
    workplace: &'static str,
}

impl From<CaseSeed> for Case {
    fn from(seed: CaseSeed) -> Self {
        Case {
            id: seed.id.into(),
            case_number: seed.number.into(),
            title: seed.title.into(),
            client_id: seed.client.0.into(),
            client_name: seed.client.1.into(),
            court: seed.court.into(),
            case_type: seed.case_type.into(),
            status: seed.status,
            next_hearing: seed.next_hearing.into(),
            workplace: Some(seed.workplace.into()),
            ..Case::default()
        }
    }
}

pub fn cases() -> Vec<Case> {
    [
        CaseSeed {
            id: "101",
            number: "CIV/2023/452",
            title: "Kumar vs. State of MH",
            client: ("1", "Rajesh Kumar"),
            court: "Bombay High Court",
            case_type: "Civil Litigation",
            status: CaseStatus::Open,
            next_hearing: "2023-11-15",
            workplace: "Other Places",
        },
        CaseSeed {
            id: "102",
            number: "COM/2023/889",
            title: "TechSolutions vs. Vendor Corp",
            client: ("2", "TechSolutions Pvt Ltd"),
            court: "NCLT Mumbai",
            case_type: "Corporate Dispute",
            status: CaseStatus::Pending,
            next_hearing: "2023-11-20",
            workplace: "Mati court",
        },
        CaseSeed {
            id: "103",
            number: "FAM/2022/112",
            title: "Verma Divorce Petition",
            client: ("3", "Amitabh Verma"),
            court: "Family Court Bandra",
            case_type: "Family Law",
            status: CaseStatus::Closed,
            next_hearing: "-",
            workplace: "Kanpur Court",
        },
        CaseSeed {
            id: "104",
            number: "RERA/2023/005",
            title: "Green Field Compliance",
            client: ("4", "Green Field Estates"),
            court: "MahaRERA",
            case_type: "Real Estate",
            status: CaseStatus::Open,
            next_hearing: "2023-11-05",
            workplace: "Ghatampur Court",
        },
    ]
    .into_iter()
    .map(Case::from)
    .collect()
}

#[allow(clippy::too_many_arguments)]
fn task(
    id: &str,
    title: &str,
    case_id: &str,
    due_date: &str,
    priority: TaskPriority,
    status: TaskStatus,
    assignee: &str,
    workplace: &str,
) -> Task {
    Task {
        id: id.into(),
        title: title.into(),
        case_id: Some(case_id.into()),
        due_date: due_date.into(),
        priority,
        status,
        assignee: assignee.into(),
        workplace: Some(workplace.into()),
        ..Task::default()
    }
}

pub fn tasks() -> Vec<Task> {
    use TaskPriority::{High, Low, Medium};
    use TaskStatus::{Done, InProgress, ToDo};
    vec![
        task("t1", "File Affidavit for Kumar Case", "101", "2023-11-10", High, InProgress, "Adv. Sharma", "Other Places"),
        task("t2", "Client Meeting - TechSolutions", "102", "2023-11-12", Medium, ToDo, "Adv. Sharma", "Mati court"),
        task("t3", "Draft Notice for Green Field", "104", "2023-11-01", High, Done, "Para. John", "Ghatampur Court"),
        task("t4", "Submit Court Fees", "101", "2023-11-14", Low, ToDo, "Staff Admin", "Kanpur Court"),
    ]
}

fn document(id: &str, name: &str, file_type: &str, size: &str, date: &str, case_id: &str, tags: &[&str]) -> LegalDocument {
    LegalDocument {
        id: id.into(),
        name: name.into(),
        file_type: file_type.into(),
        size: size.into(),
        upload_date: date.into(),
        case_id: Some(case_id.into()),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        ..LegalDocument::default()
    }
}

pub fn documents() -> Vec<LegalDocument> {
    vec![
        document("d1", "Vakilnama_Kumar.pdf", "PDF", "1.2 MB", "2023-10-01", "101", &["Vakilnama", "Legal"]),
        document("d2", "Evidence_Photos.jpg", "JPG", "4.5 MB", "2023-10-15", "101", &["Evidence"]),
        document("d3", "Contract_Draft_v2.docx", "DOCX", "500 KB", "2023-10-20", "102", &["Draft", "Contract"]),
        document("d4", "Court_Order_Oct23.pdf", "PDF", "2.1 MB", "2023-10-25", "104", &["Order", "Important"]),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn each_collection_has_four_records_with_unique_ids() {
        let ids: Vec<String> = clients()
            .into_iter()
            .map(|c| c.id)
            .chain(cases().into_iter().map(|c| c.id))
            .chain(tasks().into_iter().map(|t| t.id))
            .chain(documents().into_iter().map(|d| d.id))
            .collect();
        assert_eq!(ids.len(), 16);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 16);
    }

    #[test]
    fn seeded_cases_reference_seeded_clients_by_name() {
        let clients = clients();
        for case in cases() {
            let client = clients
                .iter()
                .find(|c| c.id == case.client_id)
                .expect("seeded case should reference a seeded client");
            assert_eq!(client.name, case.client_name);
        }
    }

    #[test]
    fn closed_seed_case_is_unscheduled() {
        let closed = cases().into_iter().find(|c| c.status == CaseStatus::Closed).expect("one closed case");
        assert_eq!(closed.next_hearing, "-");
    }
}
