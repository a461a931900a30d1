// Metadata derivation for uploaded and in-app authored documents.

use crate::types::{Case, LegalDocument};

pub const DEFAULT_UPLOAD_TAG: &str = "Uploaded";
pub const DEFAULT_AUTHORED_TITLE: &str = "Untitled Document";
pub const DEFAULT_AUTHORED_FONT: &str = "Kruti Dev 010";

/// Upper-cased extension of `file_name`, or `FILE` when it has none.
pub fn file_type_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, extension)) if !extension.is_empty() => extension.to_uppercase(),
        _ => "FILE".to_string(),
    }
}

/// Size in megabytes with two decimals, e.g. "1.20 MB".
pub fn megabytes(size_bytes: u64) -> String {
    format!("{:.2} MB", size_bytes as f64 / 1024.0 / 1024.0)
}

/// Comma-separated tags, trimmed, blanks dropped; `["Uploaded"]` if none.
pub fn parse_tags(tags_csv: &str) -> Vec<String> {
    let tags: Vec<String> = tags_csv
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    if tags.is_empty() {
        vec![DEFAULT_UPLOAD_TAG.to_string()]
    } else {
        tags
    }
}

/// Describes a file to be recorded as a document.
#[derive(Debug, Clone, Default)]
pub struct Upload<'a> {
    pub file_name: &'a str,
    pub size_bytes: u64,
    pub upload_date: &'a str,
    pub case_id: Option<&'a str>,
    pub client_id: Option<&'a str>,
    pub tags_csv: &'a str,
}

fn present(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

impl LegalDocument {
    /// Metadata-only document for an uploaded file. A case given without a
    /// client links the case's client.
    pub fn from_upload(upload: &Upload<'_>, cases: &[Case]) -> Self {
        let case_id = present(upload.case_id);
        let client_id = present(upload.client_id).or_else(|| {
            let case_id = case_id.as_deref()?;
            cases.iter().find(|case| case.id == case_id).map(|case| case.client_id.clone())
        });

        LegalDocument {
            id: String::new(),
            name: upload.file_name.to_string(),
            file_type: file_type_of(upload.file_name),
            size: megabytes(upload.size_bytes),
            upload_date: upload.upload_date.to_string(),
            case_id,
            client_id,
            tags: parse_tags(upload.tags_csv),
            content: None,
            font: None,
        }
    }

    /// Document written with the in-app editor; the content travels with it.
    pub fn authored(title: &str, content: &str, font: Option<&str>, date: &str) -> Self {
        let title = match title.trim() {
            "" => DEFAULT_AUTHORED_TITLE,
            title => title,
        };
        let kilobytes = (content.len() as f64 / 1024.0).round() as u64;

        LegalDocument {
            id: String::new(),
            name: format!("{title}.doc"),
            file_type: "DOC".to_string(),
            size: format!("{} KB", kilobytes.max(1)),
            upload_date: date.to_string(),
            case_id: None,
            client_id: None,
            tags: vec!["Editor".to_string(), "Krutidev".to_string()],
            content: Some(content.to_string()),
            font: Some(font.unwrap_or(DEFAULT_AUTHORED_FONT).to_string()),
        }
    }

    /// Exportable content. Uploaded files are metadata-only and have none.
    pub fn downloadable_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|content| !content.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_metadata_is_derived_from_the_file() {
        let cases = crate::seed::cases();
        let document = LegalDocument::from_upload(
            &Upload {
                file_name: "Bail_Order.final.pdf",
                size_bytes: 1_258_291,
                upload_date: "2024-03-01",
                case_id: Some("102"),
                client_id: None,
                tags_csv: " Order, ,Bail ",
            },
            &cases,
        );
        assert_eq!(document.file_type, "PDF");
        assert_eq!(document.size, "1.20 MB");
        assert_eq!(document.case_id.as_deref(), Some("102"));
        assert_eq!(document.client_id.as_deref(), Some("2"));
        assert_eq!(document.tags, vec!["Order", "Bail"]);
        assert_eq!(document.downloadable_content(), None);
    }

    #[test]
    fn explicit_client_wins_over_case_client() {
        let document = LegalDocument::from_upload(
            &Upload {
                file_name: "notes",
                case_id: Some("101"),
                client_id: Some("4"),
                ..Upload::default()
            },
            &crate::seed::cases(),
        );
        assert_eq!(document.client_id.as_deref(), Some("4"));
        assert_eq!(document.file_type, "FILE");
        assert_eq!(document.size, "0.00 MB");
        assert_eq!(document.tags, vec!["Uploaded"]);
    }

    #[test]
    fn unknown_case_links_no_client() {
        let document = LegalDocument::from_upload(
            &Upload { file_name: "a.txt", case_id: Some("999"), ..Upload::default() },
            &crate::seed::cases(),
        );
        assert_eq!(document.client_id, None);
    }

    #[test]
    fn authored_documents_carry_content() {
        let document = LegalDocument::authored("  ", "<p>नमस्ते</p>", None, "2024-03-01");
        assert_eq!(document.name, "Untitled Document.doc");
        assert_eq!(document.file_type, "DOC");
        assert_eq!(document.size, "1 KB");
        assert_eq!(document.font.as_deref(), Some("Kruti Dev 010"));
        assert_eq!(document.downloadable_content(), Some("<p>नमस्ते</p>"));
    }

    #[test]
    fn authored_size_rounds_to_kilobytes() {
        let content = "x".repeat(3 * 1024 + 600);
        let document = LegalDocument::authored("Brief", &content, Some("Lora"), "2024-03-01");
        assert_eq!(document.size, "4 KB");
        assert_eq!(document.name, "Brief.doc");
    }
}
