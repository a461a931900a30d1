// `lexflow export`: write an authored document's content to a file or stdout.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use lexflow_common::types::{LegalDocument, RecordKind};
use lexflow_sync::SyncError;
use serde::Serialize;

use super::{block_on, emit, open_context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Document id.
    id: String,
    /// Destination file; the content goes to stdout when omitted.
    #[arg(long, short)]
    out: Option<PathBuf>,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub id: String,
    pub name: String,
    pub bytes: usize,
    pub path: String,
}

pub fn run(args: ExportArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let document = block_on(find(&args.id)).and_then(|inner| inner);

    let Some(out) = &args.out else {
        return document.and_then(|document| print_content(&document)).inspect_err(|error| {
            output::print_anyhow_error(format, error);
        });
    };

    let result = document.and_then(|document| write_export(&document, out));
    emit(format, result, |result| format!("Exported {} to {} ({} bytes)", result.name, result.path, result.bytes))
}

async fn find(id: &str) -> anyhow::Result<LegalDocument> {
    let context = open_context().await?;
    let document = context
        .store()
        .document(id)
        .ok_or_else(|| SyncError::UnknownRecord { kind: RecordKind::Document, id: id.to_string() })?;
    Ok(document)
}

fn exportable(document: &LegalDocument) -> anyhow::Result<&str> {
    match document.downloadable_content() {
        Some(content) => Ok(content),
        None => bail!("document `{}` is metadata only and has no content to export", document.id),
    }
}

fn print_content(document: &LegalDocument) -> anyhow::Result<()> {
    let content = exportable(document)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn write_export(document: &LegalDocument, out: &Path) -> anyhow::Result<ExportResult> {
    let content = exportable(document)?;
    fs::write(out, content).with_context(|| format!("failed to write `{}`", out.display()))?;
    Ok(ExportResult {
        id: document.id.clone(),
        name: document.name.clone(),
        bytes: content.len(),
        path: out.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexflow_common::seed;
    use tempfile::TempDir;

    #[test]
    fn authored_content_is_written() {
        let dir = TempDir::new().expect("tempdir should be created");
        let out = dir.path().join("notice.doc");
        let document = LegalDocument {
            id: "1712345678901".into(),
            ..LegalDocument::authored("notice", "Sir, it is submitted", None, "2024-02-01")
        };

        let result = write_export(&document, &out).expect("export should succeed");
        assert_eq!(result.bytes, 20);
        assert_eq!(result.name, "notice.doc");
        assert_eq!(fs::read_to_string(&out).expect("export should be readable"), "Sir, it is submitted");
    }

    #[test]
    fn uploaded_files_have_nothing_to_export() {
        let dir = TempDir::new().expect("tempdir should be created");
        let out = dir.path().join("d1.pdf");
        let document = seed::documents().remove(0);

        let error = write_export(&document, &out).expect_err("metadata-only export should fail");
        assert!(error.to_string().contains("`d1` is metadata only"));
        assert!(!out.exists());
    }
}
