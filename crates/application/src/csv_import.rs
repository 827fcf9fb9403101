//! CSV bulk import: parse, validate per row, preview, submit valid rows.
//!
//! Invalid rows are reported and skipped, never sent to the create path.

use std::collections::BTreeMap;

use brokerdesk_core::{AppError, AppResult, RecordId, UserIdentity};
use brokerdesk_domain::{Resource, ResourceKind};
use serde::Serialize;

use crate::ResourceService;

mod mappings;

/// Cell values of one CSV row keyed by normalized column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CsvRow {
    fields: BTreeMap<String, String>,
}

impl CsvRow {
    /// Returns a trimmed cell, `None` when absent or blank.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(&normalize_column(column))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Returns a cell or an empty string.
    #[must_use]
    pub fn text(&self, column: &str) -> String {
        self.get(column).unwrap_or_default().to_owned()
    }

    /// Returns a cell as an optional owned string.
    #[must_use]
    pub fn optional(&self, column: &str) -> Option<String> {
        self.get(column).map(str::to_owned)
    }

    /// Returns every cell.
    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

/// A record kind that can be bulk-created from CSV.
pub trait CsvImportable: Resource {
    /// Columns every row must fill.
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Optional columns read when present.
    const OPTIONAL_COLUMNS: &'static [&'static str];

    /// Maps a row whose required columns are filled to a draft.
    fn draft_from_row(row: &CsvRow) -> Self::Draft;
}

/// One parsed data row with its validation outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow<D> {
    /// Line number in the file, the header being line 1.
    pub line: u64,
    /// Raw cells.
    pub fields: BTreeMap<String, String>,
    /// Problems found, empty for valid rows.
    pub errors: Vec<String>,
    /// Draft built from a valid row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<D>,
}

impl<D> ImportRow<D> {
    /// Returns whether the row has problems.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parsed file ready to be reviewed before submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview<T: Resource> {
    /// Kind being imported.
    pub kind: ResourceKind,
    /// Normalized header columns.
    pub columns: Vec<String>,
    /// Required columns absent from the header.
    pub missing_columns: Vec<String>,
    /// Data rows in file order.
    pub rows: Vec<ImportRow<T::Draft>>,
}

impl<T: Resource> ImportPreview<T> {
    /// Number of rows that will be submitted.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.rows.len() - self.invalid_count()
    }

    /// Number of rows that will be skipped.
    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.rows.iter().filter(|row| row.has_errors()).count()
    }

    /// Drafts of the valid rows, in file order.
    #[must_use]
    pub fn valid_drafts(&self) -> Vec<T::Draft> {
        self.rows
            .iter()
            .filter(|row| !row.has_errors())
            .filter_map(|row| row.draft.clone())
            .collect()
    }

    /// Line numbers of the valid rows, aligned with [`Self::valid_drafts`].
    #[must_use]
    pub fn valid_lines(&self) -> Vec<u64> {
        self.rows
            .iter()
            .filter(|row| !row.has_errors() && row.draft.is_some())
            .map(|row| row.line)
            .collect()
    }
}

/// A valid row the create path rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    /// File line of the row.
    pub line: u64,
    /// Error reported by the create path.
    pub message: String,
}

/// Result of submitting a preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    /// Ids of the created records, in file order.
    pub created: Vec<RecordId>,
    /// Rows the create path rejected.
    pub failed: Vec<ImportFailure>,
    /// Invalid rows that were never submitted.
    pub skipped: usize,
}

/// Header line of an empty import template for the kind.
#[must_use]
pub fn template_header<T: CsvImportable>() -> String {
    T::REQUIRED_COLUMNS
        .iter()
        .chain(T::OPTIONAL_COLUMNS)
        .copied()
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses CSV bytes into an import preview.
pub fn preview<T: CsvImportable>(bytes: &[u8]) -> AppResult<ImportPreview<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|error| AppError::Validation(format!("unreadable CSV header: {error}")))?
        .iter()
        .map(normalize_column)
        .collect();
    if columns.iter().all(String::is_empty) {
        return Err(AppError::Validation("CSV file has no header row".to_owned()));
    }

    let missing_columns: Vec<String> = T::REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.contains(&normalize_column(required)))
        .map(|required| (*required).to_owned())
        .collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let fallback_line = u64::try_from(index).unwrap_or(u64::MAX).saturating_add(2);
        let record = match record {
            Ok(record) => record,
            Err(error) => {
                rows.push(ImportRow {
                    line: error
                        .position()
                        .map(csv::Position::line)
                        .unwrap_or(fallback_line),
                    fields: BTreeMap::new(),
                    errors: vec![format!("unreadable row: {error}")],
                    draft: None,
                });
                continue;
            }
        };

        let line = record
            .position()
            .map(csv::Position::line)
            .unwrap_or(fallback_line);
        let row = CsvRow {
            fields: columns
                .iter()
                .zip(record.iter())
                .filter(|(column, _)| !column.is_empty())
                .map(|(column, value)| (column.clone(), value.to_owned()))
                .collect(),
        };

        rows.push(validate_row::<T>(line, row));
    }

    Ok(ImportPreview {
        kind: T::KIND,
        columns,
        missing_columns,
        rows,
    })
}

fn validate_row<T: CsvImportable>(line: u64, row: CsvRow) -> ImportRow<T::Draft> {
    let mut errors: Vec<String> = T::REQUIRED_COLUMNS
        .iter()
        .filter(|column| row.get(column).is_none())
        .map(|column| format!("missing required column '{column}'"))
        .collect();

    let draft = if errors.is_empty() {
        let draft = T::draft_from_row(&row);
        match T::validate_draft(&draft) {
            Ok(()) => Some(draft),
            Err(error) => {
                errors.push(error.to_string());
                None
            }
        }
    } else {
        None
    };

    ImportRow {
        line,
        fields: row.fields,
        errors,
        draft,
    }
}

/// Submits the valid rows of a preview through the permission-checked create path.
///
/// Rows are created one by one in file order; a rejected row does not stop
/// the rest.
pub async fn submit<T: CsvImportable>(
    service: &ResourceService<T>,
    actor: &UserIdentity,
    preview: &ImportPreview<T>,
) -> AppResult<ImportOutcome> {
    service
        .require(actor, brokerdesk_domain::Capability::Create)
        .await?;

    let mut outcome = ImportOutcome {
        skipped: preview.invalid_count(),
        ..ImportOutcome::default()
    };
    for (line, draft) in preview.valid_lines().into_iter().zip(preview.valid_drafts()) {
        match service.create(actor, draft).await {
            Ok(record) => outcome.created.push(record.id()),
            Err(error) => outcome.failed.push(ImportFailure {
                line,
                message: error.to_string(),
            }),
        }
    }

    tracing::info!(
        kind = T::KIND.collection(),
        created = outcome.created.len(),
        failed = outcome.failed.len(),
        skipped = outcome.skipped,
        "csv import finished"
    );
    Ok(outcome)
}

/// Lower-cases a column name and drops separators, so `Legal Name`,
/// `legal_name` and `legalName` match.
fn normalize_column(column: &str) -> String {
    column
        .trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|character| !matches!(character, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}
