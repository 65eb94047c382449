//! Record transformer
//!
//! Cleans raw CSV rows into [`CleanedRecord`]s according to a [`FieldMapping`].

use rayon::prelude::*;
use tracing::{debug, warn};

use super::mapping::{FieldMapping, Target};
use super::operations::{clean_cell, is_valid_name, parse_array, strip_parenthetical};
use crate::error::{TransformError, TransformResult};
use crate::models::{CleanedRecord, RawRecord, TopField};

/// Clean one raw record.
///
/// Columns are processed in mapping order. Fails with
/// [`TransformError::MissingField`] as soon as a mapped column is absent; no
/// partial record is returned.
pub fn transform(raw: &RawRecord, mapping: &FieldMapping) -> TransformResult<CleanedRecord> {
    let mut record = CleanedRecord::default();

    for column in mapping.columns() {
        let cell = raw
            .get(&column.source)
            .ok_or_else(|| TransformError::MissingField(column.source.clone()))?;
        let value = clean_cell(cell);

        match column.target {
            Target::Classification(rank) => record.classification.set(rank, value),
            Target::Field(TopField::Label) => {
                record.label = value.map(|v| strip_parenthetical(&v));
            }
            Target::Field(TopField::Name) => {
                record.name = match value {
                    Some(name) if is_valid_name(&name) => Some(name),
                    _ => record.label.clone(),
                };
            }
            Target::Field(TopField::Synonym) => {
                record.synonym = value.map(|v| parse_array(&v));
            }
            Target::Field(TopField::Uri) => record.uri = value,
            Target::Field(TopField::Description) => record.description = value,
        }
    }

    Ok(record)
}

/// What to do with a row that fails to transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Stop at the first failing row.
    #[default]
    Abort,
    /// Record the row as skipped and keep going.
    Skip,
}

/// A row that was skipped under [`RowPolicy::Skip`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
    pub missing_fields: Vec<String>,
}

/// Result of transforming a batch of rows
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Cleaned records, in input order
    pub records: Vec<CleanedRecord>,
    /// Rows skipped under [`RowPolicy::Skip`]
    pub skipped: Vec<SkippedRow>,
}

impl BatchResult {
    /// Get summary statistics
    pub fn summary(&self) -> String {
        format!(
            "Cleaned: {} records, {} skipped",
            self.records.len(),
            self.skipped.len()
        )
    }
}

/// A failed row under [`RowPolicy::Abort`]: the row index and its error.
pub type RowFailure = (usize, TransformError);

/// Transform rows in order.
///
/// Row indexes are zero-based positions in `rows`.
pub fn execute(
    rows: &[RawRecord],
    mapping: &FieldMapping,
    policy: RowPolicy,
) -> Result<BatchResult, RowFailure> {
    let results = rows
        .iter()
        .enumerate()
        .map(|(row_idx, raw)| (row_idx, transform(raw, mapping)));
    collect(results, policy)
}

/// Transform rows on the rayon thread pool.
///
/// Output order and error reporting match [`execute`]: under
/// [`RowPolicy::Abort`] the lowest failing row is reported.
pub fn execute_parallel(
    rows: &[RawRecord],
    mapping: &FieldMapping,
    policy: RowPolicy,
) -> Result<BatchResult, RowFailure> {
    let results: Vec<_> = rows
        .par_iter()
        .enumerate()
        .map(|(row_idx, raw)| (row_idx, transform(raw, mapping)))
        .collect();
    collect(results, policy)
}

fn collect(
    results: impl IntoIterator<Item = (usize, TransformResult<CleanedRecord>)>,
    policy: RowPolicy,
) -> Result<BatchResult, RowFailure> {
    let mut batch = BatchResult::default();

    for (row_idx, result) in results {
        match result {
            Ok(record) => {
                debug!(row = row_idx, label = ?record.label, "cleaned row");
                batch.records.push(record);
            }
            Err(err) if policy == RowPolicy::Skip => {
                warn!(row = row_idx, error = %err, "skipping row");
                batch.skipped.push(skipped_row(row_idx, err));
            }
            Err(err) => return Err((row_idx, err)),
        }
    }

    Ok(batch)
}

fn skipped_row(row: usize, err: TransformError) -> SkippedRow {
    let reason = err.to_string();
    let missing_fields = match err {
        TransformError::MissingField(column) => vec![column],
    };
    SkippedRow {
        row,
        reason,
        missing_fields,
    }
}
