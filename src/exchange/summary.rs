//! Per-unit results and the pure fold that turns them into a batch summary.

use std::time::Duration;

use serde::Serialize;

/// Result of one unit of work (one memo converted or imported).
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    /// Succeeded with reduced fidelity.
    Warning(T, Vec<String>),
    Reject(String),
}

impl<T> Outcome<T> {
    /// Attach warnings, promoting `Success` to `Warning` when any exist.
    pub fn with_warnings(value: T, warnings: Vec<String>) -> Self {
        if warnings.is_empty() {
            Outcome::Success(value)
        } else {
            Outcome::Warning(value, warnings)
        }
    }
}

/// What happened to one imported memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Created,
    Updated,
    /// Passed validation in a dry run; nothing was written.
    Validated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub disposition: Disposition,
    pub attachments_imported: u32,
    pub relations_imported: u32,
}

impl ImportOutcome {
    pub fn new(disposition: Disposition) -> Self {
        ImportOutcome {
            disposition,
            attachments_imported: 0,
            relations_imported: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total_memos: u32,
    pub imported_count: u32,
    pub skipped_count: u32,
    pub validation_errors: u32,
    pub created_count: u32,
    pub updated_count: u32,
    pub attachments_imported: u32,
    pub relations_imported: u32,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub duration_ms: u64,
}

/// Fold import outcomes, in snapshot order, into a summary.
///
/// Rejects count as skipped, and also as validation errors when the batch
/// ran with `validate_only`.
pub fn aggregate<I>(outcomes: I, validate_only: bool, elapsed: Duration) -> ImportSummary
where
    I: IntoIterator<Item = Outcome<ImportOutcome>>,
{
    let mut summary = outcomes
        .into_iter()
        .fold(ImportSummary::default(), |mut summary, outcome| {
            summary.total_memos += 1;
            match outcome {
                Outcome::Reject(reason) => {
                    summary.skipped_count += 1;
                    if validate_only {
                        summary.validation_errors += 1;
                    }
                    summary.errors.push(reason);
                }
                Outcome::Success(result) => tally(&mut summary, &result),
                Outcome::Warning(result, warnings) => {
                    tally(&mut summary, &result);
                    summary.warnings.extend(warnings);
                }
            }
            summary
        });

    summary.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    summary
}

fn tally(summary: &mut ImportSummary, result: &ImportOutcome) {
    summary.imported_count += 1;
    match result.disposition {
        Disposition::Created => summary.created_count += 1,
        Disposition::Updated => summary.updated_count += 1,
        Disposition::Validated => {}
    }
    summary.attachments_imported += result.attachments_imported;
    summary.relations_imported += result.relations_imported;
}
