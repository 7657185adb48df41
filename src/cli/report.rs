//! Human-readable rendering of command results.

use chrono::DateTime;

use crate::exchange::{ExportResponse, ImportResponse};
use crate::model::{Memo, RowStatus};

use super::theme;

const PREVIEW_CHARS: usize = 48;

/// First line of `content`, clipped for one-line listings.
pub fn preview(content: &str) -> String {
    let line = content.lines().next().unwrap_or("");
    if line.chars().count() > PREVIEW_CHARS {
        let clipped: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", clipped)
    } else {
        line.to_string()
    }
}

fn format_ts(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

pub fn print_memo_list(memos: &[Memo]) {
    if memos.is_empty() {
        println!("No memos.");
        return;
    }

    println!("{}", theme::header(&format!("Memos ({}):", memos.len())));
    for memo in memos {
        let mut flags = memo.visibility.to_string();
        if memo.pinned {
            flags.push_str(" pinned");
        }
        if memo.row_status == RowStatus::Archived {
            flags.push_str(" archived");
        }
        println!(
            "  {} {} {} {}",
            theme::short_uid(&memo.uid),
            theme::dim(&format_ts(memo.created_ts)),
            theme::label(&flags),
            preview(&memo.content)
        );
    }
}

pub fn print_export(response: &ExportResponse, written_to: &str) {
    println!(
        "{} {} memos ({} bytes) to {}",
        theme::success("Exported"),
        theme::meta(&response.memo_count.to_string()),
        theme::meta(&response.size_bytes.to_string()),
        written_to
    );
}

pub fn print_import(response: &ImportResponse, validate_only: bool) {
    let verb = if validate_only { "Validated" } else { "Imported" };
    let summary = &response.summary;

    println!(
        "{} {} of {} memos",
        theme::success(verb),
        theme::meta(&response.imported_count.to_string()),
        theme::meta(&summary.total_memos.to_string())
    );
    if !validate_only {
        println!(
            "  created {}, updated {}",
            theme::meta(&summary.created_count.to_string()),
            theme::meta(&summary.updated_count.to_string())
        );
    }
    if response.skipped_count > 0 {
        println!("  skipped {}", theme::meta(&response.skipped_count.to_string()));
    }
    if response.validation_errors > 0 {
        println!(
            "  validation errors {}",
            theme::meta(&response.validation_errors.to_string())
        );
    }
    println!("  {}", theme::dim(&format!("took {} ms", summary.duration_ms)));

    for warning in &response.warnings {
        println!("{} {}", theme::warning("warning:"), warning);
    }
    for error in &response.errors {
        println!("{} {}", theme::error("error:"), error);
    }
}
