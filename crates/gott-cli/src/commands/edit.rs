//! Edit command: change intervals in an external editor.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gott_core::filter::KEY_TODAY;
use gott_core::{EditOutcome, EditSession, Editor, Store};

/// Runs an edit session over `filter_args`, defaulting to today.
///
/// Returns whether the store was changed.
pub fn run<W: Write, E: Editor + ?Sized>(
    writer: &mut W,
    store: &mut Store,
    filter_args: &[String],
    editor: &E,
    now: DateTime<Utc>,
) -> Result<bool> {
    let filter_args = if filter_args.is_empty() {
        vec![KEY_TODAY.to_string()]
    } else {
        filter_args.to_vec()
    };

    let outcome = EditSession::new()
        .run(store, &filter_args, editor, now)
        .context("edit failed, nothing was changed")?;

    match outcome {
        EditOutcome::Unchanged => {
            writeln!(writer, "file unchanged. nothing to do.")?;
            Ok(false)
        }
        EditOutcome::Applied(result) => {
            writeln!(
                writer,
                "{} added, {} updated, {} removed",
                result.inserted.len(),
                result.updated.len(),
                result.removed.len()
            )?;
            Ok(!result.is_noop())
        }
    }
}
