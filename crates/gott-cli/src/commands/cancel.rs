//! Cancel command: discard the running interval.

use std::io::Write;

use anyhow::Result;
use gott_core::Store;

use super::util::{NO_TRACKING, describe};

/// Removes the running interval. Returns whether there was one.
pub fn run<W: Write>(writer: &mut W, store: &mut Store) -> Result<bool> {
    let Some(cancelled) = store.cancel() else {
        writeln!(writer, "{NO_TRACKING}")?;
        return Ok(false);
    };
    tracing::debug!(id = %cancelled.id, "cancelled interval");
    writeln!(writer, "cancelled {}", describe(&cancelled))?;
    Ok(true)
}
