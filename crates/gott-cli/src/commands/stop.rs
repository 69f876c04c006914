//! Stop command: end the running interval.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use gott_core::Store;

use super::util::{NO_TRACKING, total_today, write_status};

/// Stops the running interval and prints it. Returns whether anything stopped.
pub fn run<W: Write>(writer: &mut W, store: &mut Store, now: DateTime<Utc>) -> Result<bool> {
    let Some(stopped) = store.stop_at(now) else {
        writeln!(writer, "{NO_TRACKING}")?;
        return Ok(false);
    };
    tracing::debug!(id = %stopped.id, "stopped interval");
    write_status(writer, &stopped, total_today(store, now), now)?;
    Ok(true)
}
