//! Start command: begin tracking a new interval.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use gott_core::{Interval, Store};

use super::util::{total_today, write_status};

pub fn run<W: Write>(
    writer: &mut W,
    store: &mut Store,
    tokens: &[String],
    now: DateTime<Utc>,
) -> Result<()> {
    let started = store.start_at(Interval::from_tokens(tokens), now).clone();
    tracing::debug!(id = %started.id, "started interval");
    write_status(writer, &started, total_today(store, now), now)?;
    Ok(())
}
