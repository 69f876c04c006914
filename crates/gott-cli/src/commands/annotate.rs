//! Annotate command: re-describe the running interval.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use gott_core::Store;

use super::util::{total_today, write_status};

pub fn run<W: Write>(
    writer: &mut W,
    store: &mut Store,
    tokens: &[String],
    now: DateTime<Utc>,
) -> Result<()> {
    let Some(current) = store.current_mut() else {
        bail!("no tracking in progress, only a running interval can be annotated");
    };
    current.annotate(tokens);
    let current = current.clone();
    write_status(writer, &current, total_today(store, now), now)?;
    Ok(())
}
