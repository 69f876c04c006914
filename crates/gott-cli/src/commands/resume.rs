//! Continue command: start a new interval described like the latest one.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use gott_core::{Interval, Store};

use super::util::{total_today, write_status};

pub fn run<W: Write>(writer: &mut W, store: &mut Store, now: DateTime<Utc>) -> Result<()> {
    if store.current().is_some() {
        bail!("there is a tracking in progress, nothing to continue");
    }
    let latest = store.latest().context("nothing to continue")?;
    let tokens: Vec<String> = latest.raw.split(' ').map(str::to_string).collect();
    tracing::debug!(from = %latest.id, "continuing interval");

    let started = store.start_at(Interval::from_tokens(&tokens), now).clone();
    write_status(writer, &started, total_today(store, now), now)?;
    Ok(())
}
