//! Status command for showing the running interval.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use gott_core::Store;

use super::util::{NO_TRACKING, total_today, write_status};

pub fn run<W: Write>(writer: &mut W, store: &Store, now: DateTime<Utc>) -> Result<()> {
    match store.current() {
        Some(current) => write_status(writer, current, total_today(store, now), now)?,
        None => writeln!(writer, "{NO_TRACKING}")?,
    }
    Ok(())
}
