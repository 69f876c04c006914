//! Track command: record a duration for a whole day.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gott_core::day::local_midnight;
use gott_core::duration::{format_clock, parse_duration};
use gott_core::filter::DATE_FORMAT;
use gott_core::{Interval, Store};

use super::util::{describe, parse_day};

/// Appends a day entry without clock times.
pub fn run<W: Write>(
    writer: &mut W,
    store: &mut Store,
    date: &str,
    duration: &str,
    tokens: &[String],
    now: DateTime<Utc>,
) -> Result<()> {
    let day = parse_day(date, now)?;
    let duration =
        parse_duration(duration).with_context(|| format!("invalid duration {duration}"))?;

    let mut interval = Interval::from_tokens(tokens);
    interval.begin = local_midnight(day);
    interval.end = Some(interval.begin);
    interval.duration = duration;
    tracing::debug!(id = %interval.id, %day, "tracked day entry");

    writeln!(
        writer,
        "tracked {} on {}: {}",
        format_clock(duration),
        day.format(DATE_FORMAT),
        describe(&interval)
    )?;
    store.append(interval);
    Ok(())
}
