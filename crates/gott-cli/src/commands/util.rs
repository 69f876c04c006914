//! Shared utilities for CLI commands.

use std::io::{self, Write};

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use gott_core::day::local_day;
use gott_core::duration::format_clock;
use gott_core::filter::{DATE_FORMAT, KEY_TODAY, KEY_YESTERDAY};
use gott_core::{Filter, Interval, PROJECT_PREFIX_SHORT, REF_PREFIX, Store};

/// Printed when a command needs a running interval and there is none.
pub const NO_TRACKING: &str = "<< no tracking in progress >>";

/// Date format of the day column and the status lines.
pub const SHORT_DATE_FORMAT: &str = "%m-%d";

/// Left-aligned text columns separated by two spaces.
#[derive(Debug, Default)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        for row in &self.rows {
            let mut line = String::new();
            for (cell, width) in row.iter().zip(&widths) {
                line.push_str(cell);
                let pad = width - cell.chars().count() + 2;
                line.extend(std::iter::repeat_n(' ', pad));
            }
            writeln!(writer, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// One-line description: annotation, then project, tags and reference.
pub fn describe(interval: &Interval) -> String {
    let mut out = interval.annotation.clone();
    if let Some(project) = &interval.project {
        out.push_str(&format!(" -- {PROJECT_PREFIX_SHORT}{project}"));
    }
    if !interval.tags.is_empty() {
        out.push_str(" -- ");
        out.push_str(&interval.tags.join(", "));
    }
    if let Some(reference) = &interval.reference {
        out.push_str(&format!(" -- {REF_PREFIX}{reference}"));
    }
    out
}

/// Total elapsed time of everything on the local day of `now`.
pub fn total_today(store: &Store, now: DateTime<Utc>) -> Duration {
    let filter = Filter::day(local_day(now));
    store
        .intervals()
        .iter()
        .filter(|i| filter.matches(i))
        .map(|i| i.elapsed_at(now))
        .sum()
}

/// Prints `interval` with its start, stop and running totals.
pub fn write_status<W: Write>(
    writer: &mut W,
    interval: &Interval,
    today: Duration,
    now: DateTime<Utc>,
) -> io::Result<()> {
    writeln!(writer, "tracking {}", describe(interval))?;

    let stamp = |ts: DateTime<Utc>| {
        ts.with_timezone(&chrono::Local)
            .format(&format!("{SHORT_DATE_FORMAT} %H:%M"))
            .to_string()
    };
    let mut table = Table::new();
    table.add_row(["", "Started", stamp(interval.begin).as_str()]);
    if let Some(end) = interval.end {
        table.add_row(["", "Stopped", stamp(end).as_str()]);
    }
    table.add_row(["", "Current", format_clock(interval.elapsed_at(now)).as_str()]);
    table.add_row(["", "Total (today)", format_clock(today).as_str()]);
    table.write(writer)
}

/// Resolves a `track` date: `today`, `yesterday` (optionally `:`-prefixed)
/// or `YYYY-MM-DD`.
pub fn parse_day(arg: &str, now: DateTime<Utc>) -> anyhow::Result<NaiveDate> {
    let today = local_day(now);
    match arg.strip_prefix(':').unwrap_or(arg) {
        KEY_TODAY => Ok(today),
        KEY_YESTERDAY => today.pred_opt().context("date out of range"),
        _ => NaiveDate::parse_from_str(arg, DATE_FORMAT).with_context(|| {
            format!("invalid date {arg}, use {KEY_TODAY}, {KEY_YESTERDAY} or YYYY-MM-DD")
        }),
    }
}
