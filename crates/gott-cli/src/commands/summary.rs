//! Summary command for listing intervals by calendar week and day.
//!
//! The table output marks the last row of each day with a `day =` total and
//! the last row of each week with a `wk =` total. `--json` emits the same
//! grouping with totals in whole seconds.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, IsoWeek, NaiveDate, Utc};
use gott_core::day::{local_day, local_time};
use gott_core::duration::format_clock;
use gott_core::edit::TIME_FORMAT;
use gott_core::filter::{DATE_FORMAT, KEY_TODAY};
use gott_core::{Filter, Interval, Store};
use serde::Serialize;

use super::util::{SHORT_DATE_FORMAT, Table};

/// Shown in the END column of a running interval.
const RUNNING_MARKER: &str = "tracking...";

const HEADER: [&str; 8] = [
    "CWEEK",
    "DAY",
    "BEGIN",
    "END",
    "DURATION",
    "PROJECT",
    "TAG",
    "ANNOTATION",
];

/// Intervals of one local day, in chronological order.
#[derive(Debug)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    pub intervals: Vec<&'a Interval>,
    pub total: Duration,
}

/// Days of one ISO week.
#[derive(Debug)]
pub struct WeekGroup<'a> {
    pub week: IsoWeek,
    pub days: Vec<DayGroup<'a>>,
    pub total: Duration,
}

/// Groups chronologically sorted intervals by ISO week and local day.
pub fn group<'a>(intervals: &[&'a Interval], now: DateTime<Utc>) -> Vec<WeekGroup<'a>> {
    let mut weeks: Vec<WeekGroup<'a>> = Vec::new();
    for &interval in intervals {
        let date = local_day(interval.begin);
        let elapsed = interval.elapsed_at(now);

        if weeks.last().is_none_or(|w| w.week != date.iso_week()) {
            weeks.push(WeekGroup {
                week: date.iso_week(),
                days: Vec::new(),
                total: Duration::zero(),
            });
        }
        let last = weeks.len() - 1;
        let week = &mut weeks[last];
        week.total += elapsed;

        if week.days.last().is_none_or(|d| d.date != date) {
            week.days.push(DayGroup {
                date,
                intervals: Vec::new(),
                total: Duration::zero(),
            });
        }
        let last = week.days.len() - 1;
        let day = &mut week.days[last];
        day.total += elapsed;
        day.intervals.push(interval);
    }
    weeks
}

/// Formats the grouped intervals as an aligned table.
pub fn format_table<W: Write>(
    writer: &mut W,
    weeks: &[WeekGroup<'_>],
    now: DateTime<Utc>,
) -> Result<()> {
    let mut table = Table::new();
    table.add_row(HEADER);

    for week in weeks {
        let mut week_text = week.week.week().to_string();
        for day in &week.days {
            let mut day_text = day.date.format(SHORT_DATE_FORMAT).to_string();
            for interval in &day.intervals {
                let (begin, end) = clock_columns(interval);
                table.add_row([
                    std::mem::take(&mut week_text),
                    std::mem::take(&mut day_text),
                    begin,
                    end,
                    format_clock(interval.elapsed_at(now)),
                    interval.project.clone().unwrap_or_default(),
                    interval.tags.join(", "),
                    interval.annotation.clone(),
                ]);
            }
            table.add_row(["", "", "", "day =", format_clock(day.total).as_str()]);
        }
        table.add_row(["", "", "wk =", "", format_clock(week.total).as_str()]);
    }

    table.write(writer)?;
    Ok(())
}

fn clock_columns(interval: &Interval) -> (String, String) {
    if interval.is_day_entry() {
        return (String::new(), String::new());
    }
    let clock = |ts| local_time(ts).format(TIME_FORMAT).to_string();
    let end = interval
        .end
        .map_or_else(|| RUNNING_MARKER.to_string(), clock);
    (clock(interval.begin), end)
}

// ========== JSON Output ==========

/// JSON summary structure.
#[derive(Debug, Serialize)]
pub struct JsonSummary {
    pub generated_at: String,
    pub timezone: String,
    pub filter: Vec<String>,
    pub weeks: Vec<JsonWeek>,
    pub total_secs: i64,
}

#[derive(Debug, Serialize)]
pub struct JsonWeek {
    pub year: i32,
    pub week: u32,
    pub days: Vec<JsonDay>,
    pub total_secs: i64,
}

#[derive(Debug, Serialize)]
pub struct JsonDay {
    pub date: String,
    pub intervals: Vec<JsonInterval>,
    pub total_secs: i64,
}

#[derive(Debug, Serialize)]
pub struct JsonInterval {
    pub id: String,
    pub begin: String,
    pub end: Option<String>,
    pub elapsed_secs: i64,
    pub project: Option<String>,
    pub tags: Vec<String>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub annotation: String,
}

/// Formats the grouped intervals as pretty JSON.
pub fn format_json(
    weeks: &[WeekGroup<'_>],
    filter_args: &[String],
    timezone: String,
    now: DateTime<Utc>,
) -> Result<String> {
    let weeks: Vec<JsonWeek> = weeks
        .iter()
        .map(|week| JsonWeek {
            year: week.week.year(),
            week: week.week.week(),
            days: week
                .days
                .iter()
                .map(|day| JsonDay {
                    date: day.date.format(DATE_FORMAT).to_string(),
                    intervals: day
                        .intervals
                        .iter()
                        .map(|i| JsonInterval {
                            id: i.id.to_string(),
                            begin: i.begin.to_rfc3339(),
                            end: i.end.map(|e| e.to_rfc3339()),
                            elapsed_secs: i.elapsed_at(now).num_seconds(),
                            project: i.project.clone(),
                            tags: i.tags.clone(),
                            reference: i.reference.clone(),
                            annotation: i.annotation.clone(),
                        })
                        .collect(),
                    total_secs: day.total.num_seconds(),
                })
                .collect(),
            total_secs: week.total.num_seconds(),
        })
        .collect();

    let summary = JsonSummary {
        generated_at: now.to_rfc3339(),
        timezone,
        filter: filter_args.to_vec(),
        total_secs: weeks.iter().map(|w| w.total_secs).sum(),
        weeks,
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}

// ========== Public Interface ==========

/// Prints the intervals selected by `filter_args`, defaulting to today.
pub fn run<W: Write>(
    writer: &mut W,
    store: &mut Store,
    filter_args: &[String],
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let filter_args = if filter_args.is_empty() {
        vec![KEY_TODAY.to_string()]
    } else {
        filter_args.to_vec()
    };
    let filter = Filter::parse(&filter_args, now)?;
    let selected = store.select(&filter);
    let weeks = group(&selected, now);
    tracing::debug!(intervals = selected.len(), weeks = weeks.len(), "summary selected");

    if json {
        let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
        writeln!(writer, "{}", format_json(&weeks, &filter_args, timezone, now)?)?;
    } else {
        format_table(writer, &weeks, now)?;
    }
    Ok(())
}
