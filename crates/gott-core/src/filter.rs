//! Interval selection by date, range, project and tag.
//!
//! # Vocabulary
//!
//! | argument      | selects                                            |
//! |---------------|----------------------------------------------------|
//! | `today`       | intervals beginning on the current local day       |
//! | `yesterday`   | intervals beginning on the previous local day      |
//! | `week`        | Monday of the current week through today           |
//! | `month`       | the 1st of the current month through today         |
//! | `all`         | everything                                         |
//! | `YYYY-MM-DD`  | intervals beginning on that day                    |
//! | `+tag`        | intervals carrying the tag                         |
//! | `proj:name`   | intervals of the project (`project:name` as well)  |
//!
//! Keys may also be spelled with a leading colon (`:today`). All arguments
//! must match (logical AND).
//!
//! Range bounds are strict: an interval must begin *after* midnight of the
//! first day and *before* midnight following the last day. An interval that
//! begins exactly at midnight of the first day is therefore not selected.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use thiserror::Error;

use crate::annotation::{PROJECT_PREFIX, PROJECT_PREFIX_SHORT, TAG_PREFIX};
use crate::day::{local_day, local_midnight};
use crate::interval::Interval;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const KEY_TODAY: &str = "today";
pub const KEY_YESTERDAY: &str = "yesterday";
pub const KEY_WEEK: &str = "week";
pub const KEY_MONTH: &str = "month";
pub const KEY_ALL: &str = "all";

/// All named filter keys.
pub const KEYS: [&str; 5] = [KEY_TODAY, KEY_YESTERDAY, KEY_WEEK, KEY_MONTH, KEY_ALL];

/// Errors from building a filter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error(
        "invalid filter '{0}': use one of today, yesterday, week, month, all or a date in the format YYYY-MM-DD"
    )]
    InvalidArgument(String),
}

/// A single condition on an interval.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    /// Begins on this local day.
    Day(NaiveDate),
    /// Begins strictly between the two instants.
    Range {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    Project(String),
    Tag(String),
}

impl Predicate {
    /// Range from local midnight of `from` to local midnight after `to`.
    fn day_range(from: NaiveDate, to: NaiveDate) -> Self {
        let next = to.succ_opt().unwrap_or(to);
        Self::Range {
            from: local_midnight(from),
            to: local_midnight(next),
        }
    }

    fn matches(&self, interval: &Interval) -> bool {
        match self {
            Self::Day(day) => local_day(interval.begin) == *day,
            Self::Range { from, to } => interval.begin > *from && interval.begin < *to,
            Self::Project(project) => interval.project.as_deref() == Some(project.as_str()),
            Self::Tag(tag) => interval.tags.iter().any(|t| t == tag),
        }
    }
}

/// A conjunction of predicates. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    /// Builds a filter from command-line arguments, relative to `now`.
    pub fn parse<S: AsRef<str>>(args: &[S], now: DateTime<Utc>) -> Result<Self, FilterError> {
        let today = local_day(now);
        let mut predicates = Vec::with_capacity(args.len());

        for arg in args {
            let arg = arg.as_ref();
            let key = arg.strip_prefix(':').unwrap_or(arg);
            match key {
                KEY_TODAY => predicates.push(Predicate::Day(today)),
                KEY_YESTERDAY => {
                    predicates.push(Predicate::Day(today - Duration::days(1)));
                }
                KEY_WEEK => {
                    let monday = today
                        - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                    predicates.push(Predicate::day_range(monday, today));
                }
                KEY_MONTH => {
                    let first = today.with_day(1).unwrap_or(today);
                    predicates.push(Predicate::day_range(first, today));
                }
                KEY_ALL => {}
                _ => predicates.push(parse_argument(arg)?),
            }
        }

        Ok(Self { predicates })
    }

    /// Filter selecting a single local day.
    pub fn day(day: NaiveDate) -> Self {
        Self {
            predicates: vec![Predicate::Day(day)],
        }
    }

    /// Whether every predicate accepts the interval.
    pub fn matches(&self, interval: &Interval) -> bool {
        self.predicates.iter().all(|p| p.matches(interval))
    }

    /// Whether the filter has no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

fn parse_argument(arg: &str) -> Result<Predicate, FilterError> {
    if let Some(tag) = arg.strip_prefix(TAG_PREFIX).filter(|t| !t.is_empty()) {
        return Ok(Predicate::Tag(tag.to_string()));
    }
    if let Some(project) = arg
        .strip_prefix(PROJECT_PREFIX_SHORT)
        .or_else(|| arg.strip_prefix(PROJECT_PREFIX))
        .filter(|p| !p.is_empty())
    {
        return Ok(Predicate::Project(project.to_string()));
    }
    NaiveDate::parse_from_str(arg, DATE_FORMAT)
        .map(Predicate::Day)
        .map_err(|_| FilterError::InvalidArgument(arg.to_string()))
}
