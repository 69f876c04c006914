//! Bulk editing of intervals as text.
//!
//! # Flow
//!
//! 1. Select intervals with a [`Filter`]; their ids form the "before" set.
//! 2. Render them with an [`EditFormat`] into a scratch file.
//! 3. Hand the file to an [`Editor`] and wait for it to return.
//! 4. If the bytes did not change, stop. Otherwise parse the whole file;
//!    any parse error rejects the file before the store is touched.
//! 5. Reconcile: rows without an id are inserted, rows with an id overwrite
//!    the stored interval, and "before" ids that no longer appear are removed.
//!
//! The running interval is shown as a comment and is never part of the
//! "before" set, so an edit pass cannot rewrite or delete it.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::{self, Write as _};
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, DurationRound, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use thiserror::Error;

use crate::day::{local_at, local_day, local_midnight, local_time};
use crate::duration::{DurationParseError, format_duration, parse_duration};
use crate::filter::{DATE_FORMAT, Filter, FilterError};
use crate::interval::Interval;
use crate::store::{Store, StoreError};
use crate::types::{IntervalId, Status};

pub const TIME_FORMAT: &str = "%H:%M";

/// Lines starting with this marker are ignored when parsing.
pub const COMMENT_MARKER: char = '#';

/// Columns before the annotation: id, date, begin, end and duration.
const FIXED_COLUMNS: usize = 5;

/// One fixed column. The annotation is cut out separately since it may
/// contain parentheses itself.
static COLUMN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)").expect("valid column regex"));

/// Edit session errors.
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("line {line}: date is empty but should be filled with format YYYY-MM-DD")]
    MissingDate { line: usize },

    #[error("line {line}: error parsing date '{value}', expected YYYY-MM-DD")]
    InvalidDate { line: usize, value: String },

    #[error("line {line}: error parsing {column} time '{value}', expected HH:MM")]
    InvalidTime {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: begin and end are both {value}, leave them empty to set a duration")]
    EmptyRange { line: usize, value: String },

    #[error("line {line}: error parsing duration")]
    InvalidDuration {
        line: usize,
        #[source]
        source: DurationParseError,
    },

    #[error("interval with id {0} does not exist")]
    UnknownId(IntervalId),

    #[error("interval {0} is still running; stop it before editing")]
    RunningInterval(IntervalId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to prepare edit file")]
    Io(#[from] io::Error),

    #[error("editor failed")]
    Editor(#[source] io::Error),
}

/// A parsed data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRow {
    /// 1-based line number in the edited file.
    pub line: usize,
    /// Id column; `None` marks a new entry.
    pub id: Option<IntervalId>,
    /// The row as an interval. Its own id is freshly minted and only used for new entries.
    pub interval: Interval,
}

/// What a format needs to render an edit file.
#[derive(Debug, Clone)]
pub struct RenderInput<'a> {
    pub intervals: &'a [Interval],
    pub running: Option<&'a IntervalId>,
    pub filter_args: &'a [String],
    pub now: DateTime<Utc>,
}

/// A text representation intervals can be edited in.
pub trait EditFormat {
    fn render(&self, input: &RenderInput<'_>) -> String;

    /// Parses the whole file. Any error rejects every row.
    fn parse(&self, text: &str) -> Result<Vec<EditRow>, EditError>;
}

/// The external program a user edits the file with.
pub trait Editor {
    /// Blocks until the user is done with `path`.
    fn edit(&self, path: &Path) -> io::Result<()>;
}

impl<F> Editor for F
where
    F: Fn(&Path) -> io::Result<()>,
{
    fn edit(&self, path: &Path) -> io::Result<()> {
        self(path)
    }
}

/// Parenthesized columns: `(id) (date) (begin) (end) (duration) (annotation)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnFormat;

impl ColumnFormat {
    fn cells(interval: &Interval, now: DateTime<Utc>) -> [String; 6] {
        let date = local_day(interval.begin).format(DATE_FORMAT).to_string();
        let (begin, end) = if interval.is_day_entry() {
            (String::new(), String::new())
        } else {
            (
                local_time(interval.begin).format(TIME_FORMAT).to_string(),
                interval
                    .end
                    .map(|end| local_time(end).format(TIME_FORMAT).to_string())
                    .unwrap_or_default(),
            )
        };
        [
            format!("({})", interval.id),
            format!("({date})"),
            format!("({begin})"),
            format!("({end})"),
            format!("({})", format_duration(interval.elapsed_at(now))),
            format!("({})", interval.raw),
        ]
    }

    fn parse_line(line_no: usize, line: &str) -> Result<EditRow, EditError> {
        let mut columns = Vec::with_capacity(FIXED_COLUMNS);
        let mut rest = "";
        for caps in COLUMN_RE.captures_iter(line).take(FIXED_COLUMNS) {
            columns.push(caps.get(1).map_or("", |m| m.as_str().trim()));
            rest = caps.get(0).map_or("", |m| &line[m.end()..]);
        }
        let column = |n: usize| columns.get(n).copied().unwrap_or_default();
        let (id, date, begin, end, duration) =
            (column(0), column(1), column(2), column(3), column(4));
        // Everything from the next `(` up to the last `)` on the line.
        let annotation = if columns.len() == FIXED_COLUMNS {
            rest.trim()
                .strip_prefix('(')
                .and_then(|r| r.strip_suffix(')'))
                .unwrap_or_default()
        } else {
            ""
        };

        let tokens: Vec<&str> = annotation.split_whitespace().collect();
        let mut interval = Interval::from_tokens(&tokens);

        if date.is_empty() {
            return Err(EditError::MissingDate { line: line_no });
        }
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
            EditError::InvalidDate {
                line: line_no,
                value: date.to_string(),
            }
        })?;
        let begin = parse_time(line_no, "begin", begin)?;
        let end = parse_time(line_no, "end", end)?;

        match (begin, end) {
            (Some(b), Some(e)) if b != NaiveTime::MIN && e != NaiveTime::MIN => {
                interval.begin = local_at(date, b);
                // An end before the begin runs past midnight.
                let end_date = if e < b {
                    date.succ_opt().unwrap_or(date)
                } else {
                    date
                };
                interval.end = Some(local_at(end_date, e));
                interval.status = Some(Status::Ended);
            }
            _ => {
                interval.duration =
                    parse_duration(duration).map_err(|source| EditError::InvalidDuration {
                        line: line_no,
                        source,
                    })?;
                interval.begin = local_midnight(date);
                interval.end = Some(interval.begin);
            }
        }

        Ok(EditRow {
            line: line_no,
            id: IntervalId::new(id).ok(),
            interval,
        })
    }
}

/// Empty means "no time"; anything else must be `HH:MM`.
fn parse_time(line: usize, column: &'static str, value: &str) -> Result<Option<NaiveTime>, EditError> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map(Some)
        .map_err(|_| EditError::InvalidTime {
            line,
            column,
            value: value.to_string(),
        })
}

impl EditFormat for ColumnFormat {
    fn render(&self, input: &RenderInput<'_>) -> String {
        let rows: Vec<[String; 6]> = input
            .intervals
            .iter()
            .filter(|i| Some(&i.id) != input.running)
            .map(|i| Self::cells(i, input.now))
            .collect();

        let mut widths = [0usize; 6];
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        writeln!(out, "# Edit below values to change tracking data").unwrap();
        writeln!(out, "# - delete rows to delete").unwrap();
        writeln!(out, "# - set begin and end to 00:00 or leave them empty to just set a duration").unwrap();
        writeln!(out, "# - the duration is ignored when begin and end are set").unwrap();
        if let Some(running) = input
            .intervals
            .iter()
            .find(|i| Some(&i.id) == input.running)
        {
            writeln!(out, "# - the running interval cannot be edited here:").unwrap();
            writeln!(out, "#   {}", Self::cells(running, input.now).join(" ")).unwrap();
        }
        writeln!(out).unwrap();

        for row in &rows {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                if i + 1 == row.len() {
                    line.push_str(cell);
                } else {
                    write!(line, "{cell:<width$}", width = widths[i] + 2).unwrap();
                }
            }
            writeln!(out, "{line}").unwrap();
        }

        writeln!(out).unwrap();
        writeln!(out).unwrap();
        writeln!(
            out,
            "# NEW ENTRIES HERE #############################################"
        )
        .unwrap();
        writeln!(
            out,
            "# (ID [leave empty]) (DATE) (BEGIN) (END) (DURATION) (ANNOTATION)"
        )
        .unwrap();
        writeln!(out).unwrap();
        writeln!(
            out,
            "# () ({}) () () () ()",
            local_day(input.now).format(DATE_FORMAT)
        )
        .unwrap();
        writeln!(out, "\n\n\n").unwrap();
        writeln!(
            out,
            "# meta #########################################################"
        )
        .unwrap();
        writeln!(out, "# ;; filter == {}", input.filter_args.join(" ")).unwrap();
        out
    }

    fn parse(&self, text: &str) -> Result<Vec<EditRow>, EditError> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.starts_with(COMMENT_MARKER) && !line.trim().is_empty())
            .map(|(i, line)| Self::parse_line(i + 1, line))
            .collect()
    }
}

/// Changes applied to the store by one edit pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub inserted: Vec<IntervalId>,
    pub updated: Vec<IntervalId>,
    /// Rows that matched their stored interval exactly.
    pub unchanged: usize,
    pub removed: Vec<IntervalId>,
}

impl Reconciliation {
    /// Whether the store was left untouched.
    pub fn is_noop(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Applies parsed rows to the store.
///
/// Every row is checked before the first mutation, so an unknown or running
/// id leaves the store exactly as it was.
pub fn reconcile(
    store: &mut Store,
    before: &[IntervalId],
    rows: Vec<EditRow>,
) -> Result<Reconciliation, EditError> {
    for row in &rows {
        if let Some(id) = &row.id {
            if store.current_id() == Some(id) {
                return Err(EditError::RunningInterval(id.clone()));
            }
            if !store.contains(id) {
                return Err(EditError::UnknownId(id.clone()));
            }
        }
        // Equal clock times only stand for a stored interval shorter than a minute.
        if is_empty_range(&row.interval) && !shown_as_is(store, row.id.as_ref(), &row.interval) {
            return Err(EditError::EmptyRange {
                line: row.line,
                value: local_time(row.interval.begin).format(TIME_FORMAT).to_string(),
            });
        }
    }

    let mut result = Reconciliation::default();
    let mut after = HashSet::new();

    for row in rows {
        let EditRow { id, mut interval, .. } = row;
        match id {
            None => {
                result.inserted.push(interval.id.clone());
                store.append(interval);
            }
            Some(id) => {
                interval.id = id.clone();
                if !shown_as_is(store, Some(&id), &interval) && store.apply(interval)? {
                    result.updated.push(id.clone());
                } else {
                    result.unchanged += 1;
                }
                after.insert(id);
            }
        }
    }

    for id in before {
        if !after.contains(id) && store.remove_by_id(id) > 0 {
            result.removed.push(id.clone());
        }
    }

    Ok(result)
}

/// Whether `parsed` is what the stored interval `id` renders as.
///
/// The edit file carries times to the minute and durations to the second,
/// so the stored interval is compared at that precision. A match leaves the
/// stored record untouched, seconds included.
fn shown_as_is(store: &Store, id: Option<&IntervalId>, parsed: &Interval) -> bool {
    let Some(stored) = id.and_then(|id| store.get(id)) else {
        return false;
    };
    let minute = |ts: DateTime<Utc>| ts.duration_trunc(Duration::minutes(1)).unwrap_or(ts);
    let shown = Interval {
        id: parsed.id.clone(),
        begin: minute(stored.begin),
        end: stored.end.map(minute),
        duration: Duration::seconds(stored.duration.num_seconds()),
        ..stored.clone()
    };
    shown == *parsed
}

/// A timed row whose begin and end are the same clock time.
fn is_empty_range(interval: &Interval) -> bool {
    interval.is_day_entry() && interval.status == Some(Status::Ended)
}

/// Result of an edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The file came back byte-identical; nothing was parsed or applied.
    Unchanged,
    Applied(Reconciliation),
}

/// Runs the select, render, edit, parse and reconcile cycle.
#[derive(Debug, Clone, Default)]
pub struct EditSession<F = ColumnFormat> {
    format: F,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: EditFormat> EditSession<F> {
    pub const fn with_format(format: F) -> Self {
        Self { format }
    }

    /// Edits the intervals selected by `filter_args`.
    ///
    /// The scratch file is deleted on every exit path.
    pub fn run<E: Editor + ?Sized>(
        &self,
        store: &mut Store,
        filter_args: &[String],
        editor: &E,
        now: DateTime<Utc>,
    ) -> Result<EditOutcome, EditError> {
        let filter = Filter::parse(filter_args, now)?;
        let running = store.current_id().cloned();
        let selected: Vec<Interval> = store.select(&filter).into_iter().cloned().collect();
        let before: Vec<IntervalId> = selected
            .iter()
            .map(|i| i.id.clone())
            .filter(|id| Some(id) != running.as_ref())
            .collect();

        let rendered = self.format.render(&RenderInput {
            intervals: &selected,
            running: running.as_ref(),
            filter_args,
            now,
        });

        let mut file = tempfile::Builder::new()
            .prefix("gott-edit-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(rendered.as_bytes())?;
        file.flush()?;
        tracing::debug!(path = %file.path().display(), rows = before.len(), "opening edit file");

        editor.edit(file.path()).map_err(EditError::Editor)?;

        let edited = std::fs::read(file.path())?;
        if edited == rendered.as_bytes() {
            tracing::debug!("edit file unchanged");
            return Ok(EditOutcome::Unchanged);
        }

        let text = String::from_utf8_lossy(&edited);
        let rows = self.format.parse(&text)?;
        let result = reconcile(store, &before, rows)?;
        tracing::debug!(
            inserted = result.inserted.len(),
            updated = result.updated.len(),
            removed = result.removed.len(),
            "edit reconciled"
        );
        Ok(EditOutcome::Applied(result))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;

    use insta::assert_snapshot;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn timed(id: &str, day: NaiveDate, from: NaiveTime, to: NaiveTime, tokens: &[&str]) -> Interval {
        let mut interval = Interval::from_tokens(tokens);
        interval.id = IntervalId::new(id).unwrap();
        interval.begin = local_at(day, from);
        interval.end = Some(local_at(day, to));
        interval.status = Some(Status::Ended);
        interval
    }

    fn day_entry(id: &str, day: NaiveDate, duration: Duration, tokens: &[&str]) -> Interval {
        let mut interval = Interval::from_tokens(tokens);
        interval.id = IntervalId::new(id).unwrap();
        interval.begin = local_midnight(day);
        interval.end = Some(interval.begin);
        interval.duration = duration;
        interval
    }

    fn sample_store() -> Store {
        let mut store = Store::new();
        store.append(timed("a1", date(2026, 1, 5), hm(9, 0), hm(10, 30), &["fix", "bug", "+urgent"]));
        store.append(day_entry("bb22", date(2026, 1, 6), Duration::minutes(90), &["review", "proj:infra"]));
        store
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn now() -> DateTime<Utc> {
        local_at(date(2026, 1, 7), hm(12, 0))
    }

    fn render(store: &Store) -> String {
        ColumnFormat.render(&RenderInput {
            intervals: store.intervals(),
            running: store.current_id(),
            filter_args: &args(&["all"]),
            now: now(),
        })
    }

    #[test]
    fn renders_aligned_columns() {
        let text = render(&sample_store());
        let rows: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with('('))
            .collect();

        assert_eq!(
            rows,
            vec![
                "(a1)    (2026-01-05)  (09:00)  (10:30)  (1h30m0s)  (fix bug +urgent)",
                "(bb22)  (2026-01-06)  ()       ()       (1h30m0s)  (review proj:infra)",
            ]
        );
        assert!(text.contains("# () (2026-01-07) () () () ()"));
        assert!(text.ends_with("# ;; filter == all\n"));
    }

    #[test]
    fn renders_full_file_with_running_interval() {
        let mut store = sample_store();
        let mut running = Interval::from_tokens(&["call", "+meeting"]);
        running.id = IntervalId::new("run9").unwrap();
        store.start_at(running, local_at(date(2026, 1, 7), hm(11, 0)));

        assert_snapshot!(render(&store), @r"
        # Edit below values to change tracking data
        # - delete rows to delete
        # - set begin and end to 00:00 or leave them empty to just set a duration
        # - the duration is ignored when begin and end are set
        # - the running interval cannot be edited here:
        #   (run9) (2026-01-07) (11:00) () (1h0m0s) (call +meeting)

        (a1)    (2026-01-05)  (09:00)  (10:30)  (1h30m0s)  (fix bug +urgent)
        (bb22)  (2026-01-06)  ()       ()       (1h30m0s)  (review proj:infra)


        # NEW ENTRIES HERE #############################################
        # (ID [leave empty]) (DATE) (BEGIN) (END) (DURATION) (ANNOTATION)

        # () (2026-01-07) () () () ()




        # meta #########################################################
        # ;; filter == all
        ");
    }

    #[test]
    fn parses_rendered_file_back() {
        let store = sample_store();
        let rows = ColumnFormat.parse(&render(&store)).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.as_ref().unwrap().as_str(), "a1");
        assert_eq!(rows[0].interval.begin, store.intervals()[0].begin);
        assert_eq!(rows[0].interval.end, store.intervals()[0].end);
        assert_eq!(rows[0].interval.tags, vec!["urgent"]);
        assert!(rows[1].interval.is_day_entry());
        assert_eq!(rows[1].interval.duration, Duration::minutes(90));
        assert_eq!(rows[1].interval.project.as_deref(), Some("infra"));
    }

    #[test]
    fn reconciling_unedited_rows_changes_nothing() {
        let mut store = sample_store();
        let snapshot = store.clone();
        let rows = ColumnFormat.parse(&render(&store)).unwrap();
        let before = ids(&store);

        let result = reconcile(&mut store, &before, rows).unwrap();

        assert!(result.is_noop());
        assert_eq!(result.unchanged, 2);
        assert_eq!(store, snapshot);
    }

    fn ids(store: &Store) -> Vec<IntervalId> {
        store.intervals().iter().map(|i| i.id.clone()).collect()
    }

    /// Adds a started-and-stopped interval whose times carry seconds, plus a
    /// day entry with a sub-second duration.
    fn store_with_seconds() -> Store {
        let mut store = sample_store();
        let begin = local_at(date(2026, 1, 5), NaiveTime::from_hms_opt(9, 0, 17).unwrap());
        store.start_at(Interval::from_tokens(&["standup", "+team"]), begin);
        assert!(store.stop_at(begin + Duration::seconds(3625)).is_some());
        store.append(day_entry("ms7", date(2026, 1, 6), Duration::milliseconds(60_500), &["ping"]));
        store
    }

    #[test]
    fn unedited_pass_keeps_seconds_from_start_and_stop() {
        let mut store = store_with_seconds();
        let snapshot = store.clone();
        let before = ids(&store);
        let rows = ColumnFormat.parse(&render(&store)).unwrap();

        let result = reconcile(&mut store, &before, rows).unwrap();

        assert!(result.is_noop());
        assert_eq!(result.unchanged, 4);
        assert_eq!(store, snapshot);
    }

    #[test]
    fn editing_one_row_leaves_the_others_exact() {
        let mut store = store_with_seconds();
        let snapshot = store.clone();
        let before = ids(&store);
        let text = render(&store).replace("(review proj:infra)", "(review proj:ops)");

        let rows = ColumnFormat.parse(&text).unwrap();
        let result = reconcile(&mut store, &before, rows).unwrap();

        assert_eq!(result.updated, vec![IntervalId::new("bb22").unwrap()]);
        assert_eq!(result.unchanged, 3);
        for (after, before) in store.intervals().iter().zip(snapshot.intervals()) {
            if after.id.as_str() != "bb22" {
                assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn annotation_may_contain_parentheses() {
        let rows = ColumnFormat
            .parse("(a1) (2026-01-05) (09:00) (10:00) (1h0m0s) (fix (bug) +x)\n() (2026-01-05) () () (5m) (smile :))\n")
            .unwrap();

        assert_eq!(rows[0].interval.raw, "fix (bug) +x");
        assert_eq!(rows[0].interval.annotation, "fix (bug)");
        assert_eq!(rows[0].interval.tags, vec!["x"]);
        assert_eq!(rows[1].interval.raw, "smile :)");
    }

    #[test]
    fn parenthesized_annotations_survive_an_unedited_pass() {
        let mut store = Store::new();
        store.append(timed("p1", date(2026, 1, 5), hm(9, 0), hm(9, 30), &["fix", "(bug)", "+x"]));
        store.append(day_entry("p2", date(2026, 1, 5), Duration::minutes(5), &["(", "smile", ":)"]));
        let snapshot = store.clone();
        let before = ids(&store);

        let rows = ColumnFormat.parse(&render(&store)).unwrap();
        let result = reconcile(&mut store, &before, rows).unwrap();

        assert!(result.is_noop());
        assert_eq!(store, snapshot);
    }

    #[test]
    fn equal_begin_and_end_reject_file() {
        let mut store = sample_store();
        let snapshot = store.clone();
        let rows = ColumnFormat
            .parse("() (2026-01-05) () () (1h) (ok)\n(a1) (2026-01-05) (09:00) (09:00) () (fix bug +urgent)\n")
            .unwrap();

        let err = reconcile(&mut store, &ids(&snapshot), rows).unwrap_err();

        assert!(matches!(err, EditError::EmptyRange { line: 2, .. }));
        assert!(err.to_string().contains("09:00"));
        assert_eq!(store, snapshot);

        let rows = ColumnFormat.parse("() (2026-01-05) (14:10) (14:10) () (new)").unwrap();
        let err = reconcile(&mut store, &[], rows).unwrap_err();
        assert!(matches!(err, EditError::EmptyRange { line: 1, .. }));
    }

    #[test]
    fn interval_shorter_than_a_minute_survives_an_unedited_pass() {
        let mut store = Store::new();
        let begin = local_at(date(2026, 1, 5), NaiveTime::from_hms_opt(14, 10, 5).unwrap());
        store.start_at(Interval::from_tokens(&["oops"]), begin);
        assert!(store.stop_at(begin + Duration::seconds(20)).is_some());
        let snapshot = store.clone();

        let text = render(&store);
        assert!(text.contains("(14:10)  (14:10)"));
        let rows = ColumnFormat.parse(&text).unwrap();
        let result = reconcile(&mut store, &ids(&snapshot), rows).unwrap();

        assert!(result.is_noop());
        assert_eq!(store, snapshot);
    }

    #[test]
    fn midnight_or_missing_times_fall_back_to_duration() {
        let text = "(x) (2026-01-05) (00:00) (17:00) (2h) (standup)\n() (2026-01-05) (09:00) () (45m) (call)\n";
        let rows = ColumnFormat.parse(text).unwrap();

        for row in &rows {
            assert!(row.interval.is_day_entry());
            assert_eq!(row.interval.begin, local_midnight(date(2026, 1, 5)));
        }
        assert_eq!(rows[0].interval.duration, Duration::hours(2));
        assert_eq!(rows[1].interval.duration, Duration::minutes(45));
        assert_eq!(rows[1].id, None);
    }

    #[test]
    fn timed_rows_ignore_the_duration_column() {
        let rows = ColumnFormat
            .parse("() (2026-01-05) (09:15) (10:00) (garbage) (x)")
            .unwrap();
        assert_eq!(rows[0].interval.elapsed_at(now()), Duration::minutes(45));
        assert_eq!(rows[0].interval.status, Some(Status::Ended));
    }

    #[test]
    fn end_before_begin_runs_past_midnight() {
        let rows = ColumnFormat
            .parse("() (2026-01-05) (23:00) (01:00) () (deploy)")
            .unwrap();
        assert_eq!(rows[0].interval.elapsed_at(now()), Duration::hours(2));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# (a) (2026-01-01) () () (1h) (commented)\n\n   \n() (2026-01-05) () () (1h) (kept)\n";
        let rows = ColumnFormat.parse(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 4);
        assert_eq!(rows[0].interval.annotation, "kept");
    }

    #[test]
    fn missing_date_rejects_file() {
        let err = ColumnFormat
            .parse("() (2026-01-05) () () (1h) (ok)\n(id) () () () (1h) (no date)\n")
            .unwrap_err();
        assert!(matches!(err, EditError::MissingDate { line: 2 }));
    }

    #[test]
    fn malformed_fields_reject_file() {
        let bad_date = ColumnFormat.parse("() (05.01.2026) () () (1h) (x)").unwrap_err();
        assert!(matches!(bad_date, EditError::InvalidDate { line: 1, .. }));

        let bad_time = ColumnFormat.parse("() (2026-01-05) (9am) (10:00) () (x)").unwrap_err();
        assert!(matches!(bad_time, EditError::InvalidTime { column: "begin", .. }));

        let bad_duration = ColumnFormat.parse("() (2026-01-05) () () (lots) (x)").unwrap_err();
        assert!(matches!(bad_duration, EditError::InvalidDuration { .. }));
        assert!(bad_duration.to_string().contains("line 1"));
    }

    #[test]
    fn omitted_row_is_removed_and_nothing_else() {
        let mut store = sample_store();
        store.append(day_entry("outside", date(2025, 12, 1), Duration::hours(1), &["old"]));
        let before = args(&["a1", "bb22"])
            .into_iter()
            .map(|id| IntervalId::new(id).unwrap())
            .collect::<Vec<_>>();
        let text = render(&store);
        let kept: String = text
            .lines()
            .filter(|l| !l.starts_with("(bb22)") && !l.starts_with("(outside)"))
            .map(|l| format!("{l}\n"))
            .collect();

        let rows = ColumnFormat.parse(&kept).unwrap();
        let result = reconcile(&mut store, &before, rows).unwrap();

        assert_eq!(result.removed, vec![IntervalId::new("bb22").unwrap()]);
        assert_eq!(store.len(), 2);
        assert!(store.get(&IntervalId::new("outside").unwrap()).is_some());
    }

    #[test]
    fn new_rows_get_fresh_ids() {
        let mut store = sample_store();
        let rows = ColumnFormat
            .parse("(a1) (2026-01-05) (09:00) (10:30) () (fix bug +urgent)\n() (2026-01-07) () () (30m) (new +one)\n")
            .unwrap();
        let before = vec![IntervalId::new("a1").unwrap()];

        let result = reconcile(&mut store, &before, rows).unwrap();

        assert_eq!(result.inserted.len(), 1);
        let new_id = &result.inserted[0];
        assert!(new_id.as_str() != "a1" && new_id.as_str() != "bb22");
        let inserted = store.get(new_id).unwrap();
        assert_eq!(inserted.tags, vec!["one"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn edited_row_overwrites_fields() {
        let mut store = sample_store();
        let rows = ColumnFormat
            .parse("(a1) (2026-01-05) (09:00) (11:00) () (fix bug ref:T-9)\n")
            .unwrap();
        let before = vec![IntervalId::new("a1").unwrap()];

        let result = reconcile(&mut store, &before, rows).unwrap();
        let a1 = store.get(&IntervalId::new("a1").unwrap()).unwrap();

        assert_eq!(result.updated.len(), 1);
        assert_eq!(a1.elapsed_at(now()), Duration::hours(2));
        assert!(a1.tags.is_empty());
        assert_eq!(a1.reference.as_deref(), Some("T-9"));
    }

    #[test]
    fn unknown_id_rejects_all_rows() {
        let mut store = sample_store();
        let snapshot = store.clone();
        let rows = ColumnFormat
            .parse("() (2026-01-07) () () (30m) (new)\n(nope) (2026-01-07) () () (30m) (ghost)\n")
            .unwrap();

        let err = reconcile(&mut store, &[], rows).unwrap_err();
        assert!(matches!(err, EditError::UnknownId(_)));
        assert_eq!(store, snapshot);
    }

    /// Editor double that rewrites the file and remembers where it was.
    struct ScriptedEditor {
        rewrite: fn(&str) -> String,
        seen: RefCell<Option<PathBuf>>,
    }

    impl Editor for ScriptedEditor {
        fn edit(&self, path: &Path) -> io::Result<()> {
            *self.seen.borrow_mut() = Some(path.to_path_buf());
            let text = std::fs::read_to_string(path)?;
            std::fs::write(path, (self.rewrite)(&text))
        }
    }

    impl ScriptedEditor {
        const fn new(rewrite: fn(&str) -> String) -> Self {
            Self {
                rewrite,
                seen: RefCell::new(None),
            }
        }

        fn seen_path(&self) -> PathBuf {
            self.seen.borrow().clone().unwrap()
        }
    }

    #[test]
    fn session_without_changes_is_a_noop() {
        let mut store = sample_store();
        let snapshot = store.clone();
        let editor = ScriptedEditor::new(|text| text.to_string());

        let outcome = EditSession::new()
            .run(&mut store, &args(&["all"]), &editor, now())
            .unwrap();

        assert_eq!(outcome, EditOutcome::Unchanged);
        assert_eq!(store, snapshot);
        assert!(!editor.seen_path().exists());
    }

    #[test]
    fn session_deletes_omitted_rows_and_cleans_up() {
        let mut store = sample_store();
        let editor = ScriptedEditor::new(|text| {
            text.lines()
                .filter(|l| !l.starts_with("(a1)"))
                .map(|l| format!("{l}\n"))
                .collect()
        });

        let outcome = EditSession::new()
            .run(&mut store, &args(&["all"]), &editor, now())
            .unwrap();

        let EditOutcome::Applied(result) = outcome else {
            panic!("expected applied outcome");
        };
        assert_eq!(result.removed, vec![IntervalId::new("a1").unwrap()]);
        assert_eq!(result.unchanged, 1);
        assert_eq!(store.len(), 1);
        assert!(!editor.seen_path().exists());
    }

    #[test]
    fn session_parse_error_applies_nothing() {
        let mut store = sample_store();
        let snapshot = store.clone();
        let editor = ScriptedEditor::new(|text| {
            let mut text = text.replace("(bb22)", "()");
            text.push_str("() (2026-01-07) (xx:yy) () () (broken)\n");
            text
        });

        let err = EditSession::new()
            .run(&mut store, &args(&["all"]), &editor, now())
            .unwrap_err();

        assert!(matches!(err, EditError::InvalidTime { .. }));
        assert_eq!(store, snapshot);
        assert!(!editor.seen_path().exists());
    }

    #[test]
    fn session_only_offers_filtered_rows() {
        let mut store = sample_store();
        let editor = ScriptedEditor::new(|text| {
            assert!(text.contains("(a1)"));
            assert!(!text.contains("(bb22)"));
            text.lines()
                .filter(|l| !l.starts_with("(a1)"))
                .map(|l| format!("{l}\n"))
                .collect()
        });

        EditSession::new()
            .run(&mut store, &args(&["2026-01-05"]), &editor, now())
            .unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get(&IntervalId::new("bb22").unwrap()).is_some());
    }

    #[test]
    fn session_keeps_running_interval_out_of_reach() {
        let mut store = sample_store();
        let running = store
            .start_at(Interval::from_tokens(&["live"]), local_at(date(2026, 1, 5), hm(11, 0)))
            .id
            .clone();
        let editor = ScriptedEditor::new(|text| {
            assert!(text.contains("# - the running interval cannot be edited here:"));
            text.lines()
                .filter(|l| l.starts_with('#'))
                .map(|l| format!("{l}\n"))
                .collect()
        });

        let outcome = EditSession::new()
            .run(&mut store, &args(&["all"]), &editor, now())
            .unwrap();

        let EditOutcome::Applied(result) = outcome else {
            panic!("expected applied outcome");
        };
        assert_eq!(result.removed.len(), 2);
        assert_eq!(store.current_id(), Some(&running));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn session_rejects_bad_filter_before_editing() {
        let mut store = sample_store();
        let editor = |_: &Path| -> io::Result<()> { panic!("editor must not run") };

        let err = EditSession::new()
            .run(&mut store, &args(&["someday"]), &editor, now())
            .unwrap_err();
        assert!(matches!(err, EditError::Filter(_)));
    }

    #[test]
    fn editor_failure_is_reported() {
        let mut store = sample_store();
        let editor = |_: &Path| -> io::Result<()> { Err(io::Error::other("no editor")) };

        let err = EditSession::new()
            .run(&mut store, &args(&["all"]), &editor, now())
            .unwrap_err();
        assert!(matches!(err, EditError::Editor(_)));
    }
}
