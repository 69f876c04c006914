//! Tracked intervals of work.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::serde_secs;
use crate::types::{IntervalId, Status};

/// One tracked span or block of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Unique identifier, fixed at creation.
    pub id: IntervalId,
    pub begin: DateTime<Utc>,
    /// `None` while tracking is running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Explicit elapsed time, only meaningful for day entries (`end == begin`).
    #[serde(default = "Duration::zero", with = "serde_secs")]
    pub duration: Duration,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// External reference (ticket, issue, ...).
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub annotation: String,
    /// Whitespace-joined tokens the interval was built from; `gott continue` replays these.
    #[serde(default)]
    pub raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl Interval {
    /// Creates an interval from annotation tokens with a freshly minted id.
    ///
    /// `begin` is set to now; callers that track a specific time overwrite it.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut interval = Self {
            id: IntervalId::generate(),
            begin: Utc::now(),
            end: None,
            duration: Duration::zero(),
            tags: Vec::new(),
            project: None,
            reference: None,
            annotation: String::new(),
            raw: String::new(),
            status: None,
        };
        interval.annotate(tokens);
        interval
    }

    /// Whether this is a day entry whose elapsed time is the stored duration.
    pub fn is_day_entry(&self) -> bool {
        self.end == Some(self.begin)
    }

    /// Whether tracking is still running.
    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Elapsed time as of `now`.
    ///
    /// Day entries report their stored duration, open intervals run until
    /// `now`, closed intervals span `begin..end`.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        match self.end {
            Some(end) if end == self.begin => self.duration,
            Some(end) => end - self.begin,
            None => now - self.begin,
        }
    }

    /// Elapsed time as of the wall clock.
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Utc::now())
    }

    /// Marks the interval as ended at `now`.
    pub(crate) fn stop_at(&mut self, now: DateTime<Utc>) {
        self.end = Some(now);
        self.status = Some(Status::Ended);
    }
}
