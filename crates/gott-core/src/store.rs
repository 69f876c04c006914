//! In-memory interval collection with a "currently running" pointer.
//!
//! The store is the whole persisted state; the storage layer loads and saves
//! it verbatim around each command.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::Filter;
use crate::interval::Interval;
use crate::types::{IntervalId, Status};

/// Store lookup errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("interval with id {0} does not exist")]
    NotFound(IntervalId),

    #[error("store is empty, there is no latest interval")]
    Empty,
}

/// All intervals plus the id of the running one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current: Option<IntervalId>,
    #[serde(default)]
    intervals: Vec<Interval>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `interval` now, stopping whatever was running.
    pub fn start(&mut self, interval: Interval) -> &Interval {
        self.start_at(interval, Utc::now())
    }

    /// Starts tracking `interval` at `now`, stopping whatever was running.
    pub fn start_at(&mut self, mut interval: Interval, now: DateTime<Utc>) -> &Interval {
        if let Some(previous) = self.stop_at(now) {
            tracing::debug!(id = %previous.id, "stopped previous interval");
        }
        interval.begin = now;
        interval.end = None;
        interval.status = Some(Status::Started);
        self.current = Some(interval.id.clone());
        self.intervals.push(interval);
        &self.intervals[self.intervals.len() - 1]
    }

    /// Stops the running interval now.
    pub fn stop(&mut self) -> Option<Interval> {
        self.stop_at(Utc::now())
    }

    /// Stops the running interval at `now` and returns a copy of it.
    ///
    /// Does nothing when no interval is running.
    pub fn stop_at(&mut self, now: DateTime<Utc>) -> Option<Interval> {
        let id = self.current.take()?;
        let interval = self.get_mut(&id)?;
        interval.stop_at(now);
        Some(interval.clone())
    }

    /// Discards the running interval entirely.
    pub fn cancel(&mut self) -> Option<Interval> {
        let id = self.current.take()?;
        let pos = self.intervals.iter().position(|i| i.id == id)?;
        Some(self.intervals.remove(pos))
    }

    /// Inserts an interval without touching the running pointer or its times.
    pub fn append(&mut self, interval: Interval) {
        self.intervals.push(interval);
    }

    pub fn get(&self, id: &IntervalId) -> Option<&Interval> {
        self.intervals.iter().find(|i| &i.id == id)
    }

    pub fn get_mut(&mut self, id: &IntervalId) -> Option<&mut Interval> {
        self.intervals.iter_mut().find(|i| &i.id == id)
    }

    /// The running interval, if any.
    pub fn current(&self) -> Option<&Interval> {
        self.current.as_ref().and_then(|id| self.get(id))
    }

    pub fn current_mut(&mut self) -> Option<&mut Interval> {
        let id = self.current.clone()?;
        self.get_mut(&id)
    }

    pub const fn current_id(&self) -> Option<&IntervalId> {
        self.current.as_ref()
    }

    pub fn contains(&self, id: &IntervalId) -> bool {
        self.get(id).is_some()
    }

    /// Overwrites every field of the stored interval with the same id.
    ///
    /// Returns whether anything changed.
    pub fn apply(&mut self, interval: Interval) -> Result<bool, StoreError> {
        let Some(existing) = self.get_mut(&interval.id) else {
            return Err(StoreError::NotFound(interval.id));
        };
        if *existing == interval {
            return Ok(false);
        }
        *existing = interval;
        Ok(true)
    }

    /// Removes every interval with `id` and returns how many were removed.
    pub fn remove_by_id(&mut self, id: &IntervalId) -> usize {
        let before = self.intervals.len();
        self.intervals.retain(|i| &i.id != id);
        if self.current.as_ref() == Some(id) {
            self.current = None;
        }
        before - self.intervals.len()
    }

    /// The most recently appended interval (collection order, not begin time).
    pub fn latest(&self) -> Result<&Interval, StoreError> {
        self.intervals.last().ok_or(StoreError::Empty)
    }

    /// Sorts by begin time and returns the intervals `filter` accepts.
    ///
    /// The sort is stable and persists, so the returned slice is in
    /// chronological order.
    pub fn select(&mut self, filter: &Filter) -> Vec<&Interval> {
        self.intervals.sort_by_key(|i| i.begin);
        self.intervals.iter().filter(|i| filter.matches(i)).collect()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}
