//! Core domain logic for the gott time tracker.
//!
//! This crate contains:
//! - Intervals: the tracked spans of work and their elapsed-time rules
//! - Annotation parsing: tags, project and reference from free-form tokens
//! - Filtering: date, range, project and tag selection
//! - The store: the interval collection and the running pointer
//! - Edit sessions: render, external edit, parse and reconcile

mod annotation;
pub mod day;
pub mod duration;
pub mod edit;
pub mod filter;
mod interval;
pub mod store;
mod types;

pub use annotation::{PROJECT_PREFIX, PROJECT_PREFIX_SHORT, REF_PREFIX, TAG_PREFIX};
pub use edit::{
    ColumnFormat, EditError, EditFormat, EditOutcome, EditRow, EditSession, Editor,
    Reconciliation,
};
pub use filter::{Filter, FilterError};
pub use interval::Interval;
pub use store::{Store, StoreError};
pub use types::{IntervalId, Status, ValidationError};
