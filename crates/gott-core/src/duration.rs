//! Elapsed-time notation (`1h30m`, `45m`, `0s`).
//!
//! Used by the edit file's duration column and by `gott track`.

use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;
use thiserror::Error;

/// The whole input must be a run of `<number><unit>` pairs.
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:\d+(?:\.\d*)?|\.\d+)(?:ms|h|m|s))+$").expect("valid duration regex")
});

static COMPONENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d*)?|\.\d+)(ms|h|m|s)").expect("valid duration component regex")
});

/// Errors from parsing a duration string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("duration is empty")]
    Empty,

    #[error("invalid duration '{0}': expected e.g. 1h30m, 45m or 90s")]
    Invalid(String),
}

/// Parses `1h30m`-style notation. A bare `0` is accepted as zero.
pub fn parse_duration(s: &str) -> Result<Duration, DurationParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if s == "0" {
        return Ok(Duration::zero());
    }
    if !DURATION_RE.is_match(s) {
        return Err(DurationParseError::Invalid(s.to_string()));
    }

    let mut total_ms = 0.0_f64;
    for caps in COMPONENT_RE.captures_iter(s) {
        let value: f64 = caps[1]
            .parse()
            .map_err(|_| DurationParseError::Invalid(s.to_string()))?;
        let unit_ms = match &caps[2] {
            "h" => 3_600_000.0,
            "m" => 60_000.0,
            "s" => 1_000.0,
            _ => 1.0,
        };
        total_ms += value * unit_ms;
    }

    // ~100 years; anything larger is a typo, not a work entry.
    if total_ms > 3_155_760_000_000.0 {
        return Err(DurationParseError::Invalid(s.to_string()));
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "bounded above, rounded to whole milliseconds"
    )]
    let ms = total_ms.round() as i64;
    Ok(Duration::milliseconds(ms))
}

/// Formats a duration the way [`parse_duration`] reads it: `1h30m0s`, `45m0s`, `0s`.
///
/// Sub-second precision is dropped; negative durations format as `0s`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.num_seconds();
    if secs <= 0 {
        return "0s".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Formats a duration as `HH:MM`, rounded to the nearest minute.
pub fn format_clock(d: Duration) -> String {
    let secs = d.num_seconds().max(0);
    let total_minutes = (secs + 30) / 60;
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Serde adapter storing a [`Duration`] as seconds.
///
/// Whole seconds are written as an integer. Anything finer is written as
/// fractional seconds with millisecond precision, which is what
/// [`parse_duration`] can produce.
pub(crate) mod serde_secs {
    use chrono::Duration;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        if d.subsec_nanos() == 0 {
            serializer.serialize_i64(d.num_seconds())
        } else {
            #[expect(
                clippy::cast_precision_loss,
                reason = "parsed durations are capped far below 2^53 ms"
            )]
            let secs = d.num_milliseconds() as f64 / 1000.0;
            serializer.serialize_f64(secs)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        let ms = (secs * 1000.0).round();
        if !ms.is_finite() || ms.abs() >= 9.0e15 {
            return Err(D::Error::custom(format!("duration out of range: {secs}s")));
        }
        #[expect(clippy::cast_possible_truncation, reason = "bounds checked above")]
        Duration::try_milliseconds(ms as i64)
            .ok_or_else(|| D::Error::custom(format!("duration out of range: {secs}s")))
    }
}
