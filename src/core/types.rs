//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Revision`] - Monotonic document version used for compare-and-swap
//! - [`UtcTimestamp`] - RFC3339 timestamp truncated to whole seconds
//!
//! # Examples
//!
//! ```
//! use linecook::core::types::{Revision, UtcTimestamp};
//!
//! let rev = Revision::INITIAL;
//! assert_eq!(rev.next(), Some(Revision::new(1)));
//!
//! let ts = UtcTimestamp::parse("2025-12-16T09:30:00+00:00").unwrap();
//! assert_eq!(ts.to_string(), "2025-12-16T09:30:00+00:00");
//! ```

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// The version tag of the stored document.
///
/// Revisions start at [`Revision::INITIAL`] and advance by exactly one on
/// every committed write. Serialized as a bare JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(u64);

impl Revision {
    /// Revision of a freshly seeded document.
    pub const INITIAL: Revision = Revision(0);

    /// Wrap a raw revision number.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The revision a successful write on top of `self` produces.
    ///
    /// Returns `None` once the counter is exhausted.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Get the raw revision number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Revision {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A UTC timestamp with second precision.
///
/// Serialized as RFC3339 with an explicit `+00:00` offset, e.g.
/// `2025-12-16T09:30:00+00:00`. Sub-second precision is dropped at
/// construction so a timestamp always round-trips through its string form.
///
/// # Example
///
/// ```
/// use linecook::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// let parsed = UtcTimestamp::parse(&now.to_string()).unwrap();
/// assert_eq!(now, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UtcTimestamp(DateTime<Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Create a timestamp from a chrono DateTime, truncating to seconds.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(0))
    }

    /// Parse an RFC3339 timestamp in any offset, normalized to UTC.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidTimestamp` if `s` is not RFC3339.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self::from_datetime(dt.with_timezone(&Utc)))
            .map_err(|e| TypeError::InvalidTimestamp(format!("{s}: {e}")))
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::Secs, false))
    }
}

impl TryFrom<String> for UtcTimestamp {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UtcTimestamp> for String {
    fn from(value: UtcTimestamp) -> Self {
        value.to_string()
    }
}
