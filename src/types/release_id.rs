// ABOUTME: Timestamp-keyed release identifiers.
// ABOUTME: String order equals creation order, so releases sort without parsing.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Format of the timestamp part of every release id.
pub const RELEASE_ID_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Length of a formatted timestamp (`YYYY-MM-DD-HH-MM-SS`).
const TIMESTAMP_LEN: usize = 19;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReleaseIdError {
    #[error("release id cannot be empty")]
    Empty,

    #[error("release id cannot start with a dot: {0}")]
    Hidden(String),

    #[error("release id cannot contain a path separator: {0}")]
    PathSeparator(String),
}

/// Name of one release directory under the releases root.
///
/// Ids produced by [`ReleaseId::now`] are fixed-width timestamps, optionally
/// followed by a `-NNN` collision suffix. Directories created by hand are
/// accepted as long as they are not hidden and contain no separator; they
/// simply have no [`timestamp`](ReleaseId::timestamp).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseId(String);

impl ReleaseId {
    pub fn new(value: &str) -> Result<Self, ReleaseIdError> {
        if value.is_empty() {
            return Err(ReleaseIdError::Empty);
        }

        if value.starts_with('.') {
            return Err(ReleaseIdError::Hidden(value.to_string()));
        }

        if value.contains('/') || value.contains('\\') {
            return Err(ReleaseIdError::PathSeparator(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    /// Id stamped from the local wall clock.
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self(datetime.format(RELEASE_ID_FORMAT).to_string())
    }

    /// Same timestamp with a zero-padded `-NNN` disambiguating suffix.
    ///
    /// `2024-01-01-00-00-00-001` sorts after `2024-01-01-00-00-00` and before
    /// `2024-01-01-00-00-01`. String order follows `n` up to 999.
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{:03}", self.timestamp_part(), n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time encoded in the id, if it follows the timestamp format.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let stamp = self.0.get(..TIMESTAMP_LEN)?;
        let rest = &self.0[TIMESTAMP_LEN..];
        if !rest.is_empty() {
            let suffix = rest.strip_prefix('-')?;
            if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
        }
        NaiveDateTime::parse_from_str(stamp, RELEASE_ID_FORMAT).ok()
    }

    /// Human-readable creation date, e.g. `Jan 3rd, 2024 02:15:09 pm`.
    pub fn display_date(&self) -> Option<String> {
        let ts = self.timestamp()?;
        let day = ts.format("%-d").to_string();
        Some(format!(
            "{} {}{}, {}",
            ts.format("%b"),
            day,
            ordinal_suffix(&day),
            ts.format("%Y %I:%M:%S %P")
        ))
    }

    fn timestamp_part(&self) -> &str {
        self.0.get(..TIMESTAMP_LEN).unwrap_or(&self.0)
    }
}

fn ordinal_suffix(day: &str) -> &'static str {
    match day {
        "11" | "12" | "13" => "th",
        d if d.ends_with('1') => "st",
        d if d.ends_with('2') => "nd",
        d if d.ends_with('3') => "rd",
        _ => "th",
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ReleaseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ReleaseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::new(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> ReleaseId {
        let dt = NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap();
        ReleaseId::from_datetime(dt)
    }

    #[test]
    fn formats_fixed_width_timestamp() {
        assert_eq!(at(2024, 1, 3, 9, 5, 7).as_str(), "2024-01-03-09-05-07");
    }

    #[test]
    fn string_order_matches_time_order() {
        let older = at(2023, 12, 31, 23, 59, 59);
        let newer = at(2024, 1, 1, 0, 0, 0);
        assert!(older < newer);
    }

    #[test]
    fn suffix_sorts_between_neighbouring_seconds() {
        let base = at(2024, 1, 1, 0, 0, 0);
        let next = at(2024, 1, 1, 0, 0, 1);
        let suffixed = base.with_suffix(1);
        assert_eq!(suffixed.as_str(), "2024-01-01-00-00-00-001");
        assert!(base < suffixed);
        assert!(suffixed < next);
        assert_eq!(suffixed.with_suffix(2).as_str(), "2024-01-01-00-00-00-002");
    }

    #[test]
    fn suffix_order_follows_collision_count() {
        let base = at(2024, 1, 1, 0, 0, 0);
        assert!(base.with_suffix(2) < base.with_suffix(10));
        assert!(base.with_suffix(99) < base.with_suffix(100));
    }

    #[test]
    fn parses_timestamp_back() {
        let id = ReleaseId::new("2024-03-02-14-15-16").unwrap();
        let ts = id.timestamp().unwrap();
        assert_eq!(
            ts,
            NaiveDate::from_ymd_opt(2024, 3, 2)
                .unwrap()
                .and_hms_opt(14, 15, 16)
                .unwrap()
        );
        assert!(ReleaseId::new("2024-03-02-14-15-16-3").unwrap().timestamp().is_some());
    }

    #[test]
    fn hand_made_names_have_no_timestamp() {
        let id = ReleaseId::new("hotfix").unwrap();
        assert!(id.timestamp().is_none());
        assert!(ReleaseId::new("2024-03-02-14-15-16-x").unwrap().timestamp().is_none());
    }

    #[test]
    fn rejects_hidden_and_nested_names() {
        assert_eq!(ReleaseId::new(""), Err(ReleaseIdError::Empty));
        assert!(matches!(ReleaseId::new(".tmp"), Err(ReleaseIdError::Hidden(_))));
        assert!(matches!(
            ReleaseId::new("a/b"),
            Err(ReleaseIdError::PathSeparator(_))
        ));
    }

    #[test]
    fn display_date_uses_ordinals() {
        assert_eq!(
            ReleaseId::new("2024-01-03-14-15-09").unwrap().display_date().unwrap(),
            "Jan 3rd, 2024 02:15:09 pm"
        );
        assert_eq!(
            ReleaseId::new("2024-02-11-08-00-00").unwrap().display_date().unwrap(),
            "Feb 11th, 2024 08:00:00 am"
        );
        assert_eq!(
            ReleaseId::new("2024-02-22-08-00-00").unwrap().display_date().unwrap(),
            "Feb 22nd, 2024 08:00:00 am"
        );
    }
}
