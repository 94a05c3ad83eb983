//! Weekly series expansion and "this and following" date arithmetic.
//!
//! A series is materialized up front as [`SERIES_LENGTH`] concrete
//! rows that share one `recurrence_id`. Mutations that target a
//! series only ever touch rows at or after the chosen occurrence, so
//! everything here is expressed relative to that anchor.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::core::time::{ensure_storable, format_timestamp};
use crate::core::{Error, Result};

/// Number of occurrences written when a recurring event is created.
pub const SERIES_LENGTH: usize = 100;

/// Days between two consecutive occurrences of a series.
pub const SERIES_INTERVAL_DAYS: i64 = 7;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Single,
    ThisAndFollowing,
}

impl Scope {
    /// Map the `recurring` query flag to a scope. Only the literal
    /// `true` widens the scope.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("true") => Self::ThisAndFollowing,
            _ => Self::Single,
        }
    }

    /// A delete on an event outside of any series can only ever
    /// remove that one row.
    pub fn for_delete(self, recurrence_id: Option<&str>) -> Self {
        match recurrence_id {
            Some(id) if !id.is_empty() => self,
            _ => Self::Single,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub id: String,
    pub date: DateTime<Utc>,
    pub recurrence_id: Option<String>,
}

/// Expand an anchor date into the occurrences to persist. A one-off
/// event yields a single occurrence without a series key; a
/// recurring one yields the full weekly horizon. Fails when the
/// horizon runs past the last storable date.
pub fn expand(anchor: DateTime<Utc>, recurring: bool) -> Result<Vec<Occurrence>> {
    let anchor = ensure_storable(anchor)?;
    if !recurring {
        return Ok(vec![Occurrence {
            id: Uuid::new_v4().to_string(),
            date: anchor,
            recurrence_id: None,
        }]);
    }

    let recurrence_id = Uuid::new_v4().to_string();
    occurrence_dates(anchor)
        .map(|date| {
            Ok(Occurrence {
                id: Uuid::new_v4().to_string(),
                date: ensure_storable(date)?,
                recurrence_id: Some(recurrence_id.clone()),
            })
        })
        .collect()
}

pub fn occurrence_dates(anchor: DateTime<Utc>) -> impl Iterator<Item = DateTime<Utc>> {
    (0..SERIES_LENGTH as i64).map(move |i| anchor + Duration::days(SERIES_INTERVAL_DAYS * i))
}

/// Whole days between the current and the requested date, rounded
/// half away from zero.
pub fn shift_in_days(current: DateTime<Utc>, requested: DateTime<Utc>) -> i64 {
    let seconds = (requested - current).num_seconds() as f64;
    (seconds / SECONDS_PER_DAY).round() as i64
}

/// Move `date` by whole days, failing instead of leaving the storable
/// range.
pub fn shift_date(date: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| {
            Error::InvalidDate(format!("{} {}", format_timestamp(&date), day_modifier(days)))
        })
        .and_then(ensure_storable)
}

/// SQLite date modifier for a shift, e.g. `+7 days` or `-1 days`.
pub fn day_modifier(days: i64) -> String {
    format!("{:+} days", days)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn it_expands_a_one_off_event() {
        let anchor = at(2024, 1, 1, 9, 0);
        let occurrences = expand(anchor, false).unwrap();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].date, anchor);
        assert!(occurrences[0].recurrence_id.is_none());
    }

    #[test]
    fn it_expands_a_weekly_series() {
        let anchor = at(2024, 1, 1, 9, 0);
        let occurrences = expand(anchor, true).unwrap();

        assert_eq!(occurrences.len(), SERIES_LENGTH);
        assert_eq!(occurrences[0].date, anchor);
        assert_eq!(occurrences[99].date, at(2025, 11, 24, 9, 0));

        let series: HashSet<_> = occurrences
            .iter()
            .map(|o| o.recurrence_id.clone().unwrap())
            .collect();
        assert_eq!(series.len(), 1);

        let ids: HashSet<_> = occurrences.iter().map(|o| o.id.clone()).collect();
        assert_eq!(ids.len(), SERIES_LENGTH);

        for pair in occurrences.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(7));
        }
    }

    #[test]
    fn it_generates_a_new_series_key_per_expansion() {
        let anchor = at(2024, 1, 1, 9, 0);
        let a = expand(anchor, true).unwrap();
        let b = expand(anchor, true).unwrap();
        assert_ne!(a[0].recurrence_id, b[0].recurrence_id);
    }

    #[test]
    fn it_refuses_series_past_year_9999() {
        let anchor = at(9999, 6, 1, 9, 0);
        assert!(expand(anchor, false).is_ok());
        assert!(matches!(expand(anchor, true), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn it_shifts_dates_within_range() {
        let date = at(2024, 1, 1, 9, 0);
        assert_eq!(shift_date(date, 2).unwrap(), at(2024, 1, 3, 9, 0));
        assert!(matches!(
            shift_date(at(9999, 12, 30, 9, 0), 7),
            Err(Error::InvalidDate(_))
        ));
        assert!(shift_date(date, i64::MAX).is_err());
    }

    #[test]
    fn it_computes_whole_day_shifts() {
        let current = at(2024, 1, 1, 9, 0);
        assert_eq!(shift_in_days(current, current), 0);
        assert_eq!(shift_in_days(current, at(2024, 1, 3, 9, 0)), 2);
        assert_eq!(shift_in_days(current, at(2023, 12, 31, 9, 0)), -1);
    }

    #[test]
    fn it_rounds_partial_days() {
        let current = at(2024, 1, 1, 9, 0);
        // 1 day and 11 hours
        assert_eq!(shift_in_days(current, at(2024, 1, 2, 20, 0)), 1);
        // 1 day and 12 hours
        assert_eq!(shift_in_days(current, at(2024, 1, 2, 21, 0)), 2);
        // a one hour nudge is not a day shift
        assert_eq!(shift_in_days(current, at(2024, 1, 1, 10, 0)), 0);
        assert_eq!(shift_in_days(current, at(2023, 12, 31, 21, 0)), -1);
    }

    #[test]
    fn it_formats_sqlite_modifiers() {
        assert_eq!(day_modifier(3), "+3 days");
        assert_eq!(day_modifier(0), "+0 days");
        assert_eq!(day_modifier(-2), "-2 days");
    }

    #[test]
    fn it_parses_the_scope_flag() {
        assert_eq!(Scope::from_flag(Some("true")), Scope::ThisAndFollowing);
        assert_eq!(Scope::from_flag(Some("false")), Scope::Single);
        assert_eq!(Scope::from_flag(Some("yes")), Scope::Single);
        assert_eq!(Scope::from_flag(None), Scope::Single);
    }

    #[test]
    fn it_forces_single_delete_outside_a_series() {
        let scope = Scope::ThisAndFollowing;
        assert_eq!(scope.for_delete(None), Scope::Single);
        assert_eq!(scope.for_delete(Some("")), Scope::Single);
        assert_eq!(scope.for_delete(Some("series")), Scope::ThisAndFollowing);
        assert_eq!(Scope::Single.for_delete(Some("series")), Scope::Single);
    }
}
