//! Schedule-day resolution shared by the store and the finalizer.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{CoreError, CoreResult};

/// When a class session takes place: on one calendar date, or on a weekday every week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionDay {
    Dated(NaiveDate),
    Weekly(Weekday),
}

impl SessionDay {
    /// ## Summary
    /// Builds a `SessionDay` from the nullable schedule columns.
    /// An explicit date takes precedence over the weekday.
    ///
    /// ## Errors
    /// Returns `CoreError::ValidationError` if neither column is set or the weekday
    /// index is outside `0..=6`.
    pub fn from_parts(scheduled_date: Option<NaiveDate>, day_of_week: Option<i16>) -> CoreResult<Self> {
        match (scheduled_date, day_of_week) {
            (Some(date), _) => Ok(Self::Dated(date)),
            (None, Some(index)) => weekday_from_index(index).map(Self::Weekly),
            (None, None) => Err(CoreError::ValidationError(
                "a schedule needs either scheduled_date or day_of_week".to_string(),
            )),
        }
    }

    /// ## Summary
    /// Returns the session date if this schedule has an occurrence on `today`.
    #[must_use]
    pub fn occurrence_on(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Dated(date) => (date == today).then_some(date),
            Self::Weekly(weekday) => (today.weekday() == weekday).then_some(today),
        }
    }
}

/// ## Summary
/// Converts a day index (0 = Sunday .. 6 = Saturday) to a `Weekday`.
///
/// ## Errors
/// Returns `CoreError::ValidationError` for indices outside `0..=6`.
pub fn weekday_from_index(index: i16) -> CoreResult<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(CoreError::ValidationError(format!(
            "day_of_week must be between 0 (Sunday) and 6 (Saturday), got {other}"
        ))),
    }
}

/// Inverse of [`weekday_from_index`].
#[must_use]
pub fn weekday_index(weekday: Weekday) -> i16 {
    i16::try_from(weekday.num_days_from_sunday()).unwrap_or_default()
}
