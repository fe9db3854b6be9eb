//! Session occurrences derived from schedule rows.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use rollcall_db::model::schedule::ClassSchedule;

/// One occurrence of a scheduled class meeting.
///
/// A dated schedule has a single occurrence; a weekly schedule has one per
/// matching weekday. Finalization is tracked per occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClassSession {
    pub schedule_id: i32,
    pub class_id: i32,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_number: Option<String>,
}

impl ClassSession {
    /// ## Summary
    /// Resolves the occurrence of `schedule` on `today`, if it has one.
    /// Rows whose date/weekday columns are unusable resolve to `None`.
    #[must_use]
    pub fn resolve(schedule: &ClassSchedule, today: NaiveDate) -> Option<Self> {
        let day = match schedule.session_day() {
            Ok(day) => day,
            Err(e) => {
                tracing::warn!(schedule_id = schedule.id, error = %e, "Ignoring malformed schedule row");
                return None;
            }
        };

        day.occurrence_on(today).map(|session_date| Self {
            schedule_id: schedule.id,
            class_id: schedule.class_id,
            session_date,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            room_number: schedule.room_number.clone(),
        })
    }

    /// A session has ended once its end time is strictly before `now`.
    #[must_use]
    pub fn has_ended_by(&self, now: NaiveTime) -> bool {
        self.end_time < now
    }
}
