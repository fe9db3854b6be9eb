use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use rollcall_core::error::CoreResult;
use rollcall_core::types::SessionDay;

use crate::{db::schema, model};

/// A scheduled class meeting: either one calendar date or a weekly slot.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Associations, Serialize,
)]
#[diesel(table_name = schema::class_schedules)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(model::class::Class, foreign_key = class_id))]
pub struct ClassSchedule {
    pub id: i32,
    pub class_id: i32,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: Option<i16>,
    pub scheduled_date: Option<chrono::NaiveDate>,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    pub room_number: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ClassSchedule {
    /// ## Summary
    /// Resolves the nullable date/weekday columns into a `SessionDay`.
    ///
    /// ## Errors
    /// Returns a validation error for rows with neither column set or a bad weekday.
    pub fn session_day(&self) -> CoreResult<SessionDay> {
        SessionDay::from_parts(self.scheduled_date, self.day_of_week)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::class_schedules)]
pub struct NewClassSchedule<'a> {
    pub class_id: i32,
    pub day_of_week: Option<i16>,
    pub scheduled_date: Option<chrono::NaiveDate>,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    pub room_number: Option<&'a str>,
}

/// Full replacement of the editable schedule columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::class_schedules)]
#[diesel(treat_none_as_null = true)]
pub struct ClassScheduleChangeset<'a> {
    pub day_of_week: Option<i16>,
    pub scheduled_date: Option<chrono::NaiveDate>,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    pub room_number: Option<&'a str>,
}

/// Marker that one occurrence of a schedule has been finalized.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = schema::session_finalizations)]
#[diesel(check_for_backend(Pg))]
#[diesel(primary_key(schedule_id, session_date))]
#[diesel(belongs_to(ClassSchedule, foreign_key = schedule_id))]
pub struct SessionFinalization {
    pub schedule_id: i32,
    pub session_date: chrono::NaiveDate,
    pub finalized_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = schema::session_finalizations)]
pub struct NewSessionFinalization {
    pub schedule_id: i32,
    pub session_date: chrono::NaiveDate,
}
