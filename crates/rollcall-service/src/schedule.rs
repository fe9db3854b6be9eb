//! Schedule management and the per-schedule finalization view.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use serde::{Deserialize, Deserializer, Serialize};

use rollcall_core::types::{SessionDay, weekday_from_index};
use rollcall_db::db::connection::DbConnection;
use rollcall_db::db::query::{class, schedule};
use rollcall_db::model::schedule::{ClassSchedule, ClassScheduleChangeset, NewClassSchedule};

use crate::error::{ServiceError, ServiceResult};

/// Accepts `HH:MM` as well as `HH:MM:SS[.f]`.
fn deserialize_time<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&raw, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
        .map_err(|e| serde::de::Error::custom(format!("invalid time '{raw}': {e}")))
}

/// The editable columns of a schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleFields {
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: Option<i16>,
    pub scheduled_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_time")]
    pub start_time: NaiveTime,
    #[serde(deserialize_with = "deserialize_time")]
    pub end_time: NaiveTime,
    pub room_number: Option<String>,
}

impl ScheduleFields {
    /// ## Summary
    /// Checks that the row describes a usable session.
    ///
    /// ## Errors
    /// Returns `ValidationError` if neither date nor weekday is set, the weekday
    /// is out of range, or the session does not end after it starts.
    pub fn validate(&self) -> ServiceResult<SessionDay> {
        let invalid = |e: rollcall_core::error::CoreError| ServiceError::ValidationError(e.to_string());
        if let Some(index) = self.day_of_week {
            weekday_from_index(index).map_err(invalid)?;
        }
        let day = SessionDay::from_parts(self.scheduled_date, self.day_of_week).map_err(invalid)?;
        if self.start_time >= self.end_time {
            return Err(ServiceError::ValidationError(
                "end_time must be after start_time".to_string(),
            ));
        }
        Ok(day)
    }

    fn room(&self) -> Option<&str> {
        self.room_number.as_deref().map(str::trim).filter(|room| !room.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSchedule {
    pub class_id: i32,
    #[serde(flatten)]
    pub fields: ScheduleFields,
}

/// A schedule together with whether its relevant occurrence is finalized:
/// the dated occurrence, or today's occurrence for a weekly schedule.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    #[serde(flatten)]
    pub schedule: ClassSchedule,
    pub finalized: bool,
}

/// A schedule with an occurrence today, with its class code and name.
#[derive(Debug, Clone, Serialize)]
pub struct TodaySchedule {
    #[serde(flatten)]
    pub schedule: ClassSchedule,
    pub class_code: String,
    pub class_name: String,
    pub finalized: bool,
}

/// The date whose finalization state a schedule reports.
fn relevant_date(schedule: &ClassSchedule, today: NaiveDate) -> NaiveDate {
    schedule.scheduled_date.unwrap_or(today)
}

async fn finalized_set(
    conn: &mut DbConnection<'_>,
    schedules: &[&ClassSchedule],
) -> ServiceResult<HashSet<(i32, NaiveDate)>> {
    let ids: Vec<i32> = schedules.iter().map(|s| s.id).collect();
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    Ok(schedule::finalized_occurrences(conn, &ids)
        .await?
        .into_iter()
        .collect())
}

/// ## Summary
/// Creates a schedule for an existing class.
///
/// ## Errors
/// - `ValidationError` if the fields do not describe a usable session.
/// - `NotFound` if the class does not exist.
#[tracing::instrument(skip(conn, request), fields(class_id = request.class_id))]
pub async fn create_schedule(
    conn: &mut DbConnection<'_>,
    request: &CreateSchedule,
) -> ServiceResult<ClassSchedule> {
    request.fields.validate()?;
    if class::get_class(conn, request.class_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "Class {} not found",
            request.class_id
        )));
    }

    let fields = &request.fields;
    let created = schedule::create_schedule(
        conn,
        &NewClassSchedule {
            class_id: request.class_id,
            day_of_week: fields.day_of_week,
            scheduled_date: fields.scheduled_date,
            start_time: fields.start_time,
            end_time: fields.end_time,
            room_number: fields.room(),
        },
    )
    .await?;

    tracing::info!(schedule_id = created.id, "Schedule created");
    Ok(created)
}

/// ## Summary
/// Lists a class's schedules with their finalization state as of `today`.
///
/// ## Errors
/// Returns `StoreUnavailable` if a query fails.
pub async fn list_for_class(
    conn: &mut DbConnection<'_>,
    class_id: i32,
    today: NaiveDate,
) -> ServiceResult<Vec<ScheduleView>> {
    let schedules = schedule::list_for_class(conn, class_id).await?;
    let finalized = finalized_set(conn, &schedules.iter().collect::<Vec<_>>()).await?;

    Ok(schedules
        .into_iter()
        .map(|schedule| {
            let finalized = finalized.contains(&(schedule.id, relevant_date(&schedule, today)));
            ScheduleView {
                schedule,
                finalized,
            }
        })
        .collect())
}

/// ## Summary
/// Replaces a schedule's editable columns.
///
/// The row is locked for the duration of the check and the update, so a
/// concurrent sweep cannot finalize a dated schedule between the two.
///
/// ## Errors
/// - `ValidationError` if the new fields are unusable.
/// - `NotFound` if the schedule does not exist.
/// - `Conflict` if the schedule is dated and its session is already finalized.
#[tracing::instrument(skip(conn, fields))]
pub async fn update_schedule(
    conn: &mut DbConnection<'_>,
    schedule_id: i32,
    fields: &ScheduleFields,
) -> ServiceResult<ClassSchedule> {
    fields.validate()?;
    let (day_of_week, scheduled_date) = (fields.day_of_week, fields.scheduled_date);
    let (start_time, end_time) = (fields.start_time, fields.end_time);
    let room_number = fields.room().map(str::to_string);

    let updated = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let existing = schedule::lock_for_update(tx, schedule_id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("Schedule {schedule_id} not found")))?;

                if let Some(date) = existing.scheduled_date
                    && schedule::is_finalized(tx, schedule_id, date).await?
                {
                    return Err(ServiceError::Conflict(format!(
                        "Schedule {schedule_id} on {date} is already finalized"
                    )));
                }

                let changes = ClassScheduleChangeset {
                    day_of_week,
                    scheduled_date,
                    start_time,
                    end_time,
                    room_number: room_number.as_deref(),
                };
                schedule::update_schedule(tx, schedule_id, &changes)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("Schedule {schedule_id} not found")))
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!("Schedule updated");
    Ok(updated)
}

/// ## Errors
/// Returns `NotFound` if the schedule does not exist.
#[tracing::instrument(skip(conn))]
pub async fn delete_schedule(conn: &mut DbConnection<'_>, schedule_id: i32) -> ServiceResult<()> {
    if schedule::delete_schedule(conn, schedule_id).await? == 0 {
        return Err(ServiceError::NotFound(format!(
            "Schedule {schedule_id} not found"
        )));
    }
    tracing::info!("Schedule deleted");
    Ok(())
}

/// ## Summary
/// Lists every schedule with an occurrence on `today`, ordered by start time.
///
/// ## Errors
/// Returns `StoreUnavailable` if a query fails.
pub async fn list_today(conn: &mut DbConnection<'_>, today: NaiveDate) -> ServiceResult<Vec<TodaySchedule>> {
    let rows = schedule::list_occurring_on(conn, today).await?;
    let finalized = finalized_set(conn, &rows.iter().map(|(s, _, _)| s).collect::<Vec<_>>()).await?;

    Ok(rows
        .into_iter()
        .map(|(schedule, class_code, class_name)| {
            let finalized = finalized.contains(&(schedule.id, today));
            TodaySchedule {
                schedule,
                class_code,
                class_name,
                finalized,
            }
        })
        .collect())
}
