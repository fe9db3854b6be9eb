//! Query functions for class schedules and their finalized occurrences.

use chrono::{NaiveDate, NaiveTime};
use diesel::dsl::{AsSelect, SqlTypeOf, exists};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use rollcall_core::types::weekday_index;

use crate::db::connection::DbConnection;
use crate::db::schema::{class_schedules, classes, session_finalizations};
use crate::model::schedule::{
    ClassSchedule, ClassScheduleChangeset, NewClassSchedule, NewSessionFinalization,
};

/// Boxed select of `T`'s columns from `class_schedules`.
type BoxedQuery<'a, T> = class_schedules::BoxedQuery<'a, Pg, SqlTypeOf<AsSelect<T, Pg>>>;

/// ## Summary
/// Returns a query to select all schedules.
#[must_use]
pub fn all() -> BoxedQuery<'static, ClassSchedule> {
    class_schedules::table
        .select(ClassSchedule::as_select())
        .into_boxed()
}

/// ## Summary
/// Returns a query for the schedules of a class, dated rows first by date, then by weekday and start.
#[must_use]
pub fn by_class(class_id: i32) -> BoxedQuery<'static, ClassSchedule> {
    all()
        .filter(class_schedules::class_id.eq(class_id))
        .order((
            class_schedules::scheduled_date.asc(),
            class_schedules::day_of_week.asc(),
            class_schedules::start_time.asc(),
        ))
}

/// ## Summary
/// Filter matching schedules with an occurrence on a day: rows dated that day,
/// and undated weekly rows on the given weekday index.
#[diesel::dsl::auto_type]
#[must_use]
pub fn occurs_on(day: NaiveDate, weekday: i16) -> _ {
    class_schedules::scheduled_date.eq(day).or(class_schedules::scheduled_date
        .is_null()
        .and(class_schedules::day_of_week.eq(weekday)))
}

/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_schedule(
    conn: &mut DbConnection<'_>,
    new_schedule: &NewClassSchedule<'_>,
) -> diesel::QueryResult<ClassSchedule> {
    diesel::insert_into(class_schedules::table)
        .values(new_schedule)
        .returning(ClassSchedule::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Reads a schedule row and locks it for the rest of the transaction.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn lock_for_update(conn: &mut DbConnection<'_>, id: i32) -> diesel::QueryResult<Option<ClassSchedule>> {
    class_schedules::table
        .filter(class_schedules::id.eq(id))
        .select(ClassSchedule::as_select())
        .for_update()
        .first::<ClassSchedule>(conn)
        .await
        .optional()
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_for_class(conn: &mut DbConnection<'_>, class_id: i32) -> diesel::QueryResult<Vec<ClassSchedule>> {
    by_class(class_id).load::<ClassSchedule>(conn).await
}

/// ## Summary
/// Lists today's schedules with the owning class code and name, ordered by start time.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_occurring_on(
    conn: &mut DbConnection<'_>,
    today: NaiveDate,
) -> diesel::QueryResult<Vec<(ClassSchedule, String, String)>> {
    let weekday = weekday_index(chrono::Datelike::weekday(&today));
    class_schedules::table
        .inner_join(classes::table)
        .filter(occurs_on(today, weekday))
        .order(class_schedules::start_time.asc())
        .select((ClassSchedule::as_select(), classes::code, classes::name))
        .load::<(ClassSchedule, String, String)>(conn)
        .await
}

/// ## Errors
/// Returns a database error if the update fails.
pub async fn update_schedule(
    conn: &mut DbConnection<'_>,
    id: i32,
    changes: &ClassScheduleChangeset<'_>,
) -> diesel::QueryResult<Option<ClassSchedule>> {
    diesel::update(class_schedules::table.filter(class_schedules::id.eq(id)))
        .set(changes)
        .returning(ClassSchedule::as_returning())
        .get_result(conn)
        .await
        .optional()
}

/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_schedule(conn: &mut DbConnection<'_>, id: i32) -> diesel::QueryResult<usize> {
    diesel::delete(class_schedules::table.filter(class_schedules::id.eq(id)))
        .execute(conn)
        .await
}

/// ## Summary
/// Selects the session occurrences that are due for finalization on `today`:
/// scheduled today (dated or weekly), ended strictly before `now`, and without a
/// finalization row for `today`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn finalization_candidates(
    conn: &mut DbConnection<'_>,
    today: NaiveDate,
    now: NaiveTime,
) -> diesel::QueryResult<Vec<ClassSchedule>> {
    let weekday = weekday_index(chrono::Datelike::weekday(&today));
    class_schedules::table
        .left_join(
            session_finalizations::table.on(session_finalizations::schedule_id
                .eq(class_schedules::id)
                .and(session_finalizations::session_date.eq(today))),
        )
        .filter(session_finalizations::schedule_id.is_null())
        .filter(occurs_on(today, weekday))
        .filter(class_schedules::end_time.lt(now))
        .order(class_schedules::id.asc())
        .select(ClassSchedule::as_select())
        .load::<ClassSchedule>(conn)
        .await
}

/// ## Summary
/// Records that the occurrence of `schedule_id` on `session_date` is finalized.
/// Re-finalizing is a no-op; returns the number of rows inserted.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn mark_finalized(
    conn: &mut DbConnection<'_>,
    schedule_id: i32,
    session_date: NaiveDate,
) -> diesel::QueryResult<usize> {
    diesel::insert_into(session_finalizations::table)
        .values(NewSessionFinalization {
            schedule_id,
            session_date,
        })
        .on_conflict_do_nothing()
        .execute(conn)
        .await
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn is_finalized(
    conn: &mut DbConnection<'_>,
    schedule_id: i32,
    session_date: NaiveDate,
) -> diesel::QueryResult<bool> {
    diesel::select(exists(
        session_finalizations::table
            .filter(session_finalizations::schedule_id.eq(schedule_id))
            .filter(session_finalizations::session_date.eq(session_date)),
    ))
    .get_result(conn)
    .await
}

/// ## Summary
/// Returns the `(schedule_id, session_date)` pairs finalized for any of `schedule_ids`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn finalized_occurrences(
    conn: &mut DbConnection<'_>,
    schedule_ids: &[i32],
) -> diesel::QueryResult<Vec<(i32, NaiveDate)>> {
    session_finalizations::table
        .filter(session_finalizations::schedule_id.eq_any(schedule_ids))
        .select((
            session_finalizations::schedule_id,
            session_finalizations::session_date,
        ))
        .load::<(i32, NaiveDate)>(conn)
        .await
}
