//! Query functions for attendance records.
//!
//! The table holds at most one row per `(class_id, student_id, session_date)`;
//! every write goes through [`upsert_attendance`].

use chrono::NaiveDate;
use diesel::dsl::{count_distinct, count_star, sql};
use diesel::prelude::*;
use diesel::sql_types::{Bool, Double};
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::attendance;
use crate::model::attendance::{AttendanceRecord, NewAttendance};

/// ## Summary
/// Inserts an attendance fact or merges it into the existing row for the same key.
///
/// On conflict `present` becomes the logical OR of old and new and `confidence` the
/// maximum of both. `method`/`recorded_at` take the incoming values unless the row
/// is already present and the incoming write is absent, in which case the row keeps
/// the provenance of the recording that made it present.
///
/// ## Errors
/// Returns a database error if the statement fails.
pub async fn upsert_attendance(
    conn: &mut DbConnection<'_>,
    new_attendance: &NewAttendance,
) -> diesel::QueryResult<AttendanceRecord> {
    diesel::insert_into(attendance::table)
        .values(new_attendance)
        .on_conflict((
            attendance::class_id,
            attendance::student_id,
            attendance::session_date,
        ))
        .do_update()
        .set((
            attendance::present.eq(sql::<Bool>("attendance.present OR EXCLUDED.present")),
            attendance::confidence.eq(sql::<Double>(
                "GREATEST(attendance.confidence, EXCLUDED.confidence)",
            )),
            attendance::method.eq(sql::<diesel::sql_types::Text>(
                "CASE WHEN attendance.present AND NOT EXCLUDED.present \
                 THEN attendance.method ELSE EXCLUDED.method END",
            )),
            attendance::recorded_at.eq(sql::<diesel::sql_types::Timestamptz>(
                "CASE WHEN attendance.present AND NOT EXCLUDED.present \
                 THEN attendance.recorded_at ELSE EXCLUDED.recorded_at END",
            )),
        ))
        .returning(AttendanceRecord::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Returns the IDs of students recorded present for a class on a date.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn present_student_ids(
    conn: &mut DbConnection<'_>,
    class_id: i32,
    session_date: NaiveDate,
) -> diesel::QueryResult<Vec<i32>> {
    attendance::table
        .filter(attendance::class_id.eq(class_id))
        .filter(attendance::session_date.eq(session_date))
        .filter(attendance::present.eq(true))
        .select(attendance::student_id)
        .load::<i32>(conn)
        .await
}

/// ## Summary
/// Returns every attendance row of a class on a date.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn for_class_on(
    conn: &mut DbConnection<'_>,
    class_id: i32,
    session_date: NaiveDate,
) -> diesel::QueryResult<Vec<AttendanceRecord>> {
    attendance::table
        .filter(attendance::class_id.eq(class_id))
        .filter(attendance::session_date.eq(session_date))
        .select(AttendanceRecord::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Counts present days per student for a class.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn present_counts(conn: &mut DbConnection<'_>, class_id: i32) -> diesel::QueryResult<Vec<(i32, i64)>> {
    attendance::table
        .filter(attendance::class_id.eq(class_id))
        .filter(attendance::present.eq(true))
        .group_by(attendance::student_id)
        .select((attendance::student_id, count_star()))
        .load::<(i32, i64)>(conn)
        .await
}

/// ## Summary
/// Counts the distinct session dates with any attendance row for a class.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn session_count(conn: &mut DbConnection<'_>, class_id: i32) -> diesel::QueryResult<i64> {
    attendance::table
        .filter(attendance::class_id.eq(class_id))
        .select(count_distinct(attendance::session_date))
        .get_result::<i64>(conn)
        .await
}

/// ## Summary
/// Returns `(session_date, present_count)` for a class, newest date first.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn present_counts_by_date(
    conn: &mut DbConnection<'_>,
    class_id: i32,
) -> diesel::QueryResult<Vec<(NaiveDate, i64)>> {
    attendance::table
        .filter(attendance::class_id.eq(class_id))
        .filter(attendance::present.eq(true))
        .group_by(attendance::session_date)
        .select((attendance::session_date, count_star()))
        .order(attendance::session_date.desc())
        .load::<(NaiveDate, i64)>(conn)
        .await
}
