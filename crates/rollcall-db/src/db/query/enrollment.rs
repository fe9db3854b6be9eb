//! Query functions for class rosters.

use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{enrollments, students};
use crate::model::enrollment::NewEnrollment;
use crate::model::student::Student;

/// ## Summary
/// Enrolls a student in a class. Enrolling twice is a no-op.
///
/// Returns the number of inserted rows (0 when already enrolled).
///
/// ## Errors
/// Returns a database error if the insert fails (e.g. unknown class or student).
pub async fn enroll(conn: &mut DbConnection<'_>, enrollment: NewEnrollment) -> diesel::QueryResult<usize> {
    diesel::insert_into(enrollments::table)
        .values(enrollment)
        .on_conflict_do_nothing()
        .execute(conn)
        .await
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn is_enrolled(
    conn: &mut DbConnection<'_>,
    class_id: i32,
    student_id: i32,
) -> diesel::QueryResult<bool> {
    diesel::select(exists(
        enrollments::table
            .filter(enrollments::class_id.eq(class_id))
            .filter(enrollments::student_id.eq(student_id)),
    ))
    .get_result(conn)
    .await
}

/// ## Summary
/// Returns the IDs of every student enrolled in the class.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn roster_ids(conn: &mut DbConnection<'_>, class_id: i32) -> diesel::QueryResult<Vec<i32>> {
    enrollments::table
        .filter(enrollments::class_id.eq(class_id))
        .select(enrollments::student_id)
        .load::<i32>(conn)
        .await
}

/// ## Summary
/// Returns the enrolled students of a class with their enrollment time, ordered by name.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn roster_students(
    conn: &mut DbConnection<'_>,
    class_id: i32,
) -> diesel::QueryResult<Vec<(Student, chrono::DateTime<chrono::Utc>)>> {
    students::table
        .inner_join(enrollments::table)
        .filter(enrollments::class_id.eq(class_id))
        .order(students::name.asc())
        .select((Student::as_select(), enrollments::enrolled_at))
        .load::<(Student, chrono::DateTime<chrono::Utc>)>(conn)
        .await
}
