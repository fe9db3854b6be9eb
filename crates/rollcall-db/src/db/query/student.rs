//! Query functions for students.

use diesel::dsl::{AsSelect, SqlTypeOf};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::students;
use crate::model::student::{NewStudent, Student};

/// Boxed select of `T`'s columns from `students`.
type BoxedQuery<'a, T> = students::BoxedQuery<'a, Pg, SqlTypeOf<AsSelect<T, Pg>>>;

/// ## Summary
/// Returns a query to select all students ordered by name.
#[must_use]
pub fn all() -> BoxedQuery<'static, Student> {
    students::table
        .select(Student::as_select())
        .order(students::name.asc())
        .into_boxed()
}

#[must_use]
pub fn by_id(id: i32) -> BoxedQuery<'static, Student> {
    all().filter(students::id.eq(id))
}

#[must_use]
pub fn by_code(code: &str) -> BoxedQuery<'_, Student> {
    all().filter(students::student_code.eq(code))
}

/// ## Summary
/// Inserts a new student and returns the inserted record.
///
/// ## Errors
/// Returns a database error if the insert fails, including a unique violation on `student_code`.
pub async fn create_student(
    conn: &mut DbConnection<'_>,
    new_student: &NewStudent<'_>,
) -> diesel::QueryResult<Student> {
    diesel::insert_into(students::table)
        .values(new_student)
        .returning(Student::as_returning())
        .get_result(conn)
        .await
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn get_student(conn: &mut DbConnection<'_>, id: i32) -> diesel::QueryResult<Option<Student>> {
    by_id(id).first::<Student>(conn).await.optional()
}

/// ## Summary
/// Resolves an external display identifier to its student row.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn get_student_by_code(
    conn: &mut DbConnection<'_>,
    code: &str,
) -> diesel::QueryResult<Option<Student>> {
    by_code(code).first::<Student>(conn).await.optional()
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_students(conn: &mut DbConnection<'_>) -> diesel::QueryResult<Vec<Student>> {
    all().load::<Student>(conn).await
}

/// ## Summary
/// Deletes a student and returns the removed row, if any.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_student(
    conn: &mut DbConnection<'_>,
    id: i32,
) -> diesel::QueryResult<Option<Student>> {
    diesel::delete(students::table.filter(students::id.eq(id)))
        .returning(Student::as_returning())
        .get_result(conn)
        .await
        .optional()
}
