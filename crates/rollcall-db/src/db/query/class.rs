//! Query functions for classes.

use std::collections::HashMap;

use diesel::dsl::{AsSelect, SqlTypeOf, count_star};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{classes, enrollments};
use crate::model::class::{Class, NewClass};

/// Boxed select of `T`'s columns from `classes`.
type BoxedQuery<'a, T> = classes::BoxedQuery<'a, Pg, SqlTypeOf<AsSelect<T, Pg>>>;

/// ## Summary
/// Returns a query to select all classes ordered by name.
#[must_use]
pub fn all() -> BoxedQuery<'static, Class> {
    classes::table
        .select(Class::as_select())
        .order(classes::name.asc())
        .into_boxed()
}

/// ## Summary
/// Returns a query to find a class by ID.
#[must_use]
pub fn by_id(id: i32) -> BoxedQuery<'static, Class> {
    all().filter(classes::id.eq(id))
}

/// ## Summary
/// Inserts a new class and returns the inserted record.
///
/// ## Errors
/// Returns a database error if the insert fails, including a unique violation on `code`.
pub async fn create_class(
    conn: &mut DbConnection<'_>,
    new_class: &NewClass<'_>,
) -> diesel::QueryResult<Class> {
    diesel::insert_into(classes::table)
        .values(new_class)
        .returning(Class::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Retrieves a class by ID.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn get_class(conn: &mut DbConnection<'_>, id: i32) -> diesel::QueryResult<Option<Class>> {
    by_id(id).first::<Class>(conn).await.optional()
}

/// ## Summary
/// Lists all classes with the number of enrolled students.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_with_counts(conn: &mut DbConnection<'_>) -> diesel::QueryResult<Vec<(Class, i64)>> {
    let rows = all().load::<Class>(conn).await?;

    let counts: HashMap<i32, i64> = enrollments::table
        .group_by(enrollments::class_id)
        .select((enrollments::class_id, count_star()))
        .load::<(i32, i64)>(conn)
        .await?
        .into_iter()
        .collect();

    Ok(rows
        .into_iter()
        .map(|class| {
            let count = counts.get(&class.id).copied().unwrap_or(0);
            (class, count)
        })
        .collect())
}

/// ## Summary
/// Deletes a class; enrollments, schedules and attendance cascade.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_class(conn: &mut DbConnection<'_>, id: i32) -> diesel::QueryResult<usize> {
    diesel::delete(classes::table.filter(classes::id.eq(id)))
        .execute(conn)
        .await
}
