//! Query functions for holidays.

use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::holidays;
use crate::model::holiday::Holiday;

/// ## Errors
/// Returns a database error if the query fails.
pub async fn is_holiday(conn: &mut DbConnection<'_>, date: chrono::NaiveDate) -> diesel::QueryResult<bool> {
    diesel::select(exists(holidays::table.filter(holidays::holiday_date.eq(date))))
        .get_result(conn)
        .await
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_holidays(conn: &mut DbConnection<'_>) -> diesel::QueryResult<Vec<Holiday>> {
    holidays::table
        .select(Holiday::as_select())
        .order(holidays::holiday_date.asc())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts a holiday, updating its description if the date already exists.
///
/// ## Errors
/// Returns a database error if the upsert fails.
pub async fn upsert_holiday(conn: &mut DbConnection<'_>, holiday: &Holiday) -> diesel::QueryResult<Holiday> {
    diesel::insert_into(holidays::table)
        .values(holiday)
        .on_conflict(holidays::holiday_date)
        .do_update()
        .set(holidays::description.eq(holiday.description.as_deref()))
        .returning(Holiday::as_returning())
        .get_result(conn)
        .await
}

/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_holiday(conn: &mut DbConnection<'_>, date: chrono::NaiveDate) -> diesel::QueryResult<usize> {
    diesel::delete(holidays::table.filter(holidays::holiday_date.eq(date)))
        .execute(conn)
        .await
}
