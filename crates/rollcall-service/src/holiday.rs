//! Holiday calendar maintenance. The finalizer only reads it.

use chrono::NaiveDate;
use serde::Deserialize;

use rollcall_db::db::connection::DbConnection;
use rollcall_db::db::query::holiday;
use rollcall_db::model::holiday::Holiday;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateHoliday {
    pub holiday_date: NaiveDate,
    pub description: Option<String>,
}

/// ## Errors
/// Returns `StoreUnavailable` if the query fails.
pub async fn list_holidays(conn: &mut DbConnection<'_>) -> ServiceResult<Vec<Holiday>> {
    Ok(holiday::list_holidays(conn).await?)
}

/// ## Summary
/// Flags a date as non-instructional. Re-adding a date replaces its description.
///
/// ## Errors
/// Returns `StoreUnavailable` if the upsert fails.
#[tracing::instrument(skip(conn, request), fields(holiday_date = %request.holiday_date))]
pub async fn add_holiday(conn: &mut DbConnection<'_>, request: CreateHoliday) -> ServiceResult<Holiday> {
    let stored = holiday::upsert_holiday(
        conn,
        &Holiday {
            holiday_date: request.holiday_date,
            description: request.description,
        },
    )
    .await?;
    tracing::info!("Holiday added");
    Ok(stored)
}

/// ## Errors
/// Returns `NotFound` if the date is not a holiday.
#[tracing::instrument(skip(conn))]
pub async fn remove_holiday(conn: &mut DbConnection<'_>, date: NaiveDate) -> ServiceResult<()> {
    if holiday::delete_holiday(conn, date).await? == 0 {
        return Err(ServiceError::NotFound(format!("No holiday on {date}")));
    }
    Ok(())
}
